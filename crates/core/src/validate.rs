use std::sync::OnceLock;

use regex::Regex;

// ── Compiled grammar cache ───────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Standard plate: 2-digit province + 1-3 letters + 1-4 digits. The letter
// and digit classes are disjoint, so one pattern covers all 12 layouts and
// every input matches at most one of them.
re!(re_standard, r"^([0-9]{2})([A-Z]{1,3})([0-9]{1,4})$");
// Diplomatic plate: 2-3 letters + 3-4 digits + optional trailing letter.
re!(re_diplomatic, r"^([A-Z]{2,3})([0-9]{3,4})([A-Z]?)$");
// Legacy plate: 1-2 letters + 2-4 digits + 1-2 letters.
re!(re_legacy, r"^([A-Z]{1,2})([0-9]{2,4})([A-Z]{1,2})$");

/// The grammar class a plate string was accepted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateFormat {
    Standard,
    Diplomatic,
    Legacy,
}

/// A province code is valid iff it is two ASCII digits in 01–81.
pub fn valid_province(code: &str) -> bool {
    code.len() == 2
        && code.bytes().all(|b| b.is_ascii_digit())
        && matches!(code.parse::<u8>(), Ok(1..=81))
}

/// Match `text` against the known plate grammars. Standard acceptance also
/// requires a valid province prefix; anything shorter than 5 characters
/// (including the empty sentinel) is rejected outright.
pub fn validate(text: &str) -> Option<PlateFormat> {
    if text.len() < 5 {
        return None;
    }
    if let Some(captures) = re_standard().captures(text) {
        // Standard-shaped strings start with digits, so they cannot fall
        // through to the letter-prefixed grammars below.
        let province = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        return valid_province(province).then_some(PlateFormat::Standard);
    }
    if re_diplomatic().is_match(text) {
        return Some(PlateFormat::Diplomatic);
    }
    if re_legacy().is_match(text) {
        return Some(PlateFormat::Legacy);
    }
    None
}

pub fn is_valid(text: &str) -> bool {
    validate(text).is_some()
}
