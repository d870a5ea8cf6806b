//! Candidate corrected strings for the structural analyzer.
//!
//! OCR engines confuse visually similar glyphs (0/O, 1/I, 8/B, ...). Instead
//! of guessing blind, we enumerate a bounded set of alternative readings —
//! one province-only fix plus one variant per plausible letter/digit
//! boundary — and let the analyzer score them against the plate grammars.

/// Characters misread inside the 2-digit province prefix.
pub(crate) const PROVINCE_FIXES: &[(char, char)] = &[('O', '0'), ('I', '1'), ('D', '0')];

/// Digit glyphs that are plausibly misread letters (applied to an assumed
/// letter segment).
pub(crate) const DIGIT_TO_LETTER: &[(char, char)] =
    &[('8', 'B'), ('0', 'O'), ('6', 'G'), ('5', 'S'), ('1', 'I'), ('2', 'Z')];

/// Conservative letter→digit fixes for an assumed digit segment. Deliberately
/// smaller than the reverse map: G→6 and B→8 cause more damage than they fix.
pub(crate) const LETTER_TO_DIGIT_CONSERVATIVE: &[(char, char)] =
    &[('O', '0'), ('I', '1'), ('S', '5'), ('Z', '2')];

/// Apply a substitution table character by character.
pub(crate) fn apply_substitutions(text: &str, table: &[(char, char)]) -> String {
    text.chars()
        .map(|c| table.iter().find(|(from, _)| *from == c).map_or(c, |&(_, to)| to))
        .collect()
}

/// One candidate corrected string with its correction-quality score and
/// human-readable notes describing what changed.
#[derive(Debug, Clone)]
pub struct CorrectionVariant {
    pub text: String,
    pub score: f32,
    pub notes: Vec<String>,
}

/// Generate correction variants for a normalized plate string.
///
/// Bounded search: at most one province variant plus `len - 3` boundary
/// variants. Inputs shorter than 5 characters produce nothing — too little
/// signal to correct safely. Non-ASCII input also produces nothing: the
/// grammars only accept `[A-Z0-9]`, and it keeps the byte-index splits
/// below on char boundaries.
pub fn correction_variants(text: &str) -> Vec<CorrectionVariant> {
    let mut variants = Vec::new();
    if text.len() < 5 || !text.is_ascii() {
        return variants;
    }

    let (prefix, remainder) = text.split_at(2);
    let fixed_prefix = apply_substitutions(prefix, PROVINCE_FIXES);

    if fixed_prefix != prefix {
        variants.push(CorrectionVariant {
            text: format!("{fixed_prefix}{remainder}"),
            score: 0.1,
            notes: vec![format!("province: {prefix} -> {fixed_prefix}")],
        });
    }

    // Try every split of the remainder into a letter segment (1-3) and a
    // digit segment (1-4), correcting each side toward its assumed class.
    // Boundary variants build on the corrected province prefix.
    for split in 1..remainder.len() {
        let (letters, digits) = remainder.split_at(split);
        if !(1..=3).contains(&letters.len()) || !(1..=4).contains(&digits.len()) {
            continue;
        }

        let fixed_letters = apply_substitutions(letters, DIGIT_TO_LETTER);
        let fixed_digits = apply_substitutions(digits, LETTER_TO_DIGIT_CONSERVATIVE);
        let candidate = format!("{fixed_prefix}{fixed_letters}{fixed_digits}");

        if candidate != text {
            variants.push(CorrectionVariant {
                score: variant_score(letters, digits, &fixed_letters, &fixed_digits),
                notes: vec![
                    format!("letters: {letters} -> {fixed_letters}"),
                    format!("digits: {digits} -> {fixed_digits}"),
                ],
                text: candidate,
            });
        }
    }

    variants
}

/// Quality score for a boundary variant: reward segments that became pure
/// after correction, penalize corrections that touch too many characters.
fn variant_score(
    orig_letters: &str,
    orig_digits: &str,
    fixed_letters: &str,
    fixed_digits: &str,
) -> f32 {
    let mut score = 0.0;

    if is_all_alphabetic(fixed_letters) && !is_all_alphabetic(orig_letters) {
        score += 0.15;
    }
    if is_all_numeric(fixed_digits) && !is_all_numeric(orig_digits) {
        score += 0.15;
    }

    let changes = count_changes(orig_letters, fixed_letters) + count_changes(orig_digits, fixed_digits);
    if changes <= 2 {
        score += 0.1;
    } else if changes <= 4 {
        score += 0.05;
    } else {
        score -= 0.1;
    }

    score
}

fn is_all_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_all_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Positional character differences; substitutions preserve length, so a
/// plain zip suffices.
fn count_changes(before: &str, after: &str) -> usize {
    before.chars().zip(after.chars()).filter(|(b, a)| b != a).count()
}
