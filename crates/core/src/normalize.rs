/// Canonicalize a raw OCR reading: uppercase, strip everything outside
/// `[A-Z0-9]`, and reject results shorter than 2 or longer than 10
/// characters.
///
/// The empty string is the sentinel for "no usable reading" — this function
/// is total and never fails.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .flat_map(char::to_uppercase)
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if cleaned.len() < 2 || cleaned.len() > 10 {
        return String::new();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_whitespace_and_punctuation() {
        assert_eq!(normalize(" 34 ab-12 "), "34AB12");
        assert_eq!(normalize("34.AB.123"), "34AB123");
    }

    #[test]
    fn uppercases() {
        assert_eq!(normalize("06abc123"), "06ABC123");
    }

    #[test]
    fn empty_and_tiny_inputs_map_to_sentinel() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("a"), "");
        assert_eq!(normalize("  .  "), "");
    }

    #[test]
    fn overlong_input_maps_to_sentinel() {
        // 13 alphanumeric characters exceed the 10-character cap.
        assert_eq!(normalize("ABCDEFGH12345"), "");
    }

    #[test]
    fn length_two_is_kept() {
        assert_eq!(normalize("34"), "34");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(normalize("34ÇÖÜab12"), "34AB12");
    }

    #[test]
    fn idempotent() {
        for input in [" 34 ab-12 ", "06abc123", "", "ABCDEFGH12345", "x9"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input was {input:?}");
        }
    }

    #[test]
    fn output_is_empty_or_within_bounds() {
        for input in ["", "a", "ab", "abc def ghi jk", "!!!", "1234567890", "12345678901"] {
            let out = normalize(input);
            assert!(out.is_empty() || (2..=10).contains(&out.len()), "input was {input:?}");
        }
    }
}
