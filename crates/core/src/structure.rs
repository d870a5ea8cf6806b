//! Structural analysis: hypothesize the intended plate layout and, when one
//! hypothesis is convincing enough, produce a corrected string.

use crate::validate::{re_diplomatic, re_legacy, re_standard, valid_province};
use crate::variants::{apply_substitutions, correction_variants, CorrectionVariant};

/// Full letter→digit confusion map, used when repairing a province prefix.
pub(crate) const LETTER_TO_DIGIT: &[(char, char)] = &[
    ('B', '8'),
    ('D', '0'),
    ('G', '6'),
    ('S', '5'),
    ('O', '0'),
    ('I', '1'),
    ('Z', '2'),
];

/// The unambiguous confusion pair, safe to apply blind.
const OBVIOUS_FIXES: &[(char, char)] = &[('O', '0'), ('I', '1')];

/// Score a hypothesis must exceed before its correction is trusted.
const CORRECTION_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Standard,
    Diplomatic,
    Legacy,
    Unknown,
}

/// One scored guess at the intended layout of a plate string.
#[derive(Debug, Clone)]
pub struct StructuralHypothesis {
    pub kind: PatternKind,
    pub province: Option<String>,
    pub letter_segment: String,
    pub digit_segment: String,
    pub expected_letters: usize,
    pub expected_digits: usize,
    pub score: f32,
    /// Set when the hypothesis came with its own corrected reading.
    pub corrected_text: Option<String>,
    pub corrections: Vec<String>,
}

impl StructuralHypothesis {
    fn unknown() -> Self {
        StructuralHypothesis {
            kind: PatternKind::Unknown,
            province: None,
            letter_segment: String::new(),
            digit_segment: String::new(),
            expected_letters: 0,
            expected_digits: 0,
            score: 0.0,
            corrected_text: None,
            corrections: Vec::new(),
        }
    }
}

/// Determine the most probable layout for a normalized plate string.
///
/// Hypotheses are generated in a fixed order — standard as-is, then
/// variant-corrected standard, then the special formats — and the maximum
/// is taken with a strict comparison, so equal scores resolve to the
/// earliest hypothesis. Inputs shorter than 5 characters or containing
/// non-ASCII are unknown outright, matching the validator's domain.
pub fn analyze(text: &str) -> StructuralHypothesis {
    if text.len() < 5 || !text.is_ascii() {
        return StructuralHypothesis::unknown();
    }

    let mut hypotheses = Vec::new();

    if let Some(h) = standard_hypothesis(text) {
        hypotheses.push(h);
    }
    for variant in correction_variants(text) {
        if let Some(h) = variant_hypothesis(&variant) {
            hypotheses.push(h);
        }
    }
    hypotheses.extend(special_hypotheses(text));

    hypotheses
        .into_iter()
        .fold(StructuralHypothesis::unknown(), |best, h| if h.score > best.score { h } else { best })
}

/// Correct a normalized plate string using its best structural hypothesis.
///
/// Inputs shorter than 5 characters, or containing non-ASCII, pass through
/// unchanged. When no hypothesis clears the trust threshold, only the
/// unambiguous `O→0`, `I→1` substitutions are applied.
pub fn correct(text: &str) -> String {
    if text.len() < 5 || !text.is_ascii() {
        return text.to_string();
    }

    let best = analyze(text);
    if best.score > CORRECTION_THRESHOLD {
        // A raw structural match carries no corrected text: its segments are
        // already class-pure, so repairing the province is all that is left
        // — and for a matched standard layout the province is already
        // numeric. The identity result is intentional.
        return match best.corrected_text {
            Some(corrected) => corrected,
            None => repair_province(text),
        };
    }

    apply_substitutions(text, OBVIOUS_FIXES)
}

fn repair_province(text: &str) -> String {
    let (prefix, rest) = text.split_at(2);
    format!("{}{rest}", apply_substitutions(prefix, LETTER_TO_DIGIT))
}

/// Likelihood bonus for how common a standard segment-length combination is
/// on real plates.
fn layout_bonus(letters: usize, digits: usize) -> f32 {
    match (letters, digits) {
        (2, 2) | (2, 3) => 0.2,
        (3, 1) | (1, 4) => 0.15,
        _ => 0.0,
    }
}

fn standard_hypothesis(text: &str) -> Option<StructuralHypothesis> {
    let captures = re_standard().captures(text)?;
    let province = captures.get(1)?.as_str();
    let letters = captures.get(2)?.as_str();
    let digits = captures.get(3)?.as_str();

    let mut score = 0.5;
    if valid_province(province) {
        score += 0.3;
    }
    score += layout_bonus(letters.len(), digits.len());

    Some(StructuralHypothesis {
        kind: PatternKind::Standard,
        province: Some(province.to_string()),
        letter_segment: letters.to_string(),
        digit_segment: digits.to_string(),
        expected_letters: letters.len(),
        expected_digits: digits.len(),
        score,
        corrected_text: None,
        corrections: Vec::new(),
    })
}

fn variant_hypothesis(variant: &CorrectionVariant) -> Option<StructuralHypothesis> {
    let captures = re_standard().captures(&variant.text)?;
    let province = captures.get(1)?.as_str();
    let letters = captures.get(2)?.as_str();
    let digits = captures.get(3)?.as_str();

    // Lower base than an as-is match, plus the variant's own quality score;
    // the whole hypothesis is then discounted for being a guess.
    let mut score = 0.4;
    if valid_province(province) {
        score += 0.3;
    }
    score += variant.score;
    score *= 0.9;

    Some(StructuralHypothesis {
        kind: PatternKind::Standard,
        province: Some(province.to_string()),
        letter_segment: letters.to_string(),
        digit_segment: digits.to_string(),
        expected_letters: letters.len(),
        expected_digits: digits.len(),
        score,
        corrected_text: Some(variant.text.clone()),
        corrections: variant.notes.clone(),
    })
}

fn special_hypotheses(text: &str) -> Vec<StructuralHypothesis> {
    let mut hypotheses = Vec::new();

    if let Some(captures) = re_diplomatic().captures(text) {
        let letters = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let digits = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        hypotheses.push(StructuralHypothesis {
            kind: PatternKind::Diplomatic,
            province: None,
            letter_segment: letters.to_string(),
            digit_segment: digits.to_string(),
            expected_letters: letters.len(),
            expected_digits: digits.len(),
            score: 0.8,
            // Segments matched class-pure, so the text is already in its
            // corrected form.
            corrected_text: Some(text.to_string()),
            corrections: Vec::new(),
        });
    }

    if let Some(captures) = re_legacy().captures(text) {
        let letters = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let digits = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        hypotheses.push(StructuralHypothesis {
            kind: PatternKind::Legacy,
            province: None,
            letter_segment: letters.to_string(),
            digit_segment: digits.to_string(),
            expected_letters: letters.len(),
            expected_digits: digits.len(),
            score: 0.6,
            corrected_text: Some(text.to_string()),
            corrections: Vec::new(),
        });
    }

    hypotheses
}
