use crate::validate::{validate, PlateFormat};

/// Rescale an engine confidence based on how the cleaned text fares against
/// the plate grammars: a full standard match (which implies a valid
/// province) earns the strongest boost, any other accepted grammar a weaker
/// one, and rejected text a mild penalty floored at 0.1.
pub fn adjust(text: &str, confidence: f32) -> f32 {
    match validate(text) {
        Some(PlateFormat::Standard) => (confidence * 1.3).min(1.0),
        Some(_) => (confidence * 1.15).min(1.0),
        None => (confidence * 0.9).max(0.1),
    }
}
