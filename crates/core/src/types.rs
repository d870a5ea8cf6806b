use serde::{Deserialize, Serialize};
use std::fmt;

/// The two OCR engines feeding the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineId {
    #[serde(rename = "easyocr")]
    EasyOcr,
    #[serde(rename = "paddleocr")]
    PaddleOcr,
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineId::EasyOcr => write!(f, "easyocr"),
            EngineId::PaddleOcr => write!(f, "paddleocr"),
        }
    }
}

/// One raw reading from one OCR engine. Empty text is a valid reading and
/// means "the engine found nothing".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReading {
    pub engine: EngineId,
    pub text: String,
    /// Engine-reported confidence (0.0 = guessed, 1.0 = certain).
    pub confidence: f32,
}

impl RawReading {
    pub fn new(engine: EngineId, text: impl Into<String>, confidence: f32) -> Self {
        Self { engine, text: text.into(), confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// Per-engine outcome after cleaning and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineVerdict {
    pub engine: EngineId,
    pub cleaned_text: String,
    /// Confidence after the format-validity adjustment.
    pub confidence: f32,
    pub is_valid: bool,
}

/// Which decision rule produced the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    BothAgree,
    EasyocrValid,
    PaddleocrValid,
    BothValidEasyHigher,
    BothValidPaddleHigher,
    NeitherValidEasyHigher,
    NeitherValidPaddleHigher,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DecisionSource::BothAgree => "both_agree",
            DecisionSource::EasyocrValid => "easyocr_valid",
            DecisionSource::PaddleocrValid => "paddleocr_valid",
            DecisionSource::BothValidEasyHigher => "both_valid_easy_higher",
            DecisionSource::BothValidPaddleHigher => "both_valid_paddle_higher",
            DecisionSource::NeitherValidEasyHigher => "neither_valid_easy_higher",
            DecisionSource::NeitherValidPaddleHigher => "neither_valid_paddle_higher",
        };
        write!(f, "{tag}")
    }
}

/// The fused verdict for one plate region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleDecision {
    /// Corrected, validated plate text; empty when no engine produced a
    /// usable reading.
    pub final_text: String,
    pub final_confidence: f32,
    pub source: DecisionSource,
}

/// The full result of one ensemble call: the fused decision plus both
/// individual engine verdicts, so callers can log or persist either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionOutcome {
    pub decision: EnsembleDecision,
    pub easyocr: EngineVerdict,
    pub paddleocr: EngineVerdict,
}
