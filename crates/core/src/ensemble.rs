//! Fusing two engine readings into one verdict.
//!
//! The rule order encodes signal strength: agreement between independent
//! engines beats format validity, and format validity beats raw confidence.
//! Confidence is only trusted on its own when nothing else discriminates.

use crate::confidence;
use crate::normalize::normalize;
use crate::structure::correct;
use crate::types::{
    DecisionSource, EngineVerdict, EnsembleDecision, RawReading, RecognitionOutcome,
};
use crate::validate::is_valid;

/// Normalize and structurally correct one raw OCR string. Returns the empty
/// sentinel when the reading is unusable.
pub fn clean_plate_text(raw: &str) -> String {
    correct(&normalize(raw))
}

/// Fuse the two engines' readings for one plate region.
///
/// Pure and total: same inputs, same decision; empty readings flow through
/// as data rather than errors. Decision rules compare the engines' raw
/// confidences; the verdicts surfaced for observability carry the
/// format-adjusted values.
pub fn fuse(easy: &RawReading, paddle: &RawReading) -> RecognitionOutcome {
    let easy_cleaned = clean_plate_text(&easy.text);
    let paddle_cleaned = clean_plate_text(&paddle.text);
    let easy_valid = is_valid(&easy_cleaned);
    let paddle_valid = is_valid(&paddle_cleaned);

    let decision = if easy_cleaned == paddle_cleaned && !easy_cleaned.is_empty() {
        // Independent engines rarely make the same mistake.
        EnsembleDecision {
            final_confidence: confidence::adjust(
                &easy_cleaned,
                easy.confidence.max(paddle.confidence),
            ),
            final_text: easy_cleaned.clone(),
            source: DecisionSource::BothAgree,
        }
    } else if easy_valid && !paddle_valid {
        EnsembleDecision {
            final_confidence: confidence::adjust(&easy_cleaned, easy.confidence),
            final_text: easy_cleaned.clone(),
            source: DecisionSource::EasyocrValid,
        }
    } else if paddle_valid && !easy_valid {
        EnsembleDecision {
            final_confidence: confidence::adjust(&paddle_cleaned, paddle.confidence),
            final_text: paddle_cleaned.clone(),
            source: DecisionSource::PaddleocrValid,
        }
    } else if easy_valid && paddle_valid {
        if easy.confidence >= paddle.confidence {
            EnsembleDecision {
                final_confidence: confidence::adjust(&easy_cleaned, easy.confidence),
                final_text: easy_cleaned.clone(),
                source: DecisionSource::BothValidEasyHigher,
            }
        } else {
            EnsembleDecision {
                final_confidence: confidence::adjust(&paddle_cleaned, paddle.confidence),
                final_text: paddle_cleaned.clone(),
                source: DecisionSource::BothValidPaddleHigher,
            }
        }
    } else {
        // Neither reading validates: take the more confident one verbatim,
        // with no adjustment — there is nothing to reward or punish.
        if easy.confidence >= paddle.confidence {
            EnsembleDecision {
                final_text: easy_cleaned.clone(),
                final_confidence: easy.confidence,
                source: DecisionSource::NeitherValidEasyHigher,
            }
        } else {
            EnsembleDecision {
                final_text: paddle_cleaned.clone(),
                final_confidence: paddle.confidence,
                source: DecisionSource::NeitherValidPaddleHigher,
            }
        }
    };

    tracing::debug!(
        source = %decision.source,
        easyocr = %easy_cleaned,
        paddleocr = %paddle_cleaned,
        final_text = %decision.final_text,
        "ensemble decision"
    );

    RecognitionOutcome {
        easyocr: EngineVerdict {
            engine: easy.engine,
            confidence: confidence::adjust(&easy_cleaned, easy.confidence),
            cleaned_text: easy_cleaned,
            is_valid: easy_valid,
        },
        paddleocr: EngineVerdict {
            engine: paddle.engine,
            confidence: confidence::adjust(&paddle_cleaned, paddle.confidence),
            cleaned_text: paddle_cleaned,
            is_valid: paddle_valid,
        },
        decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngineId;

    fn easy(text: &str, confidence: f32) -> RawReading {
        RawReading::new(EngineId::EasyOcr, text, confidence)
    }

    fn paddle(text: &str, confidence: f32) -> RawReading {
        RawReading::new(EngineId::PaddleOcr, text, confidence)
    }

    #[test]
    fn clean_plate_text_normalizes_and_corrects() {
        assert_eq!(clean_plate_text(" o6 abc-123 "), "06ABC123");
        assert_eq!(clean_plate_text(""), "");
        assert_eq!(clean_plate_text("!!"), "");
    }

    #[test]
    fn agreement_after_correction_wins() {
        // The engines disagree on the raw bytes but converge after
        // structural correction: "O6" is repaired to province "06".
        let outcome = fuse(&easy("06ABC123", 0.55), &paddle("O6ABC123", 0.50));
        assert_eq!(outcome.decision.final_text, "06ABC123");
        assert_eq!(outcome.decision.source, DecisionSource::BothAgree);
        assert!((outcome.decision.final_confidence - 0.715).abs() < 1e-6);
    }

    #[test]
    fn agreement_dominates_validity_and_confidence() {
        // Agreed-on text wins even when it validates under no grammar and
        // both confidences are low.
        let outcome = fuse(&easy("HELLZ99XY", 0.2), &paddle("HELLZ99XY", 0.3));
        assert_eq!(outcome.decision.final_text, "HELLZ99XY");
        assert_eq!(outcome.decision.source, DecisionSource::BothAgree);
        assert!(!outcome.easyocr.is_valid);
    }

    #[test]
    fn valid_reading_beats_confident_garbage() {
        let outcome = fuse(&easy("34AB123", 0.8), &paddle("Q9ZZZ", 0.9));
        assert_eq!(outcome.decision.final_text, "34AB123");
        assert_eq!(outcome.decision.source, DecisionSource::EasyocrValid);
        assert_eq!(outcome.decision.final_confidence, 1.0); // 0.8 × 1.3, capped
        assert!(outcome.easyocr.is_valid);
        assert!(!outcome.paddleocr.is_valid);
    }

    #[test]
    fn valid_paddle_beats_invalid_easy() {
        let outcome = fuse(&easy("Q9ZZZ", 0.9), &paddle("34AB123", 0.4));
        assert_eq!(outcome.decision.final_text, "34AB123");
        assert_eq!(outcome.decision.source, DecisionSource::PaddleocrValid);
    }

    #[test]
    fn both_valid_higher_confidence_wins() {
        let outcome = fuse(&easy("34AB123", 0.6), &paddle("06CD45", 0.7));
        assert_eq!(outcome.decision.final_text, "06CD45");
        assert_eq!(outcome.decision.source, DecisionSource::BothValidPaddleHigher);

        let outcome = fuse(&easy("34AB123", 0.7), &paddle("06CD45", 0.6));
        assert_eq!(outcome.decision.final_text, "34AB123");
        assert_eq!(outcome.decision.source, DecisionSource::BothValidEasyHigher);
    }

    #[test]
    fn both_valid_tie_resolves_to_easyocr() {
        let outcome = fuse(&easy("34AB123", 0.6), &paddle("06CD45", 0.6));
        assert_eq!(outcome.decision.source, DecisionSource::BothValidEasyHigher);
    }

    #[test]
    fn neither_valid_takes_higher_confidence_verbatim() {
        let outcome = fuse(&easy("Q9ZZZ", 0.3), &paddle("ZZTOP", 0.6));
        assert_eq!(outcome.decision.source, DecisionSource::NeitherValidPaddleHigher);
        // No adjustment in this branch.
        assert_eq!(outcome.decision.final_confidence, 0.6);
    }

    #[test]
    fn both_empty_yields_empty_easy_decision() {
        let outcome = fuse(&easy("", 0.0), &paddle("", 0.0));
        assert_eq!(outcome.decision.final_text, "");
        assert_eq!(outcome.decision.final_confidence, 0.0);
        assert_eq!(outcome.decision.source, DecisionSource::NeitherValidEasyHigher);
        assert_eq!(outcome.easyocr.cleaned_text, "");
        assert_eq!(outcome.paddleocr.cleaned_text, "");
    }

    #[test]
    fn one_empty_engine_loses_to_a_valid_reading() {
        let outcome = fuse(&easy("", 0.0), &paddle("34 AB 123", 0.5));
        assert_eq!(outcome.decision.final_text, "34AB123");
        assert_eq!(outcome.decision.source, DecisionSource::PaddleocrValid);
    }

    #[test]
    fn verdicts_carry_adjusted_confidence() {
        let outcome = fuse(&easy("34AB123", 0.5), &paddle("Q9ZZZ", 0.5));
        assert!((outcome.easyocr.confidence - 0.65).abs() < 1e-6);
        assert!((outcome.paddleocr.confidence - 0.45).abs() < 1e-6);
    }

    #[test]
    fn deterministic() {
        let a = fuse(&easy("O6ABC123", 0.55), &paddle("34AB1Z3", 0.5));
        let b = fuse(&easy("O6ABC123", 0.55), &paddle("34AB1Z3", 0.5));
        assert_eq!(a.decision.final_text, b.decision.final_text);
        assert_eq!(a.decision.source, b.decision.source);
        assert_eq!(a.decision.final_confidence, b.decision.final_confidence);
    }
}
