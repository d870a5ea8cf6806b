//! Plate-text normalization, structural correction, and ensemble decision
//! engine. Pure and stateless: every entry point is a total function over
//! its inputs, and the only shared data are immutable lookup tables.

pub mod confidence;
pub mod ensemble;
pub mod normalize;
pub mod structure;
pub mod types;
pub mod validate;
pub mod variants;

pub use confidence::adjust;
pub use ensemble::{clean_plate_text, fuse};
pub use normalize::normalize;
pub use structure::{analyze, correct, PatternKind, StructuralHypothesis};
pub use types::{
    DecisionSource, EngineId, EngineVerdict, EnsembleDecision, RawReading, RecognitionOutcome,
};
pub use validate::{is_valid, valid_province, validate, PlateFormat};
pub use variants::{correction_variants, CorrectionVariant};
