pub mod guitar;

pub use guitar::{FretboardConfig, Tuning, TuningPreset, DEFAULT_MAX_FRET, STRING_COUNT};
