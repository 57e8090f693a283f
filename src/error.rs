// error.rs

/// Errors raised for malformed input. Degraded mapping outcomes (unplayable
/// pitches, chord fallback) are not errors and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pitch set is empty")]
    EmptyPitchSet,

    #[error("pitch {0} is outside the MIDI range 0-127")]
    PitchOutOfRange(i64),

    #[error("time must be a finite number >= 0, got {0}")]
    InvalidTime(f64),

    #[error("duration must be a finite number > 0, got {0}")]
    InvalidDuration(f64),

    #[error("event {index}: {source}")]
    Event {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("unknown tuning '{0}'")]
    UnknownTuning(String),

    #[error("a tuning needs exactly 6 strings, got {0}")]
    StringCount(usize),

    #[error("invalid note name '{0}'")]
    InvalidNoteName(String),

    #[error("MusicXML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("MusicXML structure error: {0}")]
    Score(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the index of the offending event.
    pub fn at_event(self, index: usize) -> Self {
        Error::Event {
            index,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
