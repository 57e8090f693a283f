//! Guitar fretboard mapping and text tablature.
//!
//! Note events (single pitches or chords) are placed on concrete
//! string/fret positions and rendered as fixed-width ASCII tab:
//!
//! ```
//! use fretmap::{map_sequence, render_tab, FretboardConfig, NoteEvent, TabLayout, Tuning};
//!
//! let tuning = Tuning::standard();
//! let events = vec![
//!     NoteEvent::single(0.0, 0.5, 40).unwrap(),
//!     NoteEvent::new(0.5, 1.0, vec![40, 47, 52, 55, 59, 64], Some("Em".into())).unwrap(),
//! ];
//! let mapped = map_sequence(&events, &tuning, &FretboardConfig::default());
//! let tab = render_tab(&mapped, &tuning, &TabLayout::default());
//! assert!(tab.starts_with("    "));
//! ```

pub mod error;
pub mod fretboard;
pub mod guitar;
pub mod music_representation;
pub mod renderer;
pub mod session;
pub mod time_scrubber;

pub use error::{Error, Result};
pub use fretboard::{map_sequence, optimize_event, Selection, SequenceMapper};
pub use guitar::{FretboardConfig, Tuning, TuningPreset};
pub use music_representation::{
    load_events, load_events_from_file, DetectedNote, InputKind, LoadedInput, MappedEvent,
    NoteEvent, Position,
};
pub use renderer::{render_json, render_tab, TabLayout};
pub use session::{Message, Session, SessionState};
pub use time_scrubber::TimeScrubber;
