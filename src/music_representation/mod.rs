pub mod grouping;
pub mod loader;
pub mod musical_structures;
pub mod musicxml_parser;
pub mod utils;

mod musical_structures_tests;

pub use grouping::{group_into_events, DEFAULT_CHORD_WINDOW_MS};
pub use loader::{load_events, load_events_from_file, InputKind, LoadedInput};
pub use musical_structures::{
    parse_detected_notes, parse_note_events, DetectedNote, MappedEvent, NoteEvent, Position,
};
pub use musicxml_parser::{ImportedScore, TimeSignature};
