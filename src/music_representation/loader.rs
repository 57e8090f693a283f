// loader.rs

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use log::info;

use crate::error::Result;
use crate::music_representation::grouping::group_into_events;
use crate::music_representation::musical_structures::{
    parse_detected_notes, parse_note_events, NoteEvent,
};
use crate::music_representation::musicxml_parser::ImportedScore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// JSON array of `{time, duration, pitches, label?}`
    Events,
    /// JSON array of detected `{pitch, onset, offset, velocity?}` notes
    Notes,
    /// MusicXML score
    Musicxml,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("xml") | Some("musicxml") => InputKind::Musicxml,
            _ => InputKind::Events,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedInput {
    pub events: Vec<NoteEvent>,
    /// Only scores carry a tempo.
    pub bpm: Option<f64>,
}

pub fn load_events(content: &str, kind: InputKind, chord_window_ms: f64) -> Result<LoadedInput> {
    let loaded = match kind {
        InputKind::Events => LoadedInput {
            events: parse_note_events(content)?,
            bpm: None,
        },
        InputKind::Notes => {
            let notes = parse_detected_notes(content)?;
            LoadedInput {
                events: group_into_events(&notes, chord_window_ms)?,
                bpm: None,
            }
        }
        InputKind::Musicxml => {
            let score = ImportedScore::parse_from_musicxml_str(content)?;
            LoadedInput {
                events: score.events,
                bpm: Some(score.tempo),
            }
        }
    };
    info!("Loaded {} events ({:?} input)", loaded.events.len(), kind);
    Ok(loaded)
}

pub fn load_events_from_file<P: AsRef<Path>>(
    path: P,
    kind: Option<InputKind>,
    chord_window_ms: f64,
) -> Result<LoadedInput> {
    let path = path.as_ref();
    let kind = kind.unwrap_or_else(|| InputKind::from_path(path));
    let content = fs::read_to_string(path)?;
    load_events(&content, kind, chord_window_ms)
}
