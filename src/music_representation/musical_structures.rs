// musical_structures.rs

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A fretted (or open) note: string 0 is the highest-pitched string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub string: u8,
    pub fret: u8,
}

impl Position {
    pub fn new(string: u8, fret: u8) -> Self {
        Self { string, fret }
    }
}

/// One onset of one or more simultaneous pitches. Only constructible through
/// [`NoteEvent::new`], so every instance satisfies its invariants.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteEvent {
    time: f64,
    duration: f64,
    pitches: Vec<u8>,
    label: Option<String>,
}

impl NoteEvent {
    pub fn new(time: f64, duration: f64, pitches: Vec<u8>, label: Option<String>) -> Result<Self> {
        if !time.is_finite() || time < 0.0 {
            return Err(Error::InvalidTime(time));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::InvalidDuration(duration));
        }
        if pitches.is_empty() {
            return Err(Error::EmptyPitchSet);
        }
        if let Some(&p) = pitches.iter().find(|p| **p > 127) {
            return Err(Error::PitchOutOfRange(p as i64));
        }
        Ok(Self {
            time,
            duration,
            pitches,
            label,
        })
    }

    pub fn single(time: f64, duration: f64, pitch: u8) -> Result<Self> {
        Self::new(time, duration, vec![pitch], None)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Pitches in input order; the order steers the chord search.
    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_chord(&self) -> bool {
        self.pitches.len() > 1
    }
}

/// `pitches` may be a bare number or a list in the input schema.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PitchInput {
    Single(i64),
    Many(Vec<i64>),
}

impl PitchInput {
    fn into_pitches(self) -> Result<Vec<u8>> {
        let raw = match self {
            PitchInput::Single(p) => vec![p],
            PitchInput::Many(ps) => ps,
        };
        raw.into_iter()
            .map(|p| {
                u8::try_from(p)
                    .ok()
                    .filter(|p| *p <= 127)
                    .ok_or(Error::PitchOutOfRange(p))
            })
            .collect()
    }
}

/// Wire shape of a note event before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNoteEvent {
    pub time: f64,
    pub duration: f64,
    pub pitches: PitchInput,
    #[serde(default)]
    pub label: Option<String>,
}

impl TryFrom<RawNoteEvent> for NoteEvent {
    type Error = Error;

    fn try_from(raw: RawNoteEvent) -> Result<Self> {
        let pitches = raw.pitches.into_pitches()?;
        NoteEvent::new(raw.time, raw.duration, pitches, raw.label)
    }
}

/// Parses and validates a JSON array of note events.
pub fn parse_note_events(json: &str) -> Result<Vec<NoteEvent>> {
    let raw: Vec<RawNoteEvent> = serde_json::from_str(json)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, ev)| NoteEvent::try_from(ev).map_err(|e| e.at_event(i)))
        .collect()
}

/// A note as reported by an upstream pitch detector, before chord grouping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedNote {
    pub pitch: u8,
    pub onset: f64,
    pub offset: f64,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

fn default_velocity() -> u8 {
    100
}

impl DetectedNote {
    pub fn new(pitch: u8, onset: f64, offset: f64) -> Self {
        Self {
            pitch,
            onset,
            offset,
            velocity: default_velocity(),
        }
    }
}

pub fn parse_detected_notes(json: &str) -> Result<Vec<DetectedNote>> {
    Ok(serde_json::from_str(json)?)
}

/// An event placed on the fretboard.
///
/// `positions` normally uses each string at most once. When `fallback` is set
/// the chord search failed and the positions are the first candidate of each
/// pitch: strings may collide and the fret span is unbounded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MappedEvent {
    pub time: f64,
    pub duration: f64,
    pub positions: Vec<Position>,
    pub pitches: Vec<u8>,
    pub label: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl MappedEvent {
    pub fn position_on(&self, string: usize) -> Option<&Position> {
        self.positions.iter().find(|p| p.string as usize == string)
    }

    pub fn has_string_collision(&self) -> bool {
        let mut used = 0u8;
        for p in &self.positions {
            let bit = 1u8 << p.string;
            if used & bit != 0 {
                return true;
            }
            used |= bit;
        }
        false
    }

    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }
}
