// grouping.rs

use log::debug;

use crate::error::{Error, Result};
use crate::music_representation::musical_structures::{DetectedNote, NoteEvent};

pub const DEFAULT_CHORD_WINDOW_MS: f64 = 20.0;

/// Groups detected notes whose onsets fall within `window_ms` of a group's
/// first onset into one chord event.
///
/// Notes are stably sorted by onset first, so input order only matters among
/// notes with equal onsets. Each group spans from its earliest onset to its
/// latest offset.
pub fn group_into_events(notes: &[DetectedNote], window_ms: f64) -> Result<Vec<NoteEvent>> {
    for (i, note) in notes.iter().enumerate() {
        validate(note).map_err(|e| e.at_event(i))?;
    }

    let mut sorted: Vec<&DetectedNote> = notes.iter().collect();
    sorted.sort_by(|a, b| a.onset.total_cmp(&b.onset));

    let window = window_ms / 1000.0;
    let mut groups: Vec<Vec<&DetectedNote>> = Vec::new();
    for note in sorted {
        let joins = groups
            .last()
            .is_some_and(|group| (note.onset - group[0].onset).abs() < window);
        match groups.last_mut() {
            Some(group) if joins => group.push(note),
            _ => groups.push(vec![note]),
        }
    }

    let events = groups
        .into_iter()
        .enumerate()
        .map(|(i, group)| {
            let onset = group.iter().map(|n| n.onset).fold(f64::INFINITY, f64::min);
            let offset = group
                .iter()
                .map(|n| n.offset)
                .fold(f64::NEG_INFINITY, f64::max);
            let pitches = group.iter().map(|n| n.pitch).collect();
            NoteEvent::new(onset, offset - onset, pitches, None).map_err(|e| e.at_event(i))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Grouped {} notes into {} events", notes.len(), events.len());
    Ok(events)
}

fn validate(note: &DetectedNote) -> Result<()> {
    if note.pitch > 127 {
        return Err(Error::PitchOutOfRange(note.pitch as i64));
    }
    if !note.onset.is_finite() || note.onset < 0.0 {
        return Err(Error::InvalidTime(note.onset));
    }
    if !note.offset.is_finite() || note.offset <= note.onset {
        return Err(Error::InvalidDuration(note.offset - note.onset));
    }
    Ok(())
}
