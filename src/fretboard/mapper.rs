// mapper.rs

use log::{info, warn};

use crate::fretboard::candidates::candidate_sets;
use crate::fretboard::optimizer::optimize_event;
use crate::guitar::{FretboardConfig, Tuning};
use crate::music_representation::{MappedEvent, NoteEvent, Position};

/// Walks an event sequence, carrying the previous event's positions into the
/// next so hand movement stays small.
///
/// Events must be fed in order: each result depends on the one before it.
pub struct SequenceMapper<'a> {
    tuning: &'a Tuning,
    config: FretboardConfig,
    last_positions: Vec<Position>,
}

impl<'a> SequenceMapper<'a> {
    pub fn new(tuning: &'a Tuning, config: FretboardConfig) -> Self {
        Self {
            tuning,
            config,
            last_positions: Vec::new(),
        }
    }

    pub fn map_event(&mut self, event: &NoteEvent) -> MappedEvent {
        let sets = candidate_sets(event.pitches(), self.tuning, &self.config);
        let selection = optimize_event(&sets, &self.last_positions);

        if selection.fallback {
            warn!(
                "No conflict-free voicing for {:?} at {:.3}s; positions may share strings",
                event.pitches(),
                event.time()
            );
        }

        self.last_positions = selection.positions.clone();

        MappedEvent {
            time: event.time(),
            duration: event.duration(),
            positions: selection.positions,
            pitches: event.pitches().to_vec(),
            label: event.label().map(str::to_string),
            fallback: selection.fallback,
        }
    }

    pub fn last_positions(&self) -> &[Position] {
        &self.last_positions
    }

    pub fn reset(&mut self) {
        self.last_positions.clear();
    }
}

/// Maps a whole sequence from an empty starting context. The output has one
/// entry per input event.
pub fn map_sequence(
    events: &[NoteEvent],
    tuning: &Tuning,
    config: &FretboardConfig,
) -> Vec<MappedEvent> {
    info!(
        "Mapping {} events to fretboard (tuning: {}, max fret {})",
        events.len(),
        tuning.label,
        config.max_fret
    );
    let mut mapper = SequenceMapper::new(tuning, *config);
    events.iter().map(|event| mapper.map_event(event)).collect()
}
