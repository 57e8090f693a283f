// optimizer.rs

use log::debug;

use crate::music_representation::Position;

/// Partial assignments kept between chord expansion steps.
pub const BEAM_WIDTH: usize = 20;
/// Widest allowed stretch between the lowest and highest fretted note.
pub const MAX_CHORD_SPAN: u8 = 5;

// Single notes.
const SINGLE_FRET_WEIGHT: f64 = 0.1;
const SINGLE_MOVE_WEIGHT: f64 = 0.5;
const SINGLE_OPEN_BONUS: f64 = 0.3;

// Chords.
const CHORD_FRET_WEIGHT: f64 = 0.05;
const CHORD_SPAN_WEIGHT: f64 = 0.3;
const CHORD_OPEN_BONUS: f64 = 0.2;
const CHORD_MOVE_WEIGHT: f64 = 0.2;

/// Positions chosen for one event.
///
/// With `fallback` set, the chord search found no valid assignment and the
/// positions are simply the first candidate of every pitch. They may share
/// strings and exceed [`MAX_CHORD_SPAN`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub positions: Vec<Position>,
    pub fallback: bool,
}

#[derive(Clone, Debug)]
struct BeamState {
    positions: Vec<Position>,
    cost: f64,
    // One bit per string. Copied into each child, never shared.
    used: u8,
}

impl BeamState {
    fn root() -> Self {
        Self {
            positions: Vec::new(),
            cost: 0.0,
            used: 0,
        }
    }

    fn uses(&self, string: u8) -> bool {
        self.used & (1 << string) != 0
    }

    fn fork(&self, candidate: Position, cost: f64) -> Self {
        let mut positions = Vec::with_capacity(self.positions.len() + 1);
        positions.extend_from_slice(&self.positions);
        positions.push(candidate);
        Self {
            positions,
            cost,
            used: self.used | (1 << candidate.string),
        }
    }
}

/// Chooses positions for one event from its per-pitch candidate sets.
///
/// Empty candidate sets are dropped, so the result holds one position per
/// playable pitch. A lone playable pitch goes through [`optimize_single`];
/// anything more goes through the beam search. Both steer towards
/// `last_positions`, the previous event's choice.
pub fn optimize_event(candidate_sets: &[Vec<Position>], last_positions: &[Position]) -> Selection {
    let playable: Vec<&[Position]> = candidate_sets
        .iter()
        .filter(|set| !set.is_empty())
        .map(Vec::as_slice)
        .collect();

    if playable.len() < candidate_sets.len() {
        debug!(
            "Dropping {} unplayable pitch(es)",
            candidate_sets.len() - playable.len()
        );
    }

    match playable.as_slice() {
        [] => Selection::default(),
        [only] => Selection {
            positions: optimize_single(only, last_positions).into_iter().collect(),
            fallback: false,
        },
        sets => optimize_chord(sets, last_positions),
    }
}

pub fn single_note_cost(candidate: &Position, last_positions: &[Position]) -> f64 {
    let mut cost = candidate.fret as f64 * SINGLE_FRET_WEIGHT;
    let nearest = last_positions
        .iter()
        .map(|lp| {
            candidate.fret.abs_diff(lp.fret) as u32 + 2 * candidate.string.abs_diff(lp.string) as u32
        })
        .min();
    if let Some(distance) = nearest {
        cost += distance as f64 * SINGLE_MOVE_WEIGHT;
    }
    if candidate.fret == 0 {
        cost -= SINGLE_OPEN_BONUS;
    }
    cost
}

/// Cheapest candidate for a single note. Ties keep the earliest candidate.
pub fn optimize_single(candidates: &[Position], last_positions: &[Position]) -> Option<Position> {
    let mut best: Option<(Position, f64)> = None;
    for candidate in candidates {
        let cost = single_note_cost(candidate, last_positions);
        if best.map_or(true, |(_, best_cost)| cost < best_cost) {
            best = Some((*candidate, cost));
        }
    }
    best.map(|(position, _)| position)
}

/// Beam search over string assignments, one pitch at a time in input order.
pub fn optimize_chord(candidate_sets: &[&[Position]], last_positions: &[Position]) -> Selection {
    let mut beam = vec![BeamState::root()];

    for candidates in candidate_sets {
        let mut next_beam = Vec::new();
        for state in &beam {
            for candidate in candidates.iter() {
                if state.uses(candidate.string) {
                    continue;
                }
                let span = fret_span(&state.positions, candidate.fret);
                if span > MAX_CHORD_SPAN {
                    continue;
                }
                let cost = chord_step_cost(state.cost, candidate.fret, span, last_positions);
                next_beam.push(state.fork(*candidate, cost));
            }
        }

        next_beam.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        next_beam.truncate(BEAM_WIDTH);
        beam = next_beam;
        if beam.is_empty() {
            break;
        }
    }

    match beam.into_iter().next() {
        Some(best) => Selection {
            positions: best.positions,
            fallback: false,
        },
        None => Selection {
            positions: candidate_sets
                .iter()
                .filter_map(|set| set.first().copied())
                .collect(),
            fallback: true,
        },
    }
}

/// Chord cost of a complete assignment, accumulated in the given order with
/// the same terms the beam search uses.
pub fn assignment_cost(positions: &[Position], last_positions: &[Position]) -> f64 {
    let mut cost = 0.0;
    for (i, position) in positions.iter().enumerate() {
        let span = fret_span(&positions[..i], position.fret);
        cost = chord_step_cost(cost, position.fret, span, last_positions);
    }
    cost
}

// Unlike single notes, chord movement only counts fret distance.
fn chord_step_cost(cost: f64, fret: u8, span: u8, last_positions: &[Position]) -> f64 {
    let mut cost = cost + fret as f64 * CHORD_FRET_WEIGHT + span as f64 * CHORD_SPAN_WEIGHT;
    if fret == 0 {
        cost -= CHORD_OPEN_BONUS;
    }
    if let Some(distance) = last_positions.iter().map(|lp| fret.abs_diff(lp.fret)).min() {
        cost += distance as f64 * CHORD_MOVE_WEIGHT;
    }
    cost
}

/// Span over non-zero frets: open strings never stretch the hand.
fn fret_span(chosen: &[Position], next_fret: u8) -> u8 {
    let fretted = chosen
        .iter()
        .map(|p| p.fret)
        .chain(std::iter::once(next_fret))
        .filter(|&f| f > 0);
    let (lo, hi) = fretted.fold((u8::MAX, 0), |(lo, hi), f| (lo.min(f), hi.max(f)));
    hi.saturating_sub(lo)
}
