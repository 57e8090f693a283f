// candidates.rs

use crate::guitar::{FretboardConfig, Tuning, STRING_COUNT};
use crate::music_representation::Position;

/// Every (string, fret) that sounds `pitch`, in ascending string order.
///
/// An empty result is a normal outcome: the pitch is out of reach under this
/// tuning and fret limit.
pub fn candidates(pitch: u8, tuning: &Tuning, config: &FretboardConfig) -> Vec<Position> {
    (0..STRING_COUNT)
        .filter_map(|string| {
            let fret = pitch as i16 - tuning.open_string(string) as i16;
            (0..=config.max_fret as i16)
                .contains(&fret)
                .then(|| Position::new(string as u8, fret as u8))
        })
        .collect()
}

/// One candidate set per pitch, in the pitch list's order.
pub fn candidate_sets(
    pitches: &[u8],
    tuning: &Tuning,
    config: &FretboardConfig,
) -> Vec<Vec<Position>> {
    pitches
        .iter()
        .map(|&pitch| candidates(pitch, tuning, config))
        .collect()
}
