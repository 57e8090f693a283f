use std::time::Duration;

use crate::music_representation::MappedEvent;

/// Playback cursor over a mapped sequence, advanced by explicit ticks rather
/// than a wall clock so the caller decides where time comes from.
///
/// Event times are assumed non-decreasing.
#[derive(Clone, Debug, Default)]
pub struct TimeScrubber {
    onsets: Vec<Duration>,
    pub total_duration: Duration,
    elapsed: Duration,
    running: bool,
}

impl TimeScrubber {
    pub fn new(events: &[MappedEvent]) -> Self {
        let onsets = events
            .iter()
            .map(|ev| seconds(ev.time))
            .collect();
        let end = events.iter().map(MappedEvent::end_time).fold(0.0, f64::max);
        Self {
            onsets,
            total_duration: seconds(end),
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.is_finished() {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Moves the cursor forward while running; stops at the end.
    pub fn advance(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        self.elapsed = (self.elapsed + dt).min(self.total_duration);
        if self.is_finished() {
            self.running = false;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn set_elapsed(&mut self, new_elapsed: Duration) {
        self.elapsed = new_elapsed.min(self.total_duration);
        if self.is_finished() {
            self.running = false;
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.total_duration
    }

    /// Index of the latest event that has started, if any.
    pub fn active_index(&self) -> Option<usize> {
        self.onsets
            .partition_point(|onset| *onset <= self.elapsed)
            .checked_sub(1)
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
