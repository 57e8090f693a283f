// session.rs

use std::time::Duration;

use log::{debug, info};

use crate::fretboard::map_sequence;
use crate::guitar::{FretboardConfig, Tuning};
use crate::music_representation::{MappedEvent, NoteEvent};
use crate::renderer::{render_tab, TabLayout};
use crate::time_scrubber::TimeScrubber;

/// Stages shown while a submission is processed. Mapping runs when the last
/// one completes.
pub const PROCESSING_STAGES: [&str; 3] = [
    "Grouping notes",
    "Mapping to fretboard",
    "Rendering tab",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Input,
    Processing {
        stage: usize,
    },
    Result {
        playing: bool,
        active_index: Option<usize>,
    },
}

/// Everything that can happen to a session: user actions and timer ticks.
#[derive(Clone, Debug)]
pub enum Message {
    Submit(Vec<NoteEvent>),
    StageComplete,
    Tick(Duration),
    Play,
    Pause,
    Seek(Duration),
    Reset,
}

/// Host-side flow around the mapping core: take input, step through the
/// processing stages, then show the result with an optional playback cursor.
pub struct Session {
    tuning: Tuning,
    config: FretboardConfig,
    layout: TabLayout,
    state: SessionState,
    pending: Vec<NoteEvent>,
    mapped: Vec<MappedEvent>,
    tab_text: String,
    scrubber: TimeScrubber,
}

impl Session {
    pub fn new(tuning: Tuning, config: FretboardConfig, layout: TabLayout) -> Self {
        Self {
            tuning,
            config,
            layout,
            state: SessionState::Input,
            pending: Vec::new(),
            mapped: Vec::new(),
            tab_text: String::new(),
            scrubber: TimeScrubber::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mapped(&self) -> &[MappedEvent] {
        &self.mapped
    }

    pub fn tab_text(&self) -> &str {
        &self.tab_text
    }

    pub fn elapsed(&self) -> Duration {
        self.scrubber.elapsed()
    }

    pub fn stage_name(&self) -> Option<&'static str> {
        match self.state {
            SessionState::Processing { stage } => PROCESSING_STAGES.get(stage).copied(),
            _ => None,
        }
    }

    pub fn active_event(&self) -> Option<&MappedEvent> {
        match self.state {
            SessionState::Result {
                active_index: Some(i),
                ..
            } => self.mapped.get(i),
            _ => None,
        }
    }

    pub fn update(&mut self, message: Message) -> &SessionState {
        let next = match (self.state.clone(), message) {
            (_, Message::Reset) => {
                self.pending.clear();
                self.mapped.clear();
                self.tab_text.clear();
                self.scrubber = TimeScrubber::default();
                Some(SessionState::Input)
            }
            (SessionState::Input, Message::Submit(events)) => {
                info!("Processing {} events", events.len());
                self.pending = events;
                Some(SessionState::Processing { stage: 0 })
            }
            (SessionState::Processing { stage }, Message::StageComplete) => {
                let stage = stage + 1;
                if stage < PROCESSING_STAGES.len() {
                    Some(SessionState::Processing { stage })
                } else {
                    self.finish_processing();
                    Some(self.result_state())
                }
            }
            (SessionState::Result { .. }, Message::Play) => {
                if self.scrubber.is_finished() {
                    self.scrubber.reset();
                }
                self.scrubber.start();
                Some(self.result_state())
            }
            (SessionState::Result { .. }, Message::Pause) => {
                self.scrubber.stop();
                Some(self.result_state())
            }
            (SessionState::Result { .. }, Message::Tick(dt)) => {
                self.scrubber.advance(dt);
                Some(self.result_state())
            }
            (SessionState::Result { .. }, Message::Seek(to)) => {
                self.scrubber.set_elapsed(to);
                Some(self.result_state())
            }
            (state, message) => {
                debug!("Ignoring {:?} in state {:?}", message, state);
                None
            }
        };

        if let Some(next) = next {
            self.state = next;
        }
        &self.state
    }

    fn finish_processing(&mut self) {
        let events = std::mem::take(&mut self.pending);
        self.mapped = map_sequence(&events, &self.tuning, &self.config);
        self.tab_text = render_tab(&self.mapped, &self.tuning, &self.layout);
        self.scrubber = TimeScrubber::new(&self.mapped);
    }

    fn result_state(&self) -> SessionState {
        SessionState::Result {
            playing: self.scrubber.is_running(),
            active_index: self.scrubber.active_index(),
        }
    }
}
