use serde::Serialize;

use crate::error::Result;
use crate::guitar::{Tuning, STRING_COUNT};
use crate::music_representation::MappedEvent;

pub const DEFAULT_EVENTS_PER_LINE: usize = 8;
pub const DEFAULT_COLUMN_WIDTH: usize = 5;
const LABEL_WIDTH: usize = 6;
const LABEL_INDENT: &str = "    ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabLayout {
    pub events_per_line: usize,
    /// Characters per event column after the leading dash.
    pub column_width: usize,
    /// When set, a `#` header with title, tuning and event count comes first.
    pub title: Option<String>,
}

impl Default for TabLayout {
    fn default() -> Self {
        Self {
            events_per_line: DEFAULT_EVENTS_PER_LINE,
            column_width: DEFAULT_COLUMN_WIDTH,
            title: None,
        }
    }
}

/// Renders mapped events as ASCII tablature, one block of rows per
/// `events_per_line` events, each block followed by a blank line.
pub fn render_tab(events: &[MappedEvent], tuning: &Tuning, layout: &TabLayout) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(title) = &layout.title {
        lines.push(format!("# {}", title));
        lines.push(format!("# Tuning: {}", tuning.label));
        lines.push(format!("# Notes: {}", events.len()));
        lines.push(String::new());
    }

    for block in events.chunks(layout.events_per_line.max(1)) {
        if block.iter().any(|ev| ev.label.as_deref().is_some_and(|l| !l.is_empty())) {
            let mut label_line = LABEL_INDENT.to_string();
            for ev in block {
                let label = ev.label.as_deref().unwrap_or("");
                label_line.push_str(&format!("{:<width$}", label, width = LABEL_WIDTH));
            }
            lines.push(label_line);
        }

        for string in 0..STRING_COUNT {
            let mut row = format!("{}|", tuning.string_names[string]);
            for ev in block {
                let fret = ev
                    .position_on(string)
                    .map(|p| p.fret.to_string())
                    .unwrap_or_else(|| "-".to_string());
                row.push_str(&format!("-{:-<width$}", fret, width = layout.column_width));
            }
            row.push('|');
            lines.push(row);
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

#[derive(Serialize)]
struct TabDocument<'a> {
    tuning: &'a str,
    tuning_label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bpm: Option<f64>,
    event_count: usize,
    events: Vec<MappedEvent>,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// JSON document for the presentation layer; times are rounded to
/// milliseconds.
pub fn render_json(events: &[MappedEvent], tuning: &Tuning, bpm: Option<f64>) -> Result<String> {
    let document = TabDocument {
        tuning: &tuning.key,
        tuning_label: &tuning.label,
        bpm: bpm.map(|b| (b * 10.0).round() / 10.0),
        event_count: events.len(),
        events: events
            .iter()
            .map(|ev| MappedEvent {
                time: round3(ev.time),
                duration: round3(ev.duration),
                ..ev.clone()
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// One-line summary for logs.
pub fn tab_info(events: &[MappedEvent]) -> String {
    let chords = events.iter().filter(|ev| ev.positions.len() > 1).count();
    let fallbacks = events.iter().filter(|ev| ev.fallback).count();
    let silent = events.iter().filter(|ev| ev.positions.is_empty()).count();
    let end = events.iter().map(MappedEvent::end_time).fold(0.0, f64::max);
    format!(
        "{} events ({} chords, {} fallback voicings, {} unplayable) over {:.2}s",
        events.len(),
        chords,
        fallbacks,
        silent,
        end
    )
}
