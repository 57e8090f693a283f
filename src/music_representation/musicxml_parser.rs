// musicxml_parser.rs

use regex::Regex;
use roxmltree::{Document, Node};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::guitar::guitar::step_semitone;
use crate::music_representation::musical_structures::NoteEvent;
use crate::music_representation::utils::{
    calculate_divisions_per_measure, child_number, child_text, extract_score_metadata, has_child,
    parse_time_signature, sound_tempo,
};

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats_per_measure: u8,
    pub beat_value: u8,
}

/// Note events read from a MusicXML score, with the timing metadata used to
/// place them in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedScore {
    pub events: Vec<NoteEvent>,
    pub time_signature: TimeSignature,
    pub tempo: f64,
    pub divisions_per_quarter: u32,
}

/// Everything that starts at one onset, merged across voices and parts.
#[derive(Default)]
struct Slot {
    pitches: Vec<u8>,
    duration: u64,
    label: Option<String>,
}

/// A pitched note, placed relative to the start of its measure.
struct MeasureNote {
    offset: u64,
    pitch: u8,
    duration: u64,
    label: Option<String>,
}

/// One part's view of one measure.
#[derive(Default)]
struct MeasureContent {
    notes: Vec<MeasureNote>,
    /// Furthest division the cursor reached.
    length: u64,
    time_signature: Option<TimeSignature>,
    tempo_changes: Vec<(u64, f64)>,
}

/// Tempo changes keyed by absolute division.
struct TempoMap {
    divisions_per_quarter: f64,
    changes: BTreeMap<u64, f64>,
}

impl TempoMap {
    fn new(tempo: f64, divisions_per_quarter: u32) -> Self {
        Self {
            divisions_per_quarter: divisions_per_quarter as f64,
            changes: BTreeMap::from([(0, tempo)]),
        }
    }

    fn set(&mut self, division: u64, tempo: f64) {
        self.changes.insert(division, tempo);
    }

    fn seconds_at(&self, division: u64) -> f64 {
        let mut seconds = 0.0;
        let mut changes = self.changes.iter().peekable();
        while let Some((&start, &tempo)) = changes.next() {
            if start >= division {
                break;
            }
            let end = changes
                .peek()
                .map_or(division, |&(&next, _)| next.min(division));
            seconds += (end - start) as f64 * 60.0 / tempo / self.divisions_per_quarter;
        }
        seconds
    }
}

impl ImportedScore {
    pub fn parse_from_musicxml_str(xml_content: &str) -> Result<ImportedScore> {
        let xml_content = doctype_regex().replace(xml_content, "");
        let doc = Document::parse(&xml_content)?;
        let root = doc.root_element();

        let (divisions_per_quarter, time_signature, tempo) = extract_score_metadata(&root);

        let parts: Vec<Vec<MeasureContent>> = root
            .children()
            .filter(|n| n.has_tag_name("part"))
            .map(parse_part)
            .collect();
        if parts.is_empty() {
            return Err(Error::Score(format!(
                "expected <part> elements under <{}>",
                root.tag_name().name()
            )));
        }

        let mut slots: BTreeMap<u64, Slot> = BTreeMap::new();
        let mut tempo_map = TempoMap::new(tempo, divisions_per_quarter);
        let mut current_time = time_signature;
        let mut measure_start: u64 = 0;
        let measure_count = parts.iter().map(Vec::len).max().unwrap_or(0);

        // Every part shares the same measure boundaries.
        for index in 0..measure_count {
            let measures: Vec<&MeasureContent> =
                parts.iter().filter_map(|part| part.get(index)).collect();

            if let Some(changed) = measures.iter().find_map(|m| m.time_signature) {
                current_time = changed;
            }

            for measure in &measures {
                for &(offset, bpm) in &measure.tempo_changes {
                    tempo_map.set(measure_start + offset, bpm);
                }
                for note in &measure.notes {
                    let slot = slots.entry(measure_start + note.offset).or_default();
                    slot.pitches.push(note.pitch);
                    slot.duration = slot.duration.max(note.duration);
                    if slot.label.is_none() {
                        slot.label = note.label.clone();
                    }
                }
            }

            let length = measures.iter().map(|m| m.length).max().unwrap_or(0);
            measure_start += if length > 0 {
                length
            } else {
                calculate_divisions_per_measure(
                    current_time.beats_per_measure,
                    divisions_per_quarter,
                    current_time.beat_value,
                )
            };
        }

        let events = slots
            .into_iter()
            .enumerate()
            .map(|(i, (onset, slot))| {
                let start = tempo_map.seconds_at(onset);
                let end = tempo_map.seconds_at(onset + slot.duration);
                NoteEvent::new(start, end - start, slot.pitches, slot.label)
                    .map_err(|e| e.at_event(i))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Imported {} events from MusicXML ({} BPM, {}/{}, {} tempo changes)",
            events.len(),
            tempo,
            time_signature.beats_per_measure,
            time_signature.beat_value,
            tempo_map.changes.len() - 1
        );

        Ok(ImportedScore {
            events,
            time_signature,
            tempo,
            divisions_per_quarter,
        })
    }

    pub fn parse_from_musicxml<P: AsRef<Path>>(file_path: P) -> Result<ImportedScore> {
        let xml_content = fs::read_to_string(file_path)?;
        Self::parse_from_musicxml_str(&xml_content)
    }
}

fn doctype_regex() -> &'static Regex {
    static DOCTYPE: OnceLock<Regex> = OnceLock::new();
    DOCTYPE.get_or_init(|| Regex::new(r"(?s)<!DOCTYPE.*?>").expect("doctype pattern is valid"))
}

fn parse_part(part: Node) -> Vec<MeasureContent> {
    part.children()
        .filter(|n| n.has_tag_name("measure"))
        .map(parse_measure)
        .collect()
}

fn parse_measure(measure_node: Node) -> MeasureContent {
    let mut content = MeasureContent::default();
    let mut cursor: u64 = 0;
    let mut last_onset: u64 = 0;
    let mut pending_label: Option<String> = None;

    for child in measure_node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => {
                if let Some(time) = child.children().find(|n| n.has_tag_name("time")) {
                    content.time_signature = parse_time_signature(&time);
                }
            }
            "direction" | "sound" => {
                if let Some(bpm) = child.descendants().find_map(|n| sound_tempo(&n)) {
                    content.tempo_changes.push((cursor, bpm));
                }
            }
            "harmony" => pending_label = harmony_label(&child),
            "backup" => {
                let d = child_number::<u64>(&child, "duration").unwrap_or(0);
                cursor = cursor.saturating_sub(d);
            }
            "forward" => {
                cursor += child_number::<u64>(&child, "duration").unwrap_or(0);
                content.length = content.length.max(cursor);
            }
            "note" => {
                if has_child(&child, "grace") {
                    continue;
                }
                let duration = child_number::<u64>(&child, "duration").unwrap_or(0);
                let onset = if has_child(&child, "chord") {
                    last_onset
                } else {
                    last_onset = cursor;
                    cursor += duration;
                    content.length = content.length.max(cursor);
                    last_onset
                };

                if has_child(&child, "rest") || duration == 0 || is_tie_continuation(&child) {
                    continue;
                }
                let Some(pitch) = extract_pitch(&child) else {
                    debug!("Skipping unpitched note at measure offset {}", onset);
                    continue;
                };

                content.notes.push(MeasureNote {
                    offset: onset,
                    pitch,
                    duration,
                    label: pending_label.take(),
                });
            }
            _ => {}
        }
    }

    content
}

fn is_tie_continuation(note_node: &Node) -> bool {
    let stops = note_node
        .children()
        .filter(|n| n.has_tag_name("tie"))
        .any(|n| n.attribute("type") == Some("stop"));
    let starts = note_node
        .children()
        .filter(|n| n.has_tag_name("tie"))
        .any(|n| n.attribute("type") == Some("start"));
    stops && !starts
}

fn extract_pitch(note_node: &Node) -> Option<u8> {
    let pitch_node = note_node.children().find(|n| n.has_tag_name("pitch"))?;
    let step = child_text(&pitch_node, "step")?.chars().next()?;
    let octave = child_number::<i64>(&pitch_node, "octave")?;
    let alter = child_number::<f64>(&pitch_node, "alter").unwrap_or(0.0).round() as i64;

    let midi = (octave + 1) * 12 + step_semitone(step) + alter;
    u8::try_from(midi).ok().filter(|p| *p <= 127)
}

fn harmony_label(harmony: &Node) -> Option<String> {
    let root = harmony.children().find(|n| n.has_tag_name("root"))?;
    let step = child_text(&root, "root-step")?;
    let alter = match child_number::<f64>(&root, "root-alter").map(|a| a.round() as i64) {
        Some(1) => "#",
        Some(-1) => "b",
        _ => "",
    };

    let kind_node = harmony.children().find(|n| n.has_tag_name("kind"));
    let suffix = match kind_node.and_then(|k| k.attribute("text")) {
        Some(text) => text.to_string(),
        None => kind_suffix(kind_node.and_then(|k| k.text()).unwrap_or("").trim()).to_string(),
    };

    Some(format!("{}{}{}", step, alter, suffix))
}

fn kind_suffix(kind: &str) -> &'static str {
    match kind {
        "minor" => "m",
        "dominant" => "7",
        "major-seventh" => "maj7",
        "minor-seventh" => "m7",
        "diminished" => "dim",
        "augmented" => "aug",
        "suspended-fourth" => "sus4",
        "suspended-second" => "sus2",
        "power" => "5",
        _ => "",
    }
}
