use roxmltree::Node;

use super::musicxml_parser::TimeSignature;

pub const DEFAULT_TEMPO: f64 = 120.0;

pub fn extract_score_metadata(root: &Node) -> (u32, TimeSignature, f64) {
    let divisions_per_quarter = root
        .descendants()
        .find(|n| n.has_tag_name("divisions"))
        .and_then(|n| n.text().and_then(|t| t.trim().parse::<u32>().ok()))
        .filter(|d| *d > 0)
        .unwrap_or(1);

    let time_signature = root
        .descendants()
        .find(|n| n.has_tag_name("time"))
        .and_then(|n| parse_time_signature(&n))
        .unwrap_or(TimeSignature {
            beats_per_measure: 4,
            beat_value: 4,
        });

    let tempo = root
        .descendants()
        .find_map(|n| sound_tempo(&n))
        .unwrap_or(DEFAULT_TEMPO);

    (divisions_per_quarter, time_signature, tempo)
}

/// Reads a `<time>` element; both beats and beat type must be positive.
pub fn parse_time_signature(time: &Node) -> Option<TimeSignature> {
    let beats_per_measure = child_number::<u8>(time, "beats").filter(|b| *b > 0)?;
    let beat_value = child_number::<u8>(time, "beat-type").filter(|b| *b > 0)?;
    Some(TimeSignature {
        beats_per_measure,
        beat_value,
    })
}

/// Tempo of a `<sound tempo="..">` element, if this is one.
pub fn sound_tempo(node: &Node) -> Option<f64> {
    if !node.has_tag_name("sound") {
        return None;
    }
    node.attribute("tempo")
        .and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t > 0.0)
}

pub fn calculate_divisions_per_measure(
    beats_per_measure: u8,
    divisions_per_quarter: u32,
    beat_value: u8,
) -> u64 {
    (beats_per_measure as u64) * (divisions_per_quarter as u64) * 4 / (beat_value as u64)
}

pub fn child_text<'a>(node: &Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(str::trim)
}

pub fn child_number<T: std::str::FromStr>(node: &Node, tag: &str) -> Option<T> {
    child_text(node, tag).and_then(|t| t.parse::<T>().ok())
}

pub fn has_child(node: &Node, tag: &str) -> bool {
    node.children().any(|n| n.has_tag_name(tag))
}
