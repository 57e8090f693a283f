// guitar.rs

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

pub const STRING_COUNT: usize = 6;
pub const DEFAULT_MAX_FRET: u8 = 22;

const STANDARD_NAMES: [&str; STRING_COUNT] = ["e", "B", "G", "D", "A", "E"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum TuningPreset {
    #[value(name = "standard")]
    Standard,
    #[value(name = "drop_d")]
    DropD,
    #[value(name = "half_down")]
    HalfDown,
    #[value(name = "open_g")]
    OpenG,
    #[value(name = "dadgad")]
    Dadgad,
}

impl TuningPreset {
    pub const ALL: [TuningPreset; 5] = [
        TuningPreset::Standard,
        TuningPreset::DropD,
        TuningPreset::HalfDown,
        TuningPreset::OpenG,
        TuningPreset::Dadgad,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TuningPreset::Standard => "standard",
            TuningPreset::DropD => "drop_d",
            TuningPreset::HalfDown => "half_down",
            TuningPreset::OpenG => "open_g",
            TuningPreset::Dadgad => "dadgad",
        }
    }

    pub fn tuning(&self) -> Tuning {
        match self {
            TuningPreset::Standard => Tuning::standard(),
            TuningPreset::DropD => Tuning::drop_d(),
            TuningPreset::HalfDown => Tuning::half_step_down(),
            TuningPreset::OpenG => Tuning::open_g(),
            TuningPreset::Dadgad => Tuning::dadgad(),
        }
    }
}

impl fmt::Display for TuningPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for TuningPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TuningPreset::ALL
            .into_iter()
            .find(|preset| preset.key() == s)
            .ok_or_else(|| Error::UnknownTuning(s.to_string()))
    }
}

/// Six open-string pitches, highest string first, with display names for
/// each string row of a rendered tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tuning {
    pub key: String,
    pub label: String,
    pub open_strings: [u8; STRING_COUNT],
    pub string_names: [String; STRING_COUNT],
}

impl Tuning {
    fn preset(
        key: &str,
        label: &str,
        open_strings: [u8; STRING_COUNT],
        string_names: [&str; STRING_COUNT],
    ) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            open_strings,
            string_names: string_names.map(String::from),
        }
    }

    pub fn standard() -> Self {
        Self::preset("standard", "Standard", [64, 59, 55, 50, 45, 40], STANDARD_NAMES)
    }

    pub fn drop_d() -> Self {
        Self::preset("drop_d", "Drop D", [64, 59, 55, 50, 45, 38], STANDARD_NAMES)
    }

    pub fn half_step_down() -> Self {
        Self::preset(
            "half_down",
            "Half Step Down",
            [63, 58, 54, 49, 44, 39],
            STANDARD_NAMES,
        )
    }

    pub fn open_g() -> Self {
        Self::preset(
            "open_g",
            "Open G",
            [62, 59, 55, 50, 47, 38],
            ["d", "B", "G", "D", "G", "D"],
        )
    }

    pub fn dadgad() -> Self {
        Self::preset(
            "dadgad",
            "DADGAD",
            [62, 57, 55, 50, 45, 38],
            ["d", "A", "G", "D", "A", "D"],
        )
    }

    /// Parses a custom tuning written the way guitarists write it: lowest
    /// string first, e.g. `"E2 A2 D3 G3 B3 E4"` or `"40 45 50 55 59 64"`.
    pub fn parse_custom(spec: &str) -> Result<Self> {
        let tokens: Vec<&str> = spec
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() != STRING_COUNT {
            return Err(Error::StringCount(tokens.len()));
        }

        let mut open_strings = [0u8; STRING_COUNT];
        let mut string_names: [String; STRING_COUNT] = Default::default();
        // Input runs low to high; storage runs high to low.
        for (i, token) in tokens.iter().enumerate() {
            let slot = STRING_COUNT - 1 - i;
            let pitch = match token.parse::<i64>() {
                Ok(n) => midi_from_number(n)?,
                Err(_) => note_name_to_midi(token)?,
            };
            open_strings[slot] = pitch;
            string_names[slot] = pitch_class_name(pitch).to_string();
        }
        string_names[0] = string_names[0].to_lowercase();

        Ok(Self {
            key: "custom".to_string(),
            label: format!("Custom ({})", tokens.join(" ")),
            open_strings,
            string_names,
        })
    }

    pub fn open_string(&self, string: usize) -> u8 {
        self.open_strings[string]
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::standard()
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.string_names.join(" "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FretboardConfig {
    pub max_fret: u8,
}

impl Default for FretboardConfig {
    fn default() -> Self {
        Self {
            max_fret: DEFAULT_MAX_FRET,
        }
    }
}

fn midi_from_number(n: i64) -> Result<u8> {
    u8::try_from(n)
        .ok()
        .filter(|p| *p <= 127)
        .ok_or(Error::PitchOutOfRange(n))
}

fn note_name_regex() -> &'static Regex {
    static NOTE_NAME: OnceLock<Regex> = OnceLock::new();
    NOTE_NAME.get_or_init(|| {
        Regex::new(r"^([A-Ga-g])([#b]?)(-?\d+)$").expect("note name pattern is valid")
    })
}

/// Scientific pitch notation to MIDI number, C4 = 60.
pub fn note_name_to_midi(name: &str) -> Result<u8> {
    let invalid = || Error::InvalidNoteName(name.to_string());
    let caps = note_name_regex().captures(name).ok_or_else(invalid)?;

    let step = caps[1].chars().next().ok_or_else(invalid)?;
    let alter = match &caps[2] {
        "#" => 1,
        "b" => -1,
        _ => 0,
    };
    let octave: i64 = caps[3].parse().map_err(|_| invalid())?;

    midi_from_number((octave + 1) * 12 + step_semitone(step) + alter)
}

pub fn step_semitone(step: char) -> i64 {
    match step.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    }
}

fn pitch_class_name(pitch: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    NAMES[(pitch % 12) as usize]
}
