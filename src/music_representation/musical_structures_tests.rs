#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::error::Error;
    use crate::music_representation::{
        group_into_events, load_events, load_events_from_file, parse_detected_notes,
        parse_note_events, DetectedNote, ImportedScore, InputKind, MappedEvent, NoteEvent,
        Position, TimeSignature,
    };

    #[test]
    fn test_note_event_validation() {
        assert!(NoteEvent::new(0.0, 0.5, vec![40], None).is_ok());
        assert!(matches!(
            NoteEvent::new(0.0, 0.5, vec![], None),
            Err(Error::EmptyPitchSet)
        ));
        assert!(matches!(
            NoteEvent::new(-1.0, 0.5, vec![40], None),
            Err(Error::InvalidTime(_))
        ));
        assert!(matches!(
            NoteEvent::new(0.0, 0.0, vec![40], None),
            Err(Error::InvalidDuration(_))
        ));
        assert!(matches!(
            NoteEvent::new(0.0, 0.5, vec![40, 128], None),
            Err(Error::PitchOutOfRange(128))
        ));
    }

    #[test]
    fn test_parse_events_accepts_single_and_list_pitches() {
        let json = r#"[
            {"time": 0.0, "duration": 0.5, "pitches": 40},
            {"time": 0.5, "duration": 1.0, "pitches": [40, 47, 52], "label": "Em"}
        ]"#;
        let events = parse_note_events(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pitches(), &[40]);
        assert!(!events[0].is_chord());
        assert_eq!(events[1].pitches(), &[40, 47, 52]);
        assert_eq!(events[1].label(), Some("Em"));
    }

    #[test]
    fn test_parse_events_reports_event_index() {
        let json = r#"[
            {"time": 0.0, "duration": 0.5, "pitches": 40},
            {"time": 0.5, "duration": 0.5, "pitches": []}
        ]"#;
        let err = parse_note_events(json).unwrap_err();
        assert!(matches!(err, Error::Event { index: 1, .. }));
        assert_eq!(err.to_string(), "event 1: pitch set is empty");
    }

    #[test]
    fn test_parse_events_rejects_non_numeric_pitch() {
        let json = r#"[{"time": 0.0, "duration": 0.5, "pitches": ["E2"]}]"#;
        assert!(matches!(parse_note_events(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_events_rejects_negative_pitch() {
        let json = r#"[{"time": 0.0, "duration": 0.5, "pitches": -3}]"#;
        let err = parse_note_events(json).unwrap_err();
        assert_eq!(err.to_string(), "event 0: pitch -3 is outside the MIDI range 0-127");
    }

    #[test]
    fn test_mapped_event_collision_check() {
        let mut event = MappedEvent {
            time: 0.0,
            duration: 1.0,
            positions: vec![Position::new(0, 0), Position::new(1, 1)],
            pitches: vec![64, 60],
            label: None,
            fallback: false,
        };
        assert!(!event.has_string_collision());
        assert_eq!(event.position_on(1), Some(&Position::new(1, 1)));
        assert_eq!(event.position_on(2), None);

        event.positions.push(Position::new(1, 3));
        assert!(event.has_string_collision());
    }

    #[test]
    fn test_group_notes_within_window() {
        let notes = vec![
            DetectedNote::new(52, 0.005, 0.4),
            DetectedNote::new(40, 0.0, 0.5),
            DetectedNote::new(47, 0.015, 0.3),
            DetectedNote::new(55, 0.5, 0.75),
        ];
        let events = group_into_events(&notes, 20.0).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pitches(), &[40, 52, 47]);
        assert_eq!(events[0].time(), 0.0);
        assert_eq!(events[0].duration(), 0.5);
        assert_eq!(events[1].pitches(), &[55]);
        assert_eq!(events[1].time(), 0.5);
    }

    #[test]
    fn test_group_window_measured_from_first_onset() {
        // 0.0 -> 0.015 -> 0.030: the third note is 30ms past the group's first onset.
        let notes = vec![
            DetectedNote::new(40, 0.0, 0.2),
            DetectedNote::new(45, 0.015, 0.2),
            DetectedNote::new(50, 0.030, 0.2),
        ];
        let events = group_into_events(&notes, 20.0).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].pitches(), &[50]);
    }

    #[test]
    fn test_group_rejects_inverted_note() {
        let notes = vec![DetectedNote::new(40, 1.0, 0.5)];
        assert!(matches!(
            group_into_events(&notes, 20.0),
            Err(Error::Event { index: 0, .. })
        ));
    }

    #[test]
    fn test_detected_notes_default_velocity() {
        let notes = parse_detected_notes(r#"[{"pitch": 64, "onset": 0.0, "offset": 0.25}]"#)
            .unwrap();
        assert_eq!(notes[0].velocity, 100);
    }

    const SCORE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN"
  "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1">
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>2</divisions>
        <time><beats>3</beats><beat-type>4</beat-type></time>
      </attributes>
      <direction><sound tempo="60"/></direction>
      <harmony>
        <root><root-step>E</root-step></root>
        <kind>minor</kind>
      </harmony>
      <note>
        <pitch><step>E</step><octave>2</octave></pitch>
        <duration>2</duration><voice>1</voice>
      </note>
      <note>
        <chord/>
        <pitch><step>B</step><octave>2</octave></pitch>
        <duration>2</duration><voice>1</voice>
      </note>
      <note>
        <rest/>
        <duration>2</duration><voice>1</voice>
      </note>
      <note>
        <pitch><step>F</step><alter>1</alter><octave>3</octave></pitch>
        <duration>1</duration><voice>1</voice>
      </note>
    </measure>
    <measure number="2">
      <note>
        <pitch><step>G</step><octave>3</octave></pitch>
        <duration>6</duration><voice>1</voice>
      </note>
    </measure>
  </part>
</score-partwise>"#;

    #[test]
    fn test_musicxml_import() {
        let score = ImportedScore::parse_from_musicxml_str(SCORE).unwrap();

        assert_eq!(
            score.time_signature,
            TimeSignature {
                beats_per_measure: 3,
                beat_value: 4
            }
        );
        assert_eq!(score.tempo, 60.0);
        assert_eq!(score.divisions_per_quarter, 2);

        // 60 BPM with 2 divisions per quarter: 0.5s per division.
        let events = &score.events;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].pitches(), &[40, 47]);
        assert_eq!(events[0].time(), 0.0);
        assert_eq!(events[0].duration(), 1.0);
        assert_eq!(events[0].label(), Some("Em"));

        assert_eq!(events[1].pitches(), &[54]);
        assert_eq!(events[1].time(), 2.0);
        assert_eq!(events[1].label(), None);

        // Measure 1 covered 5 of 6 divisions, so measure 2 starts after 5.
        assert_eq!(events[2].pitches(), &[55]);
        assert_eq!(events[2].time(), 2.5);
        assert_eq!(events[2].duration(), 3.0);
    }

    #[test]
    fn test_musicxml_import_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCORE.as_bytes()).unwrap();

        let score = ImportedScore::parse_from_musicxml(file.path()).unwrap();
        assert_eq!(score.events.len(), 3);
    }

    #[test]
    fn test_musicxml_backup_merges_voices() {
        let xml = r#"<score-partwise>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>4</duration><voice>1</voice></note>
      <backup><duration>4</duration></backup>
      <note><pitch><step>E</step><octave>2</octave></pitch><duration>2</duration><voice>2</voice></note>
      <note><pitch><step>A</step><octave>2</octave></pitch><duration>2</duration><voice>2</voice></note>
    </measure>
  </part>
</score-partwise>"#;
        let score = ImportedScore::parse_from_musicxml_str(xml).unwrap();
        assert_eq!(score.tempo, 120.0);
        assert_eq!(score.events.len(), 2);
        assert_eq!(score.events[0].pitches(), &[64, 40]);
        assert_eq!(score.events[0].duration(), 2.0);
        assert_eq!(score.events[1].pitches(), &[45]);
        assert_eq!(score.events[1].time(), 1.0);
    }

    #[test]
    fn test_musicxml_parts_share_measure_boundaries() {
        // P1 only fills one beat of its first measure; P2 fills the whole bar.
        let xml = r#"<score-partwise>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>1</duration></note>
    </measure>
    <measure number="2">
      <note><pitch><step>G</step><octave>4</octave></pitch><duration>4</duration></note>
    </measure>
  </part>
  <part id="P2">
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <note><pitch><step>E</step><octave>2</octave></pitch><duration>4</duration></note>
    </measure>
    <measure number="2">
      <note><pitch><step>G</step><octave>2</octave></pitch><duration>4</duration></note>
    </measure>
  </part>
</score-partwise>"#;
        let score = ImportedScore::parse_from_musicxml_str(xml).unwrap();
        assert_eq!(score.events.len(), 2);
        assert_eq!(score.events[0].pitches(), &[64, 40]);
        assert_eq!(score.events[1].pitches(), &[67, 43]);
        assert_eq!(score.events[1].time(), 2.0);
    }

    #[test]
    fn test_musicxml_harmony_labels_only_the_next_note() {
        let xml = r#"<score-partwise>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <harmony><root><root-step>E</root-step></root><kind>minor</kind></harmony>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>4</duration><voice>1</voice></note>
      <backup><duration>4</duration></backup>
      <harmony><root><root-step>G</root-step></root><kind>major</kind></harmony>
      <note><pitch><step>E</step><octave>2</octave></pitch><duration>2</duration><voice>2</voice></note>
      <note><pitch><step>B</step><octave>2</octave></pitch><duration>2</duration><voice>2</voice></note>
    </measure>
  </part>
</score-partwise>"#;
        let score = ImportedScore::parse_from_musicxml_str(xml).unwrap();
        assert_eq!(score.events.len(), 2);
        assert_eq!(score.events[0].label(), Some("Em"));
        assert_eq!(score.events[1].pitches(), &[47]);
        assert_eq!(score.events[1].label(), None);
    }

    #[test]
    fn test_musicxml_tempo_and_meter_changes() {
        let xml = r#"<score-partwise>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>1</divisions></attributes>
      <direction><sound tempo="120"/></direction>
      <note><pitch><step>E</step><octave>2</octave></pitch><duration>4</duration></note>
    </measure>
    <measure number="2">
      <direction><sound tempo="60"/></direction>
      <note><pitch><step>A</step><octave>2</octave></pitch><duration>4</duration></note>
    </measure>
    <measure number="3">
      <attributes><time><beats>3</beats><beat-type>4</beat-type></time></attributes>
    </measure>
    <measure number="4">
      <note><pitch><step>D</step><octave>3</octave></pitch><duration>1</duration></note>
    </measure>
  </part>
</score-partwise>"#;
        let score = ImportedScore::parse_from_musicxml_str(xml).unwrap();
        assert_eq!(score.tempo, 120.0);

        let events = &score.events;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].duration(), 2.0);
        // Second bar at 60 BPM: one second per quarter.
        assert_eq!(events[1].time(), 2.0);
        assert_eq!(events[1].duration(), 4.0);
        // The empty bar lasts three beats of the new meter.
        assert_eq!(events[2].time(), 9.0);
        assert_eq!(events[2].duration(), 1.0);
    }

    #[test]
    fn test_musicxml_rejects_malformed_document() {
        assert!(matches!(
            ImportedScore::parse_from_musicxml_str("<score-partwise><part>"),
            Err(Error::Xml(_))
        ));
        assert!(matches!(
            ImportedScore::parse_from_musicxml_str("<score-partwise/>"),
            Err(Error::Score(_))
        ));
    }

    #[test]
    fn test_input_kind_from_extension() {
        use std::path::Path;
        assert_eq!(InputKind::from_path(Path::new("song.musicxml")), InputKind::Musicxml);
        assert_eq!(InputKind::from_path(Path::new("song.XML")), InputKind::Musicxml);
        assert_eq!(InputKind::from_path(Path::new("song.json")), InputKind::Events);
        assert_eq!(InputKind::from_path(Path::new("song")), InputKind::Events);
    }

    #[test]
    fn test_load_detected_notes_groups_chords() {
        let json = r#"[
            {"pitch": 40, "onset": 0.0, "offset": 0.5},
            {"pitch": 47, "onset": 0.01, "offset": 0.5, "velocity": 90},
            {"pitch": 52, "onset": 0.6, "offset": 0.9}
        ]"#;
        let loaded = load_events(json, InputKind::Notes, 20.0).unwrap();
        assert_eq!(loaded.bpm, None);
        assert_eq!(loaded.events.len(), 2);
        assert_eq!(loaded.events[0].pitches(), &[40, 47]);
    }

    #[test]
    fn test_load_score_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".musicxml").tempfile().unwrap();
        file.write_all(SCORE.as_bytes()).unwrap();

        let loaded = load_events_from_file(file.path(), None, 20.0).unwrap();
        assert_eq!(loaded.bpm, Some(60.0));
        assert_eq!(loaded.events.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_events_from_file("/definitely/not/here.json", None, 20.0);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
