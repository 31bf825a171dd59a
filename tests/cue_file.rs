use cuewipe::{prelude::*, vlq};
use pretty_assertions::assert_eq;

fn document(rate: FrameRate, start: &str) -> Document {
    let config = DocumentConfig {
        frame_rate: rate,
        start: start.to_owned(),
        ..DocumentConfig::default()
    };
    Document::new(&config).unwrap()
}

/// Splits a file into `(type, body)` pairs, following each declared length.
fn chunks(bytes: &[u8]) -> Vec<(&[u8], &[u8])> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (kind, after) = rest.split_at(4);
        let len = u32::from_be_bytes(after[..4].try_into().unwrap()) as usize;
        let (body, next) = after[4..].split_at(len);
        chunks.push((kind, body));
        rest = next;
    }
    chunks
}

/// Absolute tick and text of every marker event in a marker track body.
fn marker_positions(mut body: &[u8]) -> Vec<(u64, String)> {
    let mut tick = 0u64;
    let mut markers = Vec::new();
    while !body.is_empty() {
        let (delta, read) = vlq::decode_prefix(body).unwrap();
        tick += delta as u64;
        body = &body[read..];
        assert_eq!(body[0], 0xFF, "marker tracks only hold meta events");
        let kind = body[1];
        let (len, read) = vlq::decode_prefix(&body[2..]).unwrap();
        let data = &body[2 + read..2 + read + len as usize];
        if kind == 0x06 {
            markers.push((tick, String::from_utf8(data.to_vec()).unwrap()));
        }
        body = &body[2 + read + len as usize..];
    }
    markers
}

#[test]
fn one_marker_one_wipe_at_24_fps() {
    let mut doc = document(FrameRate::TwentyFour, "00:00:00:00");
    doc.add_marker("00:00:01:00", "Cue1").unwrap();
    doc.add_wipe_track("Wipes")
        .unwrap()
        .add_wipe("00:00:02:00", 64u8, 9600)
        .unwrap();

    let bytes = doc.finalize().unwrap().render().unwrap();

    #[rustfmt::skip]
    let expected: Vec<u8> = [
        &b"MThd"[..], &[0, 0, 0, 6, 0, 1, 0, 2, 0x25, 0x80],
        b"MTrk", &[0, 0, 0, 30],
        &[0x00, 0xFF, 0x54, 0x05, 0, 0, 0, 0, 0],
        &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20],
        &[0x81, 0x96, 0x00, 0xFF, 0x06, 0x04], b"Cue1",
        &[0x00, 0xFF, 0x2F, 0x00],
        b"MTrk", &[0, 0, 0, 25],
        &[0x00, 0xFF, 0x03, 0x05], b"Wipes",
        &[0x82, 0xAC, 0x00, 0x90, 0x40, 0x50],
        &[0xCB, 0x00, 0x90, 0x40, 0x00],
        &[0xCB, 0x00, 0xFF, 0x2F, 0x00],
    ]
    .concat();
    assert_eq!(bytes, expected);

    let kinds: Vec<&[u8]> = chunks(&bytes).into_iter().map(|(kind, _)| kind).collect();
    assert_eq!(kinds, vec![&b"MThd"[..], b"MTrk", b"MTrk"]);
}

#[test]
fn markers_are_sorted_and_deltas_add_up() {
    let rate = FrameRate::TwentyFive;
    let mut doc = document(rate, "10:00:00:00");
    let cues = [
        ("10:00:30:00", "Outro"),
        ("10:00:00:00", "Top"),
        ("10:00:12:13", "Verse"),
        ("10:00:04:24", "Intro"),
        ("10:00:12:13", "Verse b"),
    ];
    for (at, text) in cues {
        doc.add_marker(at, text).unwrap();
    }
    let time_base = doc.time_base().clone();
    let origin = time_base.timecode_to_ticks(&doc.start()).unwrap();

    let bytes = doc.finalize().unwrap().render().unwrap();
    let markers = marker_positions(chunks(&bytes)[1].1);

    let names: Vec<&str> = markers.iter().map(|(_, name)| name.as_str()).collect();
    assert_eq!(names, vec!["Top", "Intro", "Verse", "Verse b", "Outro"]);

    for (tick, name) in &markers {
        let (at, _) = cues.iter().find(|cue| cue.1 == name.as_str()).unwrap();
        let absolute = time_base
            .timecode_to_ticks(&Timecode::parse(at, rate).unwrap())
            .unwrap();
        assert_eq!(*tick, absolute - origin, "{name}");
    }
}

#[test]
fn pulldown_rates_stretch_ticks() {
    let mut doc = document(FrameRate::TwentyThree, "00:00:00:00");
    doc.add_marker("00:00:01:00", "One").unwrap();

    let bytes = doc.finalize().unwrap().render().unwrap();
    let markers = marker_positions(chunks(&bytes)[1].1);
    assert_eq!(markers, vec![(19_219, "One".to_owned())]);
}

#[test]
fn drop_frame_start_is_written_as_30_drop() {
    let mut doc = document(FrameRate::TwentyNineDrop, "01:00:00;00");
    doc.add_marker("01:00:01;00", "Go").unwrap();

    let finalized = doc.finalize().unwrap();
    assert_eq!(finalized.smpte_offset().rate, SmpteRate::ThirtyDrop);

    let bytes = finalized.render().unwrap();
    let (_, body) = chunks(&bytes)[1];
    assert_eq!(&body[..9], &[0x00, 0xFF, 0x54, 0x05, 0x41, 0, 0, 0, 0]);
}

#[test]
fn invalid_text_is_rejected_when_added() {
    let mut doc = document(FrameRate::TwentyFour, "00:00:00:00");

    let err = doc.add_marker("00:00:01:00", &"m".repeat(33)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = doc.add_marker("00:00:01:00", "Bell\u{7}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = doc.add_marker("00:00:01:00", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = doc.add_wipe_track("Tab\tname").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(doc.markers().is_empty());
    assert!(doc.wipe_tracks().is_empty());
}

#[test]
fn malformed_times_are_rejected_when_added() {
    let mut doc = document(FrameRate::TwentyFive, "00:00:00:00");

    let err = doc.add_marker("0:00:01:00", "Cue").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let err = doc.add_marker("00:00:01:25", "Cue").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    let err = doc.add_marker("\u{661}\u{661}:00:00:00", "Cue").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let err = doc.add_marker(TimeSpec::Ticks(u64::MAX), "Cue").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(doc.markers().is_empty());

    let mut wipes = doc.add_wipe_track("Wipes").unwrap();
    let err = wipes
        .add_wipe(Timecode::zero(FrameRate::Thirty), "E3", 100)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FrameRateMismatch);
}

#[test]
fn overlapping_wipes_fail_the_render() {
    let mut doc = document(FrameRate::TwentyFour, "00:00:00:00");
    doc.add_wipe_track("Wipes")
        .unwrap()
        .add_wipe("00:00:01:00", "E3", 19_200)
        .unwrap()
        .add_wipe("00:00:01:12", "E3", 100)
        .unwrap();

    let err = doc.finalize().unwrap().render().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Scheduling);
}
