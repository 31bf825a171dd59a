use cuewipe::prelude::*;
use pretty_assertions::assert_eq;

fn finalized() -> FinalizedDocument {
    let mut doc = Document::default();
    doc.add_marker("00:00:02:00", "Walk-in").unwrap();
    doc.add_wipe_track("Streamers")
        .unwrap()
        .add_wipe_default("00:00:03:00")
        .unwrap();
    doc.finalize().unwrap()
}

#[test]
fn saved_file_matches_rendered_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cues.mid");

    let document = finalized();
    let expected = document.clone().render().unwrap();
    document.save(&path).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), expected);
}

#[test]
fn save_replaces_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cues.mid");
    std::fs::write(&path, vec![0u8; 4096]).unwrap();

    let document = finalized();
    let expected = document.clone().render().unwrap();
    document.save(&path).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), expected);
}

#[test]
fn unwritable_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("cues.mid");

    let err = finalized().save(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn failed_render_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cues.mid");

    let mut doc = Document::default();
    doc.set_start("00:00:10:00").unwrap();
    doc.add_wipe_track("Wipes")
        .unwrap()
        .add_wipe_default("00:00:01:00")
        .unwrap();

    let err = doc.finalize().unwrap().save(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ordering);
    assert!(!path.exists());
}
