#![doc = r#"
# cuewipe

Write Standard MIDI Files that line cue markers and wipe triggers up with a
production timeline.

A cue file is a format 1 MIDI file. The first track holds a SMPTE offset (the
timecode of the first tick), a fixed 120 BPM tempo and one marker meta event per
cue. Each further track is a named list of wipes, a note held for some number of
ticks, that downstream video or lighting gear reacts to.

Everything is positioned by [`Timecode`]. A [`TimeBase`] turns timecodes into
ticks at 9600 ticks per quarter note, so a frame at any supported rate lands on a
whole tick.

```rust
use cuewipe::prelude::*;

let config = DocumentConfig {
    frame_rate: FrameRate::TwentyFive,
    start: "10:00:00:00".to_owned(),
    ..DocumentConfig::default()
};
let mut doc = Document::new(&config).unwrap();
doc.add_marker("10:00:04:00", "Intro").unwrap();
doc.add_marker("10:00:01:00", "Countdown").unwrap();

let mut wipes = doc.add_wipe_track("Wipes").unwrap();
wipes.add_wipe("10:00:02:00", "E3", 9600).unwrap();
wipes.add_wipe_default("10:00:06:00").unwrap();

let mut file = Vec::new();
doc.finalize().unwrap().write_to(&mut file).unwrap();
assert_eq!(&file[..4], b"MThd");
```
"#]

mod error;
pub use error::*;

pub mod vlq;

pub mod note;

pub mod text;

pub mod timecode;

pub mod time_base;

pub mod smpte;

pub mod event;

pub mod chunk;

pub mod track;

mod config;
pub use config::*;

mod document;
pub use document::*;

#[doc = r#"
Everything needed to build a cue file
"#]
pub mod prelude {
    pub use crate::{
        ErrorKind, NoteError, SmpteError, TextError, TimecodeError, VlqError,
        chunk::{HeaderChunk, TrackChunk},
        config::{DEFAULT_SAMPLE_RATE, DocumentConfig},
        document::{Document, FinalizedDocument, WipeTrackMut},
        event::{ChannelEvent, EventKind, MetaEvent, NOTE_ON_VELOCITY, TrackEvent, WriteBytes},
        note::WipeNote,
        smpte::{SmpteOffset, SmpteRate},
        text::MidiText,
        time_base::{DEFAULT_TEMPO, PPQ, Tempo, TimeBase, TimeSpec},
        timecode::{ClockParts, FrameRate, Timecode},
        track::{DEFAULT_TRACK_NAME, DEFAULT_WIPE_DURATION, Marker, MarkerTrack, Wipe, WipeTrack},
        vlq::Vlq,
    };
}
