#![doc = r#"
The tracks of a cue file

A cue file is format 1: the first track carries the SMPTE offset, the tempo and the
[`Marker`]s; every following track is a [`WipeTrack`] of note events.

Tracks keep their events in insertion order. They are sorted by timecode only when
rendered, and rendering checks that nothing sits before the document start.
"#]

mod marker;
pub use marker::*;

mod wipe;
pub use wipe::*;
