#![doc = r#"
Chunks of a Standard MIDI File

A MIDI file is a sequence of chunks, each a 4-character ASCII type followed by a
32-bit big-endian length and then the chunk data.

## [`HeaderChunk`]

`MThd`, always 6 bytes long, carrying the format, the number of tracks and the
timing. Cue files are always format 1 (simultaneous tracks) with ticks per
quarter note timing.

## [`TrackChunk`]

`MTrk`, followed by a stream of delta-timed [`TrackEvent`]s. The length is measured
from the rendered events, never estimated.

```text
[Header Chunk: "MThd"]
[Track Chunk 1: "MTrk"]   SMPTE offset, tempo, markers
[Track Chunk 2: "MTrk"]   wipes
...
```
"#]

use crate::prelude::*;

/// Standard MIDI file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderChunk {
    track_count: u16,
    ticks_per_quarter_note: u16,
}

impl HeaderChunk {
    /// Chunk type
    pub const TYPE: [u8; 4] = *b"MThd";
    /// Format 1: simultaneous tracks, the first holding the tempo map
    pub const FORMAT: u16 = 1;
    /// The header data is always 6 bytes
    pub const LEN: u32 = 6;

    /// A format 1 header.
    ///
    /// The leading bit of `ticks_per_quarter_note` selects SMPTE timing and is
    /// masked off.
    pub const fn new(track_count: u16, ticks_per_quarter_note: u16) -> Self {
        Self {
            track_count,
            ticks_per_quarter_note: ticks_per_quarter_note & 0x7FFF,
        }
    }

    /// Number of track chunks that follow
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }

    /// The timing division
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.ticks_per_quarter_note
    }
}

impl WriteBytes for HeaderChunk {
    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&Self::TYPE);
        out.extend_from_slice(&Self::LEN.to_be_bytes());
        out.extend_from_slice(&Self::FORMAT.to_be_bytes());
        out.extend_from_slice(&self.track_count.to_be_bytes());
        out.extend_from_slice(&self.ticks_per_quarter_note.to_be_bytes());
    }
}

/// A track chunk and the events it holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackChunk {
    events: Vec<TrackEvent>,
}

impl TrackChunk {
    /// Chunk type
    pub const TYPE: [u8; 4] = *b"MTrk";

    /// A track from its events, in file order.
    pub fn new(events: Vec<TrackEvent>) -> Self {
        Self { events }
    }

    /// Append an event.
    pub fn push(&mut self, event: TrackEvent) {
        self.events.push(event);
    }

    /// The events in file order
    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    /// The rendered event stream, without the chunk header
    pub fn body(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for event in &self.events {
            event.write_bytes(&mut body);
        }
        body
    }
}

impl WriteBytes for TrackChunk {
    fn write_bytes(&self, out: &mut Vec<u8>) {
        let body = self.body();
        out.extend_from_slice(&Self::TYPE);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
    }
}

#[test]
fn header_layout() {
    use pretty_assertions::assert_eq;

    let header = HeaderChunk::new(2, 9600);
    assert_eq!(
        header.to_bytes(),
        [
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 2, 0x25, 0x80
        ]
    );
}

#[test]
fn track_size_is_measured() {
    use pretty_assertions::assert_eq;

    let mut track = TrackChunk::default();
    track.push(TrackEvent::new(
        Vlq::from_u32(200),
        MetaEvent::Marker(MidiText::new("A").unwrap()),
    ));
    track.push(TrackEvent::now(MetaEvent::EndOfTrack));

    let bytes = track.to_bytes();
    assert_eq!(&bytes[..4], b"MTrk");
    assert_eq!(&bytes[4..8], &[0, 0, 0, 10]);
    assert_eq!(
        &bytes[8..],
        &[0x81, 0x48, 0xFF, 0x06, 0x01, b'A', 0x00, 0xFF, 0x2F, 0x00]
    );
}
