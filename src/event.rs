#![doc = r#"
Track events and their byte layout

Every event in a track is preceded by its delta time, a [`Vlq`] count of ticks since
the previous event. Cue files only need a handful of events:

```text
FF 54 05 hr mn se fr ff   SMPTE offset
FF 51 03 tt tt tt         tempo
FF 06 len text            marker
FF 03 len text            track name
FF 2F 00                  end of track
90 nn vv                  note on, channel 0
90 nn 00                  note off, written as a velocity 0 note on
```

Note offs are written as note ons with velocity 0 rather than with the `0x80`
status. Downstream wipe hardware expects exactly this layout.
"#]

use crate::prelude::*;

/// Something with a fixed byte layout in a MIDI file.
pub trait WriteBytes {
    /// Append the bytes of `self`, in file order, to `out`.
    fn write_bytes(&self, out: &mut Vec<u8>);

    /// The bytes of `self` in a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_bytes(&mut out);
        out
    }
}

impl WriteBytes for Vlq {
    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

const META: u8 = 0xFF;

#[doc = r#"
The meta events a cue file carries.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEvent {
    /// `FF 54 05 hr mn se fr ff`
    SmpteOffset(SmpteOffset),
    /// `FF 51 03 tt tt tt`
    Tempo(Tempo),
    /// `FF 06 len text`: the name of a point on the timeline
    Marker(MidiText),
    /// `FF 03 len text`: the name of the track
    TrackName(MidiText),
    /// `FF 2F 00`
    EndOfTrack,
}

impl MetaEvent {
    /// The meta event type byte
    pub const fn type_byte(&self) -> u8 {
        match self {
            Self::SmpteOffset(_) => 0x54,
            Self::Tempo(_) => 0x51,
            Self::Marker(_) => 0x06,
            Self::TrackName(_) => 0x03,
            Self::EndOfTrack => 0x2F,
        }
    }
}

impl WriteBytes for MetaEvent {
    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.push(META);
        out.push(self.type_byte());
        match self {
            Self::SmpteOffset(offset) => write_data(out, &offset.to_bytes()),
            Self::Tempo(tempo) => write_data(out, &tempo.to_bytes()),
            Self::Marker(text) | Self::TrackName(text) => write_data(out, text.as_bytes()),
            Self::EndOfTrack => write_data(out, &[]),
        }
    }
}

fn write_data(out: &mut Vec<u8>, data: &[u8]) {
    // meta payloads are at most 32 bytes, so the length always fits
    Vlq::from_u32(data.len() as u32).write_bytes(out);
    out.extend_from_slice(data);
}

/// Velocity wipes are triggered with
pub const NOTE_ON_VELOCITY: u8 = 0x50;

#[doc = r#"
Note events on channel 0.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// `90 nn 50`
    NoteOn(WipeNote),
    /// `90 nn 00`
    NoteOff(WipeNote),
}

impl ChannelEvent {
    const NOTE_ON: u8 = 0x90;
    const CHANNEL: u8 = 0;
}

impl WriteBytes for ChannelEvent {
    fn write_bytes(&self, out: &mut Vec<u8>) {
        let (note, velocity) = match self {
            Self::NoteOn(note) => (note, NOTE_ON_VELOCITY),
            Self::NoteOff(note) => (note, 0),
        };
        out.extend_from_slice(&[Self::NOTE_ON | Self::CHANNEL, note.value(), velocity]);
    }
}

/// Either kind of event a track can hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// See [`MetaEvent`]
    Meta(MetaEvent),
    /// See [`ChannelEvent`]
    Channel(ChannelEvent),
}

impl From<MetaEvent> for EventKind {
    fn from(value: MetaEvent) -> Self {
        Self::Meta(value)
    }
}

impl From<ChannelEvent> for EventKind {
    fn from(value: ChannelEvent) -> Self {
        Self::Channel(value)
    }
}

/// An event with the delta time that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvent {
    delta: Vlq,
    kind: EventKind,
}

impl TrackEvent {
    /// An event `delta` ticks after the previous one
    pub fn new(delta: impl Into<Vlq>, kind: impl Into<EventKind>) -> Self {
        Self {
            delta: delta.into(),
            kind: kind.into(),
        }
    }

    /// An event at the same tick as the previous one
    pub fn now(kind: impl Into<EventKind>) -> Self {
        Self::new(Vlq::from_u32(0), kind)
    }

    /// Ticks since the previous event
    pub fn delta(&self) -> u32 {
        self.delta.value()
    }

    /// The event itself
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}

impl WriteBytes for TrackEvent {
    fn write_bytes(&self, out: &mut Vec<u8>) {
        self.delta.write_bytes(out);
        match &self.kind {
            EventKind::Meta(meta) => meta.write_bytes(out),
            EventKind::Channel(channel) => channel.write_bytes(out),
        }
    }
}

#[test]
fn meta_event_layout() {
    use pretty_assertions::assert_eq;

    let marker = MetaEvent::Marker(MidiText::new("Cue1").unwrap());
    assert_eq!(marker.to_bytes(), [0xFF, 0x06, 0x04, b'C', b'u', b'e', b'1']);

    let name = MetaEvent::TrackName(MidiText::new("Wipes").unwrap());
    assert_eq!(
        name.to_bytes(),
        [0xFF, 0x03, 0x05, b'W', b'i', b'p', b'e', b's']
    );

    assert_eq!(
        MetaEvent::Tempo(Tempo::new(500_000)).to_bytes(),
        [0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]
    );
    assert_eq!(MetaEvent::EndOfTrack.to_bytes(), [0xFF, 0x2F, 0x00]);
}

#[test]
fn note_off_is_velocity_zero_note_on() {
    use pretty_assertions::assert_eq;

    let note = WipeNote::new(64u8).unwrap();
    assert_eq!(ChannelEvent::NoteOn(note).to_bytes(), [0x90, 64, 0x50]);
    assert_eq!(ChannelEvent::NoteOff(note).to_bytes(), [0x90, 64, 0x00]);
}

#[test]
fn track_event_prefixes_delta() {
    use pretty_assertions::assert_eq;

    let event = TrackEvent::new(9600u32, MetaEvent::EndOfTrack);
    assert_eq!(event.to_bytes(), [0xCB, 0x00, 0xFF, 0x2F, 0x00]);
    assert_eq!(event.delta(), 9600);
}
