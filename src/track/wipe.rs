use core::fmt;

use tracing::trace;

use crate::{Error, Result, prelude::*};

/// How long a wipe note is held unless told otherwise, in ticks (one quarter note)
pub const DEFAULT_WIPE_DURATION: u32 = 9600;

/// Name given to new wipe tracks
pub const DEFAULT_TRACK_NAME: &str = "Wipes";

/// A single wipe trigger: a note held for `duration` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wipe {
    at: Timecode,
    note: WipeNote,
    duration: u32,
}

impl Wipe {
    /// A wipe at `at` on `note`, held for `duration` ticks.
    pub const fn new(at: Timecode, note: WipeNote, duration: u32) -> Self {
        Self { at, note, duration }
    }

    /// Where the wipe starts
    pub const fn at(&self) -> Timecode {
        self.at
    }

    /// The note the wipe is triggered with
    pub const fn note(&self) -> WipeNote {
        self.note
    }

    /// Ticks between note on and note off
    pub const fn duration(&self) -> u32 {
        self.duration
    }
}

/// A wipe that starts before the previous one has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overlap {
    /// Index of the late wipe
    pub index: usize,
    /// Ticks by which the previous note off runs past its note on
    pub ticks: u64,
}

/// Delta times before each note on.
///
/// `wipes` are `(tick, duration)` pairs in timeline order. The first delta is measured
/// from `start`; every later one from the previous note off, which sits `duration`
/// ticks after the previous note on.
pub(crate) fn note_on_deltas(
    start: u64,
    wipes: &[(u64, u32)],
) -> Result<Vec<u64>, Overlap> {
    let mut deltas = Vec::with_capacity(wipes.len());
    let mut free_from = start;
    for (index, &(tick, duration)) in wipes.iter().enumerate() {
        let Some(delta) = tick.checked_sub(free_from) else {
            return Err(Overlap {
                index,
                ticks: free_from - tick,
            });
        };
        deltas.push(delta);
        free_from = tick + duration as u64;
    }
    Ok(deltas)
}

/// A named track of wipe notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipeTrack {
    name: MidiText,
    wipes: Vec<Wipe>,
}

impl WipeTrack {
    /// An empty track.
    ///
    /// # Errors
    /// [`TextError`] if `name` is longer than 32 characters or not printable ASCII.
    pub fn new(name: &str) -> Result<Self, TextError> {
        Ok(Self {
            name: MidiText::new(name)?,
            wipes: Vec::new(),
        })
    }

    /// Rename the track.
    pub fn change_name(&mut self, name: &str) -> Result<(), TextError> {
        self.name = MidiText::new(name)?;
        Ok(())
    }

    /// The track name
    pub fn name(&self) -> &MidiText {
        &self.name
    }

    /// Add a wipe. Order does not matter.
    pub fn push(&mut self, wipe: Wipe) {
        self.wipes.push(wipe);
    }

    /// Wipes in insertion order
    pub fn wipes(&self) -> &[Wipe] {
        &self.wipes
    }

    /// Number of wipes
    pub fn len(&self) -> usize {
        self.wipes.len()
    }

    /// True if the track has no wipes
    pub fn is_empty(&self) -> bool {
        self.wipes.is_empty()
    }

    /// Render the track.
    ///
    /// The track name comes first, at tick 0. Each wipe is a note on followed
    /// `duration` ticks later by its note off. The end of track sits one more
    /// duration after the last note off.
    ///
    /// # Errors
    /// - [`Error::BeforeStart`] if a wipe precedes `start`
    /// - [`Error::Overlap`] if a wipe starts before the previous note off
    /// - [`TimecodeError::FrameRateMismatch`] if a wipe is at a different rate
    /// - [`VlqError::OutOfRange`] if a gap does not fit in a delta time
    pub fn render(&self, start: &Timecode, time_base: &TimeBase) -> Result<TrackChunk> {
        let mut sorted = self.wipes.clone();
        sorted.sort_by_key(|wipe| wipe.at);
        if let Some(first) = sorted.first().filter(|w| w.at < *start) {
            return Err(Error::BeforeStart {
                kind: "Wipe",
                at: first.at,
                start: *start,
            });
        }

        let ticks = sorted
            .iter()
            .map(|wipe| {
                time_base
                    .timecode_to_ticks(&wipe.at)
                    .map(|tick| (tick, wipe.duration))
            })
            .collect::<Result<Vec<_>, TimecodeError>>()?;
        let deltas = note_on_deltas(time_base.timecode_to_ticks(start)?, &ticks).map_err(
            |overlap| Error::Overlap {
                at: sorted[overlap.index].at,
                overlap: overlap.ticks,
            },
        )?;

        let mut track = TrackChunk::default();
        track.push(TrackEvent::now(MetaEvent::TrackName(self.name.clone())));
        for (wipe, delta) in sorted.iter().zip(deltas) {
            track.push(TrackEvent::new(
                Vlq::encode(delta)?,
                ChannelEvent::NoteOn(wipe.note),
            ));
            track.push(TrackEvent::new(
                Vlq::from_u32(wipe.duration),
                ChannelEvent::NoteOff(wipe.note),
            ));
        }
        let tail = sorted.last().map_or(0, |wipe| wipe.duration);
        track.push(TrackEvent::new(
            Vlq::from_u32(tail),
            MetaEvent::EndOfTrack,
        ));

        trace!(name = %self.name, wipes = self.len(), "rendered wipe track");
        Ok(track)
    }
}

impl Default for WipeTrack {
    fn default() -> Self {
        Self {
            name: MidiText::new(DEFAULT_TRACK_NAME).unwrap_or_default(),
            wipes: Vec::new(),
        }
    }
}

impl fmt::Display for WipeTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Midi track '{}' containing {} wipes.",
            self.name,
            self.wipes.len()
        )
    }
}

#[test]
fn later_deltas_subtract_previous_duration() {
    use pretty_assertions::assert_eq;

    let deltas = note_on_deltas(0, &[(1000, 500), (3000, 500)]).unwrap();
    assert_eq!(deltas, vec![1000, 1500]);
}

#[test]
fn back_to_back_wipes_have_zero_delta() {
    use pretty_assertions::assert_eq;

    let deltas = note_on_deltas(200, &[(200, 100), (300, 100)]).unwrap();
    assert_eq!(deltas, vec![0, 0]);
}

#[test]
fn overlapping_wipes_are_reported() {
    use pretty_assertions::assert_eq;

    let overlap = note_on_deltas(0, &[(1000, 9600), (3000, 500)]).unwrap_err();
    assert_eq!(overlap, Overlap {
        index: 1,
        ticks: 7600
    });
}

#[test]
fn renders_note_pairs_and_tail() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyFour;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::zero(rate);
    let note = WipeNote::new("C3").unwrap();

    let mut track = WipeTrack::new("W").unwrap();
    // 2 frames = 1600 ticks, 5 frames = 4000 ticks
    track.push(Wipe::new(Timecode::from_frames(5, rate), note, 100));
    track.push(Wipe::new(Timecode::from_frames(2, rate), note, 200));

    let chunk = track.render(&start, &base).unwrap();
    assert_eq!(
        chunk.body(),
        [
            0x00, 0xFF, 0x03, 0x01, b'W', //
            0x8C, 0x40, 0x90, 60, 0x50, // 1600
            0x81, 0x48, 0x90, 60, 0x00, // 200
            0x91, 0x18, 0x90, 60, 0x50, // 4000 - 1600 - 200 = 2200
            0x64, 0x90, 60, 0x00, // 100
            0x64, 0xFF, 0x2F, 0x00,
        ]
    );
}

#[test]
fn render_rejects_overlap_and_early_wipes() {
    let rate = FrameRate::TwentyFour;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::from_frames(10, rate);

    let mut track = WipeTrack::default();
    track.push(Wipe::new(Timecode::from_frames(9, rate), WipeNote::DEFAULT, 10));
    let err = track.render(&start, &base).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ordering);

    let mut track = WipeTrack::default();
    track.push(Wipe::new(Timecode::from_frames(10, rate), WipeNote::DEFAULT, 9600));
    track.push(Wipe::new(Timecode::from_frames(11, rate), WipeNote::DEFAULT, 10));
    let err = track.render(&start, &base).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Scheduling);
}

#[test]
fn empty_track_renders_name_and_end() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyFive;
    let base = TimeBase::new(rate, 48_000.);
    let chunk = WipeTrack::default()
        .render(&Timecode::zero(rate), &base)
        .unwrap();
    assert_eq!(
        chunk.body(),
        [0x00, 0xFF, 0x03, 0x05, b'W', b'i', b'p', b'e', b's', 0x00, 0xFF, 0x2F, 0x00]
    );
}

#[test]
fn names_follow_text_rules() {
    use pretty_assertions::assert_eq;

    let mut track = WipeTrack::default();
    assert_eq!(track.to_string(), "Midi track 'Wipes' containing 0 wipes.");
    assert_eq!(
        track.change_name(&"n".repeat(33)),
        Err(TextError::TooLong(33))
    );
    track.change_name("Streamers").unwrap();
    assert_eq!(track.name().as_str(), "Streamers");
    assert!(WipeTrack::new("bad\nname").is_err());
}
