#![doc = r#"
Conversions between timecode, ticks and samples

Every cue document is laid out on a fixed musical grid: 9600 ticks per quarter note
at 120 BPM, which is 19 200 ticks per second. At 24 fps that is exactly 800 ticks per
frame, at 25 fps 768, at 30 fps 640.

The NTSC rates (23.976 and 29.97) label frames at the nominal 24 or 30 fps, but
each real frame lasts 1001/1000 as long. Tick positions for those rates are
stretched by 1.001 so the MIDI file stays on wall-clock time.
"#]

use core::fmt;

use crate::prelude::*;

/// Ticks per quarter note written to every file
pub const PPQ: u16 = 9600;

/// Tempo written to every file, in microseconds per quarter note (120 BPM)
pub const DEFAULT_TEMPO: Tempo = Tempo::new(500_000);

const PULLDOWN: f64 = 1.001;

/// A fixed tempo, in microseconds per quarter note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tempo(u32);

impl Tempo {
    /// Create a tempo from microseconds per quarter note.
    ///
    /// Only the low 24 bits can be written to a file.
    pub const fn new(micros_per_quarter_note: u32) -> Self {
        Self(micros_per_quarter_note)
    }

    /// Microseconds per quarter note
    pub const fn micros_per_quarter_note(&self) -> u32 {
        self.0
    }

    /// Quarter notes per minute
    pub fn bpm(&self) -> f64 {
        60_000_000. / self.0 as f64
    }

    /// The 3-byte big-endian payload of a tempo meta event
    pub const fn to_bytes(&self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }
}

#[doc = r#"
A point in time in any of the forms callers use to place events.

Resolved once, against a [`TimeBase`], into a [`Timecode`] at the document rate.

```rust
# use cuewipe::prelude::*;
let base = TimeBase::new(FrameRate::TwentyFour, 48_000.);

let from_clock = base.resolve("00:00:01:00".into()).unwrap();
let from_frames = base.resolve(24u32.into()).unwrap();
let from_ticks = base.resolve(TimeSpec::Ticks(19_200)).unwrap();

assert_eq!(from_clock, from_frames);
assert_eq!(from_clock, from_ticks);
```
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSpec {
    /// An already built timecode; its rate must match the document.
    Timecode(Timecode),
    /// A clock string, `HH:MM:SS:FF` or `HH:MM:SS;FF`
    Clock(String),
    /// An absolute frame count
    Frames(u32),
    /// An absolute tick position, rounded to the nearest frame
    Ticks(u64),
}

impl From<Timecode> for TimeSpec {
    fn from(value: Timecode) -> Self {
        Self::Timecode(value)
    }
}

impl From<&str> for TimeSpec {
    fn from(value: &str) -> Self {
        Self::Clock(value.to_owned())
    }
}

impl From<String> for TimeSpec {
    fn from(value: String) -> Self {
        Self::Clock(value)
    }
}

impl From<u32> for TimeSpec {
    fn from(value: u32) -> Self {
        Self::Frames(value)
    }
}

/// The fixed grid of a document: tick resolution, tempo, frame rate and sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBase {
    ppq: u16,
    tempo: Tempo,
    frame_rate: FrameRate,
    sample_rate: f64,
}

impl TimeBase {
    /// Create a time base at [`PPQ`] and [`DEFAULT_TEMPO`].
    ///
    /// `sample_rate` is in Hz and should be positive.
    pub const fn new(frame_rate: FrameRate, sample_rate: f64) -> Self {
        Self {
            ppq: PPQ,
            tempo: DEFAULT_TEMPO,
            frame_rate,
            sample_rate,
        }
    }

    /// Ticks per quarter note
    pub const fn ppq(&self) -> u16 {
        self.ppq
    }

    /// The file tempo
    pub const fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// The document frame rate
    pub const fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Samples per second
    pub const fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Ticks per second of wall time: `ppq * (1_000_000 / tempo)`
    pub const fn ticks_per_second(&self) -> u64 {
        self.ppq as u64 * (1_000_000 / self.tempo.micros_per_quarter_note() as u64)
    }

    /// Ticks per nominal frame
    pub fn ticks_per_frame(&self) -> f64 {
        self.ticks_per_second() as f64 / self.frame_rate.nominal() as f64
    }

    /// Convert a tick position to the nearest sample.
    pub fn ticks_to_samples(&self, ticks: u64) -> u64 {
        round(ticks as f64 * self.sample_rate / self.ticks_per_second() as f64)
    }

    /// Convert a sample position to the nearest tick.
    pub fn samples_to_ticks(&self, samples: u64) -> u64 {
        round(samples as f64 * self.ticks_per_second() as f64 / self.sample_rate)
    }

    /// Tick position of `tc`.
    ///
    /// Whole ticks per frame times the frame count, stretched by 1.001 for NTSC
    /// rates.
    ///
    /// # Errors
    /// [`TimecodeError::FrameRateMismatch`] if `tc` is not at the document rate.
    pub fn timecode_to_ticks(&self, tc: &Timecode) -> Result<u64, TimecodeError> {
        self.check_rate(tc)?;
        let ticks = self.ticks_per_frame().floor() as u64 * tc.frame_count() as u64;
        if self.frame_rate.is_pulldown() {
            return Ok(round(ticks as f64 * PULLDOWN));
        }
        Ok(ticks)
    }

    /// The timecode nearest to a tick position, at the document rate.
    ///
    /// # Errors
    /// [`TimecodeError::FrameOverflow`] if the frame count does not fit in 32 bits.
    pub fn ticks_to_timecode(&self, ticks: u64) -> Result<Timecode, TimecodeError> {
        let frames = round(ticks as f64 / self.ticks_per_frame());
        let frames = u32::try_from(frames).map_err(|_| TimecodeError::FrameOverflow(frames))?;
        Ok(Timecode::from_frames(frames, self.frame_rate))
    }

    /// Encode `start` as the payload of a SMPTE offset meta event.
    pub fn smpte_offset(&self, start: &Timecode) -> Result<SmpteOffset, SmpteError> {
        self.check_rate(start)?;
        SmpteOffset::from_timecode(start)
    }

    /// Resolve a [`TimeSpec`] into a timecode at the document rate.
    pub fn resolve(&self, spec: TimeSpec) -> Result<Timecode, TimecodeError> {
        match spec {
            TimeSpec::Timecode(tc) => {
                self.check_rate(&tc)?;
                Ok(tc)
            }
            TimeSpec::Clock(clock) => Timecode::parse(&clock, self.frame_rate),
            TimeSpec::Frames(frames) => Ok(Timecode::from_frames(frames, self.frame_rate)),
            TimeSpec::Ticks(ticks) => self.ticks_to_timecode(ticks),
        }
    }

    fn check_rate(&self, tc: &Timecode) -> Result<(), TimecodeError> {
        if tc.rate() != self.frame_rate {
            return Err(TimecodeError::FrameRateMismatch {
                expected: self.frame_rate,
                found: tc.rate(),
            });
        }
        Ok(())
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        let config = DocumentConfig::default();
        Self::new(config.frame_rate, config.sample_rate)
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ppq @ {} BPM, {} fps, {} Hz",
            self.ppq,
            self.tempo.bpm(),
            self.frame_rate,
            self.sample_rate
        )
    }
}

/// Round half to even, saturating into `u64`.
fn round(value: f64) -> u64 {
    value.round_ties_even() as u64
}

#[test]
fn grid_constants() {
    use pretty_assertions::assert_eq;

    let base = TimeBase::new(FrameRate::TwentyFour, 48_000.);
    assert_eq!(base.ticks_per_second(), 19_200);
    assert_eq!(base.ticks_per_frame(), 800.);
    assert_eq!(DEFAULT_TEMPO.to_bytes(), [0x07, 0xA1, 0x20]);
    assert_eq!(DEFAULT_TEMPO.bpm(), 120.);

    assert_eq!(TimeBase::new(FrameRate::TwentyFive, 48_000.).ticks_per_frame(), 768.);
    assert_eq!(TimeBase::new(FrameRate::Thirty, 48_000.).ticks_per_frame(), 640.);
}

#[test]
fn timecode_to_ticks_whole_rates() {
    use pretty_assertions::assert_eq;

    let base = TimeBase::new(FrameRate::TwentyFour, 48_000.);
    let tc = Timecode::parse("00:00:01:00", FrameRate::TwentyFour).unwrap();
    assert_eq!(base.timecode_to_ticks(&tc).unwrap(), 19_200);

    let base = TimeBase::new(FrameRate::TwentyFive, 48_000.);
    let tc = Timecode::from_frames(3, FrameRate::TwentyFive);
    assert_eq!(base.timecode_to_ticks(&tc).unwrap(), 3 * 768);
}

#[test]
fn timecode_to_ticks_pulls_down_ntsc() {
    use pretty_assertions::assert_eq;

    let base = TimeBase::new(FrameRate::TwentyThree, 48_000.);
    let one_second = Timecode::from_frames(24, FrameRate::TwentyThree);
    assert_eq!(base.timecode_to_ticks(&one_second).unwrap(), 19_219);

    let base = TimeBase::new(FrameRate::TwentyNineDrop, 48_000.);
    let minute = Timecode::from_frames(1_000, FrameRate::TwentyNineDrop);
    assert_eq!(base.timecode_to_ticks(&minute).unwrap(), 640_640);

    // 800 * 1.001 = 800.8
    let base = TimeBase::new(FrameRate::TwentyThree, 48_000.);
    let frame = Timecode::from_frames(1, FrameRate::TwentyThree);
    assert_eq!(base.timecode_to_ticks(&frame).unwrap(), 801);
}

#[test]
fn timecode_to_ticks_checks_rate() {
    use pretty_assertions::assert_eq;

    let base = TimeBase::new(FrameRate::TwentyFour, 48_000.);
    let tc = Timecode::from_frames(10, FrameRate::TwentyFive);
    assert_eq!(
        base.timecode_to_ticks(&tc),
        Err(TimecodeError::FrameRateMismatch {
            expected: FrameRate::TwentyFour,
            found: FrameRate::TwentyFive,
        })
    );
}

#[test]
fn ticks_and_samples() {
    use pretty_assertions::assert_eq;

    let base = TimeBase::new(FrameRate::TwentyFour, 48_000.);
    assert_eq!(base.ticks_to_samples(19_200), 48_000);
    assert_eq!(base.samples_to_ticks(48_000), 19_200);
    // 2.5 samples per tick, ties go to even
    assert_eq!(base.ticks_to_samples(5), 12);
    assert_eq!(base.ticks_to_samples(3), 8);
    assert_eq!(base.samples_to_ticks(1), 0);

    assert_eq!(base.ticks_to_timecode(19_200).unwrap().frame_count(), 24);
    // 400 ticks is half a frame, ties go to even
    assert_eq!(base.ticks_to_timecode(400).unwrap().frame_count(), 0);
    assert_eq!(base.ticks_to_timecode(1_200).unwrap().frame_count(), 2);
}

#[test]
fn tick_positions_past_the_last_frame_are_rejected() {
    use pretty_assertions::assert_eq;

    let base = TimeBase::new(FrameRate::TwentyFour, 48_000.);
    let last = u32::MAX as u64 * 800;
    assert_eq!(
        base.resolve(TimeSpec::Ticks(last)).unwrap().frame_count(),
        u32::MAX
    );
    assert_eq!(
        base.resolve(TimeSpec::Ticks(1 << 45)),
        Err(TimecodeError::FrameOverflow((1 << 45) / 800))
    );
    assert!(matches!(
        base.resolve(TimeSpec::Ticks(u64::MAX)),
        Err(TimecodeError::FrameOverflow(_))
    ));
}
