#![doc = r#"
SMPTE timecode values

A [`Timecode`] is an absolute frame count (frame `0` is `00:00:00:00`) at a known
[`FrameRate`]. Clock strings use `:` before the frame field, or `;` for drop-frame
rates.

# Drop frame

29.97 fps video runs slightly slower than its nominal 30 fps. Drop-frame timecode
keeps the clock display aligned with wall time by skipping frame numbers `00` and
`01` at the start of every minute, except for every tenth minute. No frames are
actually removed; only their labels are.
"#]

use core::{fmt, str::FromStr};
use std::sync::LazyLock;

use regex::Regex;

use crate::TimecodeError;

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})([:;])([0-9]{2})$").expect("clock pattern compiles")
});

/// True if `clock` has the shape `HH:MM:SS:FF` or `HH:MM:SS;FF`.
pub fn is_clock_string(clock: &str) -> bool {
    CLOCK.is_match(clock)
}

/// Frame rates a cue document can be laid out at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum FrameRate {
    /// 23.976 fps (24000/1001), film pulled down for NTSC
    #[default]
    TwentyThree,
    /// 24 fps film
    TwentyFour,
    /// 25 fps PAL/SECAM
    TwentyFive,
    /// 29.97 fps (30000/1001) with drop-frame labelling
    TwentyNineDrop,
    /// 29.97 fps (30000/1001) with non-drop labelling
    TwentyNine,
    /// 30 fps
    Thirty,
}

impl FrameRate {
    /// All supported rates
    pub const ALL: [FrameRate; 6] = [
        Self::TwentyThree,
        Self::TwentyFour,
        Self::TwentyFive,
        Self::TwentyNineDrop,
        Self::TwentyNine,
        Self::Thirty,
    ];

    /// Frames per labelled second. 23.976 counts 24 frames, 29.97 counts 30.
    pub const fn nominal(&self) -> u32 {
        match self {
            Self::TwentyThree | Self::TwentyFour => 24,
            Self::TwentyFive => 25,
            Self::TwentyNineDrop | Self::TwentyNine | Self::Thirty => 30,
        }
    }

    /// The real frame rate.
    pub const fn as_f64(&self) -> f64 {
        match self {
            Self::TwentyThree => 24_000. / 1001.,
            Self::TwentyFour => 24.,
            Self::TwentyFive => 25.,
            Self::TwentyNineDrop | Self::TwentyNine => 30_000. / 1001.,
            Self::Thirty => 30.,
        }
    }

    /// True for the NTSC rates that run 1000/1001 slower than nominal.
    pub const fn is_pulldown(&self) -> bool {
        matches!(
            self,
            Self::TwentyThree | Self::TwentyNineDrop | Self::TwentyNine
        )
    }

    /// True if frame labels are dropped to keep the clock on wall time.
    pub const fn is_drop_frame(&self) -> bool {
        matches!(self, Self::TwentyNineDrop)
    }

    /// Name used in configuration and display
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TwentyThree => "23.976",
            Self::TwentyFour => "24",
            Self::TwentyFive => "25",
            Self::TwentyNineDrop => "29.97 drop",
            Self::TwentyNine => "29.97 non-drop",
            Self::Thirty => "30",
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameRate {
    type Err = TimecodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = match s.trim() {
            "23.976" | "23.98" => Self::TwentyThree,
            "24" => Self::TwentyFour,
            "25" => Self::TwentyFive,
            "29.97 drop" | "29.97df" => Self::TwentyNineDrop,
            "29.97" | "29.97 non-drop" | "29.97ndf" => Self::TwentyNine,
            "30" | "30 non-drop" => Self::Thirty,
            other => return Err(TimecodeError::UnknownFrameRate(other.to_owned())),
        };
        Ok(rate)
    }
}

impl TryFrom<String> for FrameRate {
    type Error = TimecodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameRate> for String {
    fn from(rate: FrameRate) -> Self {
        rate.name().to_owned()
    }
}

/// Frames in ten drop-frame minutes (one full minute, nine short ones)
const DF_FRAMES_PER_TEN_MINUTES: u32 = 17_982;
/// Frames in a drop-frame minute that skips two labels
const DF_FRAMES_PER_MINUTE: u32 = 1_798;

/// Hours, minutes, seconds and frames of a clock display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockParts {
    /// Hours, not wrapped at 24
    pub hours: u32,
    /// Minutes (0-59)
    pub minutes: u32,
    /// Seconds (0-59)
    pub seconds: u32,
    /// Frame within the second
    pub frames: u32,
}

#[doc = r#"
A position on the timeline, counted in frames.

```rust
# use cuewipe::prelude::*;
let tc = Timecode::parse("00:00:01:00", FrameRate::TwentyFour).unwrap();
assert_eq!(tc.frame_count(), 24);
assert_eq!(tc.to_string(), "00:00:01:00");
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode {
    frames: u32,
    rate: FrameRate,
}

impl Timecode {
    /// A timecode `frames` frames after `00:00:00:00`.
    pub const fn from_frames(frames: u32, rate: FrameRate) -> Self {
        Self { frames, rate }
    }

    /// `00:00:00:00` at `rate`
    pub const fn zero(rate: FrameRate) -> Self {
        Self::from_frames(0, rate)
    }

    /// Parse a clock string such as `01:00:00:00` or `01:00:00;02`.
    ///
    /// # Errors
    /// - [`TimecodeError::Format`] if the string is not of the form `HH:MM:SS[:;]FF`
    /// - [`TimecodeError::Component`] if a field is out of range for `rate`, including
    ///   labels skipped by drop-frame counting
    pub fn parse(clock: &str, rate: FrameRate) -> Result<Self, TimecodeError> {
        let caps = CLOCK
            .captures(clock)
            .ok_or_else(|| TimecodeError::Format(clock.to_owned()))?;
        let field = |i: usize| {
            caps[i]
                .parse::<u32>()
                .map_err(|_| TimecodeError::Format(clock.to_owned()))
        };
        let parts = ClockParts {
            hours: field(1)?,
            minutes: field(2)?,
            seconds: field(3)?,
            frames: field(5)?,
        };

        let out_of_range = parts.minutes > 59 || parts.seconds > 59 || parts.frames >= rate.nominal();
        let dropped_label =
            rate.is_drop_frame() && parts.seconds == 0 && parts.frames < 2 && parts.minutes % 10 != 0;
        if out_of_range || dropped_label {
            return Err(TimecodeError::Component(clock.to_owned()));
        }
        Ok(Self::from_parts(parts, rate))
    }

    fn from_parts(parts: ClockParts, rate: FrameRate) -> Self {
        let nominal = rate.nominal();
        let seconds = parts.hours * 3600 + parts.minutes * 60 + parts.seconds;
        let mut frames = seconds * nominal + parts.frames;
        if rate.is_drop_frame() {
            let minutes = parts.hours * 60 + parts.minutes;
            frames -= 2 * (minutes - minutes / 10);
        }
        Self::from_frames(frames, rate)
    }

    /// Absolute frame count since `00:00:00:00`
    pub const fn frame_count(&self) -> u32 {
        self.frames
    }

    /// The frame rate this timecode counts in
    pub const fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Split the frame count into its clock display.
    pub fn parts(&self) -> ClockParts {
        let nominal = self.rate.nominal();
        let mut frames = self.frames;
        if self.rate.is_drop_frame() {
            let tens = frames / DF_FRAMES_PER_TEN_MINUTES;
            let rest = frames % DF_FRAMES_PER_TEN_MINUTES;
            let skipped = if rest < 2 {
                18 * tens
            } else {
                18 * tens + 2 * ((rest - 2) / DF_FRAMES_PER_MINUTE)
            };
            frames += skipped;
        }
        let seconds = frames / nominal;
        ClockParts {
            hours: seconds / 3600,
            minutes: seconds / 60 % 60,
            seconds: seconds % 60,
            frames: frames % nominal,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.parts();
        let sep = if self.rate.is_drop_frame() { ';' } else { ':' };
        write!(
            f,
            "{:02}:{:02}:{:02}{sep}{:02}",
            p.hours, p.minutes, p.seconds, p.frames
        )
    }
}

#[test]
fn parses_non_drop_clocks() {
    use pretty_assertions::assert_eq;

    let tc = Timecode::parse("01:02:03:04", FrameRate::TwentyFive).unwrap();
    assert_eq!(tc.frame_count(), (3600 + 120 + 3) * 25 + 4);
    assert_eq!(tc.to_string(), "01:02:03:04");

    let tc = Timecode::parse("00:00:00:12", FrameRate::TwentyFour).unwrap();
    assert_eq!(tc.frame_count(), 12);
}

#[test]
fn drop_frame_skips_labels() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyNineDrop;
    let before = Timecode::parse("00:00:59;29", rate).unwrap();
    let after = Timecode::parse("00:01:00;02", rate).unwrap();
    assert_eq!(after.frame_count(), before.frame_count() + 1);
    assert_eq!(after.to_string(), "00:01:00;02");

    let tenth = Timecode::parse("00:10:00;00", rate).unwrap();
    assert_eq!(tenth.frame_count(), 17_982);
    assert_eq!(tenth.to_string(), "00:10:00;00");

    let hour = Timecode::parse("01:00:00;00", rate).unwrap();
    assert_eq!(hour.frame_count(), 107_892);
    assert_eq!(hour.to_string(), "01:00:00;00");

    assert_eq!(
        Timecode::parse("00:01:00;00", rate),
        Err(TimecodeError::Component("00:01:00;00".to_owned()))
    );
}

#[test]
fn rejects_malformed_clocks() {
    use pretty_assertions::assert_eq;

    for clock in ["1:00:00:00", "00:00:00.00", "00:00:00:00:00", "aa:bb:cc:dd", ""] {
        assert_eq!(
            Timecode::parse(clock, FrameRate::TwentyFour),
            Err(TimecodeError::Format(clock.to_owned()))
        );
    }
    // digits outside ASCII
    for clock in ["\u{660}\u{661}:00:00:00", "00:00:0\u{665}:00"] {
        assert_eq!(
            Timecode::parse(clock, FrameRate::TwentyFour),
            Err(TimecodeError::Format(clock.to_owned()))
        );
    }
    assert_eq!(
        Timecode::parse("00:00:00:24", FrameRate::TwentyFour),
        Err(TimecodeError::Component("00:00:00:24".to_owned()))
    );
}

#[test]
fn frame_rate_names_round_trip() {
    use pretty_assertions::assert_eq;

    for rate in FrameRate::ALL {
        assert_eq!(rate.name().parse::<FrameRate>().unwrap(), rate);
    }
    assert!("59.94".parse::<FrameRate>().is_err());
}
