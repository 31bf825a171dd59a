#![doc = r#"
SMPTE Offset - where the timeline of a cue file begins

The SMPTE offset meta event (`FF 54 05 hr mn se fr ff`) tells a sequencer which
timecode tick `0` of the file corresponds to. In a format 1 file it lives in the
first track, with the tempo map, before any non-zero delta time.

# Format

- Byte 0: `0rrhhhhh` where `rr` is the frame rate code and `hhhhh` the hour
- Byte 1: Minutes (0-59)
- Byte 2: Seconds (0-59)
- Byte 3: Frames
- Byte 4: Fractional frames in 100ths. Cue files always write `0`.

# Frame rate codes

| code | rate |
|------|------|
| `00` | 24 fps (23.976 is written as 24) |
| `01` | 25 fps |
| `10` | 30 fps drop frame (29.97 drop) |
| `11` | 30 fps non-drop (30, 29.97 non-drop) |
"#]

use num_enum::IntoPrimitive;

use crate::{SmpteError, TimecodeError, prelude::*, timecode::is_clock_string};

/// Frame rate codes understood by the SMPTE offset meta event
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum SmpteRate {
    /// 24 frames per second
    TwentyFour = 0b00,
    /// 25 frames per second
    TwentyFive = 0b01,
    /// 30 frames per second, drop-frame labelling
    ThirtyDrop = 0b10,
    /// 30 frames per second, non-drop labelling
    Thirty = 0b11,
}

impl From<FrameRate> for SmpteRate {
    fn from(rate: FrameRate) -> Self {
        match rate {
            FrameRate::TwentyThree | FrameRate::TwentyFour => Self::TwentyFour,
            FrameRate::TwentyFive => Self::TwentyFive,
            FrameRate::TwentyNineDrop => Self::ThirtyDrop,
            FrameRate::TwentyNine | FrameRate::Thirty => Self::Thirty,
        }
    }
}

/// The payload of a SMPTE offset meta event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SmpteOffset {
    /// Frame rate code
    pub rate: SmpteRate,
    /// Hour component of the time code (0-23).
    pub hour: u8,
    /// Minute component of the time code (0-59).
    pub minute: u8,
    /// Second component of the time code (0-59).
    pub second: u8,
    /// Frame number within the current second.
    pub frame: u8,
    /// Fractional frames, in 100ths
    pub subframe: u8,
}

impl SmpteOffset {
    /// Build the offset from a start timecode.
    ///
    /// The timecode is formatted as a clock string and its fields are read back from
    /// it, so the offset always matches what the timecode displays.
    ///
    /// # Errors
    /// - [`TimecodeError::Format`] if the clock display is not `HH:MM:SS[:;]FF`
    /// - [`SmpteError::HourOutOfRange`] if the hour is past 23
    pub fn from_timecode(start: &Timecode) -> Result<Self, SmpteError> {
        let clock = start.to_string();
        if !is_clock_string(&clock) {
            return Err(TimecodeError::Format(clock).into());
        }
        let parts = start.parts();
        if parts.hours > 23 {
            return Err(SmpteError::HourOutOfRange(parts.hours));
        }
        Ok(Self {
            rate: start.rate().into(),
            hour: parts.hours as u8,
            minute: parts.minutes as u8,
            second: parts.seconds as u8,
            frame: parts.frames as u8,
            subframe: 0,
        })
    }

    /// The five payload bytes, rate code and hour packed into the first.
    pub fn to_bytes(&self) -> [u8; 5] {
        let rate: u8 = self.rate.into();
        [
            (rate << 5) | (self.hour & 0b0001_1111),
            self.minute,
            self.second,
            self.frame,
            self.subframe,
        ]
    }
}

#[test]
fn packs_rate_and_hour() {
    use pretty_assertions::assert_eq;

    let start = Timecode::parse("01:02:03:04", FrameRate::TwentyFive).unwrap();
    let offset = SmpteOffset::from_timecode(&start).unwrap();
    assert_eq!(offset.to_bytes(), [0b001_00001, 2, 3, 4, 0]);
}

#[test]
fn maps_ntsc_rates_to_codes() {
    use pretty_assertions::assert_eq;

    let code = |rate: FrameRate| {
        let start = Timecode::parse("23:59:59:00", rate).unwrap();
        SmpteOffset::from_timecode(&start).unwrap().to_bytes()[0]
    };
    assert_eq!(code(FrameRate::TwentyThree), 0b000_10111);
    assert_eq!(code(FrameRate::TwentyFour), 0b000_10111);
    assert_eq!(code(FrameRate::TwentyFive), 0b001_10111);
    assert_eq!(code(FrameRate::TwentyNineDrop), 0b010_10111);
    assert_eq!(code(FrameRate::TwentyNine), 0b011_10111);
    assert_eq!(code(FrameRate::Thirty), 0b011_10111);
}

#[test]
fn drop_frame_offset_uses_display_fields() {
    use pretty_assertions::assert_eq;

    let start = Timecode::parse("10:01:00;02", FrameRate::TwentyNineDrop).unwrap();
    let offset = SmpteOffset::from_timecode(&start).unwrap();
    assert_eq!(offset.to_bytes(), [0b010_01010, 1, 0, 2, 0]);
}

#[test]
fn rejects_hours_past_a_day() {
    use pretty_assertions::assert_eq;

    let start = Timecode::parse("24:00:00:00", FrameRate::TwentyFour).unwrap();
    assert_eq!(
        SmpteOffset::from_timecode(&start),
        Err(SmpteError::HourOutOfRange(24))
    );

    // more hours than two digits can show
    let start = Timecode::from_frames(24 * 3600 * 100, FrameRate::TwentyFour);
    assert_eq!(
        SmpteOffset::from_timecode(&start),
        Err(SmpteError::Timecode(TimecodeError::Format(
            "100:00:00:00".to_owned()
        )))
    );
}
