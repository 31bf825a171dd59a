#![doc = r#"
Errors produced while building and rendering a cue document.

Each concern owns a small error type ([`VlqError`], [`NoteError`], [`TextError`],
[`TimecodeError`], [`SmpteError`]). They all convert into the crate-wide [`Error`]
so the `?` operator works across module boundaries.
"#]

use thiserror::Error;

use crate::prelude::*;

/// Errors from the variable-length quantity codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VlqError {
    /// The value does not fit in 32 bits
    #[error("Variable-length value {0} is larger than {max}", max = u32::MAX)]
    OutOfRange(u64),
    /// No byte with a cleared top bit was found
    #[error("Variable-length value is not terminated")]
    Unterminated,
    /// The encoded digits overflow 32 bits
    #[error("Variable-length value overflows 32 bits")]
    Overflow,
    /// Bytes follow the terminating byte of a single value
    #[error("{0} bytes follow the end of the variable-length value")]
    TrailingBytes(usize),
}

/// Errors when resolving a wipe note
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    /// A numeric note outside of the representable table
    #[error("Bad value given for midi note: {value}. Expected a number between {min} and {max}")]
    OutOfRange {
        /// The offending value
        value: i64,
        /// Lowest accepted value
        min: u8,
        /// Highest accepted value
        max: u8,
    },
    /// A note name missing from the note table
    #[error("Unknown note name {0:?}")]
    UnknownName(String),
}

/// Errors for marker text and track names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// More than [`MidiText::MAX_LEN`] characters
    #[error("Text is {0} characters long, at most {max} are allowed", max = MidiText::MAX_LEN)]
    TooLong(usize),
    /// A character outside of printable ASCII
    #[error("Illegal character {character:?} at position {position}")]
    IllegalCharacter {
        /// The offending character
        character: char,
        /// Its index in the text
        position: usize,
    },
    /// Marker text must not be empty
    #[error("Marker text is empty")]
    Empty,
}

/// Errors from timecode parsing and conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    /// Not of the form `HH:MM:SS:FF` or `HH:MM:SS;FF`
    #[error("Timecode {0:?} is not in the expected format HH:MM:SS:FF or HH:MM:SS;FF")]
    Format(String),
    /// A component is out of range for the frame rate
    #[error("Timecode {0:?} has a component out of range")]
    Component(String),
    /// A position past the last frame a timecode can count
    #[error("Position of {0} frames is past the end of the timeline")]
    FrameOverflow(u64),
    /// Frame rate names that are not supported
    #[error("Unknown frame rate {0:?}")]
    UnknownFrameRate(String),
    /// A timecode at a different rate than the document
    #[error("Frame rate of timecode ({found}) does not match frame rate of the document ({expected})")]
    FrameRateMismatch {
        /// The document rate
        expected: FrameRate,
        /// The rate of the timecode that was passed in
        found: FrameRate,
    },
}

/// Errors while encoding a SMPTE offset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmpteError {
    /// The hour does not fit the 0-23 range of the offset byte
    #[error("SMPTE offset hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),
    /// The start timecode did not format cleanly
    #[error(transparent)]
    Timecode(#[from] TimecodeError),
}

/// The crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// See [`VlqError`]
    #[error("Encoding {0}")]
    Vlq(#[from] VlqError),
    /// See [`NoteError`]
    #[error("Note {0}")]
    Note(#[from] NoteError),
    /// See [`TextError`]
    #[error("Validating {0}")]
    Text(#[from] TextError),
    /// See [`TimecodeError`]
    #[error("Timecode {0}")]
    Timecode(#[from] TimecodeError),
    /// See [`SmpteError`]
    #[error("SMPTE offset {0}")]
    Smpte(#[from] SmpteError),
    /// An event positioned before the start timecode
    #[error("{kind} at {at} found before start timecode {start}")]
    BeforeStart {
        /// What kind of event was misplaced
        kind: &'static str,
        /// Where the event sits
        at: Timecode,
        /// The document start
        start: Timecode,
    },
    /// A wipe starts before the previous wipe has ended
    #[error("Wipe at {at} overlaps the previous wipe by {overlap} ticks")]
    Overlap {
        /// The late wipe
        at: Timecode,
        /// How far the previous note-off reaches past this note-on
        overlap: u64,
    },
    /// A sample rate that is not a positive finite number
    #[error("Sample rate {0} Hz is not a positive number")]
    SampleRate(f64),
    /// More tracks than the header can count
    #[error("{0} tracks do not fit in a MIDI header")]
    TooManyTracks(usize),
    /// Failure of the output sink
    #[error("Writing {0}")]
    Io(#[from] std::io::Error),
}

/// Categories callers can branch on without matching every variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An integer or note value is out of bounds
    Range,
    /// A note name is not in the table
    UnknownNote,
    /// Illegal characters or an over-long name
    Validation,
    /// An event precedes the start timecode
    Ordering,
    /// A timecode frame rate differs from the document's
    FrameRateMismatch,
    /// A malformed timecode string
    Format,
    /// Overlapping wipe durations
    Scheduling,
    /// The output sink failed
    Io,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Vlq(VlqError::OutOfRange(_) | VlqError::Overflow) => ErrorKind::Range,
            Self::Vlq(VlqError::Unterminated | VlqError::TrailingBytes(_)) => ErrorKind::Format,
            Self::Note(NoteError::OutOfRange { .. }) => ErrorKind::Range,
            Self::Note(NoteError::UnknownName(_)) => ErrorKind::UnknownNote,
            Self::Text(_) => ErrorKind::Validation,
            Self::Timecode(e) | Self::Smpte(SmpteError::Timecode(e)) => e.kind(),
            Self::Smpte(SmpteError::HourOutOfRange(_)) => ErrorKind::Range,
            Self::BeforeStart { .. } => ErrorKind::Ordering,
            Self::Overlap { .. } => ErrorKind::Scheduling,
            Self::SampleRate(_) | Self::TooManyTracks(_) => ErrorKind::Range,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl TimecodeError {
    const fn kind(&self) -> ErrorKind {
        match self {
            Self::FrameRateMismatch { .. } => ErrorKind::FrameRateMismatch,
            Self::Component(_) | Self::FrameOverflow(_) => ErrorKind::Range,
            Self::Format(_) | Self::UnknownFrameRate(_) => ErrorKind::Format,
        }
    }
}

/// Result type with the crate [`Error`]
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[test]
fn kinds_follow_the_inner_error() {
    use pretty_assertions::assert_eq;

    let err: Error = VlqError::OutOfRange(1 << 32).into();
    assert_eq!(err.kind(), ErrorKind::Range);

    let err: Error = NoteError::UnknownName("H2".into()).into();
    assert_eq!(err.kind(), ErrorKind::UnknownNote);

    let err: Error = SmpteError::from(TimecodeError::Format("1:2:3".into())).into();
    assert_eq!(err.kind(), ErrorKind::Format);

    let err: Error = TextError::TooLong(40).into();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err: Error = TimecodeError::FrameOverflow(1 << 40).into();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(Error::SampleRate(0.).kind(), ErrorKind::Range);
}
