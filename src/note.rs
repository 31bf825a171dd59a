use core::fmt;
use std::{collections::HashMap, str::FromStr, sync::LazyLock};

use crate::NoteError;

#[doc = r#"
Names of every note a wipe can be triggered with, lowest first.

Index `0` is `C0`, which is MIDI note `24`.
"#]
pub static NOTE_NAMES: [&str; 98] = [
    "C0", "C#0", "D0", "D#0", "E0", "F0", "F#0", "G0", "G#0", "A0", "A#0", "B0", //
    "C1", "C#1", "D1", "D#1", "E1", "F1", "F#1", "G1", "G#1", "A1", "A#1", "B1", //
    "C2", "C#2", "D2", "D#2", "E2", "F2", "F#2", "G2", "G#2", "A2", "A#2", "B2", //
    "C3", "C#3", "D3", "D#3", "E3", "F3", "F#3", "G3", "G#3", "A3", "A#3", "B3", //
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", //
    "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5", "A5", "A#5", "B5", //
    "C6", "C#6", "D6", "D#6", "E6", "F6", "F#6", "G6", "G#6", "A6", "A#6", "B6", //
    "C7", "C#7", "D7", "D#7", "E7", "F7", "F#7", "G7", "G#7", "A7", "A#7", "B7", //
    "C8", "C#8",
];

static NOTE_VALUES: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    NOTE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i as u8 + WipeNote::MIN))
        .collect()
});

/// Look up the MIDI value of a note name.
pub fn name_to_value(name: &str) -> Result<u8, NoteError> {
    NOTE_VALUES
        .get(name)
        .copied()
        .ok_or_else(|| NoteError::UnknownName(name.to_owned()))
}

/// Look up the name of a MIDI note value.
pub fn value_to_name(value: u8) -> Result<&'static str, NoteError> {
    WipeNote::try_from(value).map(|n| n.name())
}

#[doc = r#"
The note a wipe is triggered with.

Only notes with a name in [`NOTE_NAMES`] are accepted, `C0` (24) through `C#8` (121).
A note can be built from either its value or its name:

```rust
# use cuewipe::prelude::*;
let by_value = WipeNote::new(64u8).unwrap();
let by_name = WipeNote::new("E3").unwrap();

assert_eq!(by_value, by_name);
assert_eq!(by_value.name(), "E3");
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct WipeNote(u8);

impl WipeNote {
    /// Lowest accepted note value
    pub const MIN: u8 = 24;
    /// Highest accepted note value
    pub const MAX: u8 = 121;
    /// The note wipes use unless told otherwise (E3)
    pub const DEFAULT: Self = Self(64);

    /// Create a note from anything that resolves to a note value.
    pub fn new<N>(note: N) -> Result<Self, NoteError>
    where
        N: TryInto<WipeNote, Error = NoteError>,
    {
        note.try_into()
    }

    /// The MIDI key byte
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// The name of the note, e.g. `"C#4"`
    pub fn name(&self) -> &'static str {
        NOTE_NAMES[(self.0 - Self::MIN) as usize]
    }

    fn out_of_range(value: i64) -> NoteError {
        NoteError::OutOfRange {
            value,
            min: Self::MIN,
            max: Self::MAX,
        }
    }
}

impl Default for WipeNote {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for WipeNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for WipeNote {
    type Error = NoteError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Self::out_of_range(value as i64))
        }
    }
}

macro_rules! note_from_int {
    ($($int:ty),*) => {$(
        impl TryFrom<$int> for WipeNote {
            type Error = NoteError;
            fn try_from(value: $int) -> Result<Self, Self::Error> {
                u8::try_from(value)
                    .map_err(|_| Self::out_of_range(i64::try_from(value).unwrap_or(i64::MAX)))
                    .and_then(Self::try_from)
            }
        }
    )*};
}

note_from_int!(i8, i16, i32, i64, isize, u16, u32, u64, usize);

impl TryFrom<&str> for WipeNote {
    type Error = NoteError;
    fn try_from(name: &str) -> Result<Self, Self::Error> {
        name_to_value(name).map(Self)
    }
}

impl TryFrom<String> for WipeNote {
    type Error = NoteError;
    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::try_from(name.as_str())
    }
}

impl FromStr for WipeNote {
    type Err = NoteError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl From<WipeNote> for u8 {
    fn from(note: WipeNote) -> Self {
        note.0
    }
}

#[test]
fn names_and_values_round_trip() {
    use pretty_assertions::assert_eq;

    for value in WipeNote::MIN..=WipeNote::MAX {
        let name = value_to_name(value).unwrap();
        assert_eq!(name_to_value(name).unwrap(), value);
    }
}

#[test]
fn table_edges() {
    use pretty_assertions::assert_eq;

    assert_eq!(value_to_name(24).unwrap(), "C0");
    assert_eq!(value_to_name(60).unwrap(), "C3");
    assert_eq!(value_to_name(121).unwrap(), "C#8");
    assert_eq!(name_to_value("C0").unwrap(), 24);
}

#[test]
fn rejects_values_outside_table() {
    use pretty_assertions::assert_eq;

    let expected = |value| NoteError::OutOfRange {
        value,
        min: 24,
        max: 121,
    };
    assert_eq!(value_to_name(23), Err(expected(23)));
    assert_eq!(value_to_name(122), Err(expected(122)));
    assert_eq!(WipeNote::new(-1i32), Err(expected(-1)));
    assert_eq!(WipeNote::new(300i32), Err(expected(300)));

    let message = expected(122).to_string();
    assert!(message.contains("24") && message.contains("121"));
}

#[test]
fn rejects_unknown_names() {
    use pretty_assertions::assert_eq;

    assert_eq!(
        WipeNote::new("H2"),
        Err(NoteError::UnknownName("H2".to_owned()))
    );
    assert_eq!(
        "Db3".parse::<WipeNote>(),
        Err(NoteError::UnknownName("Db3".to_owned()))
    );
}

#[test]
fn accepts_any_integer_width() {
    use pretty_assertions::assert_eq;

    assert_eq!(WipeNote::new(64i64).unwrap().name(), "E3");
    assert_eq!(WipeNote::new(64u32).unwrap().name(), "E3");
    assert_eq!(WipeNote::new(121usize).unwrap().name(), "C#8");
    assert_eq!(
        WipeNote::new(-5i64),
        Err(NoteError::OutOfRange {
            value: -5,
            min: 24,
            max: 121
        })
    );
    assert_eq!(
        WipeNote::new(u64::MAX),
        Err(NoteError::OutOfRange {
            value: i64::MAX,
            min: 24,
            max: 121
        })
    );
}
