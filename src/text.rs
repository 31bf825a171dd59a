use core::fmt;

use crate::TextError;

#[doc = r#"
Text carried by a marker or track name meta event.

Only printable ASCII (`0x20..=0x7E`) is accepted, at most [`MidiText::MAX_LEN`]
characters. Every character is therefore exactly one byte in the file.
"#]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MidiText(String);

impl MidiText {
    /// Longest text a marker or track name may hold
    pub const MAX_LEN: usize = 32;

    /// Validate `text`. Empty text is allowed.
    pub fn new(text: impl Into<String>) -> Result<Self, TextError> {
        let text = text.into();
        if let Some((position, character)) = text
            .chars()
            .enumerate()
            .find(|(_, c)| !is_printable(*c))
        {
            return Err(TextError::IllegalCharacter {
                character,
                position,
            });
        }
        // all ascii from here, so bytes == chars
        if text.len() > Self::MAX_LEN {
            return Err(TextError::TooLong(text.len()));
        }
        Ok(Self(text))
    }

    /// Validate `text`, additionally rejecting the empty string.
    pub fn non_empty(text: impl Into<String>) -> Result<Self, TextError> {
        let text = Self::new(text)?;
        if text.0.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(text)
    }

    /// The text as written to the file
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// True for characters that may appear in marker text and track names.
pub const fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~')
}

impl fmt::Display for MidiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MidiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl TryFrom<&str> for MidiText {
    type Error = TextError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[test]
fn accepts_printable_ascii_up_to_limit() {
    let text = MidiText::new("~ Scene 12, take 3 ~").unwrap();
    assert_eq!(text.as_bytes(), b"~ Scene 12, take 3 ~");

    let longest = "x".repeat(32);
    assert!(MidiText::new(longest.as_str()).is_ok());
}

#[test]
fn rejects_long_and_unprintable_text() {
    use pretty_assertions::assert_eq;

    assert_eq!(MidiText::new("x".repeat(33)), Err(TextError::TooLong(33)));
    assert_eq!(
        MidiText::new("Cue\t1"),
        Err(TextError::IllegalCharacter {
            character: '\t',
            position: 3
        })
    );
    assert_eq!(
        MidiText::new("Café"),
        Err(TextError::IllegalCharacter {
            character: 'é',
            position: 3
        })
    );
    assert_eq!(
        MidiText::new("\u{7F}"),
        Err(TextError::IllegalCharacter {
            character: '\u{7F}',
            position: 0
        })
    );
    assert_eq!(MidiText::non_empty(""), Err(TextError::Empty));
}
