#![doc = r#"
Variable-length quantities

Delta times and meta event lengths in a MIDI file are written as variable-length
quantities: big-endian groups of 7 bits, where every byte except the last has its
top bit set.

```text
0x00000000 -> 00
0x0000007F -> 7F
0x00000080 -> 81 00
0x00003FFF -> FF 7F
0x0FFFFFFF -> FF FF FF 7F
0xFFFFFFFF -> 8F FF FF FF 7F
```
"#]

use core::fmt;

use crate::VlqError;

/// Longest encoding of a 32-bit value
const MAX_LEN: usize = 5;

/// An encoded variable-length quantity.
///
/// Stored inline; [`Vlq::as_bytes`] returns only the used bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vlq {
    bytes: [u8; MAX_LEN],
    len: u8,
}

impl Vlq {
    /// The largest value that can be encoded
    pub const MAX: u64 = u32::MAX as u64;

    /// Encode `value`.
    ///
    /// # Errors
    /// [`VlqError::OutOfRange`] if `value` is larger than [`Vlq::MAX`].
    pub const fn encode(value: u64) -> Result<Self, VlqError> {
        if value > Self::MAX {
            return Err(VlqError::OutOfRange(value));
        }
        Ok(Self::from_u32(value as u32))
    }

    /// Encode a value that is known to fit.
    pub const fn from_u32(value: u32) -> Self {
        let mut groups = [0u8; MAX_LEN];
        let mut count = 0;
        let mut rest = value;
        loop {
            groups[count] = (rest & 0x7F) as u8;
            count += 1;
            rest >>= 7;
            if rest == 0 {
                break;
            }
        }

        // groups are least significant first
        let mut bytes = [0u8; MAX_LEN];
        let mut i = 0;
        while i < count {
            let group = groups[count - 1 - i];
            bytes[i] = if i + 1 < count { group | 0x80 } else { group };
            i += 1;
        }
        Self {
            bytes,
            len: count as u8,
        }
    }

    /// The encoded bytes, most significant group first
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of bytes in the encoding (1-5)
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Decode the value back out of the encoding.
    pub fn value(&self) -> u32 {
        // an encoding built by this type is always well formed
        decode_prefix(self.as_bytes()).map_or(0, |(v, _)| v)
    }
}

impl fmt::Debug for Vlq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vlq({:02X?})", self.as_bytes())
    }
}

impl From<u32> for Vlq {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl TryFrom<u64> for Vlq {
    type Error = VlqError;
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::encode(value)
    }
}

/// Encode `value` into its variable-length byte sequence.
///
/// # Errors
/// [`VlqError::OutOfRange`] if `value > 4294967295`.
pub fn encode(value: u64) -> Result<Vec<u8>, VlqError> {
    Vlq::encode(value).map(|v| v.as_bytes().to_vec())
}

/// Decode `bytes` as exactly one variable-length quantity.
///
/// The last byte must be the only one with its top bit cleared. Use
/// [`decode_prefix`] to read a value off the front of a longer stream.
///
/// # Errors
/// - [`VlqError::Unterminated`] if no byte ends the value
/// - [`VlqError::TrailingBytes`] if bytes follow the terminating byte
/// - [`VlqError::Overflow`] if the value does not fit in 32 bits
pub fn decode(bytes: &[u8]) -> Result<u32, VlqError> {
    let (value, read) = decode_prefix(bytes)?;
    if read < bytes.len() {
        return Err(VlqError::TrailingBytes(bytes.len() - read));
    }
    Ok(value)
}

/// Decode a variable-length quantity from the start of `bytes`, returning the value and
/// the number of bytes it occupied. Bytes after the terminating byte are left alone.
pub fn decode_prefix(bytes: &[u8]) -> Result<(u32, usize), VlqError> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        value = (value << 7) | (byte & 0x7F) as u64;
        if value > Vlq::MAX {
            return Err(VlqError::Overflow);
        }
        if byte & 0x80 == 0 {
            return Ok((value as u32, i + 1));
        }
    }
    Err(VlqError::Unterminated)
}

#[test]
fn encodes_reference_values() {
    use pretty_assertions::assert_eq;

    assert_eq!(Vlq::from(0).as_bytes(), &[0x00]);
    assert_eq!(Vlq::from(0x40).as_bytes(), &[0x40]);
    assert_eq!(Vlq::from(0x7F).as_bytes(), &[0x7F]);
    assert_eq!(Vlq::from(0x80).as_bytes(), &[0x81, 0x00]);
    assert_eq!(Vlq::from(0x2000).as_bytes(), &[0xC0, 0x00]);
    assert_eq!(Vlq::from(0x3FFF).as_bytes(), &[0xFF, 0x7F]);
    assert_eq!(Vlq::from(0x4000).as_bytes(), &[0x81, 0x80, 0x00]);
    assert_eq!(Vlq::from(0x1FFFFF).as_bytes(), &[0xFF, 0xFF, 0x7F]);
    assert_eq!(Vlq::from(0x200000).as_bytes(), &[0x81, 0x80, 0x80, 0x00]);
    assert_eq!(Vlq::from(0x0FFFFFFF).as_bytes(), &[0xFF, 0xFF, 0xFF, 0x7F]);
    assert_eq!(
        Vlq::from(u32::MAX).as_bytes(),
        &[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]
    );
}

#[test]
fn round_trips_group_boundaries() {
    use pretty_assertions::assert_eq;

    for n in [
        0u64, 1, 127, 128, 16383, 16384, 2097151, 2097152, 268435455, 268435456, 4294967295,
    ] {
        let bytes = encode(n).unwrap();
        assert_eq!(decode(&bytes).unwrap() as u64, n, "value {n}");
    }
}

#[test]
fn rejects_values_past_32_bits() {
    use pretty_assertions::assert_eq;

    assert_eq!(encode(4294967296), Err(VlqError::OutOfRange(4294967296)));
    assert_eq!(
        Vlq::try_from(u64::MAX),
        Err(VlqError::OutOfRange(u64::MAX))
    );
}

#[test]
fn decode_stops_at_terminator() {
    use pretty_assertions::assert_eq;

    assert_eq!(decode_prefix(&[0x81, 0x00, 0xFF, 0x06]), Ok((0x80, 2)));
    assert_eq!(decode(&[0x81, 0x80]), Err(VlqError::Unterminated));
    assert_eq!(decode(&[0x81, 0x00]), Ok(0x80));
    assert_eq!(decode(&[0x00, 0x05]), Err(VlqError::TrailingBytes(1)));
    assert_eq!(
        decode(&[0x81, 0x00, 0xFF, 0x06]),
        Err(VlqError::TrailingBytes(2))
    );
    assert_eq!(decode(&[]), Err(VlqError::Unterminated));
    assert_eq!(
        decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]),
        Err(VlqError::Overflow)
    );
}
