use sha3::{Digest, Keccak256};
use std::fmt;

/// Splits a key byte into its (high, low) nibbles.
#[inline]
pub fn split_nibbles(byte: u8) -> (usize, usize) {
    ((byte >> 4) as usize, (byte & 0x0f) as usize)
}

/// Maps a key to its canonical byte sequence, one byte per call.
///
/// `project` is called with `index` 0, 1, 2, ... until it returns `None`
/// (end of key). It must be a pure function of `(key, index)`: the trie calls
/// it again for the same key on every operation, and delete relies on
/// insert having seen exactly the same bytes.
pub trait KeyProjector<K: ?Sized>: Send + Sync {
    fn project(&self, key: &K, index: usize) -> Option<u8>;
}

impl<K, F> KeyProjector<K> for F
where
    K: ?Sized,
    F: Fn(&K, usize) -> Option<u8> + Send + Sync,
{
    fn project(&self, key: &K, index: usize) -> Option<u8> {
        self(key, index)
    }
}

/// Collects the whole projection of `key`.
pub fn project_all<K, P>(projector: &P, key: &K) -> Vec<u8>
where
    K: ?Sized,
    P: KeyProjector<K> + ?Sized,
{
    let mut bytes = Vec::new();
    while let Some(byte) = projector.project(key, bytes.len()) {
        bytes.push(byte);
    }
    bytes
}

/// One byte per decimal digit of an unsigned integer, most significant digit
/// first. Each byte holds the digit value (0..=9), not its ASCII code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecimalDigits;

fn decimal_digit(key: u128, index: usize) -> Option<u8> {
    // 0 still has one digit
    let digits = key.checked_ilog10().map_or(1, |d| d as usize + 1);
    if index >= digits {
        return None;
    }
    let shift = (digits - index - 1) as u32;
    Some((key / 10u128.pow(shift) % 10) as u8)
}

macro_rules! impl_decimal_digits {
    ($($t:ty),*) => {
        $(
            impl KeyProjector<$t> for DecimalDigits {
                fn project(&self, key: &$t, index: usize) -> Option<u8> {
                    decimal_digit(*key as u128, index)
                }
            }
        )*
    };
}

impl_decimal_digits!(u8, u16, u32, u64, u128, usize);

/// One byte per character of a byte string, ending at the first NUL byte or
/// at the end of the data, whichever comes first.
///
/// Each call rescans the bytes before `index` for a NUL, so one trie
/// operation costs time quadratic in the key length. Keys that cannot hold a
/// NUL are better served by a closure over `get(index)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StringBytes;

impl<K: AsRef<[u8]> + ?Sized> KeyProjector<K> for StringBytes {
    fn project(&self, key: &K, index: usize) -> Option<u8> {
        let bytes = key.as_ref();
        let byte = *bytes.get(index)?;
        if byte == 0 || bytes[..index].contains(&0) {
            return None;
        }
        Some(byte)
    }
}

/// Big-endian base-256 digits of an unsigned integer with no leading zero
/// bytes. Like [`DecimalDigits`], the key 0 has one digit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MinimalBytes;

fn minimal_byte(key: u128, index: usize) -> Option<u8> {
    let width = key.checked_ilog2().map_or(1, |bits| bits as usize / 8 + 1);
    if index >= width {
        return None;
    }
    Some((key >> (8 * (width - index - 1))) as u8)
}

macro_rules! impl_minimal_bytes {
    ($($t:ty),*) => {
        $(
            impl KeyProjector<$t> for MinimalBytes {
                fn project(&self, key: &$t, index: usize) -> Option<u8> {
                    minimal_byte(*key as u128, index)
                }
            }
        )*
    };
}

impl_minimal_bytes!(u8, u16, u32, u64, u128, usize);

/// Fixed-width big-endian bytes. Every key of a given type has the same
/// depth, so no key is a prefix of another.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BigEndian;

macro_rules! impl_big_endian {
    ($($t:ty),*) => {
        $(
            impl KeyProjector<$t> for BigEndian {
                fn project(&self, key: &$t, index: usize) -> Option<u8> {
                    key.to_be_bytes().get(index).copied()
                }
            }
        )*
    };
}

impl_big_endian!(u16, u32, u64, u128, usize);

impl<const N: usize> KeyProjector<[u8; N]> for BigEndian {
    fn project(&self, key: &[u8; N], index: usize) -> Option<u8> {
        key.get(index).copied()
    }
}

impl KeyProjector<Key32> for BigEndian {
    fn project(&self, key: &Key32, index: usize) -> Option<u8> {
        key.0.get(index).copied()
    }
}

/// 32-byte key type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key32(pub [u8; 32]);

impl Key32 {
    /// Keccak-256 digest of `data`. Spreads arbitrary keys evenly over the
    /// first nibble levels and bounds the depth at 32 bytes.
    pub fn keccak(data: impl AsRef<[u8]>) -> Self {
        Key32(Keccak256::digest(data.as_ref()).into())
    }
}

impl fmt::Display for Key32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rand::random;

    #[test]
    fn split_nibbles_high_and_low() {
        assert_eq!(split_nibbles(0x74), (0x7, 0x4)); // 't'
        assert_eq!(split_nibbles(0x00), (0, 0));
        assert_eq!(split_nibbles(0xff), (15, 15));
    }

    #[test]
    fn decimal_digits_most_significant_first() {
        assert_eq!(project_all(&DecimalDigits, &4096u64), vec![4, 0, 9, 6]);
        assert_eq!(project_all(&DecimalDigits, &7u8), vec![7]);
    }

    #[test]
    fn decimal_digits_zero_has_one_digit() {
        assert_eq!(project_all(&DecimalDigits, &0u32), vec![0]);
    }

    #[test]
    fn decimal_digits_extremes() {
        assert_eq!(project_all(&DecimalDigits, &u64::MAX).len(), 20);
        assert_eq!(project_all(&DecimalDigits, &u128::MAX).len(), 39);
        assert_eq!(DecimalDigits.project(&10u64, 2), None);
    }

    #[test]
    fn string_bytes_stop_at_end() {
        assert_eq!(project_all(&StringBytes, "cat"), b"cat".to_vec());
        assert_eq!(project_all(&StringBytes, ""), Vec::<u8>::new());
    }

    #[test]
    fn string_bytes_stop_at_nul() {
        assert_eq!(project_all(&StringBytes, &b"ab\0cd"[..]), b"ab".to_vec());
        // pure in (key, index): past the NUL is still the end
        assert_eq!(StringBytes.project(&b"ab\0cd"[..], 3), None);
    }

    #[test]
    fn minimal_bytes_drop_leading_zeros() {
        assert_eq!(project_all(&MinimalBytes, &0u64), vec![0]);
        assert_eq!(project_all(&MinimalBytes, &0xffu32), vec![0xff]);
        assert_eq!(project_all(&MinimalBytes, &0x0100u32), vec![1, 0]);
        assert_eq!(project_all(&MinimalBytes, &0x0a0b0cu64), vec![10, 11, 12]);
        assert_eq!(project_all(&MinimalBytes, &u128::MAX), vec![0xff; 16]);
        assert_eq!(MinimalBytes.project(&0x0100u16, 2), None);
    }

    #[test]
    fn big_endian_fixed_width() {
        assert_eq!(project_all(&BigEndian, &0x0102u16), vec![1, 2]);
        assert_eq!(project_all(&BigEndian, &0u64), vec![0; 8]);
    }

    #[test]
    fn key32_projects_all_bytes() {
        let key = Key32(random::<[u8; 32]>());
        assert_eq!(project_all(&BigEndian, &key), key.0.to_vec());
    }

    #[test]
    fn keccak_key_is_deterministic() {
        let a = Key32::keccak(b"hello");
        let b = Key32::keccak("hello");
        assert_eq!(a, b);
        assert_ne!(a, Key32::keccak(b"world"));
        assert_eq!(
            a.to_string(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn closures_are_projectors() {
        let low_byte_first = |key: &u32, index: usize| key.to_le_bytes().get(index).copied();
        let bytes = project_all(&low_byte_first, &0x0a0b0c0du32);
        assert_eq!(bytes, vec![0x0d, 0x0c, 0x0b, 0x0a]);
    }
}
