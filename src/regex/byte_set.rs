//! Byte sets for character classes and the `.` wildcard.

use std::fmt;

/// The set of bytes that negated classes and `.` are taken against.
///
/// `Ascii` mirrors the scanners produced by earlier versions of the
/// generator, which built their class tables over 0..128. `Bytes` extends the
/// universe to every byte value, so `.` and `[^...]` also consume the high
/// bytes of multi-byte UTF-8 sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Universe {
    #[default]
    Ascii,
    Bytes,
}

impl Universe {
    /// Highest byte value in the universe.
    pub fn max(self) -> u8 {
        match self {
            Universe::Ascii => 0x7f,
            Universe::Bytes => 0xff,
        }
    }

    /// Every byte in the universe.
    pub fn full(self) -> ByteSet {
        ByteSet::range(0, self.max())
    }

    /// The `.` wildcard: every byte in the universe except CR and LF.
    pub fn wildcard(self) -> ByteSet {
        let mut set = self.full();
        set.remove(b'\r');
        set.remove(b'\n');
        set
    }
}

/// A set of byte values, stored as a 256-bit bitmap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    pub const fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    pub fn single(byte: u8) -> Self {
        let mut set = Self::empty();
        set.insert(byte);
        set
    }

    /// All bytes in `lo..=hi`. Empty when `lo > hi`.
    pub fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::empty();
        set.insert_range(lo, hi);
        set
    }

    pub fn insert(&mut self, byte: u8) {
        self.bits[usize::from(byte >> 6)] |= 1u64 << (byte & 63);
    }

    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for byte in lo..=hi {
            self.insert(byte);
        }
    }

    pub fn remove(&mut self, byte: u8) {
        self.bits[usize::from(byte >> 6)] &= !(1u64 << (byte & 63));
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.bits[usize::from(byte >> 6)] & (1u64 << (byte & 63)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn union(&self, other: &ByteSet) -> ByteSet {
        let mut bits = self.bits;
        for (word, theirs) in bits.iter_mut().zip(other.bits) {
            *word |= theirs;
        }
        ByteSet { bits }
    }

    /// The bytes of `universe` that are not in this set.
    pub fn complement_in(&self, universe: Universe) -> ByteSet {
        let mut set = universe.full();
        for byte in self.iter() {
            set.remove(byte);
        }
        set
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|byte| self.contains(*byte))
    }

    /// Maximal runs of consecutive members, as inclusive `(lo, hi)` pairs.
    pub fn ranges(&self) -> Vec<(u8, u8)> {
        let mut ranges: Vec<(u8, u8)> = Vec::new();
        for byte in self.iter() {
            match ranges.last_mut() {
                Some((_, hi)) if hi.checked_add(1) == Some(byte) => *hi = byte,
                _ => ranges.push((byte, byte)),
            }
        }
        ranges
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ByteSet::empty();
        for byte in iter {
            set.insert(byte);
        }
        set
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.ranges().into_iter().map(|(lo, hi)| lo..=hi))
            .finish()
    }
}
