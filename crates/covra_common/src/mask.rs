//! Per-bit boolean bitmaps for coverage and race tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-width bitmap packed 64 bits per `u64` word.
///
/// Used for a signal's "already assigned" map in the race validator and for
/// the per-bit toggle-coverage masks.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitMask {
    width: u32,
    words: Vec<u64>,
}

impl BitMask {
    /// Creates a new all-clear mask of the given width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            words: vec![0; width.div_ceil(64) as usize],
        }
    }

    /// Returns the number of bits in the mask.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        self.words[(index / 64) as usize] >> (index % 64) & 1 != 0
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        self.words[(index / 64) as usize] |= 1 << (index % 64);
    }

    /// Sets every bit in the inclusive range `[lsb, msb]`.
    pub fn set_range(&mut self, lsb: u32, msb: u32) {
        for i in lsb..=msb.min(self.width.saturating_sub(1)) {
            self.set(i);
        }
    }

    /// Sets every bit in the mask.
    pub fn set_all(&mut self) {
        if self.width > 0 {
            self.set_range(0, self.width - 1);
        }
    }

    /// Returns `true` if any bit is set.
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// Returns `true` if any bit in the inclusive range `[lsb, msb]` is set.
    pub fn any_in_range(&self, lsb: u32, msb: u32) -> bool {
        (lsb..=msb.min(self.width.saturating_sub(1))).any(|i| self.get(i))
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// ORs another mask of the same width into this one.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn union(&mut self, other: &Self) {
        assert_eq!(self.width, other.width, "BitMask width mismatch in union");
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
    }

    /// Returns `true` if any bit is set in both masks.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn intersects(&self, other: &Self) -> bool {
        assert_eq!(
            self.width, other.width,
            "BitMask width mismatch in intersects"
        );
        self.words.iter().zip(&other.words).any(|(w, o)| w & o != 0)
    }
}

impl fmt::Debug for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitMask(")?;
        for i in (0..self.width).rev() {
            write!(f, "{}", u8::from(self.get(i)))?;
        }
        write!(f, ")")
    }
}
