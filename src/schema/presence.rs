//! Presence set: satu bit per optional field
//!
//! Menggantikan manipulasi `has_fields |= mask` manual. Bit hanya diubah
//! lewat setter per field (di `Record` atau kode hasil `message!`), jadi
//! value dan presence tidak bisa out of sync.

use std::fmt;

use crate::config::PRESENCE_BITS;

/// Fixed-size bit set, index = presence slot (urutan optional field di schema)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PresenceSet(u32);

impl PresenceSet {
    #[inline(always)]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline(always)]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn is_set(self, slot: u8) -> bool {
        (slot as usize) < PRESENCE_BITS && self.0 & (1 << slot) != 0
    }

    /// Slot di luar 32 bit diabaikan; schema builder sudah menolaknya
    #[inline(always)]
    pub fn mark_set(&mut self, slot: u8) {
        debug_assert!((slot as usize) < PRESENCE_BITS, "presence slot {slot} out of range");
        if (slot as usize) < PRESENCE_BITS {
            self.0 |= 1 << slot;
        }
    }

    #[inline(always)]
    pub fn clear(&mut self, slot: u8) {
        if (slot as usize) < PRESENCE_BITS {
            self.0 &= !(1 << slot);
        }
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Hanya slot `0..limit` yang dipertahankan
    #[inline(always)]
    pub const fn limited(self, limit: usize) -> Self {
        if limit >= PRESENCE_BITS {
            self
        } else {
            Self(self.0 & ((1u32 << limit) - 1))
        }
    }

    /// Slot yang di-set, urut naik
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..PRESENCE_BITS as u8).filter(move |slot| self.is_set(*slot))
    }
}

impl fmt::Debug for PresenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PresenceSet({:#034b})", self.0)
    }
}
