//! `const fn` checks untuk kode hasil `message!`
//!
//! Dievaluasi di `const _: () = assert!(...)`, jadi schema yang salah
//! gagal saat compile, bukan saat runtime.

use crate::config::PRESENCE_BITS;

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

pub const fn names_unique(names: &[&str]) -> bool {
    let mut i = 0;
    while i < names.len() {
        let mut j = i + 1;
        while j < names.len() {
            if str_eq(names[i], names[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

pub const fn names_nonempty(names: &[&str]) -> bool {
    let mut i = 0;
    while i < names.len() {
        if names[i].is_empty() {
            return false;
        }
        i += 1;
    }
    true
}

/// Ordinal harus `0, 1, 2, ...` sesuai urutan deklarasi
pub const fn ordinals_contiguous(ordinals: &[usize]) -> bool {
    let mut i = 0;
    while i < ordinals.len() {
        if ordinals[i] != i {
            return false;
        }
        i += 1;
    }
    true
}

pub const fn optional_fits(optional: &[bool]) -> bool {
    count_optional(optional) <= PRESENCE_BITS
}

pub const fn count_optional(optional: &[bool]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < optional.len() {
        if optional[i] {
            count += 1;
        }
        i += 1;
    }
    count
}

/// Presence slot = jumlah optional field sebelum `ordinal`
pub const fn presence_slot(optional: &[bool], ordinal: usize) -> u8 {
    let mut slot = 0u8;
    let mut i = 0;
    while i < ordinal && i < optional.len() {
        if optional[i] {
            slot += 1;
        }
        i += 1;
    }
    slot
}
