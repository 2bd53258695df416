//! Codec configuration
//!
//! Limits dan policy yang dipakai decoder/encoder. Nilai default mengikuti
//! ubus: pesan maksimal 1 MiB, duplicate attribute diambil yang pertama.

/// Lebar presence mask (satu bit per optional field)
pub const PRESENCE_BITS: usize = 32;

/// Default maximum encoded message size (ubus `UBUS_MAX_MSGLEN`)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Recursion guard untuk nested table/array walking
pub const MAX_NESTING_DEPTH: usize = 32;

/// Policy untuk nama attribute yang muncul lebih dari sekali dalam satu buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Occurrence pertama dipakai, sisanya di-skip tanpa type check
    #[default]
    FirstWins,
    /// Occurrence terakhir menimpa yang sebelumnya
    LastWins,
}

/// Codec configuration, dibawa oleh setiap `Object` dan dipakai saat dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub max_message_size: usize,
    pub duplicates: DuplicatePolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            duplicates: DuplicatePolicy::FirstWins,
        }
    }
}

impl CodecConfig {
    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }
}
