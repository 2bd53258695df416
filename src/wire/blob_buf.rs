//! Bounded attribute writer
//!
//! Setiap `put` bersifat all-or-nothing: kalau limit terlampaui, buffer
//! dikembalikan ke posisi sebelum attribute tersebut.

use super::attr::padded_len;
use super::{AttrHeader, AttrReader, WireType, WireValue, ATTR_HEADER_SIZE};
use crate::config::DEFAULT_MAX_MESSAGE_SIZE;
use crate::error::EncodeError;

/// Handle untuk table/array yang sedang dibuka
#[derive(Debug)]
#[must_use = "a nested attribute must be closed"]
pub struct Nest {
    header_at: usize,
    payload_at: usize,
    /// `BlobBuf::generation` saat nest dibuka
    generation: u32,
}

/// Attribute writer dengan batas ukuran
pub struct BlobBuf {
    buffer: Vec<u8>,
    limit: usize,
    /// Naik setiap `reset`; nest dari generasi lama ditolak
    generation: u32,
}

impl Default for BlobBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobBuf {
    /// Writer dengan limit default (1 MiB)
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_MESSAGE_SIZE)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit,
            generation: 0,
        }
    }

    /// Reset untuk reuse, kapasitas dipertahankan
    #[inline(always)]
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline(always)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sisa ruang sebelum limit
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.buffer.len())
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Tulis satu attribute
    pub fn put<'v>(&mut self, name: &str, value: impl Into<WireValue<'v>>) -> Result<(), EncodeError> {
        let value = value.into();
        let payload_len = value.payload_len();
        let start = self.begin(value.wire_type(), name, payload_len)?;
        value.write_payload(&mut self.buffer);
        self.pad(start);
        Ok(())
    }

    /// Tulis attribute dengan payload mentah (dipakai untuk opaque passthrough)
    pub fn put_raw(&mut self, name: &str, ty: WireType, payload: &[u8]) -> Result<(), EncodeError> {
        let start = self.begin(ty, name, payload.len())?;
        self.buffer.extend_from_slice(payload);
        self.pad(start);
        Ok(())
    }

    pub fn open_table(&mut self, name: &str) -> Result<Nest, EncodeError> {
        self.open(WireType::Table, name)
    }

    pub fn open_array(&mut self, name: &str) -> Result<Nest, EncodeError> {
        self.open(WireType::Array, name)
    }

    /// Tutup nested attribute: patch payload length lalu pad
    pub fn close(&mut self, nest: Nest) -> Result<(), EncodeError> {
        // Buffer sudah di-reset atau di-rollback melewati nest ini
        if nest.generation != self.generation || nest.payload_at > self.buffer.len() {
            return Err(EncodeError::StaleNest);
        }
        let payload_len = self.buffer.len() - nest.payload_at;
        let encoded = u32::try_from(payload_len).map_err(|_| EncodeError::BufferExceeded {
            needed: payload_len,
            limit: u32::MAX as usize,
        })?;
        let padded = nest.header_at + padded_len(self.buffer.len() - nest.header_at);
        if padded > self.limit {
            self.buffer.truncate(nest.header_at);
            return Err(EncodeError::BufferExceeded {
                needed: padded,
                limit: self.limit,
            });
        }
        self.buffer[nest.header_at + 4..nest.header_at + ATTR_HEADER_SIZE].copy_from_slice(&encoded.to_be_bytes());
        self.pad(nest.header_at);
        Ok(())
    }

    /// Posisi tulis saat ini, untuk rollback
    #[inline(always)]
    pub(crate) fn mark(&self) -> usize {
        self.buffer.len()
    }

    /// Buang semua yang ditulis sejak `mark`
    #[inline(always)]
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.buffer.truncate(mark);
    }

    pub fn finish(self) -> WireBuffer {
        WireBuffer { bytes: self.buffer }
    }

    fn open(&mut self, ty: WireType, name: &str) -> Result<Nest, EncodeError> {
        let header_at = self.begin(ty, name, 0)?;
        Ok(Nest {
            header_at,
            payload_at: self.buffer.len(),
            generation: self.generation,
        })
    }

    /// Tulis header + name, return offset header
    fn begin(&mut self, ty: WireType, name: &str, payload_len: usize) -> Result<usize, EncodeError> {
        let name_len = u16::try_from(name.len()).map_err(|_| EncodeError::BufferExceeded {
            needed: name.len(),
            limit: u16::MAX as usize,
        })?;
        let encoded_len = u32::try_from(payload_len).map_err(|_| EncodeError::BufferExceeded {
            needed: payload_len,
            limit: u32::MAX as usize,
        })?;

        let start = self.buffer.len();
        let needed = start + padded_len(ATTR_HEADER_SIZE + name.len() + payload_len);
        if needed > self.limit {
            return Err(EncodeError::BufferExceeded {
                needed,
                limit: self.limit,
            });
        }

        let header = AttrHeader::new(ty.tag(), name_len, encoded_len);
        self.buffer.extend_from_slice(&header.to_bytes());
        self.buffer.extend_from_slice(name.as_bytes());
        Ok(start)
    }

    #[inline(always)]
    fn pad(&mut self, start: usize) {
        let end = start + padded_len(self.buffer.len() - start);
        self.buffer.resize(end, 0);
    }
}

/// Encoded message, siap diserahkan ke transport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireBuffer {
    bytes: Vec<u8>,
}

impl WireBuffer {
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn attrs(&self) -> AttrReader<'_> {
        AttrReader::new(&self.bytes)
    }
}

impl AsRef<[u8]> for WireBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_layout() {
        let mut buf = BlobBuf::new();
        buf.put("id", 7i32).unwrap();
        assert_eq!(
            buf.as_bytes(),
            &[5, 0, 0, 2, 0, 0, 0, 4, b'i', b'd', 0, 0, 0, 7, 0, 0]
        );
    }

    #[test]
    fn test_limit_is_all_or_nothing() {
        let mut buf = BlobBuf::with_limit(20);
        buf.put("a", 1i8).unwrap();
        assert_eq!(buf.len(), 12);

        let err = buf.put("b", 2i64).unwrap_err();
        assert_eq!(err, EncodeError::BufferExceeded { needed: 32, limit: 20 });
        assert_eq!(buf.len(), 12);
        assert_eq!(buf.available(), 8);
    }

    #[test]
    fn test_nested_close_patches_length() {
        let mut buf = BlobBuf::new();
        let nest = buf.open_table("t").unwrap();
        buf.put("x", true).unwrap();
        buf.close(nest).unwrap();

        let bytes = buf.finish();
        let outer = bytes.attrs().next().unwrap().unwrap();
        assert_eq!(outer.wire_type(), WireType::Table);
        // inner: 8 + 1 + 1 = 10 → padded 12
        assert_eq!(outer.payload().len(), 12);
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn test_close_over_limit_discards_nest() {
        let mut buf = BlobBuf::with_limit(24);
        buf.put("a", 1i8).unwrap();
        let nest = buf.open_table("t").unwrap();
        assert!(buf.close(nest).is_ok());
        assert_eq!(buf.len(), 24);
        assert!(buf.open_table("u").is_err());
    }

    #[test]
    fn test_close_after_reset_is_rejected() {
        let mut buf = BlobBuf::new();
        let nest = buf.open_table("t").unwrap();
        buf.reset();
        assert_eq!(buf.close(nest), Err(EncodeError::StaleNest));
        assert!(buf.is_empty());

        // buffer terisi lagi melewati offset lama, nest tetap ditolak
        let stale = buf.open_table("t").unwrap();
        buf.reset();
        buf.put("a", "panjang sekali").unwrap();
        assert_eq!(buf.close(stale), Err(EncodeError::StaleNest));
        assert_eq!(buf.finish().attrs().count(), 1);
    }

    #[test]
    fn test_close_after_rollback_is_rejected() {
        let mut buf = BlobBuf::new();
        let mark = buf.mark();
        let nest = buf.open_array("a").unwrap();
        buf.rollback(mark);
        assert_eq!(buf.close(nest), Err(EncodeError::StaleNest));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_rollback() {
        let mut buf = BlobBuf::new();
        buf.put("keep", 1i32).unwrap();
        let mark = buf.mark();
        buf.put("drop", "me").unwrap();
        buf.rollback(mark);
        let names: Vec<_> = buf.finish().attrs().map(|a| a.unwrap().name().to_string()).collect();
        assert_eq!(names, ["keep"]);
    }

    #[test]
    fn test_raw_passthrough() {
        let mut buf = BlobBuf::new();
        buf.put_raw("blob", WireType::Unspec, &[1, 2, 3]).unwrap();
        let bytes = buf.finish();
        let attr = bytes.attrs().next().unwrap().unwrap();
        assert_eq!(attr.payload(), &[1, 2, 3]);
        assert_eq!(attr.wire_type(), WireType::Unspec);
    }
}
