//! Attribute header dan zero-copy reader

use super::{WireType, WireValue};
use crate::error::DecodeError;

/// tag + flags + name_len + payload_len
pub const ATTR_HEADER_SIZE: usize = 8;
/// Setiap attribute di-pad ke kelipatan 4 byte
pub const ATTR_ALIGN: usize = 4;

#[inline(always)]
pub(crate) const fn padded_len(len: usize) -> usize {
    (len + ATTR_ALIGN - 1) & !(ATTR_ALIGN - 1)
}

/// Attribute header - fixed 8 bytes, big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrHeader {
    pub tag: u8,
    /// Reserved, selalu 0 saat encode
    pub flags: u8,
    pub name_len: u16,
    pub payload_len: u32,
}

impl AttrHeader {
    #[inline(always)]
    pub fn new(tag: u8, name_len: u16, payload_len: u32) -> Self {
        Self {
            tag,
            flags: 0,
            name_len,
            payload_len,
        }
    }

    /// Parse dari awal `buf`, `None` jika kurang dari 8 byte
    #[inline(always)]
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let raw: &[u8; ATTR_HEADER_SIZE] = buf.get(..ATTR_HEADER_SIZE)?.try_into().ok()?;
        Some(Self {
            tag: raw[0],
            flags: raw[1],
            name_len: u16::from_be_bytes([raw[2], raw[3]]),
            payload_len: u32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
        })
    }

    #[inline(always)]
    pub fn to_bytes(&self) -> [u8; ATTR_HEADER_SIZE] {
        let name = self.name_len.to_be_bytes();
        let payload = self.payload_len.to_be_bytes();
        [
            self.tag, self.flags, name[0], name[1], payload[0], payload[1], payload[2], payload[3],
        ]
    }

    /// Header + name + payload, tanpa padding
    #[inline(always)]
    pub fn total_size(&self) -> usize {
        ATTR_HEADER_SIZE + self.name_len as usize + self.payload_len as usize
    }
}

/// Satu attribute yang sudah di-frame, payload masih berupa slice dari buffer asli
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr<'a> {
    name: &'a str,
    tag: u8,
    payload: &'a [u8],
    offset: usize,
}

impl<'a> Attr<'a> {
    #[inline(always)]
    pub fn name(&self) -> &'a str {
        self.name
    }

    #[inline(always)]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Canonical wire type (tag 7 dibaca sebagai int8)
    #[inline(always)]
    pub fn wire_type(&self) -> WireType {
        // Reader hanya menghasilkan attribute dengan tag yang dikenal
        WireType::from_tag(self.tag).unwrap_or(WireType::Unspec)
    }

    #[inline(always)]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Offset attribute header, relatif ke awal buffer teratas
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Interpretasi payload sesuai tag-nya sendiri
    pub fn value(&self) -> Result<WireValue<'a>, DecodeError> {
        WireValue::read(self.wire_type(), self.payload, self.offset)
    }

    /// Interpretasi payload sebagai `ty`; gagal jika tag tidak cocok
    pub fn value_as(&self, ty: WireType) -> Result<WireValue<'a>, DecodeError> {
        if !ty.accepts(self.tag) {
            return Err(DecodeError::TypeMismatch {
                field: self.name.to_string(),
                expected: ty,
                actual: self.wire_type(),
            });
        }
        WireValue::read(ty, self.payload, self.offset)
    }
}

/// Zero-copy attribute reader
///
/// Iterasi berhenti setelah error pertama.
pub struct AttrReader<'a> {
    buffer: &'a [u8],
    read_pos: usize,
    base: usize,
    failed: bool,
}

impl<'a> AttrReader<'a> {
    #[inline(always)]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::nested(buffer, 0)
    }

    /// Reader untuk payload nested; `base` dipakai untuk offset di error
    #[inline(always)]
    pub(crate) fn nested(buffer: &'a [u8], base: usize) -> Self {
        Self {
            buffer,
            read_pos: 0,
            base,
            failed: false,
        }
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }

    fn read_next(&mut self) -> Result<Attr<'a>, DecodeError> {
        let start = self.read_pos;
        let offset = self.base + start;

        let header = AttrHeader::parse(&self.buffer[start..])
            .ok_or_else(|| DecodeError::malformed(offset, "truncated attribute header"))?;

        if WireType::from_tag(header.tag).is_none() {
            return Err(DecodeError::malformed(offset, "unknown wire type tag"));
        }

        let name_start = start + ATTR_HEADER_SIZE;
        let name_end = name_start + header.name_len as usize;
        if name_end > self.buffer.len() {
            return Err(DecodeError::malformed(offset, "attribute name runs past end of buffer"));
        }
        let name = std::str::from_utf8(&self.buffer[name_start..name_end])
            .map_err(|_| DecodeError::malformed(offset, "attribute name is not valid UTF-8"))?;

        let payload_end = name_end
            .checked_add(header.payload_len as usize)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| DecodeError::malformed(offset, "attribute payload runs past end of buffer"))?;

        // Attribute terakhir boleh tanpa trailing padding
        self.read_pos = (start + padded_len(payload_end - start)).min(self.buffer.len());

        Ok(Attr {
            name,
            tag: header.tag,
            payload: &self.buffer[name_end..payload_end],
            offset,
        })
    }
}

impl<'a> Iterator for AttrReader<'a> {
    type Item = Result<Attr<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.read_pos >= self.buffer.len() {
            return None;
        }
        let item = self.read_next();
        self.failed = item.is_err();
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::BlobBuf;

    #[test]
    fn test_header_roundtrip() {
        let header = AttrHeader::new(5, 2, 4);
        let bytes = header.to_bytes();
        assert_eq!(bytes, [5, 0, 0, 2, 0, 0, 0, 4]);
        assert_eq!(AttrHeader::parse(&bytes), Some(header));
        assert_eq!(header.total_size(), 14);
        assert_eq!(AttrHeader::parse(&bytes[..7]), None);
    }

    #[test]
    fn test_padding() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(13), 16);
    }

    #[test]
    fn test_read_sequence() {
        let mut buf = BlobBuf::new();
        buf.put("id", 7i32).unwrap();
        buf.put("msg", "hi").unwrap();
        let bytes = buf.finish();

        let attrs: Vec<_> = AttrReader::new(bytes.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name(), "id");
        assert_eq!(attrs[0].payload(), &7i32.to_be_bytes());
        assert_eq!(attrs[0].offset(), 0);
        assert_eq!(attrs[1].name(), "msg");
        assert_eq!(attrs[1].value().unwrap(), WireValue::String("hi"));
        // 8 + 2 + 4 = 14 → padded 16
        assert_eq!(attrs[1].offset(), 16);
    }

    #[test]
    fn test_truncated_header() {
        let mut reader = AttrReader::new(&[5, 0, 0]);
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::BufferMalformed { offset: 0, .. }));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_payload_past_end() {
        let mut raw = AttrHeader::new(5, 1, 4).to_bytes().to_vec();
        raw.extend_from_slice(b"x");
        raw.extend_from_slice(&[0, 0]);
        let err = AttrReader::new(&raw).next().unwrap().unwrap_err();
        assert_eq!(
            err,
            DecodeError::BufferMalformed {
                offset: 0,
                reason: "attribute payload runs past end of buffer"
            }
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let raw = AttrHeader::new(42, 0, 0).to_bytes();
        let err = AttrReader::new(&raw).next().unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::BufferMalformed { reason: "unknown wire type tag", .. }));
    }

    #[test]
    fn test_last_attr_without_padding() {
        let mut raw = AttrHeader::new(7, 1, 1).to_bytes().to_vec();
        raw.extend_from_slice(b"b");
        raw.push(1);
        // 10 bytes, tidak di-pad ke 12
        let attrs: Vec<_> = AttrReader::new(&raw).collect::<Result<_, _>>().unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value_as(WireType::Bool).unwrap(), WireValue::Bool(true));
    }

    #[test]
    fn test_value_as_mismatch() {
        let mut buf = BlobBuf::new();
        buf.put("id", "seven").unwrap();
        let bytes = buf.finish();
        let attr = AttrReader::new(bytes.as_bytes()).next().unwrap().unwrap();
        let err = attr.value_as(WireType::Int32).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                field: "id".into(),
                expected: WireType::Int32,
                actual: WireType::String,
            }
        );
    }
}
