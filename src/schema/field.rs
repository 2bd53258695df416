//! Field descriptor

use std::borrow::Cow;

use crate::wire::WireType;

/// Required atau optional; optional field membawa presence slot-nya
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Required,
    Optional { slot: u8 },
}

/// Satu entry di schema table
///
/// `ordinal` bersifat posisional dan tidak pernah dikirim di wire;
/// `name` adalah satu-satunya identifier di wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    wire_type: WireType,
    ordinal: usize,
    presence: Presence,
}

impl FieldDescriptor {
    pub(crate) fn new(name: Cow<'static, str>, wire_type: WireType, ordinal: usize, presence: Presence) -> Self {
        Self {
            name,
            wire_type,
            ordinal,
            presence,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    #[inline(always)]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline(always)]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    #[inline(always)]
    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    /// `None` untuk required field
    #[inline(always)]
    pub fn presence_slot(&self) -> Option<u8> {
        match self.presence {
            Presence::Required => None,
            Presence::Optional { slot } => Some(slot),
        }
    }
}
