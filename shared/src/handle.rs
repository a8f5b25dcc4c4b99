/// Non-owning reference to a gravity source in the world registry.
///
/// # Why this exists
/// Agents remember which floor or sphere is pulling them, and floors remember which agents are
/// inside their field. Neither side owns the other, so both hold this plain value instead of a
/// pointer. A handle whose source has been removed simply resolves to `None`.
///
/// SpacetimeDB only indexes primitive columns, so the kind and id are packed into one `u64`.
///
/// # Bit layout
/// - bits 0..=31  : source id (u32)
/// - bits 32..=39 : [`SourceKind`] tag (u8)
/// - bits 40..=63 : reserved (must be zero)
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceHandle(u64);

pub type SourceId = u32;

/// Which gravity behavior a source provides.
///
/// The numeric values are part of the packed handle format. Do not reorder.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// Flat, two-sided floor slab.
    FlatFloor = 1,
    /// Solid sphere the agent walks around on the outside.
    SphereFloor = 2,
    /// Hollow level sphere the agent walks on from the inside.
    LevelSphere = 3,
}

impl SourceKind {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(SourceKind::FlatFloor),
            2 => Some(SourceKind::SphereFloor),
            3 => Some(SourceKind::LevelSphere),
            _ => None,
        }
    }
}

impl SourceHandle {
    pub fn new(id: SourceId, kind: SourceKind) -> Self {
        Self((id as u64) | ((kind as u64) << SourceId::BITS))
    }

    pub fn id(self) -> SourceId {
        (self.0 & SourceId::MAX as u64) as SourceId
    }

    /// Kind tag of a handle built through [`SourceHandle::new`] or validated with
    /// [`SourceHandle::from_raw`]; both guarantee a known tag.
    pub fn kind(self) -> SourceKind {
        let tag = ((self.0 >> SourceId::BITS) & u8::MAX as u64) as u8;
        SourceKind::from_tag(tag).unwrap_or(SourceKind::FlatFloor)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Rebuild a handle from its packed form, failing on unknown tags or reserved bits.
    pub fn from_raw(raw: u64) -> Result<Self, &'static str> {
        validate_handle(raw)?;
        Ok(Self(raw))
    }
}

/// Validates a packed handle received across a boundary (DB row, network).
pub fn validate_handle(raw: u64) -> Result<(), &'static str> {
    const RESERVED_MASK: u64 = !0u64 << 40;
    if raw & RESERVED_MASK != 0 {
        return Err("Source handle reserved bits are non-zero");
    }
    let tag = ((raw >> SourceId::BITS) & u8::MAX as u64) as u8;
    if SourceKind::from_tag(tag).is_none() {
        return Err("Source handle has unknown kind tag");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpacks_id_and_kind() {
        let kinds = [
            SourceKind::FlatFloor,
            SourceKind::SphereFloor,
            SourceKind::LevelSphere,
        ];
        for id in [0, 1, 42, u32::MAX] {
            for kind in kinds {
                let handle = SourceHandle::new(id, kind);
                assert_eq!(handle.id(), id);
                assert_eq!(handle.kind(), kind);
                assert_eq!(SourceHandle::from_raw(handle.raw()), Ok(handle));
            }
        }
    }

    #[test]
    fn reserved_bits_are_rejected() {
        let raw = SourceHandle::new(7, SourceKind::SphereFloor).raw() | (1u64 << 40);
        assert_eq!(
            validate_handle(raw),
            Err("Source handle reserved bits are non-zero")
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = 7u64 | (200u64 << 32);
        assert_eq!(
            SourceHandle::from_raw(raw),
            Err("Source handle has unknown kind tag")
        );
    }

    #[test]
    fn handles_order_by_kind_then_id() {
        let a = SourceHandle::new(9, SourceKind::FlatFloor);
        let b = SourceHandle::new(1, SourceKind::SphereFloor);
        assert!(a < b);
    }
}
