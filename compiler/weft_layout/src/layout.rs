//! Storage layout of a maybe value.
//!
//! A `Maybe<T>` either keeps its payload inline next to the tri-state tag
//! or behind a heap box. The choice is storage-only: reading, conversion
//! and equality behave identically under both layouts.

/// Where a maybe's payload lives.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MaybeLayout {
    /// Tag and payload stored contiguously, no indirection.
    Embedded,

    /// Payload behind a uniquely owned heap allocation.
    ///
    /// Required when the payload type reaches the containing type again
    /// by value, which would otherwise make its size infinite.
    Indirect,
}

impl MaybeLayout {
    #[inline]
    pub const fn is_embedded(self) -> bool {
        matches!(self, Self::Embedded)
    }

    #[inline]
    pub const fn is_indirect(self) -> bool {
        matches!(self, Self::Indirect)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Indirect => "indirect",
        }
    }
}

impl std::fmt::Display for MaybeLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
