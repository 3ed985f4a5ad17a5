//! Tri-state maybe values and their two storage layouts.
//!
//! Every slot that can be left unset or set to null (struct fields, list
//! elements, map values) holds a `Slot`. A slot is a `Maybe` whose payload
//! is either stored inline (`Embedded`) or behind a box (`Indirect`). The
//! layout is fixed when a value is frozen; reads go through `Slot::get`,
//! which hides it.

use weft_layout::MaybeLayout;

use crate::Value;

/// Absent, explicitly null, or present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Maybe<T> {
    /// Never assigned.
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Maybe<T> {
    #[inline]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn exists(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    #[inline]
    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Absent => Maybe::Absent,
            Self::Null => Maybe::Null,
            Self::Value(v) => Maybe::Value(v),
        }
    }

    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        match self {
            Self::Absent => Maybe::Absent,
            Self::Null => Maybe::Null,
            Self::Value(v) => Maybe::Value(f(v)),
        }
    }

    /// The payload, if present.
    #[inline]
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }
}

/// Storage for one maybe slot.
///
/// Equality compares the maybe state and payload only.
#[derive(Clone, Debug)]
pub enum Slot {
    Embedded(Maybe<Value>),
    Indirect(Maybe<Box<Value>>),
}

impl Slot {
    /// Store `maybe` with the given layout.
    pub fn new(layout: MaybeLayout, maybe: Maybe<Value>) -> Self {
        match layout {
            MaybeLayout::Embedded => Self::Embedded(maybe),
            MaybeLayout::Indirect => Self::Indirect(maybe.map(Box::new)),
        }
    }

    /// A present, embedded value.
    pub fn value(value: Value) -> Self {
        Self::Embedded(Maybe::Value(value))
    }

    /// Layout-independent view of the slot.
    #[inline]
    pub fn get(&self) -> Maybe<&Value> {
        match self {
            Self::Embedded(m) => m.as_ref(),
            Self::Indirect(m) => m.as_ref().map(|b| &**b),
        }
    }

    #[inline]
    pub fn layout(&self) -> MaybeLayout {
        match self {
            Self::Embedded(_) => MaybeLayout::Embedded,
            Self::Indirect(_) => MaybeLayout::Indirect,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        self.get().is_absent()
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}
