//! Per-build adjunct configuration.
//!
//! Everything here is keyed by type name and supplied alongside a schema
//! for one compilation. It never changes the schema; it only steers the
//! layout and naming decisions `compile()` records in the model.

use rustc_hash::FxHashMap;
use weft_types::TypeName;

use crate::MaybeLayout;

/// Layout and symbol overrides for one build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdjunctConfig {
    /// Payload layout of `Maybe<T>`, by `T`.
    maybe_layouts: FxHashMap<TypeName, MaybeLayout>,

    /// Emitted symbol of a type, when it differs from the type name.
    type_symbols: FxHashMap<TypeName, String>,

    /// Emitted symbol of a struct field, by type then field name.
    field_symbols: FxHashMap<TypeName, FxHashMap<String, String>>,
}

impl AdjunctConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_maybe_layout(mut self, ty: impl Into<TypeName>, layout: MaybeLayout) -> Self {
        self.set_maybe_layout(ty, layout);
        self
    }

    pub fn set_maybe_layout(&mut self, ty: impl Into<TypeName>, layout: MaybeLayout) {
        self.maybe_layouts.insert(ty.into(), layout);
    }

    #[must_use]
    pub fn with_type_symbol(mut self, ty: impl Into<TypeName>, symbol: impl Into<String>) -> Self {
        self.type_symbols.insert(ty.into(), symbol.into());
        self
    }

    #[must_use]
    pub fn with_field_symbol(
        mut self,
        ty: impl Into<TypeName>,
        field: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        self.field_symbols
            .entry(ty.into())
            .or_default()
            .insert(field.into(), symbol.into());
        self
    }

    /// Explicit layout for `Maybe<ty>`, if configured.
    pub fn maybe_layout(&self, ty: &str) -> Option<MaybeLayout> {
        self.maybe_layouts.get(ty).copied()
    }

    pub fn type_symbol(&self, ty: &str) -> Option<&str> {
        self.type_symbols.get(ty).map(String::as_str)
    }

    pub fn field_symbol(&self, ty: &str, field: &str) -> Option<&str> {
        self.field_symbols
            .get(ty)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// Every type name the configuration mentions.
    pub fn mentioned_types(&self) -> impl Iterator<Item = &TypeName> {
        self.maybe_layouts
            .keys()
            .chain(self.type_symbols.keys())
            .chain(self.field_symbols.keys())
    }
}
