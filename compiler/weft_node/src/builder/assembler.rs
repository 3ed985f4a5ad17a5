//! Assembler handles over a builder's arena.
//!
//! A `NodeAssembler` writes exactly one slot and is consumed doing so.
//! `MapAssembler` and `ListAssembler` stay usable until `finish()`; calls
//! after that fail with `AssemblerFinalized`.

use weft_types::Kind;

use super::{Builder, CellId, Draft, SlotSpec, Target};
use crate::{Link, NodeError, OptionalityError, View};

/// A scalar handed to an assembler.
#[derive(Clone, Copy, Debug)]
pub(super) enum Scalar<'x> {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(&'x str),
    Bytes(&'x [u8]),
    Link(&'x Link),
}

impl Scalar<'_> {
    pub(super) fn kind(self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::Link(_) => Kind::Link,
        }
    }
}

/// Assigns one slot: a scalar, a null, or a new map or list.
pub struct NodeAssembler<'b, 'm> {
    builder: &'b mut Builder<'m>,
    target: Target,
    spec: SlotSpec,
}

impl<'b, 'm> NodeAssembler<'b, 'm> {
    pub(super) fn new(builder: &'b mut Builder<'m>, target: Target, spec: SlotSpec) -> Self {
        Self {
            builder,
            target,
            spec,
        }
    }

    #[inline]
    pub fn view(&self) -> View {
        self.spec.view
    }

    /// Check if this slot accepts `assign_null`.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.spec.nullable
    }

    pub fn assign_null(self) -> Result<(), NodeError> {
        let Self {
            builder,
            target,
            spec,
        } = self;
        builder.run(|b| {
            if !spec.nullable {
                return Err(OptionalityError::NullNotAllowed {
                    ty: b.spec_name(spec),
                }
                .into());
            }
            b.place(target, Draft::Null);
            Ok(())
        })
    }

    pub fn assign_bool(self, v: bool) -> Result<(), NodeError> {
        self.assign(Scalar::Bool(v))
    }

    pub fn assign_int(self, v: i64) -> Result<(), NodeError> {
        self.assign(Scalar::Int(v))
    }

    pub fn assign_float(self, v: f64) -> Result<(), NodeError> {
        self.assign(Scalar::Float(v))
    }

    pub fn assign_string(self, v: &str) -> Result<(), NodeError> {
        self.assign(Scalar::String(v))
    }

    pub fn assign_bytes(self, v: &[u8]) -> Result<(), NodeError> {
        self.assign(Scalar::Bytes(v))
    }

    pub fn assign_link(self, v: &Link) -> Result<(), NodeError> {
        self.assign(Scalar::Link(v))
    }

    fn assign(self, input: Scalar<'_>) -> Result<(), NodeError> {
        let Self {
            builder,
            target,
            spec,
        } = self;
        builder.run(|b| {
            let draft = b.scalar_draft(spec, input)?;
            b.place(target, draft);
            Ok(())
        })
    }

    /// Start a map-kind value in this slot.
    pub fn begin_map(self, size_hint: usize) -> Result<MapAssembler<'b, 'm>, NodeError> {
        let Self {
            builder,
            target,
            spec,
        } = self;
        let cell = builder.run(|b| {
            let (draft, cell) = b.open(spec, Kind::Map, size_hint)?;
            b.place(target, draft);
            Ok(cell)
        })?;
        Ok(MapAssembler {
            builder,
            cell,
            view: spec.view,
        })
    }

    /// Start a list-kind value in this slot.
    pub fn begin_list(self, size_hint: usize) -> Result<ListAssembler<'b, 'm>, NodeError> {
        let Self {
            builder,
            target,
            spec,
        } = self;
        let cell = builder.run(|b| {
            let (draft, cell) = b.open(spec, Kind::List, size_hint)?;
            b.place(target, draft);
            Ok(cell)
        })?;
        Ok(ListAssembler {
            builder,
            cell,
            view: spec.view,
        })
    }

    /// Build a map-kind value with `fill`, then finish it.
    pub fn create_map(
        self,
        size_hint: usize,
        fill: impl FnOnce(&mut MapAssembler<'b, 'm>) -> Result<(), NodeError>,
    ) -> Result<(), NodeError> {
        let mut map = self.begin_map(size_hint)?;
        fill(&mut map)?;
        map.finish()
    }

    /// Build a list-kind value with `fill`, then finish it.
    pub fn create_list(
        self,
        size_hint: usize,
        fill: impl FnOnce(&mut ListAssembler<'b, 'm>) -> Result<(), NodeError>,
    ) -> Result<(), NodeError> {
        let mut list = self.begin_list(size_hint)?;
        fill(&mut list)?;
        list.finish()
    }
}

/// Assembles a map-kind value: maps, structs and unions.
pub struct MapAssembler<'b, 'm> {
    builder: &'b mut Builder<'m>,
    cell: CellId,
    view: View,
}

impl<'m> MapAssembler<'_, 'm> {
    #[inline]
    pub fn view(&self) -> View {
        self.view
    }

    /// Start an entry whose key is given as its representation string.
    pub fn assemble_entry(&mut self, key: &str) -> Result<NodeAssembler<'_, 'm>, NodeError> {
        let (cell, view) = (self.cell, self.view);
        let (target, spec) = self.builder.run(|b| b.begin_entry(cell, key, view))?;
        Ok(NodeAssembler::new(&mut *self.builder, target, spec))
    }

    /// Start an entry by assembling its key. Follow with `assemble_value`.
    pub fn assemble_key(&mut self) -> Result<NodeAssembler<'_, 'm>, NodeError> {
        let (cell, view) = (self.cell, self.view);
        let (target, spec) = self.builder.run(|b| b.begin_key(cell, view))?;
        Ok(NodeAssembler::new(&mut *self.builder, target, spec))
    }

    /// Assembler for the value of the key just assembled.
    pub fn assemble_value(&mut self) -> Result<NodeAssembler<'_, 'm>, NodeError> {
        let (cell, view) = (self.cell, self.view);
        let (target, spec) = self.builder.run(|b| b.begin_value(cell, view))?;
        Ok(NodeAssembler::new(&mut *self.builder, target, spec))
    }

    /// Assemble one entry with `fill`.
    pub fn entry(
        &mut self,
        key: &str,
        fill: impl FnOnce(NodeAssembler<'_, 'm>) -> Result<(), NodeError>,
    ) -> Result<(), NodeError> {
        fill(self.assemble_entry(key)?)
    }

    pub fn finish(&mut self) -> Result<(), NodeError> {
        let cell = self.cell;
        self.builder.run(|b| b.finish_cell(cell))
    }

    /// Continue assembling the same value through another view.
    pub fn with_view(self, view: View) -> Result<Self, NodeError> {
        let cell = self.cell;
        self.builder.run(|b| b.check_view(cell, view, Kind::Map))?;
        Ok(Self { view, ..self })
    }
}

/// Assembles a list-kind value: lists and tuple-represented structs.
pub struct ListAssembler<'b, 'm> {
    builder: &'b mut Builder<'m>,
    cell: CellId,
    view: View,
}

impl<'m> ListAssembler<'_, 'm> {
    #[inline]
    pub fn view(&self) -> View {
        self.view
    }

    /// Assembler for the next element.
    pub fn assemble_value(&mut self) -> Result<NodeAssembler<'_, 'm>, NodeError> {
        let (cell, view) = (self.cell, self.view);
        let (target, spec) = self.builder.run(|b| b.begin_item(cell, view))?;
        Ok(NodeAssembler::new(&mut *self.builder, target, spec))
    }

    pub fn finish(&mut self) -> Result<(), NodeError> {
        let cell = self.cell;
        self.builder.run(|b| b.finish_cell(cell))
    }

    /// Continue assembling the same value through another view.
    pub fn with_view(self, view: View) -> Result<Self, NodeError> {
        let cell = self.cell;
        self.builder.run(|b| b.check_view(cell, view, Kind::List))?;
        Ok(Self { view, ..self })
    }
}
