//! Prototypes: a type and a view to build through.

use weft_layout::CompiledModel;
use weft_types::{Type, TypeId, TypeName};

use crate::copy::copy_node;
use crate::{
    Builder, Link, ListAssembler, MapAssembler, Node, NodeAssembler, NodeError, TypedValue, View,
};

/// Suffix selecting the representation prototype in `Prototype::by_name`.
pub const REPR_SUFFIX: &str = ".Repr";

/// Entry point for building values of one type.
#[derive(Clone, Copy, Debug)]
pub struct Prototype<'m> {
    model: &'m CompiledModel,
    ty: TypeId,
    view: View,
}

impl<'m> Prototype<'m> {
    /// Typed prototype for a declared type.
    pub fn new(model: &'m CompiledModel, name: &str) -> Result<Self, NodeError> {
        let ty = model.schema().id_of(name)?;
        Ok(Self::of(model, ty, View::Typed))
    }

    /// Prototype by name; `"Name.Repr"` selects the representation view.
    pub fn by_name(model: &'m CompiledModel, name: &str) -> Result<Self, NodeError> {
        match name.strip_suffix(REPR_SUFFIX) {
            Some(base) => Ok(Self::new(model, base)?.representation()),
            None => Self::new(model, name),
        }
    }

    pub fn of(model: &'m CompiledModel, ty: TypeId, view: View) -> Self {
        Self { model, ty, view }
    }

    #[must_use]
    pub fn typed(self) -> Self {
        Self {
            view: View::Typed,
            ..self
        }
    }

    #[must_use]
    pub fn representation(self) -> Self {
        Self {
            view: View::Representation,
            ..self
        }
    }

    #[inline]
    pub fn model(&self) -> &'m CompiledModel {
        self.model
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn ty(&self) -> &'m Type {
        self.model.schema().get(self.ty)
    }

    pub fn type_name(&self) -> &'m TypeName {
        self.ty().name()
    }

    #[inline]
    pub fn view(&self) -> View {
        self.view
    }

    pub fn builder(self) -> Builder<'m> {
        Builder::new(self.model, self.ty, self.view)
    }

    /// Build a value by filling the root assembler.
    pub fn build(
        self,
        fill: impl FnOnce(NodeAssembler<'_, 'm>) -> Result<(), NodeError>,
    ) -> Result<TypedValue<'m>, NodeError> {
        let mut builder = self.builder();
        fill(builder.root()?)?;
        builder.build()
    }

    pub fn build_map(
        self,
        size_hint: usize,
        fill: impl FnOnce(&mut MapAssembler<'_, 'm>) -> Result<(), NodeError>,
    ) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.create_map(size_hint, fill))
    }

    pub fn build_list(
        self,
        size_hint: usize,
        fill: impl FnOnce(&mut ListAssembler<'_, 'm>) -> Result<(), NodeError>,
    ) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.create_list(size_hint, fill))
    }

    pub fn build_bool(self, v: bool) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.assign_bool(v))
    }

    pub fn build_int(self, v: i64) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.assign_int(v))
    }

    pub fn build_float(self, v: f64) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.assign_float(v))
    }

    pub fn build_string(self, v: &str) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.assign_string(v))
    }

    pub fn build_bytes(self, v: &[u8]) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.assign_bytes(v))
    }

    pub fn build_link(self, v: &Link) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| root.assign_link(v))
    }

    /// Copy any node through this prototype's view.
    pub fn build_from(self, node: &Node<'_>) -> Result<TypedValue<'m>, NodeError> {
        self.build(|root| copy_node(root, node))
    }
}
