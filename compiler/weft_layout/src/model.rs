//! The compiled model: a frozen schema plus every decision made about it.
//!
//! `compile()` runs once per build. Emitters query the model by type name;
//! the node runtime queries it by `TypeId`. Neither recomputes layout or
//! strategy decisions.

use smallvec::SmallVec;
use weft_types::{Kind, ReprStrategy, Schema, Type, TypeDef, TypeId, TypeName};

use crate::{AdjunctConfig, CycleClassifier, LayoutError, MaybeLayout};

/// Schema, configuration and all derived layout decisions.
#[derive(Clone, Debug)]
pub struct CompiledModel {
    schema: Schema,
    config: AdjunctConfig,

    /// Payload layout of `Maybe<T>` in collection slots, by `T`.
    maybe_layouts: Vec<MaybeLayout>,

    /// Per struct, the storage layout of each field; empty for non-structs.
    field_layouts: Vec<Box<[MaybeLayout]>>,

    /// Types that contain themselves by value.
    recursive: Vec<bool>,
}

/// Default payload layout for `Maybe<T>` when the configuration is silent.
///
/// Scalars and enums embed; compound types go behind a box.
fn default_layout(ty: &Type) -> MaybeLayout {
    match ty.def() {
        TypeDef::Bool
        | TypeDef::Int
        | TypeDef::Float
        | TypeDef::String
        | TypeDef::Bytes
        | TypeDef::Link
        | TypeDef::Enum(_) => MaybeLayout::Embedded,
        TypeDef::List(_) | TypeDef::Map(_) | TypeDef::Struct(_) | TypeDef::Union(_) => {
            MaybeLayout::Indirect
        }
    }
}

/// Compile a schema and its adjunct configuration into a model.
#[tracing::instrument(level = "debug", skip_all, fields(types = schema.len()))]
pub fn compile(schema: Schema, config: AdjunctConfig) -> Result<CompiledModel, LayoutError> {
    for name in config.mentioned_types() {
        if schema.id_of(name.as_str()).is_err() {
            tracing::warn!(ty = %name, "adjunct configuration names an undeclared type");
        }
    }

    let classifier = CycleClassifier::new(&schema);

    let maybe_layouts: Vec<MaybeLayout> = schema
        .iter()
        .map(|(_, ty)| {
            config
                .maybe_layout(ty.name().as_str())
                .unwrap_or_else(|| default_layout(ty))
        })
        .collect();

    let mut field_layouts = Vec::with_capacity(schema.len());
    let mut recursive = Vec::with_capacity(schema.len());
    for (id, ty) in schema.iter() {
        recursive.push(classifier.is_recursive(id));

        let Some(def) = ty.as_struct() else {
            field_layouts.push(Box::default());
            continue;
        };
        let mut layouts = Vec::with_capacity(def.fields.len());
        for (field, &field_ty) in def.fields.iter().zip(schema.refs(id)) {
            let on_cycle = classifier.closes_cycle(id, field_ty);
            let layout = if field.is_maybe() {
                let configured = config.maybe_layout(schema.get(field_ty).name().as_str());
                match (configured, on_cycle) {
                    (Some(MaybeLayout::Embedded), true) => {
                        return Err(LayoutError::EmbeddedRecursion {
                            owner: ty.name().clone(),
                            field: field.name.clone(),
                            ty: schema.get(field_ty).name().clone(),
                        });
                    }
                    (_, true) => MaybeLayout::Indirect,
                    (_, false) => maybe_layouts[field_ty.index()],
                }
            } else if on_cycle {
                MaybeLayout::Indirect
            } else {
                MaybeLayout::Embedded
            };
            tracing::trace!(owner = %ty.name(), field = %field.name, %layout, "field layout");
            layouts.push(layout);
        }
        field_layouts.push(layouts.into_boxed_slice());
    }

    tracing::debug!("model compiled");
    Ok(CompiledModel {
        schema,
        config,
        maybe_layouts,
        field_layouts,
        recursive,
    })
}

impl CompiledModel {
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn config(&self) -> &AdjunctConfig {
        &self.config
    }

    // === Queries by name (emitter surface) ===

    fn lookup(&self, name: &str) -> Result<(TypeId, &Type), LayoutError> {
        let id = self.schema.id_of(name)?;
        Ok((id, self.schema.get(id)))
    }

    /// Representation strategy declared for a type.
    pub fn representation_strategy_of(&self, name: &str) -> Result<ReprStrategy<'_>, LayoutError> {
        Ok(self.lookup(name)?.1.representation_strategy())
    }

    /// Kind of a type's typed view.
    pub fn kind_of(&self, name: &str) -> Result<Kind, LayoutError> {
        Ok(self.lookup(name)?.1.kind())
    }

    /// Kind of a type's representation view; `None` for kinded unions.
    pub fn representation_kind_of(&self, name: &str) -> Result<Option<Kind>, LayoutError> {
        Ok(self.lookup(name)?.1.representation_kind())
    }

    /// Payload layout of `Maybe<name>` in list and map slots.
    pub fn maybe_layout_of(&self, name: &str) -> Result<MaybeLayout, LayoutError> {
        let (id, _) = self.lookup(name)?;
        Ok(self.maybe_layout(id))
    }

    /// Storage layout of a struct field.
    pub fn field_layout_of(&self, name: &str, field: &str) -> Result<MaybeLayout, LayoutError> {
        let (id, ty) = self.lookup(name)?;
        let def = ty.as_struct().ok_or_else(|| LayoutError::NotAStruct {
            ty: ty.name().clone(),
        })?;
        let (index, _) = def.field(field).ok_or_else(|| LayoutError::UnknownField {
            ty: ty.name().clone(),
            field: field.to_owned(),
        })?;
        Ok(self.field_layout(id, index))
    }

    /// Names a type refers to, in canonical order.
    pub fn references_of(&self, name: &str) -> Result<SmallVec<[&TypeName; 4]>, LayoutError> {
        Ok(self.lookup(name)?.1.references())
    }

    /// Check if a type contains itself by value.
    pub fn is_recursive(&self, name: &str) -> Result<bool, LayoutError> {
        let (id, _) = self.lookup(name)?;
        Ok(self.recursive[id.index()])
    }

    /// Symbol an emitter should use for a type.
    pub fn type_symbol(&self, name: &str) -> Result<&str, LayoutError> {
        let (_, ty) = self.lookup(name)?;
        Ok(self
            .config
            .type_symbol(name)
            .unwrap_or_else(|| ty.name().as_str()))
    }

    /// Symbol an emitter should use for a struct field.
    pub fn field_symbol<'a>(&'a self, name: &str, field: &'a str) -> Result<&'a str, LayoutError> {
        let (_, ty) = self.lookup(name)?;
        let def = ty.as_struct().ok_or_else(|| LayoutError::NotAStruct {
            ty: ty.name().clone(),
        })?;
        if def.field(field).is_none() {
            return Err(LayoutError::UnknownField {
                ty: ty.name().clone(),
                field: field.to_owned(),
            });
        }
        Ok(self.config.field_symbol(name, field).unwrap_or(field))
    }

    // === Queries by id (runtime surface) ===

    /// Payload layout of `Maybe<id>` in list and map slots.
    #[inline]
    pub fn maybe_layout(&self, id: TypeId) -> MaybeLayout {
        self.maybe_layouts[id.index()]
    }

    /// Storage layout of the `index`th field of struct `id`.
    ///
    /// Non-struct ids and out-of-range fields report `Embedded`.
    #[inline]
    pub fn field_layout(&self, id: TypeId, index: usize) -> MaybeLayout {
        self.field_layouts[id.index()]
            .get(index)
            .copied()
            .unwrap_or(MaybeLayout::Embedded)
    }
}
