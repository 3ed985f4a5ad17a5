//! Builder state machine and construction arena.
//!
//! A `Builder` owns every in-progress compound value of one construction
//! as a `Cell` in a flat arena. Assemblers are thin handles (`CellId` plus
//! a view) over that arena, so a typed-view assembler and a
//! representation-view assembler for the same cell write to the same
//! storage. `build()` freezes the arena into a `Value`, choosing each
//! slot's layout from the compiled model.
//!
//! # States
//!
//! ```text
//! Initial --root assigned--> Building --root finished--> Finished (terminal)
//!    \                           |
//!     `------ any failure -------+------> Errored (terminal)
//! ```

mod assembler;

use rustc_hash::FxHashMap;
use weft_layout::{CompiledModel, MaybeLayout};
use weft_types::{EnumRepr, Kind, StructRepr, Type, TypeDef, TypeId, TypeName, UnionRepr};

use crate::{
    strategy, AssemblyError, MapEntry, MapValue, Maybe, NodeError, OptionalityError,
    RepresentationError, Slot, TypedNode, TypedValue, Value, View,
};

pub use assembler::{ListAssembler, MapAssembler, NodeAssembler};
use assembler::Scalar;

type CellId = usize;

/// Where a builder is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuilderState {
    Initial,
    Building,
    Finished,
    Errored,
}

/// A slot's content during construction.
#[derive(Debug, Default)]
enum Draft {
    #[default]
    Absent,
    Null,
    Ready(Value),
    Cell(CellId),
    /// A kinded union member assembled through its own representation.
    Member { member: usize, inner: Box<Draft> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellShape {
    List {
        elem: TypeId,
        nullable: bool,
    },
    Map {
        key: TypeId,
        value: TypeId,
        nullable: bool,
    },
    /// Map-like in the typed view; map, tuple list or pair list in the
    /// representation.
    Struct,
    Union,
    /// One `[key, value]` element of the list-pairs struct in `owner`.
    Pair {
        owner: CellId,
    },
}

/// Progress through a map-like or list cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    ExpectKey,
    KeyInProgress,
    ValueInProgress(usize),
    /// A list-pairs element is open; its draft is the pending key.
    PairInProgress,
    /// A pair's value is being written to field `1` of cell `0`.
    PairValue(CellId, usize),
}

#[derive(Debug)]
struct Cell {
    ty: TypeId,
    shape: CellShape,

    /// List elements, map values, struct fields or union members.
    slots: Vec<Draft>,

    /// Map keys and their representation strings, parallel to `slots`.
    keys: Vec<(Value, String)>,
    index: FxHashMap<String, usize>,

    pending_key: Draft,
    phase: Phase,

    /// Next tuple position of a struct filled as a list.
    next: usize,
    finished: bool,
}

/// Where an assembler writes.
#[derive(Clone, Copy, Debug)]
enum Target {
    Root,
    Key(CellId),
    Slot(CellId, usize),
}

/// What a slot accepts.
#[derive(Clone, Copy, Debug)]
struct SlotSpec {
    ty: SlotType,
    view: View,
    nullable: bool,
}

#[derive(Clone, Copy, Debug)]
enum SlotType {
    Typed(TypeId),
    /// A bare string key of the given struct or union.
    Key(TypeId),
    /// A `[key, value]` element of the list-pairs struct in a cell.
    Pair(CellId),
}

/// Cell shape and read kind a type has in a view, if it builds as a cell.
fn cell_shape(decl: &Type, refs: &[TypeId], view: View) -> Option<(CellShape, Kind)> {
    match (decl.def(), view, refs) {
        (TypeDef::List(def), _, &[elem]) => Some((
            CellShape::List {
                elem,
                nullable: def.elem_nullable,
            },
            Kind::List,
        )),
        (TypeDef::Map(def), _, &[key, value]) => Some((
            CellShape::Map {
                key,
                value,
                nullable: def.value_nullable,
            },
            Kind::Map,
        )),
        (TypeDef::Struct(_), View::Typed, _) => Some((CellShape::Struct, Kind::Map)),
        (TypeDef::Struct(def), View::Representation, _) => match def.repr {
            StructRepr::Map(_) => Some((CellShape::Struct, Kind::Map)),
            StructRepr::Tuple | StructRepr::Listpairs(_) => Some((CellShape::Struct, Kind::List)),
            StructRepr::Stringjoin { .. } => None,
        },
        (TypeDef::Union(_), View::Typed, _) => Some((CellShape::Union, Kind::Map)),
        (TypeDef::Union(def), View::Representation, _) => match def.repr {
            UnionRepr::Keyed(_) => Some((CellShape::Union, Kind::Map)),
            UnionRepr::Kinded => None,
        },
        _ => None,
    }
}

/// Constructs one value of one type through assemblers.
pub struct Builder<'m> {
    model: &'m CompiledModel,
    ty: TypeId,
    view: View,
    cells: Vec<Cell>,
    root: Draft,
    state: BuilderState,
}

impl<'m> Builder<'m> {
    pub(crate) fn new(model: &'m CompiledModel, ty: TypeId, view: View) -> Self {
        Self {
            model,
            ty,
            view,
            cells: Vec::new(),
            root: Draft::Absent,
            state: BuilderState::Initial,
        }
    }

    #[inline]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    #[inline]
    pub fn view(&self) -> View {
        self.view
    }

    pub fn type_name(&self) -> &'m TypeName {
        self.model.schema().get(self.ty).name()
    }

    /// Assembler for the value being built. Available once, before
    /// anything has been assigned.
    pub fn root(&mut self) -> Result<NodeAssembler<'_, 'm>, NodeError> {
        let (ty, view) = (self.ty, self.view);
        self.run(|b| match b.state {
            BuilderState::Initial => Ok(()),
            _ => Err(AssemblyError::AssemblerFinalized {
                ty: b.type_name().clone(),
            }
            .into()),
        })?;
        Ok(NodeAssembler::new(
            self,
            Target::Root,
            SlotSpec {
                ty: SlotType::Typed(ty),
                view,
                nullable: false,
            },
        ))
    }

    /// Freeze the finished value.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %self.type_name(), view = %self.view))]
    pub fn build(mut self) -> Result<TypedValue<'m>, NodeError> {
        match self.state {
            BuilderState::Finished => {}
            BuilderState::Errored => return Err(AssemblyError::BuilderErrored.into()),
            BuilderState::Initial | BuilderState::Building => {
                return Err(AssemblyError::NotFinished.into())
            }
        }
        let root = std::mem::take(&mut self.root);
        let value = self.freeze_value(self.ty, root)?;
        tracing::debug!(cells = self.cells.len(), "value built");
        Ok(TypedValue::new(self.model, self.ty, value))
    }

    /// Run one assembly step. Any failure is terminal for the builder,
    /// except that a finished builder stays finished.
    fn run<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T, NodeError>) -> Result<T, NodeError> {
        match self.state {
            BuilderState::Errored => return Err(AssemblyError::BuilderErrored.into()),
            BuilderState::Finished => return op(self),
            BuilderState::Initial | BuilderState::Building => {}
        }
        let result = op(self);
        if let Err(err) = &result {
            tracing::debug!(ty = %self.type_name(), %err, "builder errored");
            self.state = BuilderState::Errored;
        }
        result
    }

    fn name_of(&self, ty: TypeId) -> TypeName {
        self.model.schema().get(ty).name().clone()
    }

    fn spec_name(&self, spec: SlotSpec) -> TypeName {
        match spec.ty {
            SlotType::Typed(ty) | SlotType::Key(ty) => self.name_of(ty),
            SlotType::Pair(owner) => self.name_of(self.cells[owner].ty),
        }
    }

    fn mismatch(&self, spec: SlotSpec, found: Kind) -> NodeError {
        let ty = match spec.ty {
            SlotType::Typed(ty) => ty,
            SlotType::Pair(owner) => {
                return RepresentationError::Mismatch {
                    ty: self.name_of(self.cells[owner].ty),
                    expected: Kind::List,
                    found,
                }
                .into()
            }
            SlotType::Key(owner) => {
                return AssemblyError::KindMismatch {
                    ty: self.name_of(owner),
                    expected: Kind::String,
                    found,
                }
                .into()
            }
        };
        let decl = self.model.schema().get(ty);
        match spec.view {
            View::Typed => AssemblyError::KindMismatch {
                ty: decl.name().clone(),
                expected: decl.kind(),
                found,
            }
            .into(),
            View::Representation => match decl.representation_kind() {
                Some(expected) => RepresentationError::Mismatch {
                    ty: decl.name().clone(),
                    expected,
                    found,
                }
                .into(),
                None => RepresentationError::NoKindedMember {
                    ty: decl.name().clone(),
                    found,
                }
                .into(),
            },
        }
    }

    fn unrecognized(&self, ty: TypeId, key: impl Into<String>) -> NodeError {
        RepresentationError::UnrecognizedField {
            ty: self.name_of(ty),
            key: key.into(),
        }
        .into()
    }

    // === Drafts ===

    fn is_complete(&self, draft: &Draft) -> bool {
        match draft {
            Draft::Absent => false,
            Draft::Null | Draft::Ready(_) => true,
            Draft::Cell(id) => self.cells[*id].finished,
            Draft::Member { inner, .. } => self.is_complete(inner),
        }
    }

    /// Draft for a scalar assignment, applying the slot type's strategy.
    fn scalar_draft(&self, spec: SlotSpec, input: Scalar<'_>) -> Result<Draft, NodeError> {
        let ty = match spec.ty {
            SlotType::Typed(ty) => ty,
            SlotType::Key(_) => {
                return match input {
                    Scalar::String(s) => Ok(Draft::Ready(Value::String(s.to_owned()))),
                    _ => Err(self.mismatch(spec, input.kind())),
                };
            }
            SlotType::Pair(_) => return Err(self.mismatch(spec, input.kind())),
        };
        let model = self.model;
        let decl = model.schema().get(ty);
        let value = match (decl.def(), spec.view, input) {
            (TypeDef::Bool, _, Scalar::Bool(v)) => Value::Bool(v),
            (TypeDef::Int, _, Scalar::Int(v)) => Value::Int(v),
            (TypeDef::Float, _, Scalar::Float(v)) => Value::Float(v),
            (TypeDef::String, _, Scalar::String(v)) => Value::String(v.to_owned()),
            (TypeDef::Bytes, _, Scalar::Bytes(v)) => Value::Bytes(v.to_vec()),
            (TypeDef::Link, _, Scalar::Link(v)) => Value::Link(v.clone()),
            (TypeDef::Enum(def), View::Typed, Scalar::String(s)) => {
                Value::Enum(def.member(s).ok_or_else(|| self.unrecognized(ty, s))?)
            }
            (TypeDef::Enum(def), View::Representation, Scalar::String(s))
                if matches!(def.repr, EnumRepr::String(_)) =>
            {
                Value::Enum(strategy::enum_from_string(def, s).ok_or_else(|| self.unrecognized(ty, s))?)
            }
            (TypeDef::Enum(def), View::Representation, Scalar::Int(v))
                if matches!(def.repr, EnumRepr::Int(_)) =>
            {
                Value::Enum(
                    strategy::enum_from_int(def, v)
                        .ok_or_else(|| self.unrecognized(ty, v.to_string()))?,
                )
            }
            (TypeDef::Struct(def), View::Representation, Scalar::String(s)) => {
                let StructRepr::Stringjoin { join } = &def.repr else {
                    return Err(self.mismatch(spec, input.kind()));
                };
                let parts = strategy::split_fields(decl.name(), join, s, def.fields.len())?;
                Value::Struct(
                    parts
                        .into_iter()
                        .enumerate()
                        .map(|(i, part)| {
                            Slot::new(
                                model.field_layout(ty, i),
                                Maybe::Value(Value::String(part.to_owned())),
                            )
                        })
                        .collect(),
                )
            }
            (TypeDef::Union(def), View::Representation, _) if def.repr == UnionRepr::Kinded => {
                let Some((member, member_ty)) =
                    strategy::kinded_member(model.schema(), ty, input.kind())
                else {
                    return Err(self.mismatch(spec, input.kind()));
                };
                let inner = self.scalar_draft(
                    SlotSpec {
                        ty: SlotType::Typed(member_ty),
                        view: View::Representation,
                        nullable: false,
                    },
                    input,
                )?;
                return Ok(Draft::Member {
                    member,
                    inner: Box::new(inner),
                });
            }
            _ => return Err(self.mismatch(spec, input.kind())),
        };
        Ok(Draft::Ready(value))
    }

    /// Allocate a cell for a compound slot read as `want` in the slot's view.
    fn open(&mut self, spec: SlotSpec, want: Kind, hint: usize) -> Result<(Draft, CellId), NodeError> {
        let ty = match spec.ty {
            SlotType::Typed(ty) => ty,
            SlotType::Pair(owner) if want == Kind::List => {
                let id = self.alloc(self.cells[owner].ty, CellShape::Pair { owner }, 2);
                tracing::trace!(owner, id, "pair opened");
                return Ok((Draft::Cell(id), id));
            }
            SlotType::Key(_) | SlotType::Pair(_) => return Err(self.mismatch(spec, want)),
        };
        let model = self.model;
        let schema = model.schema();
        let decl = schema.get(ty);
        match cell_shape(decl, schema.refs(ty), spec.view) {
            Some((shape, kind)) if kind == want => {
                let id = self.alloc(ty, shape, hint);
                tracing::trace!(ty = %decl.name(), view = %spec.view, id, "cell opened");
                Ok((Draft::Cell(id), id))
            }
            _ => match decl.def() {
                TypeDef::Union(def)
                    if spec.view == View::Representation && def.repr == UnionRepr::Kinded =>
                {
                    let Some((member, member_ty)) = strategy::kinded_member(schema, ty, want)
                    else {
                        return Err(self.mismatch(spec, want));
                    };
                    let (inner, id) = self.open(
                        SlotSpec {
                            ty: SlotType::Typed(member_ty),
                            view: View::Representation,
                            nullable: false,
                        },
                        want,
                        hint,
                    )?;
                    Ok((
                        Draft::Member {
                            member,
                            inner: Box::new(inner),
                        },
                        id,
                    ))
                }
                _ => Err(self.mismatch(spec, want)),
            },
        }
    }

    fn alloc(&mut self, ty: TypeId, shape: CellShape, hint: usize) -> CellId {
        let slots = match shape {
            CellShape::List { .. } | CellShape::Map { .. } => Vec::with_capacity(hint),
            CellShape::Pair { .. } => Vec::new(),
            CellShape::Struct | CellShape::Union => {
                let len = self.model.schema().refs(ty).len();
                std::iter::repeat_with(Draft::default).take(len).collect()
            }
        };
        let id = self.cells.len();
        self.cells.push(Cell {
            ty,
            shape,
            slots,
            keys: Vec::new(),
            index: FxHashMap::default(),
            pending_key: Draft::Absent,
            phase: Phase::ExpectKey,
            next: 0,
            finished: false,
        });
        id
    }

    fn place(&mut self, target: Target, draft: Draft) {
        match target {
            Target::Root => {
                self.root = draft;
                self.state = BuilderState::Building;
                self.refresh_state();
            }
            Target::Key(cell) => self.cells[cell].pending_key = draft,
            Target::Slot(cell, index) => self.cells[cell].slots[index] = draft,
        }
    }

    fn refresh_state(&mut self) {
        if self.state == BuilderState::Building && self.is_complete(&self.root) {
            tracing::trace!(ty = %self.type_name(), "root finished");
            self.state = BuilderState::Finished;
        }
    }

    // === Cell protocol ===

    fn check_open(&self, cell: CellId) -> Result<(), NodeError> {
        let c = &self.cells[cell];
        if c.finished {
            return Err(AssemblyError::AssemblerFinalized {
                ty: self.name_of(c.ty),
            }
            .into());
        }
        Ok(())
    }

    /// Close out the previous entry before starting another or finishing.
    fn settle(&mut self, cell: CellId) -> Result<(), NodeError> {
        let complete = match self.cells[cell].phase {
            Phase::ExpectKey => true,
            Phase::KeyInProgress => false,
            Phase::ValueInProgress(i) => self.is_complete(&self.cells[cell].slots[i]),
            Phase::PairInProgress => self.is_complete(&self.cells[cell].pending_key),
            Phase::PairValue(owner, i) => self.is_complete(&self.cells[owner].slots[i]),
        };
        if !complete {
            return Err(AssemblyError::IncompleteValue {
                ty: self.name_of(self.cells[cell].ty),
            }
            .into());
        }
        self.cells[cell].phase = Phase::ExpectKey;
        Ok(())
    }

    fn cell_kind(&self, cell: CellId, view: View) -> Option<Kind> {
        let c = &self.cells[cell];
        if let CellShape::Pair { .. } = c.shape {
            return (view == View::Representation).then_some(Kind::List);
        }
        let ty = c.ty;
        let schema = self.model.schema();
        cell_shape(schema.get(ty), schema.refs(ty), view).map(|(_, kind)| kind)
    }

    /// Check that a cell reads as `want` in `view`.
    fn check_view(&self, cell: CellId, view: View, want: Kind) -> Result<(), NodeError> {
        match self.cell_kind(cell, view) {
            Some(kind) if kind == want => Ok(()),
            found => Err(AssemblyError::KindMismatch {
                ty: self.name_of(self.cells[cell].ty),
                expected: want,
                found: found.unwrap_or(Kind::Null),
            }
            .into()),
        }
    }

    fn begin_entry(
        &mut self,
        cell: CellId,
        key: &str,
        view: View,
    ) -> Result<(Target, SlotSpec), NodeError> {
        self.check_open(cell)?;
        self.settle(cell)?;
        match self.cells[cell].shape {
            CellShape::Map { key: key_ty, .. } => {
                // Struct keys have no string form in the typed view.
                let key_view = match self.model.schema().get(key_ty).kind() {
                    Kind::String => view,
                    _ => View::Representation,
                };
                let spec = SlotSpec {
                    ty: SlotType::Typed(key_ty),
                    view: key_view,
                    nullable: false,
                };
                let draft = self.scalar_draft(spec, Scalar::String(key))?;
                let key = self.freeze_value(key_ty, draft)?;
                self.push_map_entry(cell, key, view)
            }
            CellShape::Struct | CellShape::Union => self.open_named(cell, key, view),
            CellShape::List { .. } | CellShape::Pair { .. } => Err(AssemblyError::KindMismatch {
                ty: self.name_of(self.cells[cell].ty),
                expected: Kind::List,
                found: Kind::Map,
            }
            .into()),
        }
    }

    fn begin_key(&mut self, cell: CellId, view: View) -> Result<(Target, SlotSpec), NodeError> {
        self.check_open(cell)?;
        self.settle(cell)?;
        let c = &mut self.cells[cell];
        let ty = match c.shape {
            CellShape::Map { key, .. } => SlotType::Typed(key),
            CellShape::Struct | CellShape::Union => SlotType::Key(c.ty),
            CellShape::List { .. } | CellShape::Pair { .. } => {
                return Err(AssemblyError::KindMismatch {
                    ty: self.name_of(self.cells[cell].ty),
                    expected: Kind::List,
                    found: Kind::Map,
                }
                .into())
            }
        };
        c.pending_key = Draft::Absent;
        c.phase = Phase::KeyInProgress;
        Ok((
            Target::Key(cell),
            SlotSpec {
                ty,
                view,
                nullable: false,
            },
        ))
    }

    fn begin_value(&mut self, cell: CellId, view: View) -> Result<(Target, SlotSpec), NodeError> {
        self.check_open(cell)?;
        let c = &self.cells[cell];
        if c.phase != Phase::KeyInProgress || !self.is_complete(&c.pending_key) {
            return Err(AssemblyError::IncompleteValue {
                ty: self.name_of(c.ty),
            }
            .into());
        }
        let key = std::mem::take(&mut self.cells[cell].pending_key);
        self.cells[cell].phase = Phase::ExpectKey;
        match self.cells[cell].shape {
            CellShape::Map { key: key_ty, .. } => {
                let key = self.freeze_value(key_ty, key)?;
                self.push_map_entry(cell, key, view)
            }
            _ => match key {
                Draft::Ready(Value::String(name)) => self.open_named(cell, &name, view),
                _ => Err(AssemblyError::IncompleteValue {
                    ty: self.name_of(self.cells[cell].ty),
                }
                .into()),
            },
        }
    }

    fn push_map_entry(
        &mut self,
        cell: CellId,
        key: Value,
        view: View,
    ) -> Result<(Target, SlotSpec), NodeError> {
        let c = &self.cells[cell];
        let CellShape::Map {
            key: key_ty,
            value: value_ty,
            nullable,
        } = c.shape
        else {
            return Err(AssemblyError::KindMismatch {
                ty: self.name_of(c.ty),
                expected: Kind::Map,
                found: Kind::List,
            }
            .into());
        };
        let repr_key = TypedNode::new(self.model, key_ty, &key, View::Representation)
            .as_string()?
            .into_owned();
        if c.index.contains_key(&repr_key) {
            return Err(AssemblyError::DuplicateKey {
                ty: self.name_of(c.ty),
                key: repr_key,
            }
            .into());
        }

        let c = &mut self.cells[cell];
        let index = c.slots.len();
        c.index.insert(repr_key.clone(), index);
        c.keys.push((key, repr_key));
        c.slots.push(Draft::Absent);
        c.phase = Phase::ValueInProgress(index);
        Ok((
            Target::Slot(cell, index),
            SlotSpec {
                ty: SlotType::Typed(value_ty),
                view,
                nullable,
            },
        ))
    }

    /// Open the struct field or union member named by a string key.
    fn open_named(
        &mut self,
        cell: CellId,
        key: &str,
        view: View,
    ) -> Result<(Target, SlotSpec), NodeError> {
        let model = self.model;
        let ty = self.cells[cell].ty;
        let decl = model.schema().get(ty);
        let refs = model.schema().refs(ty);
        let (index, nullable) = match decl.def() {
            TypeDef::Struct(def) => {
                let field = match (view, def.repr.keys()) {
                    (View::Representation, Some(keys)) => keys.field_for(key),
                    _ => Some(key),
                };
                let (index, field) = field
                    .and_then(|f| def.field(f))
                    .ok_or_else(|| self.unrecognized(ty, key))?;
                if !matches!(self.cells[cell].slots[index], Draft::Absent) {
                    return Err(AssemblyError::FieldAlreadySet {
                        ty: decl.name().clone(),
                        field: field.name.clone(),
                    }
                    .into());
                }
                (index, field.is_nullable())
            }
            TypeDef::Union(def) => {
                let member = match view {
                    View::Typed => def.members.iter().position(|m| m == key),
                    View::Representation => def
                        .repr
                        .member_for(key)
                        .and_then(|name| def.members.iter().position(|m| m == name)),
                };
                let index = member.ok_or_else(|| self.unrecognized(ty, key))?;
                if self.cells[cell]
                    .slots
                    .iter()
                    .any(|d| !matches!(d, Draft::Absent))
                {
                    return Err(AssemblyError::UnionMemberAlreadySet {
                        ty: decl.name().clone(),
                    }
                    .into());
                }
                (index, false)
            }
            _ => return Err(self.unrecognized(ty, key)),
        };
        self.cells[cell].phase = Phase::ValueInProgress(index);
        Ok((
            Target::Slot(cell, index),
            SlotSpec {
                ty: SlotType::Typed(refs[index]),
                view,
                nullable,
            },
        ))
    }

    fn begin_item(&mut self, cell: CellId, view: View) -> Result<(Target, SlotSpec), NodeError> {
        self.check_open(cell)?;
        if let CellShape::Pair { owner } = self.cells[cell].shape {
            return self.begin_pair_item(cell, owner, view);
        }
        self.settle(cell)?;
        let model = self.model;
        let c = &mut self.cells[cell];
        let (index, ty, nullable) = match c.shape {
            CellShape::List { elem, nullable } => {
                c.slots.push(Draft::Absent);
                (c.slots.len() - 1, elem, nullable)
            }
            CellShape::Struct => {
                let decl = model.schema().get(c.ty);
                if let Some(StructRepr::Listpairs(_)) = decl.as_struct().map(|def| &def.repr) {
                    c.pending_key = Draft::Absent;
                    c.phase = Phase::PairInProgress;
                    return Ok((
                        Target::Key(cell),
                        SlotSpec {
                            ty: SlotType::Pair(cell),
                            view,
                            nullable: false,
                        },
                    ));
                }
                let fields = decl.as_struct().map_or(&[][..], |def| def.fields.as_slice());
                let index = c.next;
                let Some(field) = fields.get(index) else {
                    return Err(RepresentationError::TupleArity {
                        ty: decl.name().clone(),
                        expected: fields.len(),
                    }
                    .into());
                };
                c.next += 1;
                (index, model.schema().refs(c.ty)[index], field.is_nullable())
            }
            CellShape::Map { .. } | CellShape::Union => {
                let ty = c.ty;
                return Err(AssemblyError::KindMismatch {
                    ty: self.name_of(ty),
                    expected: Kind::Map,
                    found: Kind::List,
                }
                .into())
            }
            CellShape::Pair { .. } => return Err(AssemblyError::NotFinished.into()),
        };
        c.phase = Phase::ValueInProgress(index);
        Ok((
            Target::Slot(cell, index),
            SlotSpec {
                ty: SlotType::Typed(ty),
                view,
                nullable,
            },
        ))
    }

    /// Key first, then the value, written straight into the owner's field.
    fn begin_pair_item(
        &mut self,
        cell: CellId,
        owner: CellId,
        view: View,
    ) -> Result<(Target, SlotSpec), NodeError> {
        let owner_ty = self.cells[owner].ty;
        let c = &mut self.cells[cell];
        match c.next {
            0 => {
                c.next = 1;
                c.pending_key = Draft::Absent;
                c.phase = Phase::KeyInProgress;
                Ok((
                    Target::Key(cell),
                    SlotSpec {
                        ty: SlotType::Key(owner_ty),
                        view,
                        nullable: false,
                    },
                ))
            }
            1 => {
                c.next = 2;
                let key = std::mem::take(&mut c.pending_key);
                let Draft::Ready(Value::String(key)) = key else {
                    return Err(AssemblyError::IncompleteValue {
                        ty: self.name_of(owner_ty),
                    }
                    .into());
                };
                let (target, spec) = self.open_named(owner, &key, view)?;
                self.cells[owner].phase = Phase::PairInProgress;
                if let Target::Slot(_, index) = target {
                    self.cells[cell].phase = Phase::PairValue(owner, index);
                }
                Ok((target, spec))
            }
            _ => Err(RepresentationError::PairArity {
                ty: self.name_of(owner_ty),
            }
            .into()),
        }
    }

    fn finish_cell(&mut self, cell: CellId) -> Result<(), NodeError> {
        self.check_open(cell)?;
        if let CellShape::Pair { .. } = self.cells[cell].shape {
            if self.cells[cell].next != 2 {
                return Err(RepresentationError::PairArity {
                    ty: self.name_of(self.cells[cell].ty),
                }
                .into());
            }
            self.settle(cell)?;
            self.cells[cell].finished = true;
            self.refresh_state();
            return Ok(());
        }
        self.settle(cell)?;
        let model = self.model;
        let c = &self.cells[cell];
        let decl = model.schema().get(c.ty);
        match decl.def() {
            TypeDef::Struct(def) => {
                let missing = def
                    .fields
                    .iter()
                    .zip(&c.slots)
                    .find(|(field, slot)| !field.is_optional() && matches!(slot, Draft::Absent));
                if let Some((field, _)) = missing {
                    return Err(OptionalityError::RequiredFieldMissing {
                        ty: decl.name().clone(),
                        field: field.name.clone(),
                    }
                    .into());
                }
            }
            TypeDef::Union(_) => {
                if c.slots.iter().all(|d| matches!(d, Draft::Absent)) {
                    return Err(AssemblyError::EmptyUnion {
                        ty: decl.name().clone(),
                    }
                    .into());
                }
            }
            _ => {}
        }
        self.cells[cell].finished = true;
        tracing::trace!(ty = %decl.name(), id = cell, "cell finished");
        self.refresh_state();
        Ok(())
    }

    // === Freezing ===

    fn freeze(&mut self, ty: TypeId, draft: Draft) -> Result<Maybe<Value>, NodeError> {
        Ok(match draft {
            Draft::Absent => Maybe::Absent,
            Draft::Null => Maybe::Null,
            Draft::Ready(value) => Maybe::Value(value),
            Draft::Cell(id) => Maybe::Value(self.freeze_cell(id)?),
            Draft::Member { member, inner } => {
                let member_ty = self.model.schema().refs(ty)[member];
                let value = self.freeze_value(member_ty, *inner)?;
                Maybe::Value(Value::Union {
                    member,
                    value: Box::new(value),
                })
            }
        })
    }

    fn freeze_value(&mut self, ty: TypeId, draft: Draft) -> Result<Value, NodeError> {
        self.freeze(ty, draft)?
            .value()
            .ok_or_else(|| AssemblyError::NotFinished.into())
    }

    fn freeze_cell(&mut self, id: CellId) -> Result<Value, NodeError> {
        let model = self.model;
        let ty = self.cells[id].ty;
        let shape = self.cells[id].shape;
        let slots = std::mem::take(&mut self.cells[id].slots);
        let refs = model.schema().refs(ty);

        let slot_layout = |nullable: bool, ty: TypeId| {
            if nullable {
                model.maybe_layout(ty)
            } else {
                MaybeLayout::Embedded
            }
        };

        Ok(match shape {
            CellShape::List { elem, nullable } => {
                let layout = slot_layout(nullable, elem);
                let items = slots
                    .into_iter()
                    .map(|d| Ok(Slot::new(layout, self.freeze(elem, d)?)))
                    .collect::<Result<Vec<_>, NodeError>>()?;
                Value::List(items)
            }
            CellShape::Map {
                value: value_ty,
                nullable,
                ..
            } => {
                let layout = slot_layout(nullable, value_ty);
                let keys = std::mem::take(&mut self.cells[id].keys);
                let mut map = MapValue::with_capacity(keys.len());
                for ((key, repr_key), d) in keys.into_iter().zip(slots) {
                    let value = Slot::new(layout, self.freeze(value_ty, d)?);
                    map.insert(MapEntry {
                        key,
                        repr_key,
                        value,
                    });
                }
                Value::Map(map)
            }
            CellShape::Struct => {
                let fields = slots
                    .into_iter()
                    .enumerate()
                    .map(|(i, d)| Ok(Slot::new(model.field_layout(ty, i), self.freeze(refs[i], d)?)))
                    .collect::<Result<Box<[_]>, NodeError>>()?;
                Value::Struct(fields)
            }
            CellShape::Pair { .. } => return Err(AssemblyError::NotFinished.into()),
            CellShape::Union => {
                let (member, d) = slots
                    .into_iter()
                    .enumerate()
                    .find(|(_, d)| !matches!(d, Draft::Absent))
                    .ok_or(AssemblyError::NotFinished)?;
                let value = self.freeze_value(refs[member], d)?;
                Value::Union {
                    member,
                    value: Box::new(value),
                }
            }
        })
    }
}

impl std::fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("ty", self.type_name())
            .field("view", &self.view)
            .field("state", &self.state)
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}
