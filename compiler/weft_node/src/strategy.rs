//! Representation strategy mappings.
//!
//! The pure, value-level half of each strategy: joining and splitting
//! stringjoin structs, mapping enum members to and from their represented
//! strings or ints, and picking the member of a kinded union. The read
//! views and the assemblers call into these; neither encodes a strategy
//! on its own.

use weft_types::{EnumDef, EnumRepr, Kind, Schema, TypeId, TypeName};

use crate::{RepresentationError, Slot, Value};

/// Join the string fields of a stringjoin struct.
pub(crate) fn join_fields(join: &str, slots: &[Slot]) -> String {
    let parts: Vec<&str> = slots
        .iter()
        .filter_map(|slot| match slot.get().value() {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    parts.join(join)
}

/// Split a stringjoin representation into exactly `expected` parts.
///
/// Separators inside field values are not escaped, so a value containing
/// the separator splits into too many parts.
pub(crate) fn split_fields<'s>(
    ty: &TypeName,
    join: &str,
    input: &'s str,
    expected: usize,
) -> Result<Vec<&'s str>, RepresentationError> {
    let parts: Vec<&str> = input.split(join).collect();
    if parts.len() != expected {
        return Err(RepresentationError::StringjoinArity {
            ty: ty.clone(),
            input: input.to_owned(),
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

/// Represented string of an enum member; `None` for int enums.
pub(crate) fn enum_string(def: &EnumDef, member: usize) -> Option<&str> {
    let name = def.members.get(member)?;
    match &def.repr {
        EnumRepr::String(renames) => Some(
            renames
                .iter()
                .find(|(m, _)| m == name)
                .map_or(name.as_str(), |(_, s)| s.as_str()),
        ),
        EnumRepr::Int(_) => None,
    }
}

/// Member whose represented string is `s`.
pub(crate) fn enum_from_string(def: &EnumDef, s: &str) -> Option<usize> {
    let EnumRepr::String(renames) = &def.repr else {
        return None;
    };
    if let Some((member, _)) = renames.iter().find(|(_, r)| r == s) {
        return def.member(member);
    }
    if renames.iter().any(|(m, _)| m == s) {
        return None;
    }
    def.member(s)
}

/// Represented int of an enum member; `None` for string enums.
pub(crate) fn enum_int(def: &EnumDef, member: usize) -> Option<i64> {
    let name = def.members.get(member)?;
    match &def.repr {
        EnumRepr::Int(values) => values.iter().find(|(m, _)| m == name).map(|&(_, v)| v),
        EnumRepr::String(_) => None,
    }
}

/// Member whose represented int is `v`.
pub(crate) fn enum_from_int(def: &EnumDef, v: i64) -> Option<usize> {
    match &def.repr {
        EnumRepr::Int(values) => values
            .iter()
            .find(|&&(_, value)| value == v)
            .and_then(|(m, _)| def.member(m)),
        EnumRepr::String(_) => None,
    }
}

/// Member of a kinded union whose representation has the given kind.
pub(crate) fn kinded_member(schema: &Schema, union: TypeId, kind: Kind) -> Option<(usize, TypeId)> {
    schema
        .refs(union)
        .iter()
        .enumerate()
        .find(|&(_, &member)| schema.get(member).representation_kind() == Some(kind))
        .map(|(i, &member)| (i, member))
}
