//! Copying nodes through assemblers, and the two representation mappings.

use weft_types::Kind;

use crate::{Datum, Node, NodeAssembler, NodeError, Prototype, TypedValue};

/// Assign `node` into `target`, recursing through maps and lists.
///
/// Map keys are copied through `assemble_key`, so typed keys land in typed
/// key slots and string keys in representation ones.
pub fn copy_node(target: NodeAssembler<'_, '_>, node: &Node<'_>) -> Result<(), NodeError> {
    match node.kind() {
        Kind::Null => target.assign_null(),
        Kind::Bool => target.assign_bool(node.as_bool()?),
        Kind::Int => target.assign_int(node.as_int()?),
        Kind::Float => target.assign_float(node.as_float()?),
        Kind::String => target.assign_string(&node.as_string()?),
        Kind::Bytes => target.assign_bytes(node.as_bytes()?),
        Kind::Link => target.assign_link(node.as_link()?),
        Kind::List => {
            let mut list = target.begin_list(node.length()?)?;
            for item in node.values()? {
                copy_node(list.assemble_value()?, &item)?;
            }
            list.finish()
        }
        Kind::Map => {
            let mut map = target.begin_map(node.length()?)?;
            for (key, value) in node.entries()? {
                copy_node(map.assemble_key()?, &key)?;
                copy_node(map.assemble_value()?, &value)?;
            }
            map.finish()
        }
    }
}

/// The representation of a typed value as a generic tree.
pub fn to_representation(value: &TypedValue<'_>) -> Result<Datum, NodeError> {
    value.to_representation()
}

/// Decode a representation node into a value of the prototype's type.
pub fn from_representation<'m>(
    prototype: Prototype<'m>,
    node: &Node<'_>,
) -> Result<TypedValue<'m>, NodeError> {
    prototype.representation().build_from(node)
}
