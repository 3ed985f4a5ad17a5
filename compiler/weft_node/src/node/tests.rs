use pretty_assertions::assert_eq;
use weft_layout::{compile, AdjunctConfig, CompiledModel};
use weft_types::{EnumRepr, FieldDef, MapRepr, StructRepr, Type, TypeSystem, UnionRepr};

use super::*;
use crate::{NodeError, Prototype, TypedValue};

fn model() -> CompiledModel {
    let mut ts = TypeSystem::with_prelude();
    for ty in [
        Type::structure(
            "Frub",
            vec![
                FieldDef::required("field", "String"),
                FieldDef::new("note", "String", true, true),
            ],
            StructRepr::map_with_renames([("field", "encoded")]),
        ),
        Type::structure(
            "Point",
            vec![FieldDef::required("x", "Int"), FieldDef::required("y", "Int")],
            StructRepr::tuple(),
        ),
        Type::structure(
            "Pair",
            vec![FieldDef::required("a", "String"), FieldDef::required("b", "String")],
            StructRepr::stringjoin(":"),
        ),
        Type::enumeration(
            "Color",
            ["Red", "Green"],
            EnumRepr::string_with_renames([("Red", "r")]),
        ),
        Type::enumeration("Level", ["Low", "High"], EnumRepr::int([("Low", 1), ("High", 10)])),
        Type::union(
            "Shape",
            ["Point", "Frub"],
            UnionRepr::keyed([("Point", "p"), ("Frub", "f")]),
        ),
        Type::union("Either", ["Int", "Frub"], UnionRepr::kinded()),
        Type::map_with_repr("Sparse", "String", "Int", true, MapRepr::omit_nulls()),
        Type::list("Ints", "Int", true),
    ] {
        ts.accumulate(ty).unwrap();
    }
    compile(ts.finalize().unwrap(), AdjunctConfig::new()).unwrap()
}

fn proto<'m>(model: &'m CompiledModel, name: &str) -> Prototype<'m> {
    Prototype::by_name(model, name).unwrap()
}

fn frub<'m>(model: &'m CompiledModel, note: Option<Option<&str>>) -> TypedValue<'m> {
    proto(model, "Frub")
        .build_map(2, |map| {
            map.assemble_entry("field")?.assign_string("hello")?;
            match note {
                None => Ok(()),
                Some(None) => map.assemble_entry("note")?.assign_null(),
                Some(Some(s)) => map.assemble_entry("note")?.assign_string(s),
            }
        })
        .unwrap()
}

fn keys(node: &Node<'_>) -> Vec<String> {
    node.entries()
        .unwrap()
        .map(|(k, _)| k.as_string().unwrap().into_owned())
        .collect()
}

#[test]
fn struct_reads_through_both_views() {
    let model = model();
    let value = frub(&model, Some(Some("n")));

    let typed = value.node();
    assert_eq!(typed.kind(), Kind::Map);
    assert_eq!(keys(&typed), ["field", "note"]);
    assert_eq!(typed.lookup_by_key("field").unwrap().as_string().unwrap(), "hello");

    let repr = value.representation();
    assert_eq!(keys(&repr), ["encoded", "note"]);
    assert_eq!(repr.lookup_by_key("encoded").unwrap().as_string().unwrap(), "hello");
    assert_eq!(
        repr.lookup_by_key("field").unwrap_err(),
        AccessError::NotExists {
            key: "field".to_owned()
        }
    );
}

#[test]
fn struct_length_counts_present_fields() {
    let model = model();

    let absent = frub(&model, None);
    assert_eq!(absent.node().length().unwrap(), 1);
    assert_eq!(absent.representation().length().unwrap(), 1);
    assert!(matches!(
        absent.node().lookup_by_key("note"),
        Err(AccessError::NotExists { .. })
    ));

    let null = frub(&model, Some(None));
    assert_eq!(null.node().length().unwrap(), 2);
    assert!(null.node().lookup_by_key("note").unwrap().is_null());
}

#[test]
fn tuple_struct_reads_as_list() {
    let model = model();
    let value = proto(&model, "Point")
        .build_map(2, |map| {
            map.assemble_entry("x")?.assign_int(3)?;
            map.assemble_entry("y")?.assign_int(4)
        })
        .unwrap();

    assert_eq!(value.node().kind(), Kind::Map);
    let repr = value.representation();
    assert_eq!(repr.kind(), Kind::List);
    assert_eq!(repr.length().unwrap(), 2);
    assert_eq!(repr.lookup_by_index(1).unwrap().as_int().unwrap(), 4);
    assert_eq!(
        repr.lookup_by_index(2).unwrap_err(),
        AccessError::OutOfRange { index: 2, len: 2 }
    );
    let items: Vec<i64> = repr.values().unwrap().map(|n| n.as_int().unwrap()).collect();
    assert_eq!(items, [3, 4]);
}

#[test]
fn stringjoin_struct_reads_as_string() {
    let model = model();
    let value = proto(&model, "Pair.Repr").build_string("left:right").unwrap();

    assert_eq!(value.representation().as_string().unwrap(), "left:right");
    let typed = value.node();
    assert_eq!(typed.lookup_by_key("a").unwrap().as_string().unwrap(), "left");
    assert_eq!(typed.lookup_by_key("b").unwrap().as_string().unwrap(), "right");
}

#[test]
fn enums_read_per_strategy() {
    let model = model();
    let red = proto(&model, "Color").build_string("Red").unwrap();
    assert_eq!(red.node().as_string().unwrap(), "Red");
    assert_eq!(red.representation().as_string().unwrap(), "r");

    let green = proto(&model, "Color.Repr").build_string("Green").unwrap();
    assert_eq!(green.representation().as_string().unwrap(), "Green");

    let high = proto(&model, "Level.Repr").build_int(10).unwrap();
    assert_eq!(high.node().as_string().unwrap(), "High");
    assert_eq!(high.representation().kind(), Kind::Int);
    assert_eq!(high.representation().as_int().unwrap(), 10);
}

#[test]
fn keyed_union_is_a_single_entry_map() {
    let model = model();
    let value = proto(&model, "Shape")
        .build_map(1, |map| {
            map.assemble_entry("Point")?.create_map(2, |point| {
                point.assemble_entry("x")?.assign_int(1)?;
                point.assemble_entry("y")?.assign_int(2)
            })
        })
        .unwrap();

    assert_eq!(value.node().length().unwrap(), 1);
    assert_eq!(keys(&value.node()), ["Point"]);
    let repr = value.representation();
    assert_eq!(keys(&repr), ["p"]);
    let point = repr.lookup_by_key("p").unwrap();
    assert_eq!(point.kind(), Kind::List);
    assert!(repr.lookup_by_key("Point").is_err());
}

#[test]
fn kinded_union_reads_as_its_member() {
    let model = model();
    let typed = proto(&model, "Either")
        .build_map(1, |map| map.assemble_entry("Int")?.assign_int(5))
        .unwrap();
    let repr = proto(&model, "Either.Repr").build_int(5).unwrap();
    assert_eq!(typed, repr);

    assert_eq!(typed.node().kind(), Kind::Map);
    assert_eq!(typed.representation().kind(), Kind::Int);
    assert_eq!(typed.representation().as_int().unwrap(), 5);

    let err = proto(&model, "Either.Repr").build_string("x").unwrap_err();
    assert_eq!(
        err,
        NodeError::Representation(crate::RepresentationError::NoKindedMember {
            ty: "Either".into(),
            found: Kind::String,
        })
    );
}

#[test]
fn omitted_nulls_vanish_from_the_representation() {
    let model = model();
    let value = proto(&model, "Sparse")
        .build_map(2, |map| {
            map.assemble_entry("a")?.assign_int(1)?;
            map.assemble_entry("b")?.assign_null()
        })
        .unwrap();

    let typed = value.node();
    assert_eq!(typed.length().unwrap(), 2);
    assert!(typed.lookup_by_key("b").unwrap().is_null());

    let repr = value.representation();
    assert_eq!(repr.length().unwrap(), 1);
    assert_eq!(keys(&repr), ["a"]);
    assert_eq!(
        repr.lookup_by_key("b").unwrap_err(),
        AccessError::NotExists { key: "b".to_owned() }
    );
}

#[test]
fn null_list_elements() {
    let model = model();
    let value = proto(&model, "Ints")
        .build_list(2, |list| {
            list.assemble_value()?.assign_null()?;
            list.assemble_value()?.assign_int(9)
        })
        .unwrap();
    let node = value.node();
    assert!(node.lookup_by_index(0).unwrap().is_null());
    assert_eq!(node.lookup_by_index(1).unwrap().as_int().unwrap(), 9);
}

#[test]
fn wrong_kind_reads() {
    let model = model();
    let value = frub(&model, None);
    assert_eq!(
        value.node().as_int().unwrap_err(),
        AccessError::WrongKind {
            expected: Kind::Int,
            found: Kind::Map,
        }
    );
    assert_eq!(
        value.node().lookup_by_index(0).unwrap_err(),
        AccessError::WrongKind {
            expected: Kind::List,
            found: Kind::Map,
        }
    );

    let int = proto(&model, "Int").build_int(1).unwrap();
    assert_eq!(
        int.node().length().unwrap_err(),
        AccessError::WrongKind {
            expected: Kind::Map,
            found: Kind::Int,
        }
    );
    assert!(Node::Null.as_string().is_err());
}

#[test]
fn lookup_by_node_uses_the_key_representation() {
    let model = model();
    let value = frub(&model, None);
    let repr = value.representation();
    let datum = Datum::from("encoded");

    assert_eq!(
        repr.lookup_by_node(&Node::Key("encoded")).unwrap().as_string().unwrap(),
        "hello"
    );
    assert_eq!(
        repr.lookup_by_node(&datum.node()).unwrap().as_string().unwrap(),
        "hello"
    );
}

#[test]
fn entries_restart_from_a_clone() {
    let model = model();
    let value = frub(&model, Some(Some("n")));
    let entries = value.node().entries().unwrap();
    let first: Vec<_> = entries.clone().map(|(k, _)| k.as_string().unwrap()).collect();
    let second: Vec<_> = entries.map(|(k, _)| k.as_string().unwrap()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn views_switch_without_copying() {
    let model = model();
    let value = frub(&model, None);
    let node = value.node();
    let typed = node.as_typed().unwrap();
    assert_eq!(typed.view(), View::Typed);
    let repr = typed.representation();
    assert_eq!(repr.view(), View::Representation);
    assert!(std::ptr::eq(typed.value(), repr.value()));
    assert_eq!(repr.typed().view(), View::Typed);
}
