//! Maps whose keys are not plain strings.

use pretty_assertions::assert_eq;
use weft_node::{
    from_representation, AccessError, Datum, Node, NodeError, RepresentationError, TypedValue,
};
use weft_types::Kind;

use crate::common::{model, proto};

fn foo_map(model: &weft_layout::CompiledModel) -> TypedValue<'_> {
    proto(model, "Map__Foo__Int")
        .build_map(2, |map| {
            map.assemble_key()?.create_map(2, |key| {
                key.assemble_entry("foo")?.assign_string("fooval")?;
                key.assemble_entry("bar")?.assign_string("barval")
            })?;
            map.assemble_value()?.assign_int(1)?;
            map.assemble_key()?.create_map(2, |key| {
                key.assemble_entry("foo")?.assign_string("a")?;
                key.assemble_entry("bar")?.assign_string("b")
            })?;
            map.assemble_value()?.assign_int(2)
        })
        .unwrap()
}

#[test]
fn stringjoin_keys_are_structs_in_the_typed_view() {
    let model = model();
    let value = foo_map(&model);

    let (key, val) = value.node().entries().unwrap().next().unwrap();
    assert_eq!(key.kind(), Kind::Map);
    assert_eq!(key.lookup_by_key("foo").unwrap().as_string().unwrap(), "fooval");
    assert_eq!(key.lookup_by_key("bar").unwrap().as_string().unwrap(), "barval");
    assert_eq!(val.as_int().unwrap(), 1);

    let (key, _) = value.representation().entries().unwrap().next().unwrap();
    assert_eq!(key.kind(), Kind::String);
    assert_eq!(key.as_string().unwrap(), "fooval:barval");
}

#[test]
fn stringjoin_keys_are_looked_up_by_their_representation() {
    let model = model();
    let value = foo_map(&model);
    for node in [value.node(), value.representation()] {
        assert_eq!(node.lookup_by_key("a:b").unwrap().as_int().unwrap(), 2);
    }

    let (typed_key, _) = value.node().entries().unwrap().next().unwrap();
    assert_eq!(
        value.node().lookup_by_node(&typed_key).unwrap().as_int().unwrap(),
        1
    );
    assert_eq!(
        value
            .representation()
            .lookup_by_node(&Node::Key("fooval:barval"))
            .unwrap()
            .as_int()
            .unwrap(),
        1
    );
}

#[test]
fn stringjoin_keys_round_trip() {
    let model = model();
    let value = foo_map(&model);
    let datum = value.to_representation().unwrap();
    assert_eq!(
        datum,
        Datum::map([("fooval:barval", Datum::Int(1)), ("a:b", Datum::Int(2))])
    );

    let back = from_representation(proto(&model, "Map__Foo__Int"), &datum.node()).unwrap();
    assert_eq!(back, value);

    let built = proto(&model, "Map__Foo__Int.Repr")
        .build_map(2, |map| {
            map.assemble_entry("fooval:barval")?.assign_int(1)?;
            map.assemble_entry("a:b")?.assign_int(2)
        })
        .unwrap();
    assert_eq!(built, value);
}

#[test]
fn malformed_stringjoin_key() {
    let model = model();
    let datum = Datum::map([("no-separator", Datum::Int(1))]);
    let err = from_representation(proto(&model, "Map__Foo__Int"), &datum.node()).unwrap_err();
    assert_eq!(
        err,
        NodeError::Representation(RepresentationError::StringjoinArity {
            ty: "Foo".into(),
            input: "no-separator".to_owned(),
            expected: 2,
            found: 1,
        })
    );
}

#[test]
fn enum_keys() {
    let model = model();
    let value = proto(&model, "Map__Color__Int")
        .build_map(2, |map| {
            map.assemble_key()?.assign_string("Red")?;
            map.assemble_value()?.assign_int(1)?;
            map.assemble_key()?.assign_string("Blue")?;
            map.assemble_value()?.assign_int(3)
        })
        .unwrap();

    let typed_keys: Vec<String> = value
        .node()
        .entries()
        .unwrap()
        .map(|(k, _)| k.as_string().unwrap().into_owned())
        .collect();
    assert_eq!(typed_keys, ["Red", "Blue"]);

    let datum = value.to_representation().unwrap();
    assert_eq!(
        datum,
        Datum::map([("r", Datum::Int(1)), ("Blue", Datum::Int(3))])
    );
    assert_eq!(value.node().lookup_by_key("Red").unwrap().as_int().unwrap(), 1);
    assert_eq!(
        value.representation().lookup_by_key("r").unwrap().as_int().unwrap(),
        1
    );

    let back = from_representation(proto(&model, "Map__Color__Int"), &datum.node()).unwrap();
    assert_eq!(back, value);
}

#[test]
fn renamed_enum_members_reject_their_declared_name_as_key() {
    let model = model();
    let datum = Datum::map([("Red", Datum::Int(1))]);
    let err = from_representation(proto(&model, "Map__Color__Int"), &datum.node()).unwrap_err();
    assert_eq!(
        err,
        NodeError::Representation(RepresentationError::UnrecognizedField {
            ty: "Color".into(),
            key: "Red".to_owned(),
        })
    );
}

#[test]
fn enum_keys_read_as_member_names_in_the_typed_view() {
    let model = model();
    let value = proto(&model, "Map__Color__Int")
        .build_map(1, |map| map.assemble_entry("Red")?.assign_int(1))
        .unwrap();

    let typed = value.node();
    for (key, _) in typed.entries().unwrap() {
        let name = key.as_string().unwrap();
        assert_eq!(typed.lookup_by_key(&name).unwrap().as_int().unwrap(), 1);
        assert_eq!(typed.lookup_by_node(&key).unwrap().as_int().unwrap(), 1);
    }
    assert!(matches!(
        typed.lookup_by_key("r"),
        Err(AccessError::NotExists { .. })
    ));
    assert!(value.representation().lookup_by_key("Red").is_err());

    let repr = proto(&model, "Map__Color__Int.Repr")
        .build_map(1, |map| map.assemble_entry("r")?.assign_int(1))
        .unwrap();
    assert_eq!(repr, value);

    let err = proto(&model, "Map__Color__Int")
        .build_map(1, |map| map.assemble_entry("r")?.assign_int(1))
        .unwrap_err();
    assert_eq!(
        err,
        NodeError::Representation(RepresentationError::UnrecognizedField {
            ty: "Color".into(),
            key: "r".to_owned(),
        })
    );
}
