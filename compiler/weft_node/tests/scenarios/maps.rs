//! String-keyed maps through both views.

use pretty_assertions::assert_eq;
use weft_layout::{AdjunctConfig, MaybeLayout};
use weft_node::{
    from_representation, AccessError, AssemblyError, Datum, NodeError, TypedValue, Value, View,
};

use crate::common::{model, model_with, proto, s};

#[test]
fn typed_and_representation_builds_agree() {
    let model = model();
    let typed = proto(&model, "Map__String__String")
        .build_map(2, |map| {
            map.assemble_entry("whee")?.assign_string("zow")?;
            map.assemble_entry("woot")?.assign_string("waga")
        })
        .unwrap();
    let repr = proto(&model, "Map__String__String.Repr")
        .build_map(2, |map| {
            map.assemble_entry("whee")?.assign_string("zow")?;
            map.assemble_entry("woot")?.assign_string("waga")
        })
        .unwrap();
    assert_eq!(typed, repr);

    let datum = typed.to_representation().unwrap();
    assert_eq!(datum, Datum::map([("whee", s("zow")), ("woot", s("waga"))]));

    let back = from_representation(proto(&model, "Map__String__String"), &datum.node()).unwrap();
    assert_eq!(back, typed);
}

#[test]
fn both_views_read_the_same_entries() {
    let model = model();
    let value = proto(&model, "Map__String__String")
        .build_map(1, |map| map.assemble_entry("k")?.assign_string("v"))
        .unwrap();
    for node in [value.node(), value.representation()] {
        assert_eq!(node.length().unwrap(), 1);
        assert_eq!(node.lookup_by_key("k").unwrap().as_string().unwrap(), "v");
        assert_eq!(
            node.lookup_by_key("missing").unwrap_err(),
            AccessError::NotExists {
                key: "missing".to_owned()
            }
        );
    }
}

fn nullable_map<'m>(model: &'m weft_layout::CompiledModel) -> TypedValue<'m> {
    proto(model, "Map__String__nullable__String")
        .build_map(2, |map| {
            map.assemble_entry("present")?.assign_string("here")?;
            map.assemble_entry("nothing")?.assign_null()
        })
        .unwrap()
}

#[test]
fn null_values_differ_from_missing_keys_in_either_layout() {
    for layout in [MaybeLayout::Embedded, MaybeLayout::Indirect] {
        let model = model_with(AdjunctConfig::new().with_maybe_layout("String", layout));
        let value = nullable_map(&model);

        let Value::Map(map) = value.value() else {
            panic!("expected a map");
        };
        assert!(map.entries().iter().all(|e| e.value.layout() == layout));

        let node = value.node();
        assert_eq!(node.length().unwrap(), 2);
        assert!(node.lookup_by_key("nothing").unwrap().is_null());
        assert_eq!(
            node.lookup_by_key("present").unwrap().as_string().unwrap(),
            "here"
        );
        assert!(matches!(
            node.lookup_by_key("absent"),
            Err(AccessError::NotExists { .. })
        ));

        let datum = value.to_representation().unwrap();
        assert_eq!(
            datum,
            Datum::map([("present", s("here")), ("nothing", Datum::Null)])
        );
    }
}

#[test]
fn layouts_do_not_change_equality() {
    let embedded = model_with(AdjunctConfig::new().with_maybe_layout("String", MaybeLayout::Embedded));
    let indirect = model_with(AdjunctConfig::new().with_maybe_layout("String", MaybeLayout::Indirect));
    assert_eq!(nullable_map(&embedded).value(), nullable_map(&indirect).value());
}

#[test]
fn omitted_nulls_are_lost_in_a_round_trip() {
    let model = model();
    let value = proto(&model, "Sparse")
        .build_map(2, |map| {
            map.assemble_entry("a")?.assign_string("x")?;
            map.assemble_entry("b")?.assign_null()
        })
        .unwrap();
    assert_eq!(value.node().length().unwrap(), 2);

    let datum = value.to_representation().unwrap();
    assert_eq!(datum, Datum::map([("a", s("x"))]));

    let back = from_representation(proto(&model, "Sparse"), &datum.node()).unwrap();
    assert_eq!(back.node().length().unwrap(), 1);
    assert_ne!(back, value);
}

fn frub(v: &str) -> Datum {
    Datum::map([("encoded", s(v))])
}

#[test]
fn nested_maps_of_renamed_structs() {
    let model = model();
    let name = "Map__String__nullable__Map__String__nullable__Frub";
    let value = proto(&model, name)
        .build_map(3, |outer| {
            outer.assemble_entry("one")?.create_map(2, |inner| {
                inner
                    .assemble_entry("a")?
                    .create_map(1, |f| f.assemble_entry("field")?.assign_string("1a"))?;
                inner.assemble_entry("b")?.assign_null()
            })?;
            outer.assemble_entry("two")?.create_map(1, |inner| {
                inner
                    .assemble_entry("c")?
                    .create_map(1, |f| f.assemble_entry("field")?.assign_string("2c"))
            })?;
            outer.assemble_entry("three")?.assign_null()
        })
        .unwrap();

    let node = value.node();
    let field = node
        .lookup_by_key("one")
        .and_then(|n| n.lookup_by_key("a"))
        .and_then(|n| n.lookup_by_key("field"))
        .unwrap();
    assert_eq!(field.as_string().unwrap(), "1a");
    assert!(node.lookup_by_key("three").unwrap().is_null());

    let expected = Datum::map([
        ("one", Datum::map([("a", frub("1a")), ("b", Datum::Null)])),
        ("two", Datum::map([("c", frub("2c"))])),
        ("three", Datum::Null),
    ]);
    let datum = value.to_representation().unwrap();
    assert_eq!(datum, expected);

    let back = from_representation(proto(&model, name), &datum.node()).unwrap();
    assert_eq!(back, value);
}

#[test]
fn representation_builds_use_representation_keys() {
    let model = model();
    let value = proto(&model, "Map__String__nullable__Frub.Repr")
        .build_map(1, |map| {
            map.assemble_entry("k")?
                .create_map(1, |f| f.assemble_entry("encoded")?.assign_string("v"))
        })
        .unwrap();
    let frub = value.node().lookup_by_key("k").unwrap();
    assert_eq!(frub.lookup_by_key("field").unwrap().as_string().unwrap(), "v");
    assert_eq!(
        frub.as_typed().map(|n| n.view()),
        Some(View::Typed)
    );
}

#[test]
fn duplicate_keys_in_a_representation_are_rejected() {
    let model = model();
    let datum = Datum::map([("k", s("1")), ("k", s("2"))]);
    let err = from_representation(proto(&model, "Map__String__String"), &datum.node()).unwrap_err();
    assert_eq!(
        err,
        NodeError::Assembly(AssemblyError::DuplicateKey {
            ty: "Map__String__String".into(),
            key: "k".to_owned(),
        })
    );
}
