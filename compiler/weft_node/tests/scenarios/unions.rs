//! Union and enum strategies.

use pretty_assertions::assert_eq;
use weft_node::{from_representation, Datum, NodeError, RepresentationError};
use weft_types::Kind;

use crate::common::{model, proto, s};

#[test]
fn keyed_unions() {
    let model = model();
    let value = proto(&model, "Shape")
        .build_map(1, |map| {
            map.assemble_entry("Frub")?
                .create_map(1, |f| f.assemble_entry("field")?.assign_string("v"))
        })
        .unwrap();

    let typed_key = value.node().entries().unwrap().next().unwrap().0;
    assert_eq!(typed_key.as_string().unwrap(), "Frub");

    let datum = value.to_representation().unwrap();
    assert_eq!(
        datum,
        Datum::map([("frub", Datum::map([("encoded", s("v"))]))])
    );
    assert_eq!(
        from_representation(proto(&model, "Shape"), &datum.node()).unwrap(),
        value
    );

    let point = Datum::map([("point", Datum::list([Datum::Int(1), Datum::Int(2)]))]);
    let value = from_representation(proto(&model, "Shape"), &point.node()).unwrap();
    let inner = value.node().lookup_by_key("Point").unwrap();
    assert_eq!(inner.lookup_by_key("y").unwrap().as_int().unwrap(), 2);
}

#[test]
fn keyed_union_rejects_unknown_discriminants() {
    let model = model();
    let datum = Datum::map([("Frub", Datum::map([("encoded", s("v"))]))]);
    assert_eq!(
        from_representation(proto(&model, "Shape"), &datum.node()).unwrap_err(),
        NodeError::Representation(RepresentationError::UnrecognizedField {
            ty: "Shape".into(),
            key: "Frub".to_owned(),
        })
    );
}

#[test]
fn kinded_unions_pick_the_member_by_kind() {
    let model = model();

    let int = from_representation(proto(&model, "Either"), &Datum::Int(7).node()).unwrap();
    assert_eq!(int.node().lookup_by_key("Int").unwrap().as_int().unwrap(), 7);
    assert_eq!(int.representation().kind(), Kind::Int);

    let string = from_representation(proto(&model, "Either"), &s("x").node()).unwrap();
    assert_eq!(
        string.node().lookup_by_key("String").unwrap().as_string().unwrap(),
        "x"
    );

    let frub = Datum::map([("encoded", s("v"))]);
    let value = from_representation(proto(&model, "Either"), &frub.node()).unwrap();
    let member = value.node().lookup_by_key("Frub").unwrap();
    assert_eq!(member.lookup_by_key("field").unwrap().as_string().unwrap(), "v");
    assert_eq!(value.to_representation().unwrap(), frub);

    assert_eq!(
        from_representation(proto(&model, "Either"), &Datum::Bool(true).node()).unwrap_err(),
        NodeError::Representation(RepresentationError::NoKindedMember {
            ty: "Either".into(),
            found: Kind::Bool,
        })
    );
}

#[test]
fn kinded_union_typed_and_representation_builds_agree() {
    let model = model();
    let typed = proto(&model, "Either")
        .build_map(1, |map| {
            map.assemble_entry("Frub")?
                .create_map(1, |f| f.assemble_entry("field")?.assign_string("v"))
        })
        .unwrap();
    let repr = proto(&model, "Either.Repr")
        .build_map(1, |map| map.assemble_entry("encoded")?.assign_string("v"))
        .unwrap();
    assert_eq!(typed, repr);
}

#[test]
fn string_enums() {
    let model = model();
    let red = from_representation(proto(&model, "Color"), &s("r").node()).unwrap();
    assert_eq!(red.node().as_string().unwrap(), "Red");
    assert_eq!(red.to_representation().unwrap(), s("r"));

    let green = proto(&model, "Color").build_string("Green").unwrap();
    assert_eq!(green.to_representation().unwrap(), s("Green"));

    assert!(matches!(
        from_representation(proto(&model, "Color"), &s("Purple").node()),
        Err(NodeError::Representation(RepresentationError::UnrecognizedField { .. }))
    ));
}

#[test]
fn int_enums() {
    let model = model();
    let high = from_representation(proto(&model, "Level"), &Datum::Int(10).node()).unwrap();
    assert_eq!(high.node().as_string().unwrap(), "High");
    assert_eq!(high.to_representation().unwrap(), Datum::Int(10));

    assert_eq!(
        from_representation(proto(&model, "Level"), &Datum::Int(5).node()).unwrap_err(),
        NodeError::Representation(RepresentationError::UnrecognizedField {
            ty: "Level".into(),
            key: "5".to_owned(),
        })
    );
    assert!(matches!(
        from_representation(proto(&model, "Level"), &s("High").node()),
        Err(NodeError::Representation(RepresentationError::Mismatch {
            expected: Kind::Int,
            found: Kind::String,
            ..
        }))
    ));
}
