//! Struct strategies and recursive structs.

use pretty_assertions::assert_eq;
use weft_layout::MaybeLayout;
use weft_node::{
    from_representation, AssemblyError, Datum, MapAssembler, NodeError, OptionalityError,
    RepresentationError,
};
use weft_types::Kind;

use crate::common::{model, proto, s};

#[test]
fn renamed_fields_round_trip() {
    let model = model();
    let value = proto(&model, "Frub")
        .build_map(1, |map| map.assemble_entry("field")?.assign_string("v"))
        .unwrap();
    let datum = value.to_representation().unwrap();
    assert_eq!(datum, Datum::map([("encoded", s("v"))]));
    assert_eq!(
        from_representation(proto(&model, "Frub"), &datum.node()).unwrap(),
        value
    );
}

#[test]
fn unknown_and_missing_fields() {
    let model = model();
    let unknown = Datum::map([("encoded", s("v")), ("extra", s("x"))]);
    assert_eq!(
        from_representation(proto(&model, "Frub"), &unknown.node()).unwrap_err(),
        NodeError::Representation(RepresentationError::UnrecognizedField {
            ty: "Frub".into(),
            key: "extra".to_owned(),
        })
    );

    let missing = Datum::map::<&str>([]);
    assert_eq!(
        from_representation(proto(&model, "Frub"), &missing.node()).unwrap_err(),
        NodeError::Optionality(OptionalityError::RequiredFieldMissing {
            ty: "Frub".into(),
            field: "field".to_owned(),
        })
    );
}

#[test]
fn tuple_structs() {
    let model = model();
    let datum = Datum::list([Datum::Int(3), Datum::Int(4)]);
    let value = from_representation(proto(&model, "Point"), &datum.node()).unwrap();

    let node = value.node();
    assert_eq!(node.lookup_by_key("x").unwrap().as_int().unwrap(), 3);
    assert_eq!(node.lookup_by_key("y").unwrap().as_int().unwrap(), 4);
    assert_eq!(value.to_representation().unwrap(), datum);

    let long = Datum::list([Datum::Int(1), Datum::Int(2), Datum::Int(3)]);
    assert_eq!(
        from_representation(proto(&model, "Point"), &long.node()).unwrap_err(),
        NodeError::Representation(RepresentationError::TupleArity {
            ty: "Point".into(),
            expected: 2,
        })
    );
}

#[test]
fn stringjoin_structs() {
    let model = model();
    let value = proto(&model, "Foo")
        .build_map(2, |map| {
            map.assemble_entry("foo")?.assign_string("x")?;
            map.assemble_entry("bar")?.assign_string("y")
        })
        .unwrap();
    assert_eq!(value.to_representation().unwrap(), s("x:y"));

    let back = from_representation(proto(&model, "Foo"), &s("x:y").node()).unwrap();
    assert_eq!(back, value);

    let err = from_representation(proto(&model, "Foo"), &s("x:y:z").node()).unwrap_err();
    assert!(matches!(
        err,
        NodeError::Representation(RepresentationError::StringjoinArity { found: 3, .. })
    ));
}

#[test]
fn listpairs_structs() {
    let model = model();
    let value = proto(&model, "Setting")
        .build_map(2, |map| {
            map.assemble_entry("name")?.assign_string("depth")?;
            map.assemble_entry("level")?.assign_int(3)
        })
        .unwrap();

    let repr = value.representation();
    assert_eq!(repr.kind(), Kind::List);
    assert_eq!(repr.length().unwrap(), 2);
    assert_eq!(repr.values().unwrap().count(), 2);
    let first = repr.lookup_by_index(0).unwrap();
    assert_eq!(first.length().unwrap(), 2);
    assert_eq!(first.lookup_by_index(0).unwrap().as_string().unwrap(), "n");
    assert_eq!(first.lookup_by_index(1).unwrap().as_string().unwrap(), "depth");
    assert!(repr.lookup_by_index(2).is_err());

    let datum = value.to_representation().unwrap();
    assert_eq!(
        datum,
        Datum::list([
            Datum::list([s("n"), s("depth")]),
            Datum::list([s("level"), Datum::Int(3)]),
        ])
    );
    assert_eq!(
        from_representation(proto(&model, "Setting"), &datum.node()).unwrap(),
        value
    );
}

#[test]
fn listpairs_pairs_may_arrive_in_any_order() {
    let model = model();
    let datum = Datum::list([
        Datum::list([s("level"), Datum::Int(1)]),
        Datum::list([s("note"), Datum::Null]),
        Datum::list([s("n"), s("x")]),
    ]);
    let value = from_representation(proto(&model, "Setting"), &datum.node()).unwrap();
    assert!(value.node().lookup_by_key("note").unwrap().is_null());
    assert_eq!(
        value.to_representation().unwrap(),
        Datum::list([
            Datum::list([s("n"), s("x")]),
            Datum::list([s("note"), Datum::Null]),
            Datum::list([s("level"), Datum::Int(1)]),
        ])
    );
}

#[test]
fn malformed_listpairs() {
    let model = model();
    let decode = |datum: Datum| {
        from_representation(proto(&model, "Setting"), &datum.node()).unwrap_err()
    };
    let pair_arity = NodeError::Representation(RepresentationError::PairArity {
        ty: "Setting".into(),
    });

    assert_eq!(decode(Datum::list([Datum::list([s("n")])])), pair_arity);
    assert_eq!(
        decode(Datum::list([Datum::list([s("n"), s("x"), s("y")])])),
        pair_arity
    );
    assert_eq!(
        decode(Datum::list([Datum::list([s("name"), s("x")])])),
        NodeError::Representation(RepresentationError::UnrecognizedField {
            ty: "Setting".into(),
            key: "name".to_owned(),
        })
    );
    assert_eq!(
        decode(Datum::list([
            Datum::list([s("n"), s("x")]),
            Datum::list([s("n"), s("y")]),
        ])),
        NodeError::Assembly(AssemblyError::FieldAlreadySet {
            ty: "Setting".into(),
            field: "name".to_owned(),
        })
    );
    assert_eq!(
        decode(Datum::list([Datum::list([s("n"), s("x")])])),
        NodeError::Optionality(OptionalityError::RequiredFieldMissing {
            ty: "Setting".into(),
            field: "level".to_owned(),
        })
    );
}

fn fill_chain(map: &mut MapAssembler<'_, '_>, values: &[i64]) -> Result<(), NodeError> {
    let Some((&head, rest)) = values.split_first() else {
        return Ok(());
    };
    map.assemble_entry("head")?.assign_int(head)?;
    if !rest.is_empty() {
        map.assemble_entry("tail")?
            .create_map(2, |tail| fill_chain(tail, rest))?;
    }
    Ok(())
}

#[test]
fn recursive_structs_are_boxed() {
    let model = model();
    assert!(model.is_recursive("Chain").unwrap());
    assert_eq!(
        model.field_layout_of("Chain", "tail").unwrap(),
        MaybeLayout::Indirect
    );

    let value = proto(&model, "Chain")
        .build_map(2, |map| fill_chain(map, &[1, 2, 3]))
        .unwrap();

    let third = value
        .node()
        .lookup_by_key("tail")
        .and_then(|n| n.lookup_by_key("tail"))
        .unwrap();
    assert_eq!(third.lookup_by_key("head").unwrap().as_int().unwrap(), 3);
    assert!(third.lookup_by_key("tail").is_err());

    let datum = value.to_representation().unwrap();
    let expected = Datum::map([
        ("head", Datum::Int(1)),
        (
            "tail",
            Datum::map([
                ("head", Datum::Int(2)),
                ("tail", Datum::map([("head", Datum::Int(3))])),
            ]),
        ),
    ]);
    assert_eq!(datum, expected);
    assert_eq!(
        from_representation(proto(&model, "Chain"), &datum.node()).unwrap(),
        value
    );
}

#[test]
fn build_from_copies_between_views() {
    let model = model();
    let value = proto(&model, "Frub")
        .build_map(1, |map| map.assemble_entry("field")?.assign_string("v"))
        .unwrap();

    let copied = proto(&model, "Frub.Repr")
        .build_from(&value.representation())
        .unwrap();
    assert_eq!(copied, value);

    let copied = proto(&model, "Frub").build_from(&value.node()).unwrap();
    assert_eq!(copied, value);
}
