//! Shared fixture for node scenarios.
//!
//! One schema covers every strategy the scenarios exercise. Tests that care
//! about layouts compile it with their own `AdjunctConfig`.

use std::sync::Once;

use weft_layout::{compile, AdjunctConfig, CompiledModel};
use weft_node::{Datum, Prototype};
use weft_types::{
    EnumRepr, FieldDef, MapRepr, Schema, StructRepr, Type, TypeSystem, UnionRepr,
};

static TRACING_INIT: Once = Once::new();

/// Install a subscriber when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer().with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

pub fn schema() -> Schema {
    let mut ts = TypeSystem::with_prelude();
    let types = [
        // Maps
        Type::map("Map__String__String", "String", "String", false),
        Type::map("Map__String__nullable__String", "String", "String", true),
        Type::map_with_repr(
            "Sparse",
            "String",
            "String",
            true,
            MapRepr::omit_nulls(),
        ),
        Type::map("Map__String__nullable__Frub", "String", "Frub", true),
        Type::map(
            "Map__String__nullable__Map__String__nullable__Frub",
            "String",
            "Map__String__nullable__Frub",
            true,
        ),
        // Structs
        Type::structure(
            "Frub",
            vec![FieldDef::required("field", "String")],
            StructRepr::map_with_renames([("field", "encoded")]),
        ),
        Type::structure(
            "Foo",
            vec![
                FieldDef::required("foo", "String"),
                FieldDef::required("bar", "String"),
            ],
            StructRepr::stringjoin(":"),
        ),
        Type::structure(
            "Point",
            vec![FieldDef::required("x", "Int"), FieldDef::required("y", "Int")],
            StructRepr::tuple(),
        ),
        Type::structure(
            "Setting",
            vec![
                FieldDef::required("name", "String"),
                FieldDef::new("note", "String", true, true),
                FieldDef::required("level", "Int"),
            ],
            StructRepr::listpairs([("name", "n")]),
        ),
        Type::structure(
            "Chain",
            vec![
                FieldDef::required("head", "Int"),
                FieldDef::new("tail", "Chain", true, false),
            ],
            StructRepr::map(),
        ),
        // Keys
        Type::map("Map__Foo__Int", "Foo", "Int", false),
        Type::enumeration(
            "Color",
            ["Red", "Green", "Blue"],
            EnumRepr::string_with_renames([("Red", "r")]),
        ),
        Type::map("Map__Color__Int", "Color", "Int", false),
        Type::enumeration(
            "Level",
            ["Low", "High"],
            EnumRepr::int([("Low", 1), ("High", 10)]),
        ),
        // Unions
        Type::union(
            "Shape",
            ["Point", "Frub"],
            UnionRepr::keyed([("Point", "point"), ("Frub", "frub")]),
        ),
        Type::union("Either", ["Int", "String", "Frub"], UnionRepr::kinded()),
    ];
    for ty in types {
        ts.accumulate(ty).unwrap();
    }
    ts.finalize().unwrap()
}

pub fn model_with(config: AdjunctConfig) -> CompiledModel {
    init_tracing();
    compile(schema(), config).unwrap()
}

pub fn model() -> CompiledModel {
    model_with(AdjunctConfig::new())
}

pub fn proto<'m>(model: &'m CompiledModel, name: &str) -> Prototype<'m> {
    Prototype::by_name(model, name).unwrap()
}

/// `Datum::String` from a literal.
pub fn s(v: &str) -> Datum {
    Datum::from(v)
}
