use super::helpers::{crew_schema, person, person_schema, strs, tagged_schema};
use anyhow::Result;
use serde_json::json;
use tessera_codec::{Encoding, Registry, View};
use tessera_types::{BinaryKind, Datum, Schema, SchemaKind};

pub fn uint8_scalar() -> Result<()> {
    let mut registry = Registry::new();
    let codec = registry.compile(&Schema::scalar(SchemaKind::Integer, BinaryKind::Uint8))?;

    let buf = codec.from_datum(&Datum::Int(200));
    assert_eq!(vec![200], buf);
    assert_eq!(Datum::Int(200), codec.decode(&buf));

    Ok(())
}

pub fn fixed_record_defaults() -> Result<()> {
    let mut registry = Registry::new();
    let codec = registry.compile(&person_schema()?)?;

    let buf = codec.from_datum(&Datum::record([("name", "Zaphod")]));
    assert_eq!(11, buf.len());
    assert_eq!(
        Datum::record([("name", Datum::from("Zaphod")), ("age", Datum::Int(100))]),
        codec.decode(&buf)
    );

    Ok(())
}

/// Records nested in variable containers surface their defaults like top-level ones.
pub fn defaults_inside_containers() -> Result<()> {
    let mut registry = Registry::new();
    registry.compile(&person_schema()?)?;
    let crowd = registry.compile(&Schema::from_json(json!({
        "type": "array",
        "btype": "vector",
        "items": { "$ref": "Person" },
    }))?)?;
    let roster = registry.compile(&Schema::from_json(json!({
        "type": "object",
        "btype": "dict",
        "propertyNames": { "type": "string", "maxLength": 4 },
        "additionalProperties": { "$ref": "Person" },
    }))?)?;
    let zaphod = Datum::record([("name", "Zaphod")]);

    let buf = crowd.from_datum(&Datum::List(vec![zaphod.clone(), Datum::Null]));
    assert_eq!(
        Datum::List(vec![person("Zaphod", 100), Datum::Null]),
        crowd.decode(&buf)
    );

    let buf = roster.from_datum(&Datum::record([("pres", zaphod)]));
    let view = View::new(&roster, &buf);
    assert_eq!(
        Some(person("Zaphod", 100)),
        view.get_key(&Datum::from("pres"))
    );

    Ok(())
}

pub fn mixed_record_absent_optional() -> Result<()> {
    let mut registry = Registry::new();
    registry.compile(&person_schema()?)?;
    let codec = registry.compile(&crew_schema()?)?;

    let buf = codec.from_datum(&Datum::record([("name", "Dent")]));
    let view = View::new(&codec, &buf);
    assert_eq!(None, view.get("members"));
    assert_eq!(Some(Datum::from("Dent")), view.get("name"));

    Ok(())
}

pub fn vector_of_strings_with_hole() -> Result<()> {
    let mut registry = Registry::new();
    let codec = registry.compile(&Schema::from_json(json!({
        "type": "array",
        "btype": "vector",
        "items": { "type": "string" },
    }))?)?;

    let dat = strs(&[Some("a"), Some("b"), None, Some("cd")]);

    // Count, five end offsets, then 1 + 1 + 0 + 2 data bytes.
    assert_eq!(4 + 5 * 4 + 4, codec.encoded_len(&dat));

    let buf = codec.from_datum(&dat);
    assert_eq!(28, buf.len());
    assert_eq!(dat, codec.decode(&buf));

    let view = View::new(&codec, &buf);
    assert_eq!(4, view.len());
    assert!(view.item(2).is_none());
    assert_eq!(Some(Datum::from("cd")), view.at(-1).map(|item| item.to_datum()));

    Ok(())
}

pub fn tagged_dispatch() -> Result<()> {
    let mut registry = Registry::new();
    registry.compile(&tagged_schema(
        "Ship",
        1,
        json!({ "crew": { "type": "integer", "btype": "uint16" } }),
    )?)?;
    registry.compile(&tagged_schema(
        "Planet",
        2,
        json!({
            "name": { "type": "string", "maxLength": 12 },
            "mass": { "type": "number" },
        }),
    )?)?;

    let planet = Datum::record([
        ("tag", Datum::Int(2)),
        ("name", Datum::from("Magrathea")),
        ("mass", Datum::Float(6.5e24)),
    ]);
    let buf = registry.encode(&planet).unwrap();
    assert_eq!(1 + 12 + 8, buf.len());
    assert_eq!(Some(planet), registry.decode(&buf));

    Ok(())
}
