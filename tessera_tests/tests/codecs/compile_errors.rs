use anyhow::Result;
use serde_json::json;
use tessera_codec::{CompileError, Registry, RegistryConfig};
use tessera_types::{Datum, Schema};

fn compile_err(registry: &mut Registry, json: serde_json::Value) -> Result<CompileError> {
    let schema = Schema::from_json(json)?;
    let err = registry.compile(&schema).unwrap_err();
    let compile_err = err.downcast_ref::<CompileError>().cloned();
    Ok(compile_err.unwrap())
}

pub fn rejected_schemas() -> Result<()> {
    let mut registry = Registry::new();

    let err = compile_err(
        &mut registry,
        json!({
            "$id": "Fleet",
            "type": "object",
            "properties": { "flagship": { "$ref": "Ship" } },
        }),
    )?;
    assert_eq!(CompileError::UnknownReference("Ship".into()), err);

    let err = compile_err(
        &mut registry,
        json!({
            "type": "object",
            "properties": {
                "log": { "type": "array", "btype": "vector", "items": { "type": "string" } },
            },
        }),
    )?;
    assert_eq!(
        CompileError::NotFixedSize {
            context: "<root>.log".into()
        },
        err
    );

    let err = compile_err(
        &mut registry,
        json!({ "type": "array", "items": { "type": "integer" } }),
    )?;
    assert_eq!(
        CompileError::UnboundedArray {
            context: "<root>".into()
        },
        err
    );

    let err = compile_err(
        &mut registry,
        json!({
            "$id": "Index",
            "type": "object",
            "btype": "dict",
            "propertyNames": { "type": "string" },
            "additionalProperties": { "type": "integer" },
        }),
    )?;
    assert_eq!(
        CompileError::UnboundedString {
            context: "Index{key}".into()
        },
        err
    );

    let err = compile_err(
        &mut registry,
        json!({ "type": "object", "properties": { "what": { "maxLength": 3 } } }),
    )?;
    assert_eq!(
        CompileError::MissingKind {
            context: "<root>.what".into()
        },
        err
    );

    let err = compile_err(
        &mut registry,
        json!({ "type": "string", "btype": "uint8" }),
    )?;
    assert_eq!(
        CompileError::UnsupportedKind {
            context: "<root>".into()
        },
        err
    );

    assert!(registry.is_empty());

    Ok(())
}

/// A map referenced from a fixed slot has no fixed size.
pub fn map_in_fixed_slot() -> Result<()> {
    let mut registry = Registry::new();
    registry.compile(&Schema::from_json(json!({
        "$id": "Note",
        "type": "object",
        "btype": "map",
        "properties": { "text": { "type": "string" } },
    }))?)?;

    let err = compile_err(
        &mut registry,
        json!({
            "type": "array",
            "maxItems": 4,
            "items": { "$ref": "Note" },
        }),
    )?;
    assert_eq!(
        CompileError::NotFixedSize {
            context: "<root>[]".into()
        },
        err
    );
    assert_eq!(1, registry.len());

    Ok(())
}

pub fn small_scratch_degrades() -> Result<()> {
    let mut registry = Registry::with_config(RegistryConfig {
        scratch_capacity: 24,
    });
    registry.compile(&Schema::from_json(json!({
        "$id": "Memo",
        "type": "object",
        "btype": "map",
        "required": ["tag"],
        "properties": {
            "tag": { "type": "integer", "btype": "uint8", "default": 7 },
            "title": { "type": "string" },
            "body": { "type": "string" },
        },
    }))?)?;

    // Prefix and table take 13 bytes, leaving room for the title only.
    let memo = Datum::record([
        ("tag", Datum::Int(7)),
        ("title", Datum::from("Vogon")),
        ("body", Datum::from("Oh freddled gruntbuggly")),
    ]);
    assert_eq!(Some(13 + 5 + 23), registry.encoded_len(&memo));
    let buf = registry.encode(&memo).unwrap();
    assert_eq!(13 + 5, buf.len());
    assert_eq!(
        Some(Datum::record([
            ("tag", Datum::Int(7)),
            ("title", Datum::from("Vogon"))
        ])),
        registry.decode(&buf)
    );

    // The scratch region is reused, and nothing of the previous encode leaks into the next.
    let short = Datum::record([("tag", 7)]);
    let buf = registry.encode(&short).unwrap();
    assert_eq!(13, buf.len());
    assert_eq!(Some(Datum::record([("tag", 7)])), registry.decode(&buf));

    Ok(())
}
