use anyhow::Result;
use serde_json::json;
use tessera_types::{Datum, Schema};

/// `{ name: string(10), age: uint8 = 100 }`
pub fn person_schema() -> Result<Schema> {
    Schema::from_json(json!({
        "$id": "Person",
        "type": "object",
        "properties": {
            "name": { "type": "string", "maxLength": 10 },
            "age": { "type": "integer", "btype": "uint8", "default": 100 },
        },
    }))
}

/// A mixed record exercising every variable-size codec family as an optional field.
pub fn crew_schema() -> Result<Schema> {
    Schema::from_json(json!({
        "$id": "Crew",
        "type": "object",
        "btype": "map",
        "required": ["name", "rank"],
        "properties": {
            "name": { "type": "string", "maxLength": 10 },
            "rank": { "type": "integer", "btype": "uint16" },
            "members": { "type": "array", "btype": "vector", "items": { "$ref": "Person" } },
            "motto": { "type": "string", "maxLength": 16 },
            "ratings": {
                "type": "object",
                "btype": "dict",
                "propertyNames": { "type": "string", "maxLength": 4 },
                "additionalProperties": { "type": "number" },
            },
            "logbook": {
                "type": "array",
                "btype": "vector",
                "items": { "type": "string" },
            },
        },
    }))
}

pub fn tagged_schema(id: &str, tag: u8, body: serde_json::Value) -> Result<Schema> {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "tag".into(),
        json!({ "type": "integer", "btype": "uint8", "default": tag }),
    );
    if let serde_json::Value::Object(body) = body {
        properties.extend(body);
    }
    Schema::from_json(json!({
        "$id": id,
        "type": "object",
        "properties": properties,
    }))
}

pub fn person(name: &str, age: i64) -> Datum {
    Datum::record([("name", Datum::from(name)), ("age", Datum::Int(age))])
}

pub fn strs(ss: &[Option<&str>]) -> Datum {
    Datum::List(ss.iter().map(|s| Datum::from(*s)).collect())
}
