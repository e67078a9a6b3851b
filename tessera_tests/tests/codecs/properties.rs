use super::helpers::{crew_schema, person, person_schema, strs, tagged_schema};
use anyhow::{bail, Result};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde_json::json;
use tessera_codec::{
    record::Slot, Codec, CodecRef, CompileError, Encoding, FieldIdx, HeaderInt, Registry, View,
    HEADER_INT_LEN,
};
use tessera_types::{Datum, Schema};

fn crew_codec() -> Result<CodecRef> {
    let mut registry = Registry::new();
    registry.compile(&person_schema()?)?;
    registry.compile(&crew_schema()?)
}

fn gen_members() -> (&'static str, Datum) {
    let members = vec![person("Arthur", 30), person("Ford", 200)];
    ("members", Datum::List(members))
}
fn gen_motto() -> (&'static str, Datum) {
    ("motto", Datum::from("Don't panic"))
}
fn gen_ratings() -> (&'static str, Datum) {
    ("ratings", Datum::record([("tea", 0.5), ("hope", 42.0)]))
}
fn gen_logbook() -> (&'static str, Datum) {
    ("logbook", strs(&[Some("Earth"), None, Some("Magrathea")]))
}

fn crew(optional: &[&fn() -> (&'static str, Datum)]) -> Datum {
    let mut fields = vec![("name", Datum::from("Heart")), ("rank", Datum::Int(3))];
    fields.extend(optional.iter().map(|gen| gen()));
    Datum::record(fields)
}

pub fn round_trip() -> Result<()> {
    let codec = crew_codec()?;
    let mut rand_rng = rand::thread_rng();

    let gen_fns: [fn() -> (&'static str, Datum); 4] =
        [gen_members, gen_motto, gen_ratings, gen_logbook];

    for mut gen_fns in gen_fns.iter().powerset() {
        let dat = crew(&gen_fns);
        let buf = codec.from_datum(&dat);
        assert_eq!(codec.encoded_len(&dat), buf.len());
        assert_eq!(dat, codec.decode(&buf));

        // Optional fields are written in declaration order, whatever order they arrive in.
        gen_fns.shuffle(&mut rand_rng);
        let dat = crew(&gen_fns);
        assert_eq!(buf, codec.from_datum(&dat));
    }

    Ok(())
}

pub fn truncation_then_idempotence() -> Result<()> {
    let codec = crew_codec()?;
    let dat = Datum::record([
        ("name", Datum::from("Zaphod Beeblebrox")),
        ("rank", Datum::Int(70_000)),
        ("motto", Datum::from("Share and Enjoy, said the door")),
        ("members", Datum::List(vec![person("Slartibartfast", 1000)])),
    ]);

    let first = codec.decode(&codec.from_datum(&dat));
    assert_eq!(Some(&Datum::from("Zaphod Bee")), first.get("name"));
    assert_eq!(Some(&Datum::Int(70_000 & 0xffff)), first.get("rank"));
    assert_eq!(Some(&Datum::from("Share and Enjoy,")), first.get("motto"));
    assert_eq!(
        Some(&Datum::List(vec![person("Slartibart", 1000 & 0xff)])),
        first.get("members")
    );

    let second = codec.decode(&codec.from_datum(&first));
    assert_eq!(first, second);

    Ok(())
}

pub fn offsets_do_not_overlap() -> Result<()> {
    let mut registry = Registry::new();
    let codec = registry.compile(&Schema::from_json(json!({
        "type": "object",
        "properties": {
            "flag": { "type": "boolean" },
            "id": { "type": "integer", "btype": "biguint64" },
            "label": { "type": "string", "maxLength": 7 },
            "scores": { "type": "array", "maxItems": 3, "items": { "type": "number", "btype": "float32" } },
            "codes": { "type": "array", "maxItems": 2, "items": { "type": "string", "maxLength": 3 } },
            "inner": {
                "type": "object",
                "properties": {
                    "x": { "type": "integer", "btype": "int16" },
                    "y": { "type": "integer", "btype": "int16" },
                },
            },
        },
    }))?)?;

    let fixed_len = codec.fixed_len().unwrap();
    assert_eq!(1 + 8 + 7 + 3 * 4 + 2 * 3 + 2 * 2, fixed_len);

    let buf = vec![0u8; fixed_len];
    let field_count = codec.fields().unwrap().len();
    let ranges = (0..field_count)
        .map(|i| codec.field_range(&buf, FieldIdx::from(i)).unwrap().1)
        .collect::<Vec<_>>();
    assert_eq!(0, ranges[0].start);
    for (a, b) in ranges.iter().tuple_windows() {
        assert!(a.start < a.end);
        assert_eq!(a.end, b.start);
    }
    assert_eq!(Some(fixed_len), ranges.last().map(|range| range.end));

    Ok(())
}

pub fn hole_symmetry() -> Result<()> {
    let mut registry = Registry::new();
    let codec = registry.compile(&Schema::from_json(json!({
        "type": "array",
        "btype": "vector",
        "items": { "type": "string" },
    }))?)?;
    let words = ["alpha", "beta", "gamma", "delta"];

    for holes in (0..words.len()).powerset() {
        let items = words
            .iter()
            .enumerate()
            .map(|(i, word)| (!holes.contains(&i)).then_some(*word))
            .collect::<Vec<_>>();
        let buf = codec.from_datum(&strs(&items));
        let view = View::new(&codec, &buf);

        for (i, item) in items.iter().enumerate() {
            let start = HeaderInt::read_len(&buf, HEADER_INT_LEN * (i + 1));
            let end = HeaderInt::read_len(&buf, HEADER_INT_LEN * (i + 2));
            assert_eq!(item.is_none(), start == end);
            assert_eq!(item.is_none(), view.item(i).is_none());
        }
    }

    Ok(())
}

/// An optional map field reads as absent iff its table entry marks an empty span.
pub fn map_hole_symmetry() -> Result<()> {
    let codec = crew_codec()?;
    let Codec::Map(map) = &*codec else {
        bail!("Crew compiled to a {}", codec.kind_name());
    };
    let names = ["members", "motto", "ratings", "logbook"];
    let table_start = map.data_start() - HEADER_INT_LEN * (names.len() + 1);

    let gen_fns: [fn() -> (&'static str, Datum); 4] =
        [gen_members, gen_motto, gen_ratings, gen_logbook];
    for gen_fns in gen_fns.iter().powerset() {
        let dat = crew(&gen_fns);
        let buf = codec.from_datum(&dat);
        let view = View::new(&codec, &buf);

        for name in names {
            let Some(Slot::Optional { ordinal }) = map.fields().by_name(name).map(|l| l.slot)
            else {
                bail!("{name} is not optional");
            };
            let start = match ordinal {
                0 => map.data_start(),
                _ => HeaderInt::read_len(&buf, table_start + HEADER_INT_LEN * (ordinal - 1)),
            };
            let end = HeaderInt::read_len(&buf, table_start + HEADER_INT_LEN * ordinal);
            assert_eq!(start == end, view.field(name).is_none(), "{name}");
            assert_eq!(dat.get(name).is_none(), start == end, "{name}");
        }
    }

    Ok(())
}

pub fn truncation_is_bounded() -> Result<()> {
    let codec = crew_codec()?;
    let gen_fns = [gen_members, gen_motto, gen_ratings, gen_logbook];
    let dat = crew(&gen_fns.iter().collect::<Vec<_>>());
    let full_len = codec.encoded_len(&dat);

    for len in 0..=full_len {
        let mut buf = vec![0xaau8; full_len + 8];
        let w_len = codec.encode(&dat, &mut buf[..len]);
        assert!(w_len <= len);
        assert!(buf[len..].iter().all(|b| *b == 0xaa));
        if w_len == 0 {
            continue;
        }
        assert_eq!(w_len, codec.used_len(&buf[..len]));

        // Every present field reads back within the bytes written.
        let view = View::new(&codec, &buf[..w_len]);
        for name in ["members", "motto", "ratings", "logbook"] {
            if let Some(field) = view.field(name) {
                assert_eq!(field.to_datum(), dat.get(name).cloned().unwrap_or_default());
            }
        }
    }

    let logbook = strs(&[Some("Earth"), Some("Magrathea"), Some("Milliways")]);
    let vector = codec.fields().unwrap().by_name("logbook").unwrap().codec.clone();
    for len in 0..=vector.encoded_len(&logbook) {
        let mut buf = vec![0xaau8; len + 8];
        let w_len = vector.encode(&logbook, &mut buf[..len]);
        assert!(buf[len..].iter().all(|b| *b == 0xaa));
        if w_len == 0 {
            continue;
        }
        let count = HeaderInt::read_len(&buf, 0);
        let ends = (0..=count)
            .map(|i| HeaderInt::read_len(&buf, HEADER_INT_LEN * (i + 1)))
            .collect::<Vec<_>>();
        assert!(ends.iter().tuple_windows().all(|(a, b)| a <= b));
        assert_eq!(Some(&w_len), ends.last());
    }

    Ok(())
}

pub fn cycle_rejection() -> Result<()> {
    let mut registry = Registry::new();
    let schema = Schema::from_json(json!({
        "$id": "Ship",
        "type": "object",
        "properties": {
            "captain": {
                "$id": "Captain",
                "type": "object",
                "properties": { "ship": { "$ref": "Ship" } },
            },
        },
    }))?;

    let err = registry.compile(&schema).unwrap_err();
    assert_eq!(
        Some(&CompileError::Cycle(vec!["Captain".into(), "Ship".into()])),
        err.downcast_ref::<CompileError>()
    );
    assert!(registry.get("Ship").is_none());
    assert!(registry.get("Captain").is_none());
    assert!(registry.is_empty());

    Ok(())
}

pub fn polymorphic_dispatch() -> Result<()> {
    let mut registry = Registry::new();
    registry.compile(&tagged_schema(
        "Towel",
        5,
        json!({ "dry": { "type": "boolean" } }),
    )?)?;
    registry.compile(&tagged_schema(
        "Guide",
        9,
        json!({
            "edition": { "type": "integer", "btype": "uint32" },
            "entry": { "type": "string", "maxLength": 8 },
        }),
    )?)?;

    let guide = Datum::record([
        ("tag", Datum::Int(9)),
        ("edition", Datum::Int(42)),
        ("entry", Datum::from("Mostly")),
    ]);
    let buf = registry.encode(&guide).unwrap();
    assert_eq!(Some(&9), buf.first());
    assert_eq!(Some(guide), registry.decode(&buf));

    let towel = registry.encode(&Datum::record([("tag", 5)])).unwrap();
    assert_eq!(
        Some(Datum::record([("tag", Datum::Int(5)), ("dry", Datum::Bool(false))])),
        registry.decode(&towel)
    );

    Ok(())
}
