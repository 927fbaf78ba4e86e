//! End-to-end bodies built through the public API.
use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Utc};
use json_contract::{
    generators, BodyBuilder, BuildError, Cardinality, Config, Element, ErrorKind, FinalizedSubtree,
    MatchingRule, NumberKind, Path, Result, Slot,
};
use proptest::prelude::*;
use serde_json::json;

fn zone(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap()
}

fn epoch_in(hours: i32) -> Config {
    Config::fixed(DateTime::<Utc>::UNIX_EPOCH, zone(hours))
}

fn path_set(subtree: &FinalizedSubtree) -> BTreeSet<String> {
    subtree.registry().paths().into_iter().collect()
}

#[test]
fn order_body_with_every_kind_of_call() -> Result<()> {
    let mut b = BodyBuilder::with_config(epoch_in(0));
    b.id()?
        .uuid("reference", None)?
        .string_matcher("status", "OPEN|CLOSED", Some("OPEN"))?
        .includes_str("note", "fragile")?
        .decimal_type("total", Some(12.5))?
        .boolean_value("paid", false)?
        .object("customer")?
        .string_type("name", Some("Ada"))?
        .ip_address("lastSeenFrom", None)?
        .close_object()?
        .min_max_array_like(
            "lines",
            1,
            10,
            Element::object(|line| line.string_type("sku", Some("A-1"))?.integer_type("qty", Some(2))),
        )?
        .datetime_expression("expires", "today + 1 day", "yyyy-MM-dd'T'HH:mm")?;
    let body = b.finish()?;

    assert_eq!(body.document(), &json!({
        "id": 1234567890,
        "reference": "e2490de5-5bd3-43d5-b7c4-526e33f71304",
        "status": "OPEN",
        "note": "fragile",
        "total": 12.5,
        "paid": false,
        "customer": { "name": "Ada", "lastSeenFrom": "127.0.0.1" },
        "lines": [{ "sku": "A-1", "qty": 2 }],
        "expires": "1970-01-02T00:00",
    }));

    let rules = body.matching_rules_json();
    assert_eq!(rules["$.lines"], json!({
        "combine": "AND",
        "matchers": [{ "match": "type", "min": 1 }, { "match": "type", "max": 10 }],
    }));
    assert_eq!(rules["$.lines[*].qty"]["matchers"][0], json!({ "match": "integer" }));
    assert_eq!(rules["$.expires"]["matchers"][0]["expression"], json!("today + 1 day"));
    assert!(rules.get("$.paid").is_none());
    Ok(())
}

#[test]
fn array_of_one_element_two_ways() -> Result<()> {
    let item = |b: &mut BodyBuilder| -> Result<()> {
        b.id()?.object("meta")?.hex_value("hash", None)?.close_object()?;
        Ok(())
    };

    let mut inline = BodyBuilder::new();
    inline.each_like("items", Element::object(|e| {
        item(&mut *e)?;
        Ok(e)
    }))?;
    let inline = inline.finish()?;

    let mut template = BodyBuilder::new();
    item(&mut template)?;
    let template = template.finish()?;
    let mut grafted = BodyBuilder::new();
    grafted.each_like("items", &template)?;
    let grafted = grafted.finish()?;

    assert_eq!(inline.document(), grafted.document());
    assert_eq!(path_set(&inline), path_set(&grafted));
    assert!(path_set(&inline).contains("$.items[*].meta.hash"));
    Ok(())
}

#[test]
fn three_levels_deep() -> Result<()> {
    let mut b = BodyBuilder::new();
    b.object("first")?
        .object("second")?
        .object("@third")?
        .string_type("leaf", None)?
        .close_object()?
        .close_object()?
        .close_object()?;
    let body = b.finish()?;
    assert_eq!(body.registry().paths(), vec!["$.first.second.@third.leaf"]);
    Ok(())
}

#[test]
fn nulls_keep_sibling_positions() -> Result<()> {
    let mut b = BodyBuilder::new();
    b.null_value("gone")?
        .array("xs")?
        .null_value(Slot::Next)?
        .integer_type(Slot::Next, Some(7))?
        .close_array()?;
    let body = b.finish()?;
    assert_eq!(body.document(), &json!({ "gone": null, "xs": [null, 7] }));
    assert_eq!(body.registry().paths(), vec!["$.xs[1]"]);
    Ok(())
}

#[test]
fn zero_instant_in_two_zones() -> Result<()> {
    for (hours, date, time) in [(-8, "1969-12-31", "16:00:00"), (1, "1970-01-01", "01:00:00")] {
        let mut b = BodyBuilder::new();
        b.date_at("d", "yyyy-MM-dd", Some(DateTime::<Utc>::UNIX_EPOCH), Some(zone(hours)))?
            .time_at("t", "HH:mm:ss", Some(DateTime::<Utc>::UNIX_EPOCH), Some(zone(hours)))?;
        assert_eq!(b.document()["d"], json!(date));
        assert_eq!(b.document()["t"], json!(time));
        assert_eq!(
            b.registry().get("$.d"),
            Some(&[MatchingRule::DateFormat("yyyy-MM-dd".into())][..])
        );
    }
    Ok(())
}

#[test]
fn min_array_like_with_a_two_field_template() -> Result<()> {
    let mut b = BodyBuilder::new();
    b.array_like(
        "pairs",
        Cardinality::at_least(1).with_examples(1),
        Element::object(|p| p.string_type("left", None)?.number_type("right", None)),
    )?;
    let body = b.finish()?;

    assert_eq!(body.document()["pairs"].as_array().map(Vec::len), Some(1));
    let entries: Vec<(String, Vec<MatchingRule>)> = body
        .registry()
        .iter()
        .map(|(path, rules)| (path.to_string(), rules.to_vec()))
        .collect();
    assert_eq!(entries, vec![
        ("$.pairs".to_string(), vec![MatchingRule::MinLength(1)]),
        ("$.pairs[*].left".to_string(), vec![MatchingRule::ExactType]),
        ("$.pairs[*].right".to_string(), vec![MatchingRule::NumberKind(NumberKind::Number)]),
    ]);
    Ok(())
}

#[test]
fn array_rooted_body_with_scalar_graft() -> Result<()> {
    let s = Default::default();
    let score = FinalizedSubtree::root_value(generators::integer_type(Some(9), &s));

    let mut b = BodyBuilder::array_root();
    b.graft(Slot::Next, &score)?
        .min_array_like(Slot::Next, 2, generators::string_type(Some("x"), &s))?;
    b.graft_at(&Path::root().index(2), &score)?;
    let body = b.finish()?;

    assert_eq!(body.document(), &json!([9, ["x"], 9]));
    assert_eq!(body.registry().paths(), vec!["$[0]", "$[1]", "$[1][*]", "$[2]"]);
    Ok(())
}

#[test]
fn samples_come_from_configuration() -> Result<()> {
    let samples = Config::samples_from_json_str(r#"{ "string": "abc", "examples": 2 }"#)?;
    let mut b = BodyBuilder::with_config(Config::default().with_samples(samples));
    b.string_type("s", None)?
        .each_like("xs", Element::object(|e| e.integer_type("n", None)))?;
    assert_eq!(b.document(), &json!({ "s": "abc", "xs": [{ "n": 100 }, { "n": 100 }] }));

    let err = Config::samples_from_json_str(r#"{ "examples": "many" }"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    match err {
        BuildError::Config { path, .. } => assert_eq!(path, "examples"),
        other => panic!("unexpected: {other}"),
    }
    Ok(())
}

#[test]
fn errors_are_classified() {
    let mut b = BodyBuilder::new();
    assert_eq!(b.string_matcher("code", "[0-9]+", Some("abc")).unwrap_err().kind(), ErrorKind::Input);

    let mut b = BodyBuilder::new();
    assert_eq!(b.string_matcher("code", "(unclosed", None).unwrap_err().kind(), ErrorKind::Input);

    let mut b = BodyBuilder::new();
    assert_eq!(b.date_expression("d", "today", "yyyy-qq").unwrap_err().kind(), ErrorKind::Format);

    let mut b = BodyBuilder::new();
    assert_eq!(b.close_object().unwrap_err().kind(), ErrorKind::Structural);
}

#[test]
fn large_product_body_with_deferred_timestamps() -> Result<()> {
    const STAMP: &str = "yyyy-MM-dd'T'HH:mm:ss.SSS'Z'";
    let config = epoch_in(0);
    let s = config.samples.clone();

    let metadata = {
        let mut b = BodyBuilder::with_config(config.clone());
        b.string_type("origin", Some("product-data"))?
            .datetime_expression("dateCreated", STAMP, STAMP)?;
        b.finish()?
    };
    let title = {
        let mut b = BodyBuilder::with_config(config.clone());
        b.string_type("mainTitle", Some("Lorem ipsum"))?.min_array_like(
            "attributes",
            1,
            Element::object(|a| a.string_type("key", Some("sample_data"))?.string_type("value", Some("sample_data"))),
        )?;
        b.finish()?
    };

    let mut b = BodyBuilder::with_config(config);
    b.graft("metadata", &metadata)?
        .integer_type("version", Some(1))?
        .object("wrapper")?
        .string_type("w", Some("17f78aqr"))?
        .min_array_like(
            "identifiers",
            1,
            Element::object(|id| {
                id.string_type("alias", Some("sku"))?
                    .min_array_like("value", 1, generators::string_type(Some("7908284"), &Default::default()))
            }),
        )?
        .array_like("aliases", Cardinality::at_least(1).with_examples(1), generators::string_type(Some("17f78aqr"), &s))?
        .close_object()?
        .object("master")?
        .graft("title", &title)?
        .array_like("colours", Cardinality::each().with_examples(0), Element::object(|c| c.boolean_type("primary", Some(false))))?
        .object("scannedData")?
        .datetime_expression("fileTimestamp", STAMP, STAMP)?
        .close_object()?
        .close_object()?;
    let body = b.finish()?;

    let doc = body.document();
    assert_eq!(doc["metadata"]["dateCreated"], json!("1970-01-01T00:00:00.000Z"));
    assert_eq!(doc["wrapper"]["identifiers"], json!([{ "alias": "sku", "value": ["7908284"] }]));
    assert_eq!(doc["wrapper"]["aliases"], json!(["17f78aqr"]));
    assert_eq!(doc["master"]["colours"], json!([]));
    assert_eq!(doc["master"]["title"]["attributes"][0]["key"], json!("sample_data"));

    let rules = body.registry();
    assert_eq!(
        rules.get("$.metadata.dateCreated"),
        Some(&[MatchingRule::GeneratedExpression { expression: STAMP.into(), format: STAMP.into() }][..])
    );
    assert!(rules.get("$.master.scannedData.fileTimestamp").is_some());
    assert_eq!(rules.get("$.wrapper.identifiers[*].value"), Some(&[MatchingRule::MinLength(1)][..]));
    assert_eq!(rules.get("$.wrapper.identifiers[*].value[*]"), Some(&[MatchingRule::ExactType][..]));
    assert_eq!(rules.get("$.wrapper.aliases[*]"), Some(&[MatchingRule::ExactType][..]));
    assert_eq!(rules.get("$.master.colours"), Some(&[MatchingRule::ExactType][..]));
    assert!(rules.get("$.master.colours[*].primary").is_some());
    assert_eq!(rules.get("$.master.title.attributes"), Some(&[MatchingRule::MinLength(1)][..]));
    Ok(())
}

// ------------------------------ Properties -------------------------------- //

#[derive(Clone, Debug)]
enum Call {
    Typed,
    Exact,
    Null,
    Object,
    Array,
}

fn call() -> impl Strategy<Value = Call> {
    prop_oneof![
        Just(Call::Typed),
        Just(Call::Exact),
        Just(Call::Null),
        Just(Call::Object),
        Just(Call::Array),
    ]
}

proptest! {
    #[test]
    fn object_keys_are_exactly_the_added_names(
        fields in prop::collection::btree_map("[a-z0-9@_-]{1,8}", call(), 0..12),
    ) {
        let mut b = BodyBuilder::new();
        for (name, call) in &fields {
            match call {
                Call::Typed => { b.string_type(name, None).unwrap(); }
                Call::Exact => { b.value(name, 1).unwrap(); }
                Call::Null => { b.null_value(name).unwrap(); }
                Call::Object => { b.object(name).unwrap().id().unwrap().close_object().unwrap(); }
                Call::Array => {
                    b.array(name).unwrap().id().unwrap().string_type(Slot::Next, None).unwrap().close_array().unwrap();
                }
            }
        }
        let body = b.finish().unwrap();
        let keys: BTreeSet<&String> = body.document().as_object().unwrap().keys().collect();
        let added: BTreeSet<&String> = fields.keys().collect();
        prop_assert_eq!(keys, added);
    }
}
