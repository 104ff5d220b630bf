//! Unit tests for rule parsing, application and persist-time collapsing.
#![allow(
    unfulfilled_lint_expectations,
    reason = "clippy::expect_used is denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]

use rstest::rstest;
use serde_json::{Value, json};

use super::{RuleKind, Schema, SchemaRule, apply_rule, to_array};
use crate::diff::{Change, Diff, diff};
use crate::path::KeyPath;
use crate::ConfigError;

#[test]
fn scalar_descriptors_become_defaults() {
    let rules = Schema::parse_descriptor(&json!({"sys.logging": true})).expect("valid descriptor");
    assert_eq!(rules, vec![SchemaRule::new("sys.logging").with_default(json!(true))]);
}

#[test]
fn object_descriptors_read_rule_fields() {
    let rules = Schema::parse_descriptor(&json!({
        "sys.logging": {"default": {"level": 1}, "stringified": true, "atomic": true},
        "hosts": {"type": "array"},
        "nothing": {"default": null},
    }))
    .expect("valid descriptor");
    assert_eq!(
        rules,
        vec![
            SchemaRule::new("hosts").array(),
            SchemaRule::new("nothing").with_default(Value::Null),
            SchemaRule::new("sys.logging")
                .with_default(json!({"level": 1}))
                .stringified(),
        ]
    );
    assert_eq!(rules.first().and_then(|rule| rule.kind), Some(RuleKind::Array));
}

#[rstest]
#[case(json!([1, 2]))]
#[case(json!("sys.logging"))]
#[case(json!({"a": {"stringified": "yes"}}))]
#[case(json!({"a": {"type": "tuple"}}))]
fn malformed_descriptors_are_rejected(#[case] descriptor: Value) {
    let err = Schema::parse_descriptor(&descriptor).expect_err("descriptor must be rejected");
    assert!(matches!(&*err, ConfigError::InvalidSchemaDescriptor { .. }));
}

#[test]
fn defaults_fill_missing_values_only() {
    let rule = SchemaRule::new("sys.logging").with_default(json!(true));
    let mut empty = json!({});
    apply_rule(&rule, &mut empty).expect("apply");
    assert_eq!(empty, json!({"sys": {"logging": true}}));

    let mut set = json!({"sys": {"logging": false}});
    apply_rule(&rule, &mut set).expect("apply");
    assert_eq!(set, json!({"sys": {"logging": false}}));
}

#[test]
fn stringified_values_are_parsed() {
    let rule = SchemaRule::new("sys.logging").stringified();
    let mut tree = json!({"sys": {"logging": "{\"enabled\":true,\"level\":3}"}});
    apply_rule(&rule, &mut tree).expect("apply");
    assert_eq!(tree, json!({"sys": {"logging": {"enabled": true, "level": 3}}}));
}

#[test]
fn stringified_round_trip_reproduces_structure() {
    let original = json!({"enabled": true, "level": 3});
    let stored = serde_json::to_string(&original).expect("serialise");
    assert_eq!(stored, r#"{"enabled":true,"level":3}"#);

    let mut tree = json!({"sys": {"logging": stored}});
    apply_rule(&SchemaRule::new("sys.logging").stringified(), &mut tree).expect("apply");
    assert_eq!(tree["sys"]["logging"], original);
}

#[test]
fn invalid_stringified_json_is_fatal() {
    let rule = SchemaRule::new("sys.logging").stringified();
    let mut tree = json!({"sys": {"logging": "{not json"}});
    let before = tree.clone();
    let err = apply_rule(&rule, &mut tree).expect_err("must fail");
    assert!(matches!(&*err, ConfigError::SchemaCoercion { path, .. } if path == "sys.logging"));
    assert_eq!(tree, before);
}

#[test]
fn array_rule_densifies_index_keyed_objects() {
    let rule = SchemaRule::new("list").array();
    let mut tree = json!({"list": {"foo": "bar", "0": "a", "1": "b", "2": 78, "3": true}});
    apply_rule(&rule, &mut tree).expect("apply");
    assert_eq!(tree, json!({"list": ["a", "b", 78, true]}));
}

#[test]
fn array_rule_leaves_absent_values_for_default() {
    let rule = SchemaRule::new("list").array().with_default(json!(["x"]));
    let mut tree = json!({});
    apply_rule(&rule, &mut tree).expect("apply");
    assert_eq!(tree, json!({"list": ["x"]}));
}

#[rstest]
#[case(json!([1, 2]), json!([1, 2]))]
#[case(json!("ab"), json!(["a", "b"]))]
#[case(json!(5), json!([]))]
#[case(json!(null), json!([]))]
#[case(json!({"1": 1, "-1": 0, "1.5": 2}), json!([null, 1]))]
#[case(json!({"70000": 1}), json!([]))]
fn to_array_handles_every_shape(#[case] input: Value, #[case] expected: Value) {
    assert_eq!(to_array(input), expected);
}

#[test]
fn stringified_changes_collapse_into_one_write() {
    let mut schema = Schema::default();
    schema.push(SchemaRule::new("sys.logging").stringified());

    let stored = json!({"sys": {"logging": {"enabled": true, "level": 1}}, "other": 1});
    let working = json!({"sys": {"logging": {"enabled": true, "level": 3}}, "other": 2});
    let mut d = diff(&stored, &working);
    schema.collapse_stringified(&mut d, &working).expect("collapse");
    d.dedup();

    assert_eq!(d.removed, vec![KeyPath::parse("sys.logging")]);
    assert_eq!(
        d.changed,
        vec![
            Change { path: KeyPath::parse("other"), value: json!(2) },
            Change {
                path: KeyPath::parse("sys.logging"),
                value: json!(r#"{"enabled":true,"level":3}"#),
            },
        ]
    );
}

#[test]
fn removed_stringified_value_is_only_removed() {
    let mut schema = Schema::default();
    schema.push(SchemaRule::new("sys.logging").stringified());
    let working = json!({"sys": {}});
    let mut d = Diff {
        changed: Vec::new(),
        removed: vec![KeyPath::parse("sys.logging")],
    };
    schema.collapse_stringified(&mut d, &working).expect("collapse");
    assert_eq!(d.removed, vec![KeyPath::parse("sys.logging")]);
    assert!(d.changed.is_empty());
}

#[test]
fn untouched_stringified_rules_do_nothing() {
    let mut schema = Schema::default();
    schema.push(SchemaRule::new("sys.logging").stringified());
    let mut d = diff(&json!({"a": 1}), &json!({"a": 2}));
    let expected = d.clone();
    schema
        .collapse_stringified(&mut d, &json!({"a": 2}))
        .expect("collapse");
    assert_eq!(d, expected);
}
