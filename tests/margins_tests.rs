use chart_compose::core::{Insets, MarginSides, MarginsSpec, parse_margins};
use serde_json::json;

fn insets(spec: impl Into<MarginsSpec>) -> Option<Insets> {
    parse_margins(&spec.into()).map(MarginSides::resolve)
}

#[test]
fn single_token_applies_to_every_side() {
    assert_eq!(insets("10"), Some(Insets::uniform(10.0)));
    assert_eq!(insets(7.5), Some(Insets::uniform(7.5)));
}

#[test]
fn two_tokens_split_vertical_and_horizontal() {
    let resolved = insets("10 20").expect("two-token margins");
    assert_eq!(resolved.top, 10.0);
    assert_eq!(resolved.bottom, 10.0);
    assert_eq!(resolved.left, 20.0);
    assert_eq!(resolved.right, 20.0);
}

#[test]
fn three_tokens_share_the_horizontal_value() {
    let resolved = insets("1 2 3").expect("three-token margins");
    assert_eq!(
        (resolved.top, resolved.right, resolved.bottom, resolved.left),
        (1.0, 2.0, 3.0, 2.0)
    );
}

#[test]
fn four_token_margins_use_css_order() {
    let resolved = insets("1 2 3 4").expect("four-token margins");
    assert_eq!(
        (resolved.top, resolved.right, resolved.bottom, resolved.left),
        (1.0, 2.0, 3.0, 4.0)
    );
}

#[test]
fn extra_whitespace_is_ignored() {
    assert_eq!(insets("  5   6 "), insets("5 6"));
}

#[test]
fn unsupported_shorthands_are_rejected() {
    assert_eq!(insets("1 2 3 4 5"), None);
    assert_eq!(insets(""), None);
    assert_eq!(insets("1 wide"), None);
    assert_eq!(insets(MarginsSpec::from(json!(true))), None);
}

#[test]
fn object_margins_prefer_sides_over_all() {
    let spec = MarginsSpec::from(json!({ "all": 4, "left": 10, "bottom": "6" }));
    let resolved = insets(spec).expect("object margins");
    assert_eq!(
        (resolved.top, resolved.right, resolved.bottom, resolved.left),
        (4.0, 4.0, 6.0, 10.0)
    );
}

#[test]
fn margins_deserialize_from_any_supported_shape() {
    let from_string: MarginsSpec = serde_json::from_value(json!("3 4")).expect("string");
    let from_number: MarginsSpec = serde_json::from_value(json!(3)).expect("number");
    let from_array: MarginsSpec = serde_json::from_value(json!([1, 2])).expect("array");

    assert_eq!(from_string, MarginsSpec::Shorthand("3 4".to_owned()));
    assert_eq!(from_number, MarginsSpec::Uniform(3.0));
    assert!(matches!(from_array, MarginsSpec::Invalid(_)));
}
