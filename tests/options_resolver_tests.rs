use chart_compose::api::{
    Anchor, BarChart, BasicChart, ChartConfig, ChartOptions, ChartVariant, OptionsResolver,
    Orientation,
};
use chart_compose::core::{MarginSides, MarginsSpec};
use proptest::prelude::*;
use serde_json::json;

fn resolved(variant: &dyn ChartVariant, config: &ChartConfig, transitions: bool) -> ChartOptions {
    let mut options = ChartOptions::merged(variant.default_options(), config);
    OptionsResolver::new(variant, transitions).resolve(&mut options);
    options
}

#[test]
fn config_overlays_variant_defaults() {
    let config = ChartConfig::new()
        .with_size(640.0, 480.0)
        .with_title("Sales")
        .with_legend(true);
    let options = resolved(&BasicChart, &config, true);

    assert_eq!(options.width, 640.0);
    assert_eq!(options.height, 480.0);
    assert_eq!(options.title.as_deref(), Some("Sales"));
    assert!(options.legend);
    assert!(options.animate);
    assert!(options.crosstab_mode);
    assert_eq!(options.orientation, Orientation::Vertical);
}

#[test]
fn shorthand_margins_become_structured_sides() {
    let config = ChartConfig::new().with_margins("5 10");
    let options = resolved(&BasicChart, &config, true);

    assert_eq!(
        options.margins,
        Some(MarginsSpec::Sides(MarginSides::sides(5.0, 10.0, 5.0, 10.0)))
    );
    assert_eq!(options.margin_insets().horizontal(), 20.0);
}

#[test]
fn unparseable_margins_are_dropped() {
    let config = ChartConfig::new().with_margins("1 2 3 4 5");
    let options = resolved(&BasicChart, &config, true);
    assert_eq!(options.margins, None);
    assert_eq!(options.margin_insets().vertical(), 0.0);
}

#[test]
fn static_backends_never_animate() {
    let config = ChartConfig::new().with_animate(true);
    assert!(!resolved(&BasicChart, &config, false).animate);
    assert!(resolved(&BasicChart, &config, true).animate);
}

#[test]
fn bar_variant_stacks_normalized_bars() {
    let config = ChartConfig {
        percentage_normalized: Some(true),
        ..ChartConfig::default()
    };
    let options = resolved(&BarChart, &config, true);
    assert!(options.stacked);
    assert!(!resolved(&BasicChart, &config, true).stacked);
}

#[test]
fn config_deserializes_from_camel_case_json() {
    let config: ChartConfig = serde_json::from_value(json!({
        "width": 320,
        "titlePosition": "left",
        "legendPosition": "right",
        "multiChartColumnIndexes": [0],
        "multiChartWrapColumn": 2,
        "extensionPoints": { "base_fillStyle": "#ffffff" },
        "roles": { "category": "category, category2" }
    }))
    .expect("config json");
    let options = resolved(&BasicChart, &config, true);

    assert_eq!(options.width, 320.0);
    assert_eq!(options.title_position, Anchor::Left);
    assert_eq!(options.legend_position, Anchor::Right);
    assert_eq!(options.multi_chart_column_indexes, vec![0]);
    assert_eq!(options.multi_chart_wrap_column, Some(2.0));
    assert_eq!(
        options.extension_points.get("base_fillStyle"),
        Some(&json!("#ffffff"))
    );
    assert!(options.roles.contains_key("category"));
}

#[test]
fn later_configuration_only_overrides_what_it_sets() {
    let mut options = ChartOptions::merged(
        BasicChart.default_options(),
        &ChartConfig::new()
            .with_title("First")
            .with_extension_point("base_fillStyle", "#000000"),
    );
    options.apply(&ChartConfig::new().with_extension_point("title_font", "12px serif"));

    assert_eq!(options.title.as_deref(), Some("First"));
    assert_eq!(options.extension_points.len(), 2);
}

proptest! {
    #[test]
    fn resolution_is_idempotent(
        top in 0.0f64..50.0,
        right in 0.0f64..50.0,
        bottom in 0.0f64..50.0,
        left in 0.0f64..50.0,
        token_count in 1usize..6,
        animate in any::<bool>(),
        transitions in any::<bool>(),
        normalized in any::<bool>()
    ) {
        let tokens = [top, right, bottom, left, top];
        let shorthand = tokens[..token_count]
            .iter()
            .map(|value| format!("{value}"))
            .collect::<Vec<_>>()
            .join(" ");
        let config = ChartConfig {
            percentage_normalized: Some(normalized),
            ..ChartConfig::new().with_margins(shorthand.as_str()).with_animate(animate)
        };

        let once = resolved(&BarChart, &config, transitions);
        let mut twice = once.clone();
        OptionsResolver::new(&BarChart, transitions).resolve(&mut twice);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.margins.is_some(), token_count <= 4);
        prop_assert_eq!(once.animate, animate && transitions);
    }
}
