use std::rc::Rc;

use chart_compose::api::{
    BarChart, ChartConfig, ChartEngine, ChartNode, ChartVariant, FacetGrid, InputData,
    NO_DATA_MESSAGE, RenderState,
};
use chart_compose::core::{BoxRect, ColumnMetadata};
use chart_compose::error::ChartError;
use chart_compose::render::NullRenderer;
use proptest::prelude::*;
use serde_json::{Value, json};

const REGIONS: [&str; 7] = ["North", "South", "East", "West", "Center", "Coast", "Islands"];

fn faceted_input(regions: &[&str]) -> InputData {
    let mut resultset: Vec<Vec<Value>> = Vec::new();
    for (index, region) in regions.iter().enumerate() {
        for (series, category) in [("Bikes", "Q1"), ("Bikes", "Q2"), ("Boats", "Q1")] {
            resultset.push(vec![
                json!(region),
                json!(series),
                json!(category),
                json!(index + 1),
            ]);
        }
    }
    InputData::new(
        vec![
            ColumnMetadata::new(0, "Region", "String"),
            ColumnMetadata::new(1, "Product", "String"),
            ColumnMetadata::new(2, "Quarter", "String"),
            ColumnMetadata::new(3, "Units", "Numeric"),
        ],
        resultset,
    )
}

fn faceted_config() -> ChartConfig {
    ChartConfig::new()
        .with_size(600.0, 400.0)
        .with_margins("10 20 30 40")
        .with_crosstab_mode(false)
        .with_animate(false)
        .with_multi_chart_column_indexes(vec![0])
}

fn faceted_chart(regions: &[&str], config: ChartConfig) -> ChartNode {
    let mut chart = ChartNode::new(BarChart, config);
    chart
        .set_data(faceted_input(regions), None)
        .expect("set data");
    chart.pre_render().expect("pre-render");
    chart
}

#[test]
fn seven_facets_wrap_into_three_columns() {
    let chart = faceted_chart(&REGIONS, faceted_config().with_multi_chart_wrap_column(3.0));
    let grid = chart.facet_grid().expect("facet grid");

    assert_eq!(chart.facets().len(), 7);
    assert_eq!((grid.col_count, grid.row_count), (3, 3));
    // content box: 600 - 40 - 20 by 400 - 10 - 30
    assert_eq!(grid.cell_width, 180.0);
    assert_eq!(grid.cell_height, 120.0);

    let fourth = &chart.facets()[3];
    assert_eq!(fourth.label, "West");
    assert_eq!(fourth.bounds, BoxRect::new(40.0, 10.0 + 120.0, 180.0, 120.0));
    assert_eq!(fourth.chart.placement(), Some((40.0, 130.0)));

    let base = fourth.chart.panels().base().expect("facet base");
    assert_eq!(base.bounds(), BoxRect::new(40.0, 130.0, 180.0, 120.0));
}

#[test]
fn facets_share_the_root_roles_and_owner() {
    let chart = faceted_chart(&REGIONS[..4], faceted_config());

    for facet in chart.facets() {
        let child = &facet.chart;
        assert!(Rc::ptr_eq(child.role_specs(), chart.role_specs()));
        assert_eq!(child.parent(), Some(chart.id()));
        assert_eq!(child.root(), chart.id());
        assert_eq!(child.owner(), chart.id());
        assert!(!child.is_root());
        assert!(child.is_pre_rendered());
        assert_eq!(child.render_version(), 1);
        assert!(!child.options().legend);
        assert_eq!(child.options().title.as_deref(), Some(facet.label.as_str()));
        assert_eq!(child.data_engine().map(|engine| engine.len()), Some(3));
    }
    let ids: Vec<u64> = chart.facets().iter().map(|facet| facet.chart.id().get()).collect();
    let mut unique = ids.clone();
    unique.dedup();
    assert_eq!(ids, unique);
}

#[test]
fn rebuild_replaces_facets_and_keeps_versions_per_chart() {
    let mut chart = faceted_chart(&REGIONS[..2], faceted_config());
    let first_ids: Vec<_> = chart.facets().iter().map(|facet| facet.chart.id()).collect();

    chart.pre_render().expect("second pre-render");

    assert_eq!(chart.render_version(), 2);
    assert_eq!(chart.facets().len(), 2);
    for facet in chart.facets() {
        assert_eq!(facet.chart.render_version(), 1);
        assert!(!first_ids.contains(&facet.chart.id()));
    }
}

#[test]
fn limit_caps_the_number_of_facets() {
    let config = faceted_config()
        .with_multi_chart_limit(2.9)
        .with_multi_chart_wrap_column(f64::INFINITY);
    let chart = faceted_chart(&REGIONS, config);
    let grid = chart.facet_grid().expect("facet grid");

    assert_eq!(chart.facets().len(), 2);
    assert_eq!((grid.col_count, grid.row_count), (2, 1));
}

#[test]
fn every_facet_paints_into_the_root_frame() {
    let chart = faceted_chart(&REGIONS[..3], faceted_config());
    let mut engine = ChartEngine::new(NullRenderer::default(), chart);
    engine.render(true, false).expect("render");

    let frame = engine.renderer().last_frame().expect("frame");
    let titles: Vec<&str> = frame.texts.iter().map(|text| text.text.as_str()).collect();
    for region in &REGIONS[..3] {
        assert!(titles.contains(region), "missing facet title {region}");
    }
    // three bars per facet: two Bikes quarters and one Boats quarter
    assert_eq!(frame.rects.len(), 9);
}

/// Bar-less chart that tolerates an empty data set.
struct PlaceholderChart;

impl ChartVariant for PlaceholderChart {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn allow_no_data(&self) -> bool {
        true
    }
}

/// Crosstab rows whose only column feeds `multiChartColumn`: no series
/// columns, so no datum and no facet.
fn region_only_input() -> InputData {
    InputData::new(
        vec![ColumnMetadata::new(0, "Region", "String")],
        vec![vec![json!("North")], vec![json!("South")]],
    )
}

fn region_only_config() -> ChartConfig {
    ChartConfig::new()
        .with_animate(false)
        .with_multi_chart_column_indexes(vec![0])
}

#[test]
fn zero_facets_raise_no_data() {
    let mut chart = ChartNode::new(BarChart, region_only_config());
    chart.set_data(region_only_input(), None).expect("set data");

    assert_eq!(chart.pre_render(), Err(ChartError::NoData));
    assert!(chart.has_role("multiChartColumn"));
    assert!(chart.facets().is_empty());
}

#[test]
fn render_recovers_from_zero_facets() {
    let mut chart = ChartNode::new(BarChart, region_only_config());
    chart.set_data(region_only_input(), None).expect("set data");
    let mut engine = ChartEngine::new(NullRenderer::default(), chart);

    engine.render(false, false).expect("no-data fallback");

    let labels: Vec<_> = engine
        .chart()
        .panels()
        .labels()
        .map(|label| label.text())
        .collect();
    assert_eq!(labels, [Some(NO_DATA_MESSAGE)]);
    assert_eq!(engine.state(), RenderState::RenderEnd);
}

#[test]
fn zero_facets_are_a_no_op_when_no_data_is_allowed() {
    let mut chart = ChartNode::new(PlaceholderChart, region_only_config());
    chart.set_data(region_only_input(), None).expect("set data");

    chart.pre_render().expect("empty replication");
    assert!(chart.is_pre_rendered());
    assert!(chart.facets().is_empty());
    assert!(chart.facet_grid().is_none());

    let mut engine = ChartEngine::new(NullRenderer::default(), chart);
    engine.render(true, true).expect("render");
    assert_eq!(engine.chart().panels().labels().count(), 0);
}

proptest! {
    #[test]
    fn grid_covers_every_facet_within_the_content_box(
        leaf_count in 1usize..40,
        wrap in 1.0f64..8.0,
        width in 50.0f64..2_000.0,
        height in 50.0f64..2_000.0
    ) {
        let content = BoxRect::new(0.0, 0.0, width, height);
        let grid = FacetGrid::compute(leaf_count, None, Some(wrap), (5.0, 7.0), content)
            .expect("grid");

        prop_assert_eq!(grid.facet_count, leaf_count);
        prop_assert!(grid.col_count <= wrap.floor() as usize);
        prop_assert!(grid.col_count * grid.row_count >= leaf_count);
        prop_assert!(grid.col_count * (grid.row_count - 1) < leaf_count);

        let last = grid.cell(leaf_count - 1);
        prop_assert!(last.left + last.width <= 5.0 + width + 1e-6);
        prop_assert!(last.top + last.height <= 7.0 + height + 1e-6);
    }
}
