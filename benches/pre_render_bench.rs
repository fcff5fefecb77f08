use chart_compose::api::{BarChart, ChartConfig, ChartEngine, ChartNode, FacetGrid, InputData};
use chart_compose::core::{BoxRect, ColumnMetadata, MarginsSpec, parse_margins};
use chart_compose::render::NullRenderer;
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

fn relational_rows(regions: usize, products: usize, quarters: usize) -> InputData {
    let mut resultset: Vec<Vec<Value>> = Vec::with_capacity(regions * products * quarters);
    for region in 0..regions {
        for product in 0..products {
            for quarter in 0..quarters {
                resultset.push(vec![
                    json!(format!("Region {region}")),
                    json!(format!("Product {product}")),
                    json!(format!("Q{}", quarter + 1)),
                    json!((region * 31 + product * 7 + quarter) % 97),
                ]);
            }
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

fn bench_margins_parse(c: &mut Criterion) {
    let spec = MarginsSpec::from("4 8 12 16");
    c.bench_function("margins_parse_four_tokens", |b| {
        b.iter(|| {
            let _ = parse_margins(black_box(&spec)).expect("valid margins");
        })
    });
}

fn bench_facet_grid(c: &mut Criterion) {
    let content = BoxRect::new(0.0, 0.0, 1920.0, 1080.0);
    c.bench_function("facet_grid_1k_cells", |b| {
        b.iter(|| {
            let grid = FacetGrid::compute(black_box(1_000), None, Some(8.0), (0.0, 0.0), content)
                .expect("grid");
            for index in 0..grid.facet_count {
                let _ = black_box(grid.cell(index));
            }
        })
    });
}

fn bench_pre_render_bar_2k_rows(c: &mut Criterion) {
    let data = relational_rows(1, 50, 40);
    let config = ChartConfig::new()
        .with_size(1920.0, 1080.0)
        .with_crosstab_mode(false)
        .with_animate(false);

    c.bench_function("pre_render_bar_2k_rows", |b| {
        b.iter(|| {
            let mut chart = ChartNode::new(BarChart, config.clone());
            chart.set_data(data.clone(), None).expect("set data");
            chart.pre_render().expect("pre-render");
            black_box(chart.render_version())
        })
    });
}

fn bench_render_multi_chart_12_facets(c: &mut Criterion) {
    let data = relational_rows(12, 4, 4);
    let config = ChartConfig::new()
        .with_size(1920.0, 1080.0)
        .with_crosstab_mode(false)
        .with_animate(false)
        .with_multi_chart_column_indexes(vec![0])
        .with_multi_chart_wrap_column(4.0);

    c.bench_function("render_multi_chart_12_facets", |b| {
        b.iter(|| {
            let mut chart = ChartNode::new(BarChart, config.clone());
            chart.set_data(data.clone(), None).expect("set data");
            let mut engine = ChartEngine::new(NullRenderer::default(), chart);
            engine.render(true, false).expect("render");
            black_box(engine.renderer().last_stats.total())
        })
    });
}

criterion_group!(
    benches,
    bench_margins_parse,
    bench_facet_grid,
    bench_pre_render_bar_2k_rows,
    bench_render_multi_chart_12_facets
);
criterion_main!(benches);
