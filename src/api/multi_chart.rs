//! Small multiples: one facet chart per `multiChartColumn` group.

use tracing::debug;

use crate::core::{BoxRect, GroupByOptions};
use crate::error::{ChartError, ChartResult};

use super::{ChartConfig, ChartNode, DEFAULT_MULTI_CHART_WRAP_COLUMN};

/// Grid geometry of a faceted chart, relative to the parent base panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacetGrid {
    pub facet_count: usize,
    pub col_count: usize,
    pub row_count: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Top-left corner of cell 0 (the base panel's left/top margins).
    pub origin: (f64, f64),
}

impl FacetGrid {
    /// Lays out `leaf_count` groups in `content`, whose origin is at
    /// `origin` inside the base panel.
    ///
    /// Returns `None` when no facet would be drawn.
    #[must_use]
    pub fn compute(
        leaf_count: usize,
        limit: Option<f64>,
        wrap_column: Option<f64>,
        origin: (f64, f64),
        content: BoxRect,
    ) -> Option<Self> {
        let facet_count = leaf_count.min(facet_limit(limit));
        if facet_count == 0 {
            return None;
        }
        let col_count = facet_count.min(wrap_columns(wrap_column));
        let row_count = facet_count.div_ceil(col_count);
        Some(Self {
            facet_count,
            col_count,
            row_count,
            cell_width: content.width / col_count as f64,
            cell_height: content.height / row_count as f64,
            origin,
        })
    }

    /// Cell of facet `index`, filled row by row.
    #[must_use]
    pub fn cell(&self, index: usize) -> BoxRect {
        let column = index % self.col_count;
        let row = index / self.col_count;
        BoxRect::new(
            self.origin.0 + column as f64 * self.cell_width,
            self.origin.1 + row as f64 * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }
}

/// Unset, non-finite or below-one limits mean "no limit".
fn facet_limit(limit: Option<f64>) -> usize {
    match limit {
        Some(limit) if limit.is_finite() && limit >= 1.0 => limit.floor() as usize,
        _ => usize::MAX,
    }
}

/// Unset, NaN or below-one wrap values fall back to the default column count.
fn wrap_columns(wrap_column: Option<f64>) -> usize {
    match wrap_column {
        Some(wrap) if wrap == f64::INFINITY => usize::MAX,
        Some(wrap) if wrap.is_finite() && wrap >= 1.0 => wrap.floor() as usize,
        _ => DEFAULT_MULTI_CHART_WRAP_COLUMN,
    }
}

/// One cell of a faceted chart.
#[derive(Debug)]
pub struct Facet {
    pub index: usize,
    pub label: String,
    /// Cell box relative to the parent base panel.
    pub bounds: BoxRect,
    pub chart: ChartNode,
}

/// Replicates a root chart into one child chart per visible
/// `multiChartColumn` group.
pub struct MultiChartReplicator;

impl MultiChartReplicator {
    pub fn replicate(chart: &mut ChartNode) -> ChartResult<()> {
        let grouped = chart
            .data_for("multiChartColumn", GroupByOptions::visible())?
            .unwrap_or_default();

        let Some(base) = chart.panels().base() else {
            return Err(ChartError::OperationInvalid(
                "multi-chart requires a composed base panel".to_owned(),
            ));
        };
        let margins = base.margins();
        let grid = FacetGrid::compute(
            grouped.leaf_count(),
            chart.options().multi_chart_limit,
            chart.options().multi_chart_wrap_column,
            (margins.left, margins.top),
            base.content_box(),
        );
        let Some(grid) = grid else {
            if chart.variant.allow_no_data() {
                return Ok(());
            }
            return Err(ChartError::NoData);
        };
        debug!(
            chart = %chart.id(),
            leafs = grouped.leaf_count(),
            facets = grid.facet_count,
            cols = grid.col_count,
            rows = grid.row_count,
            "replicating multi-chart"
        );

        let mut facets = Vec::with_capacity(grid.facet_count);
        for (index, leaf) in grouped.leafs.into_iter().take(grid.facet_count).enumerate() {
            let bounds = grid.cell(index);
            let config = ChartConfig {
                title: Some(leaf.abs_label.clone()),
                legend: Some(false),
                width: Some(bounds.width),
                height: Some(bounds.height),
                left: Some(bounds.left),
                top: Some(bounds.top),
                ..ChartConfig::default()
            };
            let mut child = ChartNode::with_parent(chart, config, Some(leaf.data))?;
            child.pre_render()?;
            facets.push(Facet {
                index,
                label: leaf.abs_label,
                bounds,
                chart: child,
            });
        }

        chart.facets = facets;
        chart.facet_grid = Some(grid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FacetGrid, facet_limit, wrap_columns};
    use crate::core::BoxRect;

    #[test]
    fn limit_below_one_is_unlimited() {
        assert_eq!(facet_limit(Some(0.5)), usize::MAX);
        assert_eq!(facet_limit(Some(f64::NAN)), usize::MAX);
        assert_eq!(facet_limit(Some(f64::INFINITY)), usize::MAX);
        assert_eq!(facet_limit(Some(4.7)), 4);
    }

    #[test]
    fn wrap_below_one_falls_back_to_three() {
        assert_eq!(wrap_columns(Some(0.0)), 3);
        assert_eq!(wrap_columns(None), 3);
        assert_eq!(wrap_columns(Some(f64::INFINITY)), usize::MAX);
        assert_eq!(wrap_columns(Some(2.0)), 2);
    }

    #[test]
    fn single_row_grid_when_fewer_facets_than_columns() {
        let content = BoxRect::new(0.0, 0.0, 90.0, 60.0);
        let grid = FacetGrid::compute(2, None, Some(3.0), (0.0, 0.0), content).expect("grid");
        assert_eq!((grid.col_count, grid.row_count), (2, 1));
        assert_eq!(grid.cell(1), BoxRect::new(45.0, 0.0, 45.0, 60.0));
    }
}
