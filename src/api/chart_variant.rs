use indexmap::IndexMap;
use tracing::trace;

use crate::core::{BoxRect, DataGroup, GroupByOptions, GroupedData};
use crate::error::ChartResult;
use crate::extensions::apply_extensions;
use crate::render::{Color, RectPrimitive, RenderFrame};

use super::{ChartNode, ChartOptions, PanelKind};

/// Variant-specific behavior plugged into the shared chart lifecycle.
///
/// One strategy value is shared by a root chart and all of its facets.
pub trait ChartVariant {
    fn name(&self) -> &'static str;

    /// Options every chart of this variant starts from.
    fn default_options(&self) -> ChartOptions {
        ChartOptions::default()
    }

    /// Variant option rules, run before base normalization.
    ///
    /// Must be idempotent.
    fn process_options(&self, _options: &mut ChartOptions) {}

    /// Whether a root chart without rows still renders normally.
    fn allow_no_data(&self) -> bool {
        false
    }

    /// Builds content panels for a single (non-replicated) chart.
    fn build_content(&self, _chart: &mut ChartNode) -> ChartResult<()> {
        Ok(())
    }

    /// Emits the primitives of the content built by `build_content`.
    ///
    /// Dual-valued properties must go through `ChartNode::animate`.
    fn paint_content(&self, _chart: &ChartNode, _frame: &mut RenderFrame) -> ChartResult<()> {
        Ok(())
    }

    fn on_render_end(&self, chart: &mut ChartNode, animated: bool) {
        chart.base_render_end(animated);
    }
}

/// Chart without content of its own: base, title and legend only.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicChart;

impl ChartVariant for BasicChart {
    fn name(&self) -> &'static str {
        "basic"
    }
}

/// Extension prefix of the bar content panel.
pub const BAR_PANEL_EXTENSION_PREFIX: &str = "barPanel_";

/// Category bars, one bar per series within each category.
///
/// Bars grow from the baseline during an animated render. Stacked bars pile
/// series on top of each other instead of placing them side by side.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarChart;

impl BarChart {
    const BAND_FILL_RATIO: f64 = 0.8;
}

impl ChartVariant for BarChart {
    fn name(&self) -> &'static str {
        "bar"
    }

    fn process_options(&self, options: &mut ChartOptions) {
        if options.percentage_normalized {
            options.stacked = true;
        }
    }

    fn build_content(&self, chart: &mut ChartNode) -> ChartResult<()> {
        let client = chart.panels().client_box();
        let points = chart.options().extension_points.clone();
        let panels = chart.panels_mut();
        let Some(base_id) = panels.base_id() else {
            return Ok(());
        };
        let content_id = panels.insert(PanelKind::Content, Some(base_id), client);
        apply_extensions(
            panels.get_mut(content_id),
            BAR_PANEL_EXTENSION_PREFIX,
            Some(&points),
        )?;
        Ok(())
    }

    fn paint_content(&self, chart: &ChartNode, frame: &mut RenderFrame) -> ChartResult<()> {
        let Some(content) = chart.panels().find("content").map(|panel| panel.bounds()) else {
            return Ok(());
        };
        let Some(categories) = chart.data_for("category", GroupByOptions::visible().lenient())?
        else {
            return Ok(());
        };

        // category -> series -> value
        let mut table: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();
        let mut series_names: IndexMap<String, usize> = IndexMap::new();
        let series_role = chart.role_of("series", false)?.cloned();
        let value_dimension = chart
            .role_of("value", false)?
            .and_then(|role| role.grouping().dimension_names().first().cloned())
            .unwrap_or_else(|| "value".to_owned());
        for category in &categories.leafs {
            let row = table.entry(category.abs_label.clone()).or_default();
            let groups = match &series_role {
                Some(role) => category.data.group_by(role.grouping(), GroupByOptions::visible()),
                None => GroupedData {
                    leafs: vec![DataGroup {
                        key: Vec::new(),
                        abs_label: String::new(),
                        data: category.data.clone(),
                    }],
                },
            };
            for series in groups.leafs {
                let next = series_names.len();
                series_names.entry(series.abs_label.clone()).or_insert(next);
                let total: f64 = series
                    .data
                    .datums()
                    .iter()
                    .filter_map(|datum| datum.atom(&value_dimension).and_then(|atom| atom.as_f64()))
                    .sum();
                *row.entry(series.abs_label).or_insert(0.0) += total;
            }
        }
        if table.is_empty() {
            return Ok(());
        }

        let options = chart.options();
        let stacked = options.stacked;
        let normalized = options.percentage_normalized;
        let scale_max = table
            .values()
            .map(|row| {
                if stacked {
                    row.values().map(|value| value.max(0.0)).sum::<f64>()
                } else {
                    row.values().fold(0.0_f64, |max, value| max.max(*value))
                }
            })
            .fold(0.0_f64, f64::max);

        let vertical = options.is_orientation_vertical(None);
        let band_count = table.len() as f64;
        let band = if vertical { content.width } else { content.height } / band_count;
        let extent = if vertical { content.height } else { content.width };
        let series_count = series_names.len().max(1) as f64;

        for (category_index, row) in table.values().enumerate() {
            let row_total: f64 = row.values().map(|value| value.max(0.0)).sum();
            let band_start =
                category_index as f64 * band + band * (1.0 - Self::BAND_FILL_RATIO) / 2.0;
            let bar_band = band * Self::BAND_FILL_RATIO;
            let mut stack_offset = 0.0;
            for (series_label, value) in row {
                let series_index = series_names.get(series_label).copied().unwrap_or(0);
                let value = value.max(0.0);
                let total = if normalized { row_total } else { scale_max };
                let ratio = if total > 0.0 { value / total } else { 0.0 };
                let length = chart.animate(0.0, ratio * extent);
                let (offset, thickness) = if stacked {
                    (band_start, bar_band)
                } else {
                    let thickness = bar_band / series_count;
                    (band_start + series_index as f64 * thickness, thickness)
                };
                let rect = bar_rect(content, vertical, offset, thickness, stack_offset, length);
                if stacked {
                    stack_offset += length;
                }
                frame.rects.push(rect.with_fill(series_color(chart, series_index)));
            }
        }
        trace!(bars = frame.rects.len(), "painted bar content");
        Ok(())
    }
}

fn bar_rect(
    content: BoxRect,
    vertical: bool,
    offset: f64,
    thickness: f64,
    stack_offset: f64,
    length: f64,
) -> RectPrimitive {
    if vertical {
        let bottom = content.top + content.height - stack_offset;
        RectPrimitive::new(content.left + offset, bottom - length, thickness, length)
    } else {
        RectPrimitive::new(
            content.left + stack_offset,
            content.top + offset,
            length,
            thickness,
        )
    }
}

fn series_color(chart: &ChartNode, series_index: usize) -> Color {
    chart.colors().color_at(series_index)
}

#[cfg(test)]
mod tests {
    use super::{BarChart, ChartVariant};
    use crate::api::ChartOptions;

    #[test]
    fn percentage_normalized_bars_are_stacked() {
        let mut options = ChartOptions {
            percentage_normalized: true,
            ..ChartOptions::default()
        };
        BarChart.process_options(&mut options);
        BarChart.process_options(&mut options);
        assert!(options.stacked);
    }

    #[test]
    fn horizontal_orientation_is_read_from_options() {
        let options = ChartOptions {
            orientation: crate::api::Orientation::Horizontal,
            ..ChartOptions::default()
        };
        assert!(options.is_orientation_horizontal(None));
    }
}
