use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{
    DataOptions, DimensionDeclaration, DimensionReader, Insets, MarginsSpec, RoleBinding,
    parse_margins,
};
use crate::extensions::ExtensionPoints;

use super::ChartCallbacks;

/// Default number of facet columns before a multi-chart grid wraps.
pub const DEFAULT_MULTI_CHART_WRAP_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Side of the parent box a title or legend panel docks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Top,
    Right,
    Bottom,
    Left,
}

impl Anchor {
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

/// Fully resolved chart configuration.
///
/// Built by overlaying a `ChartConfig` on a variant's defaults, then
/// normalized before every pre-render by `OptionsResolver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub canvas: Option<String>,
    pub width: f64,
    pub height: f64,
    pub margins: Option<MarginsSpec>,
    /// Facet placement inside the parent's base panel.
    pub left: Option<f64>,
    pub top: Option<f64>,

    pub multi_chart_limit: Option<f64>,
    pub multi_chart_wrap_column: Option<f64>,
    pub multi_chart_column_indexes: Vec<usize>,
    pub multi_chart_row_indexes: Vec<usize>,

    pub orientation: Orientation,
    pub extension_points: ExtensionPoints,

    pub roles: IndexMap<String, Option<RoleBinding>>,
    pub dimensions: IndexMap<String, DimensionDeclaration>,
    pub readers: Vec<DimensionReader>,
    pub crosstab_mode: bool,
    pub is_multi_valued: bool,
    pub series_in_rows: bool,
    pub measures_indexes: Vec<usize>,
    pub data_options: DataOptions,
    pub time_series: bool,
    pub time_series_format: Option<String>,

    pub animate: bool,

    pub title: Option<String>,
    pub title_position: Anchor,
    pub title_align: Alignment,
    pub title_size: Option<f64>,

    pub legend: bool,
    pub legend_position: Anchor,
    pub legend_size: Option<f64>,
    pub legend_align: Option<Alignment>,
    pub legend_min_margin_x: Option<f64>,
    pub legend_min_margin_y: Option<f64>,
    pub legend_text_margin: Option<f64>,
    pub legend_padding: Option<f64>,
    pub legend_text_adjust: Option<f64>,
    pub legend_shape: Option<String>,
    pub legend_draw_line: Option<bool>,
    pub legend_draw_marker: Option<bool>,
    pub legend_marker_size: Option<f64>,

    pub colors: Option<Vec<String>>,
    pub second_axis: bool,
    pub second_axis_idx: i64,
    pub second_axis_series_indexes: Option<Vec<i64>>,
    pub second_axis_color: Option<Vec<String>>,

    pub stacked: bool,
    pub percentage_normalized: bool,
    pub clickable: bool,
    pub selectable: bool,

    #[serde(skip)]
    pub callbacks: ChartCallbacks,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            canvas: None,
            width: 400.0,
            height: 300.0,
            margins: None,
            left: None,
            top: None,
            multi_chart_limit: None,
            multi_chart_wrap_column: Some(DEFAULT_MULTI_CHART_WRAP_COLUMN as f64),
            multi_chart_column_indexes: Vec::new(),
            multi_chart_row_indexes: Vec::new(),
            orientation: Orientation::Vertical,
            extension_points: ExtensionPoints::new(),
            roles: IndexMap::new(),
            dimensions: IndexMap::new(),
            readers: Vec::new(),
            crosstab_mode: true,
            is_multi_valued: false,
            series_in_rows: false,
            measures_indexes: Vec::new(),
            data_options: DataOptions::default(),
            time_series: false,
            time_series_format: None,
            animate: true,
            title: None,
            title_position: Anchor::Top,
            title_align: Alignment::Center,
            title_size: None,
            legend: false,
            legend_position: Anchor::Bottom,
            legend_size: None,
            legend_align: None,
            legend_min_margin_x: None,
            legend_min_margin_y: None,
            legend_text_margin: None,
            legend_padding: None,
            legend_text_adjust: None,
            legend_shape: None,
            legend_draw_line: None,
            legend_draw_marker: None,
            legend_marker_size: None,
            colors: None,
            second_axis: false,
            second_axis_idx: -1,
            second_axis_series_indexes: None,
            second_axis_color: None,
            stacked: false,
            percentage_normalized: false,
            clickable: false,
            selectable: false,
            callbacks: ChartCallbacks::with_defaults(),
        }
    }
}

impl ChartOptions {
    /// Overlays `config` on `defaults`.
    #[must_use]
    pub fn merged(defaults: Self, config: &ChartConfig) -> Self {
        let mut options = defaults;
        options.apply(config);
        options
    }

    /// Overlays every field set in `config`; unset fields keep their value.
    pub fn apply(&mut self, config: &ChartConfig) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &config.$field {
                        self.$field = value.clone();
                    }
                )*
            };
        }
        macro_rules! overlay_optional {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &config.$field {
                        self.$field = Some(value.clone());
                    }
                )*
            };
        }

        overlay!(
            width,
            height,
            multi_chart_column_indexes,
            multi_chart_row_indexes,
            orientation,
            readers,
            crosstab_mode,
            is_multi_valued,
            series_in_rows,
            measures_indexes,
            time_series,
            animate,
            title_position,
            title_align,
            legend,
            legend_position,
            second_axis,
            second_axis_idx,
            stacked,
            percentage_normalized,
            clickable,
            selectable,
        );
        overlay_optional!(
            canvas,
            margins,
            left,
            top,
            multi_chart_limit,
            multi_chart_wrap_column,
            time_series_format,
            title,
            title_size,
            legend_size,
            legend_align,
            legend_min_margin_x,
            legend_min_margin_y,
            legend_text_margin,
            legend_padding,
            legend_text_adjust,
            legend_shape,
            legend_draw_line,
            legend_draw_marker,
            legend_marker_size,
            colors,
            second_axis_series_indexes,
            second_axis_color,
        );

        if let Some(points) = &config.extension_points {
            for (key, value) in points {
                self.extension_points.insert(key.clone(), value.clone());
            }
        }
        if let Some(roles) = &config.roles {
            for (name, binding) in roles {
                self.roles.insert(name.clone(), binding.clone());
            }
        }
        if let Some(dimensions) = &config.dimensions {
            for (name, declaration) in dimensions {
                self.dimensions.insert(name.clone(), declaration.clone());
            }
        }
        if let Some(data_options) = &config.data_options {
            self.data_options.merge(data_options);
        }
        self.callbacks.merge(&config.callbacks);
    }

    /// Margins as resolved insets; unparsed or invalid margins are zero.
    #[must_use]
    pub fn margin_insets(&self) -> Insets {
        self.margins
            .as_ref()
            .and_then(parse_margins)
            .map(|sides| sides.resolve())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_orientation_vertical(&self, orientation: Option<Orientation>) -> bool {
        orientation.unwrap_or(self.orientation) == Orientation::Vertical
    }

    #[must_use]
    pub fn is_orientation_horizontal(&self, orientation: Option<Orientation>) -> bool {
        orientation.unwrap_or(self.orientation) == Orientation::Horizontal
    }

    #[must_use]
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|title| !title.is_empty())
    }
}

/// Caller-supplied configuration. Every field is optional; unset fields
/// never override a default.
///
/// Deserializes from the camelCase option names of the JSON configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    pub canvas: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margins: Option<MarginsSpec>,
    pub left: Option<f64>,
    pub top: Option<f64>,

    pub multi_chart_limit: Option<f64>,
    pub multi_chart_wrap_column: Option<f64>,
    pub multi_chart_column_indexes: Option<Vec<usize>>,
    pub multi_chart_row_indexes: Option<Vec<usize>>,

    pub orientation: Option<Orientation>,
    pub extension_points: Option<ExtensionPoints>,

    pub roles: Option<IndexMap<String, Option<RoleBinding>>>,
    pub dimensions: Option<IndexMap<String, DimensionDeclaration>>,
    pub readers: Option<Vec<DimensionReader>>,
    pub crosstab_mode: Option<bool>,
    pub is_multi_valued: Option<bool>,
    pub series_in_rows: Option<bool>,
    pub measures_indexes: Option<Vec<usize>>,
    pub data_options: Option<DataOptions>,
    pub time_series: Option<bool>,
    pub time_series_format: Option<String>,

    pub animate: Option<bool>,

    pub title: Option<String>,
    pub title_position: Option<Anchor>,
    pub title_align: Option<Alignment>,
    pub title_size: Option<f64>,

    pub legend: Option<bool>,
    pub legend_position: Option<Anchor>,
    pub legend_size: Option<f64>,
    pub legend_align: Option<Alignment>,
    pub legend_min_margin_x: Option<f64>,
    pub legend_min_margin_y: Option<f64>,
    pub legend_text_margin: Option<f64>,
    pub legend_padding: Option<f64>,
    pub legend_text_adjust: Option<f64>,
    pub legend_shape: Option<String>,
    pub legend_draw_line: Option<bool>,
    pub legend_draw_marker: Option<bool>,
    pub legend_marker_size: Option<f64>,

    pub colors: Option<Vec<String>>,
    pub second_axis: Option<bool>,
    pub second_axis_idx: Option<i64>,
    pub second_axis_series_indexes: Option<Vec<i64>>,
    pub second_axis_color: Option<Vec<String>>,

    pub stacked: Option<bool>,
    pub percentage_normalized: Option<bool>,
    pub clickable: Option<bool>,
    pub selectable: Option<bool>,

    #[serde(skip)]
    pub callbacks: ChartCallbacks,
}

impl ChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_margins(mut self, margins: impl Into<MarginsSpec>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = Some(legend);
        self
    }

    #[must_use]
    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = Some(animate);
        self
    }

    #[must_use]
    pub fn with_crosstab_mode(mut self, crosstab_mode: bool) -> Self {
        self.crosstab_mode = Some(crosstab_mode);
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: &str, binding: impl Into<RoleBinding>) -> Self {
        self.roles
            .get_or_insert_with(IndexMap::new)
            .insert(role.to_owned(), Some(binding.into()));
        self
    }

    #[must_use]
    pub fn with_multi_chart_column_indexes(mut self, indexes: Vec<usize>) -> Self {
        self.multi_chart_column_indexes = Some(indexes);
        self
    }

    #[must_use]
    pub fn with_multi_chart_wrap_column(mut self, wrap: f64) -> Self {
        self.multi_chart_wrap_column = Some(wrap);
        self
    }

    #[must_use]
    pub fn with_multi_chart_limit(mut self, limit: f64) -> Self {
        self.multi_chart_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_extension_point(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extension_points
            .get_or_insert_with(ExtensionPoints::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_callbacks(mut self, callbacks: ChartCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Anchor, ChartConfig, ChartOptions};
    use crate::core::MarginsSpec;

    #[test]
    fn unset_config_fields_keep_defaults() {
        let options = ChartOptions::merged(
            ChartOptions::default(),
            &ChartConfig::new().with_title("Sales"),
        );
        assert_eq!(options.width, 400.0);
        assert_eq!(options.height, 300.0);
        assert_eq!(options.multi_chart_wrap_column, Some(3.0));
        assert!(options.crosstab_mode);
        assert!(options.animate);
        assert_eq!(options.title.as_deref(), Some("Sales"));
    }

    #[test]
    fn config_deserializes_camel_case_json() {
        let config: ChartConfig = serde_json::from_value(json!({
            "width": 640,
            "margins": "10 20",
            "legendPosition": "right",
            "multiChartColumnIndexes": [0],
            "dataOptions": { "categoriesCount": 2 },
            "extensionPoints": { "base_fillStyle": "#eee" },
            "roles": { "series": "region, country", "value": null }
        }))
        .expect("config");

        assert_eq!(config.width, Some(640.0));
        assert_eq!(config.margins, Some(MarginsSpec::Shorthand("10 20".to_owned())));
        assert_eq!(config.legend_position, Some(Anchor::Right));
        assert_eq!(config.multi_chart_column_indexes, Some(vec![0]));
        let roles = config.roles.expect("roles");
        assert!(roles.get("value").expect("value entry").is_none());
    }

    #[test]
    fn nested_blocks_merge_per_key() {
        let mut options = ChartOptions::default();
        options.apply(&ChartConfig::new().with_extension_point("base_a", 1));
        options.apply(&ChartConfig::new().with_extension_point("base_b", 2));
        assert_eq!(options.extension_points.len(), 2);
    }
}
