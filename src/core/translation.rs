//! Translation operators: raw rows plus column metadata to typed datums.
//!
//! Two orientations are supported. Relational input has one datum per row
//! and one dimension per column. Crosstab input has category columns on the
//! left and one series per remaining column, producing one datum per cell.

use std::fmt;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{ChartError, ChartResult};

use super::{
    Atom, ColumnMetadata, ComplexType, Datum, DimensionKind, DimensionType, group_level_name,
    split_group_name,
};

pub type LabelFormatterFn = Rc<dyn Fn(&str) -> String>;

/// Dimension name of the second-axis marker written when second-axis series are set.
pub const DATA_PART_DIMENSION: &str = "dataPart";

/// Explicit label/kind declaration for a dimension (`dimensions` option).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionDeclaration {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value_type: Option<DimensionKind>,
}

/// Explicit column to dimension assignment (`readers` option, relational only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionReader {
    pub names: Vec<String>,
    pub indexes: Vec<usize>,
}

/// Crosstab-specific layout hints (`dataOptions` option block).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataOptions {
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub measures_in_columns: Option<bool>,
    #[serde(default, alias = "measuresIdx")]
    pub measures_index: Option<usize>,
    #[serde(default, alias = "numMeasures")]
    pub measures_count: Option<usize>,
    #[serde(default)]
    pub categories_count: Option<usize>,
}

impl DataOptions {
    /// Overlays the fields set in `other`.
    pub fn merge(&mut self, other: &Self) {
        if other.separator.is_some() {
            self.separator.clone_from(&other.separator);
        }
        if other.measures_in_columns.is_some() {
            self.measures_in_columns = other.measures_in_columns;
        }
        if other.measures_index.is_some() {
            self.measures_index = other.measures_index;
        }
        if other.measures_count.is_some() {
            self.measures_count = other.measures_count;
        }
        if other.categories_count.is_some() {
            self.categories_count = other.categories_count;
        }
    }
}

/// Normalized options bag handed to a translation operator.
#[derive(Clone, Default)]
pub struct TranslationOptions {
    pub crosstab_mode: bool,
    pub series_in_rows: bool,
    pub is_multi_valued: bool,
    pub dimensions: IndexMap<String, DimensionDeclaration>,
    pub readers: Vec<DimensionReader>,
    pub measures_indexes: Vec<usize>,
    pub multi_chart_column_indexes: Vec<usize>,
    pub multi_chart_row_indexes: Vec<usize>,
    /// Series positions plotted on the second axis; negative values count from the end.
    pub second_axis_series_indexes: Option<Vec<i64>>,
    pub data_options: DataOptions,
    pub is_category_time_series: bool,
    pub category_time_series_format: Option<String>,
    pub category_formatter: Option<LabelFormatterFn>,
    pub series_formatter: Option<LabelFormatterFn>,
}

impl fmt::Debug for TranslationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationOptions")
            .field("crosstab_mode", &self.crosstab_mode)
            .field("series_in_rows", &self.series_in_rows)
            .field("is_multi_valued", &self.is_multi_valued)
            .field("dimensions", &self.dimensions)
            .field("readers", &self.readers)
            .field("measures_indexes", &self.measures_indexes)
            .field("multi_chart_column_indexes", &self.multi_chart_column_indexes)
            .field("multi_chart_row_indexes", &self.multi_chart_row_indexes)
            .field("second_axis_series_indexes", &self.second_axis_series_indexes)
            .field("data_options", &self.data_options)
            .field("is_category_time_series", &self.is_category_time_series)
            .field("category_time_series_format", &self.category_time_series_format)
            .field("category_formatter", &self.category_formatter.is_some())
            .field("series_formatter", &self.series_formatter.is_some())
            .finish()
    }
}

/// Converts raw rows into typed datums.
///
/// `configure_type` runs first and may add or refine schema dimensions;
/// `execute` then produces datums conforming to the configured schema.
pub trait TranslationOper {
    fn configure_type(&mut self, schema: &mut ComplexType) -> ChartResult<()>;
    fn execute(&self, schema: &ComplexType) -> ChartResult<Vec<Datum>>;
}

/// Selects the crosstab or relational operator from `options.crosstab_mode`.
#[must_use]
pub fn create_translation<'a>(
    resultset: &'a [Vec<Value>],
    metadata: &'a [ColumnMetadata],
    options: TranslationOptions,
) -> Box<dyn TranslationOper + 'a> {
    if options.crosstab_mode {
        Box::new(CrosstabTranslation::new(resultset, metadata, options))
    } else {
        Box::new(RelationalTranslation::new(resultset, metadata, options))
    }
}

/// One dimension fed from one source column.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnBinding {
    dimension: String,
    column: usize,
}

#[derive(Debug)]
pub struct RelationalTranslation<'a> {
    resultset: &'a [Vec<Value>],
    metadata: &'a [ColumnMetadata],
    options: TranslationOptions,
    bindings: Vec<ColumnBinding>,
}

impl<'a> RelationalTranslation<'a> {
    #[must_use]
    pub fn new(
        resultset: &'a [Vec<Value>],
        metadata: &'a [ColumnMetadata],
        options: TranslationOptions,
    ) -> Self {
        Self {
            resultset,
            metadata,
            options,
            bindings: Vec::new(),
        }
    }

    fn plan_bindings(&self) -> ChartResult<Vec<ColumnBinding>> {
        let column_count = column_count(self.resultset, self.metadata);
        let mut bindings: Vec<ColumnBinding> = Vec::new();
        let mut used_columns = vec![false; column_count];

        for reader in &self.options.readers {
            for (name, column) in reader.names.iter().zip(&reader.indexes) {
                bind_column(&mut bindings, &mut used_columns, name.trim().to_owned(), *column)?;
            }
        }
        for (level, column) in self.options.multi_chart_column_indexes.iter().enumerate() {
            let dimension = group_level_name("multiChartColumn", level);
            bind_column(&mut bindings, &mut used_columns, dimension, *column)?;
        }
        for (level, column) in self.options.multi_chart_row_indexes.iter().enumerate() {
            let dimension = group_level_name("multiChartRow", level);
            bind_column(&mut bindings, &mut used_columns, dimension, *column)?;
        }

        let explicit_measures =
            self.options.is_multi_valued && !self.options.measures_indexes.is_empty();
        if explicit_measures {
            for (level, column) in self.options.measures_indexes.iter().enumerate() {
                let dimension = group_level_name("value", level);
                bind_column(&mut bindings, &mut used_columns, dimension, *column)?;
            }
        }

        let free: Vec<usize> = (0..column_count)
            .filter(|column| !used_columns[*column])
            .collect();
        for (dimension, column) in default_relational_layout(&free, explicit_measures) {
            bind_column(&mut bindings, &mut used_columns, dimension, column)?;
        }
        Ok(bindings)
    }
}

/// Binds `dimension` to `column` unless the dimension is already bound.
fn bind_column(
    bindings: &mut Vec<ColumnBinding>,
    used_columns: &mut [bool],
    dimension: String,
    column: usize,
) -> ChartResult<()> {
    if column >= used_columns.len() {
        return Err(ChartError::argument_invalid(
            "readers",
            format!(
                "column index {column} is out of range (columns: {})",
                used_columns.len()
            ),
        ));
    }
    if bindings.iter().any(|binding| binding.dimension == dimension) {
        return Ok(());
    }
    used_columns[column] = true;
    bindings.push(ColumnBinding { dimension, column });
    Ok(())
}

/// Default relational dimension layout over the unassigned columns.
///
/// 1 column: value; 2: category, value; 3 or more: series, category...,
/// value. Without a value column (explicit measures) the first of two or more
/// free columns is the series and the rest are categories.
fn default_relational_layout(free: &[usize], explicit_measures: bool) -> Vec<(String, usize)> {
    let (value_column, rest) = match (explicit_measures, free.split_last()) {
        (false, Some((last, rest))) => (Some(*last), rest),
        _ => (None, free),
    };

    let mut layout = Vec::with_capacity(free.len());
    let category_columns = if rest.len() >= 2 {
        layout.push(("series".to_owned(), rest[0]));
        &rest[1..]
    } else {
        rest
    };
    for (level, column) in category_columns.iter().enumerate() {
        layout.push((group_level_name("category", level), *column));
    }
    if let Some(column) = value_column {
        layout.push(("value".to_owned(), column));
    }
    layout
}

impl TranslationOper for RelationalTranslation<'_> {
    fn configure_type(&mut self, schema: &mut ComplexType) -> ChartResult<()> {
        self.bindings = self.plan_bindings()?;
        for binding in &self.bindings {
            let kind = dimension_kind(
                &binding.dimension,
                self.metadata.get(binding.column),
                &self.options,
            );
            let mut dimension = DimensionType::new(binding.dimension.clone(), kind)
                .with_source_index(binding.column);
            if let Some(column) = self.metadata.get(binding.column) {
                dimension = dimension.with_label(column.label());
            }
            schema.add_dimension(dimension);
        }
        apply_declarations(schema, &self.options.dimensions);
        add_data_part_dimension(schema, &self.options);
        debug!(dimensions = schema.len(), "configured relational schema");
        Ok(())
    }

    fn execute(&self, schema: &ComplexType) -> ChartResult<Vec<Datum>> {
        let mut datums = Vec::with_capacity(self.resultset.len());
        for row in self.resultset {
            let mut datum = Datum::new();
            for binding in &self.bindings {
                let raw = row.get(binding.column).cloned().unwrap_or(Value::Null);
                datum.set_atom(
                    binding.dimension.clone(),
                    make_atom(&binding.dimension, raw, schema, &self.options)?,
                );
            }
            datums.push(datum);
        }
        mark_second_axis(&mut datums, &self.options, "series");
        Ok(datums)
    }
}

/// Series block of a crosstab row: the columns holding one series' measures.
#[derive(Debug, Clone, PartialEq)]
struct SeriesBlock {
    key: String,
    columns: SmallVec<[usize; 2]>,
}

#[derive(Debug)]
pub struct CrosstabTranslation<'a> {
    resultset: &'a [Vec<Value>],
    metadata: &'a [ColumnMetadata],
    options: TranslationOptions,
    category_bindings: Vec<ColumnBinding>,
    measure_column: Option<usize>,
    series: Vec<SeriesBlock>,
}

impl<'a> CrosstabTranslation<'a> {
    #[must_use]
    pub fn new(
        resultset: &'a [Vec<Value>],
        metadata: &'a [ColumnMetadata],
        options: TranslationOptions,
    ) -> Self {
        Self {
            resultset,
            metadata,
            options,
            category_bindings: Vec::new(),
            measure_column: None,
            series: Vec::new(),
        }
    }

    /// Group names used for the category and series axes of the crosstab.
    fn axis_groups(&self) -> (&'static str, &'static str) {
        if self.options.series_in_rows {
            ("series", "category")
        } else {
            ("category", "series")
        }
    }

    fn measures_per_series(&self) -> usize {
        let measures_in_columns = self.options.data_options.measures_in_columns.unwrap_or(true);
        if self.options.is_multi_valued && measures_in_columns {
            self.options.data_options.measures_count.unwrap_or(1).max(1)
        } else {
            1
        }
    }

    fn plan(&mut self) {
        let column_count = column_count(self.resultset, self.metadata);
        let categories_count = self
            .options
            .data_options
            .categories_count
            .unwrap_or(1)
            .min(column_count);
        let (row_group, _) = self.axis_groups();

        self.measure_column = match (
            self.options.is_multi_valued,
            self.options.data_options.measures_in_columns,
            self.options.data_options.measures_index,
        ) {
            (true, Some(false), Some(index)) if index < categories_count => Some(index),
            _ => None,
        };

        self.category_bindings.clear();
        let mut row_level = 0;
        let mut multi_chart_level = 0;
        for column in 0..categories_count {
            if Some(column) == self.measure_column {
                continue;
            }
            let dimension = if self.options.multi_chart_column_indexes.contains(&column) {
                multi_chart_level += 1;
                group_level_name("multiChartColumn", multi_chart_level - 1)
            } else {
                row_level += 1;
                group_level_name(row_group, row_level - 1)
            };
            self.category_bindings.push(ColumnBinding { dimension, column });
        }

        let measures = self.measures_per_series();
        let separator = self.options.data_options.separator.as_deref();
        self.series = (categories_count..column_count)
            .collect::<Vec<_>>()
            .chunks(measures)
            .map(|columns| {
                let first = columns[0];
                let name = self
                    .metadata
                    .get(first)
                    .map_or_else(|| format!("Series {first}"), |column| column.col_name.clone());
                let key = match separator {
                    Some(separator) if measures > 1 => name
                        .rsplit_once(separator)
                        .map_or(name.clone(), |(series, _)| series.to_owned()),
                    _ => name,
                };
                SeriesBlock {
                    key,
                    columns: columns.iter().copied().collect(),
                }
            })
            .collect();
    }

    /// Distinct measure names of the measure column, in first-seen order.
    fn collect_measure_names(&self) -> Vec<String> {
        let Some(measure_column) = self.measure_column else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for row in self.resultset {
            let name = measure_name(row, measure_column);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    fn value_dimension_for_row(&self, row: &[Value], measure_names: &mut Vec<String>) -> String {
        let Some(measure_column) = self.measure_column else {
            return "value".to_owned();
        };
        let name = measure_name(row, measure_column);
        let level = match measure_names.iter().position(|known| *known == name) {
            Some(level) => level,
            None => {
                measure_names.push(name);
                measure_names.len() - 1
            }
        };
        group_level_name("value", level)
    }
}

fn measure_name(row: &[Value], measure_column: usize) -> String {
    row.get(measure_column)
        .map(|value| value.as_str().map_or_else(|| value.to_string(), str::to_owned))
        .unwrap_or_default()
}

impl TranslationOper for CrosstabTranslation<'_> {
    fn configure_type(&mut self, schema: &mut ComplexType) -> ChartResult<()> {
        self.plan();
        let (_, column_group) = self.axis_groups();

        for binding in &self.category_bindings {
            let column = self.metadata.get(binding.column);
            let kind = dimension_kind(&binding.dimension, column, &self.options);
            let mut dimension = DimensionType::new(binding.dimension.clone(), kind)
                .with_source_index(binding.column);
            if let Some(column) = column {
                dimension = dimension.with_label(column.label());
            }
            schema.add_dimension(dimension);
        }
        if !self.series.is_empty() {
            schema.add_dimension(DimensionType::new(column_group, DimensionKind::Text));
        }

        let value_levels = if self.measure_column.is_some() {
            self.collect_measure_names().len().max(1)
        } else {
            self.measures_per_series()
        };
        for level in 0..value_levels {
            schema.add_dimension(DimensionType::new(
                group_level_name("value", level),
                DimensionKind::Number,
            ));
        }

        apply_declarations(schema, &self.options.dimensions);
        add_data_part_dimension(schema, &self.options);
        debug!(
            dimensions = schema.len(),
            series = self.series.len(),
            "configured crosstab schema"
        );
        Ok(())
    }

    fn execute(&self, schema: &ComplexType) -> ChartResult<Vec<Datum>> {
        let (_, column_group) = self.axis_groups();
        let mut datums = Vec::with_capacity(self.resultset.len() * self.series.len());
        let mut measure_names = Vec::new();

        for row in self.resultset {
            let mut base = Datum::new();
            for binding in &self.category_bindings {
                let raw = row.get(binding.column).cloned().unwrap_or(Value::Null);
                base.set_atom(
                    binding.dimension.clone(),
                    make_atom(&binding.dimension, raw, schema, &self.options)?,
                );
            }
            let row_value_dimension = self.value_dimension_for_row(row, &mut measure_names);

            for block in &self.series {
                let mut datum = base.clone();
                datum.set_atom(
                    column_group,
                    make_atom(
                        column_group,
                        Value::String(block.key.clone()),
                        schema,
                        &self.options,
                    )?,
                );
                for (level, column) in block.columns.iter().enumerate() {
                    let dimension = if self.measure_column.is_some() {
                        row_value_dimension.clone()
                    } else {
                        group_level_name("value", level)
                    };
                    let raw = row.get(*column).cloned().unwrap_or(Value::Null);
                    datum.set_atom(dimension, Atom::new(raw));
                }
                datums.push(datum);
            }
        }
        mark_second_axis(&mut datums, &self.options, column_group);
        Ok(datums)
    }
}

fn column_count(resultset: &[Vec<Value>], metadata: &[ColumnMetadata]) -> usize {
    if metadata.is_empty() {
        resultset.first().map_or(0, Vec::len)
    } else {
        metadata.len()
    }
}

fn dimension_kind(
    dimension: &str,
    column: Option<&ColumnMetadata>,
    options: &TranslationOptions,
) -> DimensionKind {
    let (group, _) = split_group_name(dimension);
    if group == "category" && options.is_category_time_series {
        return DimensionKind::Date;
    }
    match column {
        Some(column) if column.col_type.is_some() => column.kind(),
        _ if group == "value" => DimensionKind::Number,
        _ => DimensionKind::Text,
    }
}

fn apply_declarations(
    schema: &mut ComplexType,
    declarations: &IndexMap<String, DimensionDeclaration>,
) {
    for (name, declaration) in declarations {
        let mut dimension = schema
            .dimension(name)
            .cloned()
            .unwrap_or_else(|| DimensionType::new(name.clone(), DimensionKind::Text));
        if let Some(label) = &declaration.label {
            dimension.label.clone_from(label);
        }
        if let Some(kind) = declaration.value_type {
            dimension.kind = kind;
        }
        schema.add_dimension(dimension);
    }
}

fn add_data_part_dimension(schema: &mut ComplexType, options: &TranslationOptions) {
    if options.second_axis_series_indexes.is_some() {
        schema.add_dimension(DimensionType::new(DATA_PART_DIMENSION, DimensionKind::Text));
    }
}

/// Tags every datum with `dataPart` "1" when its series is on the second axis.
fn mark_second_axis(datums: &mut [Datum], options: &TranslationOptions, series_dimension: &str) {
    let Some(indexes) = &options.second_axis_series_indexes else {
        return;
    };
    let mut series_keys = Vec::new();
    for datum in datums.iter() {
        if let Some(atom) = datum.atom(series_dimension) {
            let key = atom.key();
            if !series_keys.contains(&key) {
                series_keys.push(key);
            }
        }
    }
    let series_count = series_keys.len() as i64;
    let second_axis: Vec<usize> = indexes
        .iter()
        .filter_map(|index| {
            let resolved = if *index < 0 { series_count + index } else { *index };
            (0..series_count).contains(&resolved).then_some(resolved as usize)
        })
        .collect();

    for datum in datums.iter_mut() {
        let position = datum
            .atom(series_dimension)
            .and_then(|atom| series_keys.iter().position(|key| *key == atom.key()));
        let part = if position.is_some_and(|position| second_axis.contains(&position)) {
            "1"
        } else {
            "0"
        };
        datum.set_atom(DATA_PART_DIMENSION, Atom::new(Value::String(part.to_owned())));
    }
}

fn make_atom(
    dimension: &str,
    raw: Value,
    schema: &ComplexType,
    options: &TranslationOptions,
) -> ChartResult<Atom> {
    let (group, _) = split_group_name(dimension);
    let text = match &raw {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let is_date = schema
        .dimension(dimension)
        .is_some_and(|dimension| dimension.kind == DimensionKind::Date);
    let atom = match (&options.category_time_series_format, is_date && raw.is_string()) {
        (Some(format), true) => {
            let timestamp = parse_time(&text, format)?;
            Atom::new(Value::from(timestamp)).with_label(text.clone())
        }
        _ => Atom::new(raw),
    };

    let formatter = match group {
        "category" => options.category_formatter.as_ref(),
        "series" => options.series_formatter.as_ref(),
        _ => None,
    };
    Ok(match formatter {
        Some(formatter) => atom.with_label(formatter(&text)),
        None => atom,
    })
}

/// Parses `text` with a chrono format, returning unix milliseconds.
fn parse_time(text: &str, format: &str) -> ChartResult<i64> {
    if let Ok(date_time) = NaiveDateTime::parse_from_str(text, format) {
        return Ok(date_time.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(text, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date_time| date_time.and_utc().timestamp_millis())
        .ok_or_else(|| {
            ChartError::InvalidData(format!(
                "category '{text}' does not match time series format '{format}'"
            ))
        })
}
