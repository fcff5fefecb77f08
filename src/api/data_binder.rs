use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::core::{
    ColumnMetadata, DataSet, GroupByOptions, GroupedData, RoleSpecs, TranslationOptions,
    VisualRole, create_translation, resolve_roles,
};
use crate::error::{ChartError, ChartResult};

use super::{ChartConfig, ChartNode, ChartOptions};

/// Tabular chart input in the `{metadata, resultset}` query-result shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputData {
    #[serde(default)]
    pub metadata: Vec<ColumnMetadata>,
    #[serde(default)]
    pub resultset: Vec<Vec<Value>>,
}

impl InputData {
    #[must_use]
    pub fn new(metadata: Vec<ColumnMetadata>, resultset: Vec<Vec<Value>>) -> Self {
        Self {
            metadata,
            resultset,
        }
    }
}

/// Builds the translation options bag from resolved chart options.
#[must_use]
pub fn translation_options(options: &ChartOptions) -> TranslationOptions {
    let second_axis_series_indexes = options.second_axis.then(|| {
        options
            .second_axis_series_indexes
            .clone()
            .unwrap_or_else(|| vec![options.second_axis_idx])
    });

    TranslationOptions {
        crosstab_mode: options.crosstab_mode,
        series_in_rows: options.series_in_rows,
        is_multi_valued: options.is_multi_valued,
        dimensions: options.dimensions.clone(),
        readers: options.readers.clone(),
        measures_indexes: options.measures_indexes.clone(),
        multi_chart_column_indexes: options.multi_chart_column_indexes.clone(),
        multi_chart_row_indexes: options.multi_chart_row_indexes.clone(),
        second_axis_series_indexes,
        data_options: options.data_options.clone(),
        is_category_time_series: options.time_series,
        category_time_series_format: options
            .time_series
            .then(|| options.time_series_format.clone())
            .flatten(),
        category_formatter: options.callbacks.get_category_label.clone(),
        series_formatter: options.callbacks.get_series_label.clone(),
    }
}

impl ChartNode {
    /// Sets the raw rows. Root charts only.
    pub fn set_resultset(&mut self, resultset: Vec<Vec<Value>>) -> ChartResult<()> {
        self.assert_root("resultset")?;
        if resultset.is_empty() {
            warn!(chart = %self.id, "resultset is empty");
        }
        self.resultset = resultset;
        Ok(())
    }

    /// Sets the column metadata. Root charts only.
    pub fn set_metadata(&mut self, metadata: Vec<ColumnMetadata>) -> ChartResult<()> {
        self.assert_root("metadata")?;
        if metadata.is_empty() {
            warn!(chart = %self.id, "metadata is empty");
        }
        self.metadata = metadata;
        Ok(())
    }

    /// Sets rows and metadata, then overlays `config` on the options.
    pub fn set_data(&mut self, data: InputData, config: Option<ChartConfig>) -> ChartResult<()> {
        self.set_resultset(data.resultset)?;
        self.set_metadata(data.metadata)?;
        if let Some(config) = config {
            self.options.apply(&config);
        }
        Ok(())
    }

    fn assert_root(&self, what: &str) -> ChartResult<()> {
        if self.parent.is_some() {
            return Err(ChartError::OperationInvalid(format!(
                "can only set {what} on root chart"
            )));
        }
        Ok(())
    }

    /// Translates the raw input into the data engine and resolves roles.
    ///
    /// Child charts keep the data slice they were constructed with.
    pub(super) fn init_data_engine(&mut self) -> ChartResult<()> {
        if self.parent.is_some() {
            return Ok(());
        }
        trace!(chart = %self.id, resultset = ?self.resultset, "binding resultset");
        trace!(chart = %self.id, metadata = ?self.metadata, "binding metadata");

        let mut schema = self
            .data_engine
            .as_ref()
            .map(|engine| engine.schema().clone())
            .unwrap_or_default();
        let datums = {
            let mut translation = create_translation(
                &self.resultset,
                &self.metadata,
                translation_options(&self.options),
            );
            translation.configure_type(&mut schema)?;
            translation.execute(&schema)?
        };

        let role_specs = resolve_roles(&schema, &self.options.roles)?;
        match self.data_engine.as_mut() {
            Some(engine) => {
                *engine.schema_mut() = schema;
                engine.load(datums);
            }
            None => self.data_engine = Some(DataSet::new(schema).with_datums(datums)),
        }
        debug!(
            chart = %self.id,
            roles = ?role_specs.names().collect::<Vec<_>>(),
            data = %self.data_engine.as_ref().map(DataSet::info).unwrap_or_default(),
            "bound data engine"
        );
        self.role_specs = Rc::new(role_specs);
        Ok(())
    }

    /// Data grouped by the dimensions of role `role_name`.
    ///
    /// An unresolved role fails with `ArgumentInvalid` when
    /// `options.assert_exists`, else yields `None`.
    pub fn data_for(
        &self,
        role_name: &str,
        options: GroupByOptions,
    ) -> ChartResult<Option<GroupedData>> {
        let Some(role) = self.role_of(role_name, options.assert_exists)? else {
            return Ok(None);
        };
        let Some(engine) = self.data_engine.as_ref() else {
            return Ok(Some(GroupedData::default()));
        };
        Ok(Some(engine.group_by(role.grouping(), options)))
    }

    /// Looks up one resolved role.
    pub fn role_of(
        &self,
        role_name: &str,
        assert_exists: bool,
    ) -> ChartResult<Option<&VisualRole>> {
        match self.role_specs.get(role_name) {
            Some(role) => Ok(Some(role)),
            None if assert_exists => Err(ChartError::argument_invalid(
                "roleName",
                format!("undefined role name '{role_name}'"),
            )),
            None => Ok(None),
        }
    }

    /// All resolved roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSpecs {
        &self.role_specs
    }

    #[must_use]
    pub fn has_role(&self, role_name: &str) -> bool {
        self.role_specs.contains(role_name)
    }
}

#[cfg(test)]
mod tests {
    use super::translation_options;
    use crate::api::ChartOptions;

    #[test]
    fn second_axis_index_is_used_without_explicit_series() {
        let options = ChartOptions {
            second_axis: true,
            ..ChartOptions::default()
        };
        let translation = translation_options(&options);
        assert_eq!(translation.second_axis_series_indexes, Some(vec![-1]));

        let disabled = translation_options(&ChartOptions::default());
        assert_eq!(disabled.second_axis_series_indexes, None);
    }

    #[test]
    fn time_series_format_needs_time_series() {
        let options = ChartOptions {
            time_series_format: Some("%Y-%m-%d".to_owned()),
            ..ChartOptions::default()
        };
        assert_eq!(translation_options(&options).category_time_series_format, None);
    }
}
