use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

use super::ComplexType;

/// Separator between level labels of a multi-dimension group label.
pub const GROUP_LABEL_SEPARATOR: &str = " ~ ";

/// Hashable identity of an atom value, used to build group keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomKey {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    Text(String),
}

/// One typed cell of a datum: the raw value plus its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub value: Value,
    pub label: String,
}

impl Atom {
    #[must_use]
    pub fn new(value: Value) -> Self {
        let label = default_label(&value);
        Self { value, label }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> AtomKey {
        match &self.value {
            Value::Null => AtomKey::Null,
            Value::Bool(flag) => AtomKey::Bool(*flag),
            Value::Number(number) => number
                .as_f64()
                .map_or_else(|| AtomKey::Text(number.to_string()), |n| AtomKey::Number(n.into())),
            Value::String(text) => AtomKey::Text(text.clone()),
            other => AtomKey::Text(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }
}

fn default_label(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One typed row: dimension name to atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    atoms: IndexMap<String, Atom>,
    visible: bool,
}

impl Default for Datum {
    fn default() -> Self {
        Self {
            atoms: IndexMap::new(),
            visible: true,
        }
    }
}

impl Datum {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_atom(mut self, dimension: impl Into<String>, atom: Atom) -> Self {
        self.set_atom(dimension, atom);
        self
    }

    pub fn set_atom(&mut self, dimension: impl Into<String>, atom: Atom) {
        self.atoms.insert(dimension.into(), atom);
    }

    #[must_use]
    pub fn atom(&self, dimension: &str) -> Option<&Atom> {
        self.atoms.get(dimension)
    }

    pub fn atoms(&self) -> impl Iterator<Item = (&str, &Atom)> {
        self.atoms.iter().map(|(name, atom)| (name.as_str(), atom))
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Which dimensions to group a data set by to answer a role's data request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingSpec {
    dimension_names: SmallVec<[String; 2]>,
}

impl GroupingSpec {
    /// Builds a grouping over `dimension_names`, validated against `schema`.
    pub fn new<I, S>(dimension_names: I, schema: &ComplexType) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dimension_names: SmallVec<[String; 2]> =
            dimension_names.into_iter().map(Into::into).collect();
        if dimension_names.is_empty() {
            return Err(ChartError::argument_invalid(
                "groupingSpec",
                "grouping must reference at least one dimension",
            ));
        }
        if let Some(unknown) = dimension_names
            .iter()
            .find(|name| !schema.has_dimension(name))
        {
            return Err(ChartError::argument_invalid(
                "groupingSpec",
                format!("undefined dimension '{unknown}'"),
            ));
        }
        Ok(Self { dimension_names })
    }

    #[must_use]
    pub fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    #[must_use]
    pub fn is_single_dimension(&self) -> bool {
        self.dimension_names.len() == 1
    }
}

/// Keyword arguments of `DataSet::group_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupByOptions {
    /// Restricts grouping to datums with this visibility.
    pub visible: Option<bool>,
    /// Fails on unresolved roles instead of returning nothing.
    pub assert_exists: bool,
}

impl Default for GroupByOptions {
    fn default() -> Self {
        Self {
            visible: None,
            assert_exists: true,
        }
    }
}

impl GroupByOptions {
    #[must_use]
    pub fn visible() -> Self {
        Self {
            visible: Some(true),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.assert_exists = false;
        self
    }
}

/// One leaf of a grouping: the datums sharing a key, as an owned data set.
#[derive(Debug, Clone, PartialEq)]
pub struct DataGroup {
    pub key: Vec<AtomKey>,
    pub abs_label: String,
    pub data: DataSet,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedData {
    pub leafs: Vec<DataGroup>,
}

impl GroupedData {
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leafs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leafs.is_empty()
    }
}

/// Typed data set bound to a schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    schema: ComplexType,
    datums: Vec<Datum>,
}

impl DataSet {
    #[must_use]
    pub fn new(schema: ComplexType) -> Self {
        Self {
            schema,
            datums: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_datums(mut self, datums: Vec<Datum>) -> Self {
        self.datums = datums;
        self
    }

    /// Replaces the loaded datums.
    pub fn load(&mut self, datums: Vec<Datum>) {
        self.datums = datums;
    }

    #[must_use]
    pub fn schema(&self) -> &ComplexType {
        &self.schema
    }

    pub(crate) fn schema_mut(&mut self) -> &mut ComplexType {
        &mut self.schema
    }

    #[must_use]
    pub fn datums(&self) -> &[Datum] {
        &self.datums
    }

    pub fn datums_mut(&mut self) -> &mut [Datum] {
        &mut self.datums
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.datums.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datums.is_empty()
    }

    /// Groups datums by `grouping`, preserving first-appearance order of keys.
    #[must_use]
    pub fn group_by(&self, grouping: &GroupingSpec, options: GroupByOptions) -> GroupedData {
        let mut groups: IndexMap<Vec<AtomKey>, (String, Vec<Datum>)> = IndexMap::new();
        for datum in &self.datums {
            if options
                .visible
                .is_some_and(|visible| datum.is_visible() != visible)
            {
                continue;
            }
            let mut key = Vec::with_capacity(grouping.dimension_names.len());
            let mut labels: SmallVec<[&str; 2]> = SmallVec::new();
            for name in &grouping.dimension_names {
                match datum.atom(name) {
                    Some(atom) => {
                        key.push(atom.key());
                        labels.push(atom.label.as_str());
                    }
                    None => {
                        key.push(AtomKey::Null);
                        labels.push("");
                    }
                }
            }
            groups
                .entry(key)
                .or_insert_with(|| (labels.join(GROUP_LABEL_SEPARATOR), Vec::new()))
                .1
                .push(datum.clone());
        }

        GroupedData {
            leafs: groups
                .into_iter()
                .map(|(key, (abs_label, datums))| DataGroup {
                    key,
                    abs_label,
                    data: DataSet::new(self.schema.clone()).with_datums(datums),
                })
                .collect(),
        }
    }

    /// One-line summary for diagnostics.
    #[must_use]
    pub fn info(&self) -> String {
        let dimensions: Vec<&str> = self
            .schema
            .dimensions()
            .map(|dimension| dimension.name.as_str())
            .collect();
        format!(
            "DataSet {{ datums: {}, dimensions: [{}] }}",
            self.datums.len(),
            dimensions.join(", ")
        )
    }
}
