use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Column descriptor of the raw input, in the CDA `metadata` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub col_index: usize,
    pub col_name: String,
    #[serde(default)]
    pub col_label: Option<String>,
    #[serde(default)]
    pub col_type: Option<String>,
}

impl ColumnMetadata {
    #[must_use]
    pub fn new(col_index: usize, col_name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            col_index,
            col_name: col_name.into(),
            col_label: None,
            col_type: Some(col_type.into()),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.col_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.col_label.as_deref().unwrap_or(&self.col_name)
    }

    #[must_use]
    pub fn kind(&self) -> DimensionKind {
        self.col_type
            .as_deref()
            .map_or(DimensionKind::Text, DimensionKind::from_col_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DimensionKind {
    #[default]
    Text,
    Number,
    Date,
}

impl DimensionKind {
    #[must_use]
    pub fn from_col_type(col_type: &str) -> Self {
        match col_type.to_ascii_uppercase().as_str() {
            "NUMERIC" | "NUMBER" | "INTEGER" | "FLOAT" | "DOUBLE" => Self::Number,
            "DATE" | "DATETIME" | "TIMESTAMP" => Self::Date,
            _ => Self::Text,
        }
    }
}

/// One named, typed dimension of a `ComplexType`.
///
/// Dimensions are grouped by name: `series`, `series2` and `series3` all
/// belong to group `series`, at levels 0, 1 and 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionType {
    pub name: String,
    pub label: String,
    pub kind: DimensionKind,
    pub source_index: Option<usize>,
}

impl DimensionType {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DimensionKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            source_index: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = Some(index);
        self
    }

    #[must_use]
    pub fn group(&self) -> (&str, usize) {
        split_group_name(&self.name)
    }
}

/// Splits `name` into its group name and zero-based level.
#[must_use]
pub fn split_group_name(name: &str) -> (&str, usize) {
    let group = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if group.is_empty() || group.len() == name.len() {
        return (name, 0);
    }
    match name[group.len()..].parse::<usize>() {
        Ok(ordinal) if ordinal >= 2 => (group, ordinal - 1),
        _ => (name, 0),
    }
}

/// Builds the `index`-th dimension name of `group` (`series`, `series2`, ...).
#[must_use]
pub fn group_level_name(group: &str, level: usize) -> String {
    if level == 0 {
        group.to_owned()
    } else {
        format!("{group}{}", level + 1)
    }
}

/// Schema of a bound data set: ordered dimension name to dimension type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexType {
    dimensions: IndexMap<String, DimensionType>,
}

impl ComplexType {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a dimension. Replacing keeps the original position.
    pub fn add_dimension(&mut self, dimension: DimensionType) {
        self.dimensions.insert(dimension.name.clone(), dimension);
    }

    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&DimensionType> {
        self.dimensions.get(name)
    }

    #[must_use]
    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &DimensionType> {
        self.dimensions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Names of the dimensions in `group`, ordered by level.
    ///
    /// Returns `None` when no dimension belongs to the group.
    #[must_use]
    pub fn group_dimension_names(&self, group: &str) -> Option<SmallVec<[String; 2]>> {
        let mut members: SmallVec<[(usize, &str); 2]> = self
            .dimensions
            .values()
            .filter_map(|dimension| {
                let (name, level) = dimension.group();
                (name == group).then_some((level, dimension.name.as_str()))
            })
            .collect();
        if members.is_empty() {
            return None;
        }
        members.sort_by_key(|(level, _)| *level);
        Some(members.into_iter().map(|(_, name)| name.to_owned()).collect())
    }
}
