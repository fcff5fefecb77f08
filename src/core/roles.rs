use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::ChartResult;

use super::{ComplexType, GroupingSpec};

/// Roles that may bind several dimensions, auto-detected by dimension group.
pub const MULTI_DIMENSION_ROLES: [&str; 4] =
    ["series", "category", "multiChartColumn", "multiChartRow"];

/// Roles that bind a single dimension, auto-detected by dimension name.
pub const SINGLE_DIMENSION_ROLES: [&str; 2] = ["value", "value2"];

/// Explicit role to dimension(s) mapping from the `roles` option.
///
/// A single string may list several dimensions separated by commas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleBinding {
    Dimension(String),
    Dimensions(Vec<String>),
}

impl RoleBinding {
    #[must_use]
    pub fn dimension_names(&self) -> SmallVec<[String; 2]> {
        match self {
            Self::Dimension(text) => text
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::Dimensions(names) => names
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimension_names().is_empty()
    }
}

impl From<&str> for RoleBinding {
    fn from(text: &str) -> Self {
        Self::Dimension(text.to_owned())
    }
}

/// A named semantic slot bound to one or more data dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualRole {
    name: String,
    grouping: GroupingSpec,
}

impl VisualRole {
    #[must_use]
    pub fn new(name: impl Into<String>, grouping: GroupingSpec) -> Self {
        Self {
            name: name.into(),
            grouping,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn grouping(&self) -> &GroupingSpec {
        &self.grouping
    }
}

/// Resolved visual roles of a chart tree, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleSpecs {
    roles: IndexMap<String, VisualRole>,
}

impl RoleSpecs {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VisualRole> {
        self.roles.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualRole> {
        self.roles.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Resolves visual roles against `schema`.
///
/// Explicit bindings are kept as given. Unbound multi-dimension roles take
/// every dimension of the same group; unbound single-dimension roles take the
/// dimension named like the role. Roles that match nothing stay unresolved.
pub fn resolve_roles(
    schema: &ComplexType,
    explicit: &IndexMap<String, Option<RoleBinding>>,
) -> ChartResult<RoleSpecs> {
    let mut bindings: IndexMap<String, SmallVec<[String; 2]>> = explicit
        .iter()
        .filter_map(|(name, binding)| {
            let names = binding.as_ref()?.dimension_names();
            (!names.is_empty()).then(|| (name.clone(), names))
        })
        .collect();

    for role in MULTI_DIMENSION_ROLES {
        if bindings.contains_key(role) {
            continue;
        }
        if let Some(names) = schema.group_dimension_names(role) {
            debug!(role, dimensions = ?names, "auto-detected multi-dimension role");
            bindings.insert(role.to_owned(), names);
        }
    }

    for role in SINGLE_DIMENSION_ROLES {
        if !bindings.contains_key(role) && schema.has_dimension(role) {
            debug!(role, "auto-detected single-dimension role");
            bindings.insert(role.to_owned(), SmallVec::from_iter([role.to_owned()]));
        }
    }

    let mut roles = IndexMap::with_capacity(bindings.len());
    for (name, names) in bindings {
        let grouping = GroupingSpec::new(names, schema)?;
        roles.insert(name.clone(), VisualRole::new(name, grouping));
    }
    Ok(RoleSpecs { roles })
}
