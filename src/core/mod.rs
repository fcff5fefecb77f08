pub mod dataset;
pub mod margins;
pub mod roles;
pub mod schema;
pub mod translation;
pub mod types;

pub use dataset::{
    Atom, AtomKey, DataGroup, DataSet, Datum, GROUP_LABEL_SEPARATOR, GroupByOptions,
    GroupedData, GroupingSpec,
};
pub use margins::{MarginSides, MarginsSpec, parse_margins};
pub use roles::{
    MULTI_DIMENSION_ROLES, RoleBinding, RoleSpecs, SINGLE_DIMENSION_ROLES, VisualRole,
    resolve_roles,
};
pub use schema::{
    ColumnMetadata, ComplexType, DimensionKind, DimensionType, group_level_name,
    split_group_name,
};
pub use translation::{
    CrosstabTranslation, DATA_PART_DIMENSION, DataOptions, DimensionDeclaration,
    DimensionReader, LabelFormatterFn, RelationalTranslation, TranslationOper,
    TranslationOptions, create_translation,
};
pub use types::{BoxRect, Insets, Viewport};
