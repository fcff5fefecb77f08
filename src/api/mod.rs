//! Chart composition and render lifecycle.
//!
//! A `ChartNode` resolves its options, binds its data, composes its panels
//! and either builds its own content or replicates itself into facets.
//! `ChartEngine` drives the two-phase render of a chart tree through a
//! `Renderer`.

mod callbacks;
mod chart_node;
mod chart_variant;
mod data_binder;
mod engine;
mod multi_chart;
mod options;
mod options_resolver;
mod panels;
mod render_frame_builder;
mod render_lifecycle;
mod transition;

pub use callbacks::{
    ChartCallbacks, ClickActionFn, RenderCallbackFn, TooltipContext, TooltipFormatFn,
    ValueFormatFn, format_number,
};
pub use chart_node::{ChartId, ChartNode};
pub use chart_variant::{BAR_PANEL_EXTENSION_PREFIX, BarChart, BasicChart, ChartVariant};
pub use data_binder::{InputData, translation_options};
pub use engine::{ChartEngine, RenderState};
pub use multi_chart::{Facet, FacetGrid, MultiChartReplicator};
pub use options::{
    Alignment, Anchor, ChartConfig, ChartOptions, DEFAULT_MULTI_CHART_WRAP_COLUMN, Orientation,
};
pub use options_resolver::{OptionsResolver, resolve_base};
pub use panels::{
    BASE_EXTENSION_PREFIX, DEFAULT_LEGEND_SIZE, DEFAULT_TITLE_SIZE, LegendSettings,
    PanelAttachment, PanelComposer, PanelId, PanelKind, PanelNode, PanelPlacement, PanelTree,
    RenderEndRecord, TitleSettings,
};
pub use render_lifecycle::{NO_DATA_EXTENSION_PREFIX, NO_DATA_MESSAGE};
pub use transition::{
    Easing, TRANSITION_DURATION_MS, Transition, TransitionHandle, TransitionStatus,
};
