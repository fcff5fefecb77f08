//! chart-compose: chart composition and render lifecycle engine.
//!
//! Turns chart options plus tabular rows and column metadata into a tree of
//! renderable panels, optionally replicated into a grid of facet charts, and
//! drives a two-phase (start/end) render through a pluggable backend.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartEngine, ChartNode, ChartOptions, InputData};
pub use error::{ChartError, ChartResult};
