use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::core::{BoxRect, ColumnMetadata, DataSet, RoleSpecs};
use crate::error::{ChartError, ChartResult};
use crate::render::ColorScheme;

use super::{
    ChartConfig, ChartOptions, ChartVariant, Facet, FacetGrid, MultiChartReplicator,
    OptionsResolver, PanelComposer, PanelPlacement, PanelTree,
};

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique chart identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartId(u64);

impl ChartId {
    fn next() -> Self {
        Self(NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart#{}", self.0)
    }
}

/// One chart of a (possibly faceted) chart tree.
///
/// The root chart owns the raw input and the bound data set; facet charts
/// receive a data slice and share the root's role specifications.
pub struct ChartNode {
    pub(super) id: ChartId,
    pub(super) parent: Option<ChartId>,
    pub(super) root: ChartId,
    pub(super) owner: ChartId,
    pub(super) variant: Rc<dyn ChartVariant>,
    pub(super) options: ChartOptions,
    pub(super) render_version: u64,
    pub(super) is_pre_rendered: bool,
    pub(super) is_animating: bool,
    pub(super) render_animation_start: bool,
    pub(super) transitions_supported: bool,
    pub(super) resultset: Vec<Vec<Value>>,
    pub(super) metadata: Vec<ColumnMetadata>,
    pub(super) data_engine: Option<DataSet>,
    pub(super) role_specs: Rc<RoleSpecs>,
    pub(super) panels: PanelTree,
    pub(super) facets: Vec<Facet>,
    pub(super) facet_grid: Option<FacetGrid>,
    pub(super) colors: ColorScheme,
    pub(super) second_axis_colors: ColorScheme,
    pub(super) left: Option<f64>,
    pub(super) top: Option<f64>,
    pub(super) parent_base_bounds: BoxRect,
}

impl ChartNode {
    /// Creates a root chart of `variant`, overlaying `config` on the
    /// variant defaults.
    #[must_use]
    pub fn new<V>(variant: V, config: ChartConfig) -> Self
    where
        V: ChartVariant + 'static,
    {
        Self::with_variant(Rc::new(variant), config)
    }

    #[must_use]
    pub fn with_variant(variant: Rc<dyn ChartVariant>, config: ChartConfig) -> Self {
        let options = ChartOptions::merged(variant.default_options(), &config);
        let id = ChartId::next();
        debug!(chart = %id, variant = variant.name(), "created root chart");
        Self {
            id,
            parent: None,
            root: id,
            owner: id,
            variant,
            options,
            render_version: 0,
            is_pre_rendered: false,
            is_animating: false,
            render_animation_start: false,
            transitions_supported: true,
            resultset: Vec::new(),
            metadata: Vec::new(),
            data_engine: None,
            role_specs: Rc::new(RoleSpecs::default()),
            panels: PanelTree::new(),
            facets: Vec::new(),
            facet_grid: None,
            colors: ColorScheme::default(),
            second_axis_colors: ColorScheme::default(),
            left: None,
            top: None,
            parent_base_bounds: BoxRect::default(),
        }
    }

    /// Creates a child chart of `parent` bound to `data_engine`.
    ///
    /// The child's options are the parent's options overlaid with `config`.
    pub fn with_parent(
        parent: &ChartNode,
        config: ChartConfig,
        data_engine: Option<DataSet>,
    ) -> ChartResult<Self> {
        let data_engine = data_engine.ok_or_else(|| ChartError::argument_required("dataEngine"))?;
        let options = ChartOptions::merged(parent.options.clone(), &config);
        let id = ChartId::next();
        debug!(chart = %id, parent = %parent.id, datums = data_engine.len(), "created child chart");
        Ok(Self {
            id,
            parent: Some(parent.id),
            root: parent.root,
            owner: parent.owner,
            variant: Rc::clone(&parent.variant),
            left: options.left,
            top: options.top,
            options,
            render_version: 0,
            is_pre_rendered: false,
            is_animating: false,
            render_animation_start: false,
            transitions_supported: parent.transitions_supported,
            resultset: Vec::new(),
            metadata: Vec::new(),
            data_engine: Some(data_engine),
            role_specs: Rc::clone(&parent.role_specs),
            panels: PanelTree::new(),
            facets: Vec::new(),
            facet_grid: None,
            colors: ColorScheme::default(),
            second_axis_colors: ColorScheme::default(),
            parent_base_bounds: parent
                .panels
                .base()
                .map(|base| base.bounds())
                .unwrap_or_default(),
        })
    }

    /// Rebuilds options, data binding, panels and content (or facets).
    ///
    /// Increments the render version exactly once; facet pre-renders keep
    /// their own counters.
    pub fn pre_render(&mut self) -> ChartResult<()> {
        self.render_version += 1;
        self.is_pre_rendered = false;
        self.panels = PanelTree::new();
        self.facets.clear();
        self.facet_grid = None;
        debug!(chart = %self.id, render_version = self.render_version, "pre-rendering chart");

        let variant = Rc::clone(&self.variant);
        if self.is_root() && !variant.allow_no_data() && self.resultset.is_empty() {
            return Err(ChartError::NoData);
        }

        OptionsResolver::new(variant.as_ref(), self.transitions_supported)
            .resolve(&mut self.options);

        self.init_data_engine()?;

        self.colors = ColorScheme::from_hex_colors(self.options.colors.as_deref());
        self.second_axis_colors =
            ColorScheme::from_hex_colors(self.options.second_axis_color.as_deref());

        self.panels = PanelComposer::compose(&self.options, self.panel_placement())?;

        if self.parent.is_some() || !self.has_role("multiChartColumn") {
            variant.build_content(self)?;
        } else {
            MultiChartReplicator::replicate(self)?;
        }

        self.is_pre_rendered = true;
        Ok(())
    }

    pub(super) fn panel_placement(&self) -> PanelPlacement {
        match self.parent {
            None => PanelPlacement::Root,
            Some(parent) => PanelPlacement::Facet {
                parent,
                parent_bounds: self.parent_base_bounds,
            },
        }
    }

    /// Picks `start` while the start-state of an animated render is being
    /// painted, `end` otherwise.
    #[must_use]
    pub fn animate<T>(&self, start: T, end: T) -> T {
        if self.render_animation_start { start } else { end }
    }

    /// End-of-render behavior shared by all variants.
    pub fn base_render_end(&mut self, animated: bool) {
        let render_version = self.render_version;
        if let Some(base) = self.panels.base_mut() {
            base.on_render_end(animated, render_version);
        }
    }

    /// Overlays `config` on the current options; applied at the next pre-render.
    pub fn configure(&mut self, config: &ChartConfig) {
        self.options.apply(config);
    }

    pub(super) fn set_render_animation_start(&mut self, start: bool) {
        self.render_animation_start = start;
        for facet in &mut self.facets {
            facet.chart.set_render_animation_start(start);
        }
    }

    pub(super) fn set_transitions_supported(&mut self, supported: bool) {
        self.transitions_supported = supported;
    }

    #[must_use]
    pub fn id(&self) -> ChartId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<ChartId> {
        self.parent
    }

    #[must_use]
    pub fn root(&self) -> ChartId {
        self.root
    }

    #[must_use]
    pub fn owner(&self) -> ChartId {
        self.owner
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        self.variant.name()
    }

    #[must_use]
    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ChartOptions {
        &mut self.options
    }

    #[must_use]
    pub fn render_version(&self) -> u64 {
        self.render_version
    }

    #[must_use]
    pub fn is_pre_rendered(&self) -> bool {
        self.is_pre_rendered
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    #[must_use]
    pub fn resultset(&self) -> &[Vec<Value>] {
        &self.resultset
    }

    #[must_use]
    pub fn metadata(&self) -> &[ColumnMetadata] {
        &self.metadata
    }

    #[must_use]
    pub fn data_engine(&self) -> Option<&DataSet> {
        self.data_engine.as_ref()
    }

    /// Role specifications shared across the chart tree.
    #[must_use]
    pub fn role_specs(&self) -> &Rc<RoleSpecs> {
        &self.role_specs
    }

    #[must_use]
    pub fn panels(&self) -> &PanelTree {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelTree {
        &mut self.panels
    }

    #[must_use]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    #[must_use]
    pub fn facet_grid(&self) -> Option<&FacetGrid> {
        self.facet_grid.as_ref()
    }

    #[must_use]
    pub fn colors(&self) -> &ColorScheme {
        &self.colors
    }

    #[must_use]
    pub fn second_axis_colors(&self) -> &ColorScheme {
        &self.second_axis_colors
    }

    /// Placement inside the parent's base panel; `None` for a root chart.
    #[must_use]
    pub fn placement(&self) -> Option<(f64, f64)> {
        self.parent?;
        Some((self.left.unwrap_or(0.0), self.top.unwrap_or(0.0)))
    }
}

impl fmt::Debug for ChartNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartNode")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("root", &self.root)
            .field("variant", &self.variant.name())
            .field("render_version", &self.render_version)
            .field("is_pre_rendered", &self.is_pre_rendered)
            .field("is_animating", &self.is_animating)
            .field("panels", &self.panels.len())
            .field("facets", &self.facets.len())
            .finish()
    }
}
