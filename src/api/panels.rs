use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::core::{BoxRect, Insets, MarginsSpec, parse_margins};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{ExtensionDescriptor, Extensible, apply_extensions};

use super::{Alignment, Anchor, ChartId, ChartOptions};

pub const DEFAULT_TITLE_SIZE: f64 = 25.0;
pub const DEFAULT_LEGEND_SIZE: f64 = 30.0;

/// Extension prefix of the root base panel.
pub const BASE_EXTENSION_PREFIX: &str = "base_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(usize);

impl PanelId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a base panel hangs in the overall visual tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAttachment {
    /// Root base panel bound to the host paint surface.
    Canvas(Option<String>),
    /// Facet base panel appended under the base panel of `parent`, at
    /// `offset` from the parent's base origin.
    Chart { parent: ChartId, offset: (f64, f64) },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleSettings {
    pub text: String,
    pub anchor: Anchor,
    pub size: Option<f64>,
    pub align: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendSettings {
    pub anchor: Anchor,
    pub size: Option<f64>,
    pub align: Option<Alignment>,
    pub min_margin_x: Option<f64>,
    pub min_margin_y: Option<f64>,
    pub text_margin: Option<f64>,
    pub padding: Option<f64>,
    pub text_adjust: Option<f64>,
    pub shape: Option<String>,
    pub marker_size: Option<f64>,
    pub draw_line: Option<bool>,
    pub draw_marker: Option<bool>,
}

impl LegendSettings {
    fn from_options(options: &ChartOptions) -> Self {
        Self {
            anchor: options.legend_position,
            size: options.legend_size,
            align: options.legend_align,
            min_margin_x: options.legend_min_margin_x,
            min_margin_y: options.legend_min_margin_y,
            text_margin: options.legend_text_margin,
            padding: options.legend_padding,
            text_adjust: options.legend_text_adjust,
            shape: options.legend_shape.clone(),
            marker_size: options.legend_marker_size,
            draw_line: options.legend_draw_line,
            draw_marker: options.legend_draw_marker,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Base { attachment: PanelAttachment },
    Title(TitleSettings),
    Legend(LegendSettings),
    /// Variant-specific plot area.
    Content,
    Label { text: String },
}

impl PanelKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Base { .. } => "base",
            Self::Title(_) => "title",
            Self::Legend(_) => "legend",
            Self::Content => "content",
            Self::Label { .. } => "label",
        }
    }
}

/// Completion record left by the end-of-render hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderEndRecord {
    pub animated: bool,
    pub render_version: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelNode {
    id: PanelId,
    kind: PanelKind,
    parent: Option<PanelId>,
    bounds: BoxRect,
    margins: Insets,
    created: bool,
    properties: IndexMap<String, Value>,
    render_end: Option<RenderEndRecord>,
}

impl PanelNode {
    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &PanelKind {
        &self.kind
    }

    #[must_use]
    pub fn parent(&self) -> Option<PanelId> {
        self.parent
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn bounds(&self) -> BoxRect {
        self.bounds
    }

    #[must_use]
    pub fn margins(&self) -> Insets {
        self.margins
    }

    /// Bounds minus margins.
    #[must_use]
    pub fn content_box(&self) -> BoxRect {
        self.bounds.inset(self.margins)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.bounds.width = width;
        self.bounds.height = height;
    }

    pub fn set_margins(&mut self, margins: Insets) {
        self.margins = margins;
    }

    /// Marks the panel as materialized on its paint surface.
    pub fn create(&mut self) {
        self.created = true;
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        self.created
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            PanelKind::Label { text } => Some(text),
            PanelKind::Title(settings) => Some(&settings.text),
            _ => None,
        }
    }

    #[must_use]
    pub fn render_end(&self) -> Option<RenderEndRecord> {
        self.render_end
    }

    /// End-of-render hook of the panel.
    pub fn on_render_end(&mut self, animated: bool, render_version: u64) {
        trace!(panel = self.kind.name(), animated, render_version, "panel render end");
        self.render_end = Some(RenderEndRecord {
            animated,
            render_version,
        });
    }
}

impl Extensible for PanelNode {
    fn extension_descriptor(&self) -> ExtensionDescriptor {
        match &self.kind {
            PanelKind::Base { .. } => ExtensionDescriptor::new()
                .setter("width")
                .setter("height")
                .setter("margins")
                .locked("canvas"),
            PanelKind::Title(_) => ExtensionDescriptor::new().setter("text").intercepted("anchor"),
            PanelKind::Legend(_) => ExtensionDescriptor::new().intercepted("anchor"),
            PanelKind::Content => ExtensionDescriptor::new(),
            PanelKind::Label { .. } => ExtensionDescriptor::new()
                .setter("text")
                .intercepted("textAlign")
                .intercepted("textBaseline"),
        }
    }

    fn call_setter(&mut self, member: &str, value: &Value) -> ChartResult<()> {
        let kind_name = self.kind.name();
        match (member, &mut self.kind) {
            ("width", _) => {
                self.bounds.width = extension_number(member, value)?;
            }
            ("height", _) => {
                self.bounds.height = extension_number(member, value)?;
            }
            ("margins", _) => {
                let sides = parse_margins(&MarginsSpec::from(value.clone())).ok_or_else(|| {
                    ChartError::argument_invalid(member, format!("unsupported margins {value}"))
                })?;
                self.margins = sides.resolve();
            }
            ("text", PanelKind::Label { text }) => *text = extension_text(value),
            ("text", PanelKind::Title(settings)) => settings.text = extension_text(value),
            _ => {
                return Err(ChartError::OperationInvalid(format!(
                    "panel `{kind_name}` has no setter `{member}`"
                )));
            }
        }
        Ok(())
    }

    fn set_property(&mut self, member: &str, value: Value) {
        self.properties.insert(member.to_owned(), value);
    }
}

fn extension_number(member: &str, value: &Value) -> ChartResult<f64> {
    value
        .as_f64()
        .filter(|number| number.is_finite() && *number >= 0.0)
        .ok_or_else(|| {
            ChartError::argument_invalid(member, format!("expected a size, got {value}"))
        })
}

fn extension_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Arena holding one chart's panels; parents precede their children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelTree {
    nodes: Vec<PanelNode>,
    client: BoxRect,
}

impl PanelTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a panel under `parent`. A parentless panel becomes the base.
    pub fn insert(&mut self, kind: PanelKind, parent: Option<PanelId>, bounds: BoxRect) -> PanelId {
        let id = PanelId(self.nodes.len());
        self.nodes.push(PanelNode {
            id,
            kind,
            parent,
            bounds,
            margins: Insets::default(),
            created: false,
            properties: IndexMap::new(),
            render_end: None,
        });
        id
    }

    #[must_use]
    pub fn get(&self, id: PanelId) -> Option<&PanelNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut PanelNode> {
        self.nodes.get_mut(id.0)
    }

    #[must_use]
    pub fn base_id(&self) -> Option<PanelId> {
        self.nodes.iter().find(|node| node.is_root()).map(PanelNode::id)
    }

    #[must_use]
    pub fn base(&self) -> Option<&PanelNode> {
        self.nodes.iter().find(|node| node.is_root())
    }

    pub fn base_mut(&mut self) -> Option<&mut PanelNode> {
        self.nodes.iter_mut().find(|node| node.is_root())
    }

    pub fn children(&self, id: PanelId) -> impl Iterator<Item = &PanelNode> {
        self.nodes
            .iter()
            .filter(move |node| node.parent == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn find(&self, kind_name: &str) -> Option<&PanelNode> {
        self.nodes.iter().find(|node| node.kind.name() == kind_name)
    }

    pub fn labels(&self) -> impl Iterator<Item = &PanelNode> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, PanelKind::Label { .. }))
    }

    /// Base content box left after docking title and legend.
    #[must_use]
    pub fn client_box(&self) -> BoxRect {
        self.client
    }

    pub(crate) fn set_client_box(&mut self, client: BoxRect) {
        self.client = client;
    }
}

/// How the base panel of a chart is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelPlacement {
    Root,
    /// Facet of `parent`, whose base panel occupies `parent_bounds`.
    Facet { parent: ChartId, parent_bounds: BoxRect },
}

/// Builds the base/title/legend skeleton of a chart's visual tree.
pub struct PanelComposer;

impl PanelComposer {
    pub fn compose(options: &ChartOptions, placement: PanelPlacement) -> ChartResult<PanelTree> {
        let mut tree = Self::base_panel(options, placement)?;
        let Some(base_id) = tree.base_id() else {
            return Ok(tree);
        };
        let mut client = tree.client_box();

        if options.has_title() {
            let settings = TitleSettings {
                text: options.title.clone().unwrap_or_default(),
                anchor: options.title_position,
                size: options.title_size,
                align: options.title_align,
            };
            let size = settings.size.unwrap_or(DEFAULT_TITLE_SIZE);
            let bounds = dock(&mut client, settings.anchor, size);
            tree.insert(PanelKind::Title(settings), Some(base_id), bounds);
        }

        if options.legend {
            let settings = LegendSettings::from_options(options);
            let size = settings.size.unwrap_or(DEFAULT_LEGEND_SIZE);
            let bounds = dock(&mut client, settings.anchor, size);
            tree.insert(PanelKind::Legend(settings), Some(base_id), bounds);
        }

        tree.set_client_box(client);
        debug!(panels = tree.len(), ?client, "composed panels");
        Ok(tree)
    }

    /// Creates only the base panel, sized and margined from `options`.
    pub fn base_panel(options: &ChartOptions, placement: PanelPlacement) -> ChartResult<PanelTree> {
        let mut tree = PanelTree::new();
        let (attachment, bounds) = match placement {
            PanelPlacement::Root => (
                PanelAttachment::Canvas(options.canvas.clone()),
                BoxRect::new(0.0, 0.0, options.width, options.height),
            ),
            PanelPlacement::Facet {
                parent,
                parent_bounds,
            } => {
                let offset = (options.left.unwrap_or(0.0), options.top.unwrap_or(0.0));
                (
                    PanelAttachment::Chart { parent, offset },
                    BoxRect::new(
                        parent_bounds.left + offset.0,
                        parent_bounds.top + offset.1,
                        options.width,
                        options.height,
                    ),
                )
            }
        };
        if !bounds.is_finite() || bounds.width < 0.0 || bounds.height < 0.0 {
            return Err(ChartError::argument_invalid(
                "size",
                format!("invalid base panel size {}x{}", bounds.width, bounds.height),
            ));
        }

        let is_root = matches!(attachment, PanelAttachment::Canvas(_));
        let base_id = tree.insert(PanelKind::Base { attachment }, None, bounds);
        if let Some(base) = tree.get_mut(base_id) {
            base.set_margins(options.margin_insets());
            if is_root {
                base.create();
                apply_extensions(
                    Some(base),
                    BASE_EXTENSION_PREFIX,
                    Some(&options.extension_points),
                )?;
            }
        }
        let client = tree.base().map(PanelNode::content_box).unwrap_or_default();
        tree.set_client_box(client);
        Ok(tree)
    }
}

/// Carves a `size` strip off `client` on the `anchor` side.
fn dock(client: &mut BoxRect, anchor: Anchor, size: f64) -> BoxRect {
    let size = if anchor.is_horizontal() {
        size.clamp(0.0, client.height)
    } else {
        size.clamp(0.0, client.width)
    };
    match anchor {
        Anchor::Top => {
            let strip = BoxRect::new(client.left, client.top, client.width, size);
            client.top += size;
            client.height -= size;
            strip
        }
        Anchor::Bottom => {
            client.height -= size;
            BoxRect::new(client.left, client.top + client.height, client.width, size)
        }
        Anchor::Left => {
            let strip = BoxRect::new(client.left, client.top, size, client.height);
            client.left += size;
            client.width -= size;
            strip
        }
        Anchor::Right => {
            client.width -= size;
            BoxRect::new(client.left + client.width, client.top, size, client.height)
        }
    }
}
