use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Which end of an animated render a frame represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    /// Start state of an animated render.
    Start,
    /// Final state; also the only frame of a non-animated render.
    #[default]
    End,
}

/// Primitive counts of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub lines: usize,
    pub rects: usize,
    pub texts: usize,
}

impl FrameStats {
    #[must_use]
    pub const fn total(self) -> usize {
        self.lines + self.rects + self.texts
    }
}

/// Everything a chart tree paints in one pass, in paint order per kind.
///
/// Facet content follows the parent chart's own panels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub phase: FramePhase,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport, phase: FramePhase) -> Self {
        Self {
            viewport,
            phase,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            lines: self.lines.len(),
            rects: self.rects.len(),
            texts: self.texts.len(),
        }
    }

    /// Rejects frames a backend could not draw: an empty canvas or any
    /// primitive with non-finite geometry or out-of-range colors.
    pub fn validate(&self) -> ChartResult<()> {
        let Viewport { width, height } = self.viewport;
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport { width, height });
        }
        self.lines.iter().try_for_each(|line| line.validate())?;
        self.rects.iter().try_for_each(|rect| rect.validate())?;
        self.texts.iter().try_for_each(TextPrimitive::validate)
    }
}
