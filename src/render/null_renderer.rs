use crate::error::ChartResult;
use crate::render::{FrameStats, RenderFrame, Renderer};

/// Headless backend: validates and records every frame it is handed.
#[derive(Debug)]
pub struct NullRenderer {
    pub frames: Vec<RenderFrame>,
    pub last_stats: FrameStats,
    transitions_supported: bool,
}

impl Default for NullRenderer {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            last_stats: FrameStats::default(),
            transitions_supported: true,
        }
    }
}

impl NullRenderer {
    /// Backend that cannot animate, like a static image export.
    #[must_use]
    pub fn without_transitions() -> Self {
        Self {
            transitions_supported: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.frames.last()
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_stats = frame.stats();
        self.frames.push(frame.clone());
        Ok(())
    }

    fn supports_transitions(&self) -> bool {
        self.transitions_supported
    }
}
