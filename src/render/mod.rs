mod color_scheme;
mod frame;
mod null_renderer;
mod primitives;

pub use color_scheme::ColorScheme;
pub use frame::{FramePhase, FrameStats, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

use crate::error::ChartResult;

/// Drawing backend fed by the render lifecycle.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;

    /// `false` makes options resolution switch `animate` off.
    fn supports_transitions(&self) -> bool {
        true
    }
}
