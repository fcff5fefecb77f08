use crate::render::Renderer;

use super::{ChartNode, Transition, TransitionHandle};

/// Position of the last render call in the render protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Uninitialized,
    PreRendered,
    RenderStart,
    RenderTransitioning,
    RenderEnd,
}

/// Host-facing driver of a chart tree and its rendering backend.
///
/// `ChartEngine` runs pre-render, paints start/end frames through the
/// renderer and owns the pending transition, if any.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) chart: ChartNode,
    pub(super) transition: Option<Transition>,
    pub(super) state: RenderState,
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn new(renderer: R, mut chart: ChartNode) -> Self {
        chart.set_transitions_supported(renderer.supports_transitions());
        Self {
            renderer,
            chart,
            transition: None,
            state: RenderState::Uninitialized,
        }
    }

    #[must_use]
    pub fn chart(&self) -> &ChartNode {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut ChartNode {
        &mut self.chart
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Handle of the transition currently in flight.
    #[must_use]
    pub fn transition_handle(&self) -> Option<&TransitionHandle> {
        self.transition.as_ref().map(Transition::handle)
    }

    /// Eased progress of the transition in flight.
    #[must_use]
    pub fn transition_progress(&self) -> Option<f64> {
        self.transition.as_ref().map(Transition::progress)
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn into_chart(self) -> ChartNode {
        self.chart
    }
}
