use tracing::{debug, error};

use crate::error::{ChartError, ChartResult};
use crate::extensions::apply_extensions;
use crate::render::{FramePhase, Renderer};

use super::render_frame_builder::build_render_frame;
use super::{
    ChartEngine, ChartNode, Easing, PanelComposer, PanelKind, RenderState,
    TRANSITION_DURATION_MS, Transition, TransitionHandle,
};

/// Text of the fallback label painted when the chart has no data.
pub const NO_DATA_MESSAGE: &str = "No data found";

/// Extension prefix of the fallback no-data label.
pub const NO_DATA_EXTENSION_PREFIX: &str = "noDataMessage_";

impl<R: Renderer> ChartEngine<R> {
    /// Renders the chart, pre-rendering first when needed or when `rebuild`.
    ///
    /// With animation enabled and not bypassed, paints the start-state and
    /// schedules a transition to the end-state; the host drives it with
    /// `advance_transition`. A chart without data paints a fallback message
    /// instead of failing.
    pub fn render(&mut self, bypass_animation: bool, rebuild: bool) -> ChartResult<()> {
        match self.render_core(bypass_animation, rebuild) {
            Ok(()) => Ok(()),
            Err(ChartError::NoData) => self.render_no_data().inspect_err(|err| {
                self.clear_animation();
                error!(chart = %self.chart.id(), error = %err, "no-data render failed");
            }),
            Err(err) => {
                self.clear_animation();
                error!(chart = %self.chart.id(), error = %err, "chart render failed");
                Err(err)
            }
        }
    }

    fn render_core(&mut self, bypass_animation: bool, rebuild: bool) -> ChartResult<()> {
        self.cancel_transition();
        let supports_transitions = self.renderer.supports_transitions();
        self.chart.set_transitions_supported(supports_transitions);

        // options set through `configure` are only resolved at the next pre-render
        let mut animating =
            self.chart.options().animate && supports_transitions && !bypass_animation;
        self.chart.is_animating = animating;

        if !self.chart.is_pre_rendered() || rebuild {
            self.chart.pre_render()?;
            self.state = RenderState::PreRendered;
            // resolution may have turned animation off
            animating &= self.chart.options().animate;
            self.chart.is_animating = animating;
        }
        self.chart.set_render_animation_start(animating);

        if let Some(callback) = self.chart.options().callbacks.render_callback.clone() {
            callback(&self.chart);
        }

        let phase = if animating {
            FramePhase::Start
        } else {
            FramePhase::End
        };
        let frame = build_render_frame(&self.chart, phase)?;
        self.renderer.render(&frame)?;
        self.state = RenderState::RenderStart;

        if animating {
            self.chart.set_render_animation_start(false);
            let transition = Transition::schedule(TRANSITION_DURATION_MS, Easing::CubicInOut);
            debug!(
                chart = %self.chart.id(),
                transition = transition.handle().id(),
                duration_ms = transition.duration_ms(),
                "scheduled render transition"
            );
            self.transition = Some(transition);
            self.state = RenderState::RenderTransitioning;
        } else {
            self.finish_render(false);
        }
        Ok(())
    }

    /// Advances the pending transition by `elapsed_ms`.
    ///
    /// Returns `true` when this call completed it: the end-state is painted,
    /// animation is cleared and the render-end hook runs with `animated`.
    pub fn advance_transition(&mut self, elapsed_ms: f64) -> ChartResult<bool> {
        let completed = match self.transition.as_mut() {
            Some(transition) => transition.advance(elapsed_ms),
            None => return Ok(false),
        };
        if !completed {
            return Ok(false);
        }
        match self.transition.take() {
            Some(transition) => self.complete(transition).map(|()| true),
            None => Ok(false),
        }
    }

    /// Completes the pending transition immediately.
    pub fn complete_transition(&mut self) -> ChartResult<bool> {
        let remaining = self
            .transition
            .as_ref()
            .map_or(0.0, Transition::remaining_ms);
        match self.transition.as_mut() {
            Some(transition) => {
                transition.advance(remaining);
            }
            None => return Ok(false),
        }
        self.advance_transition(0.0)
    }

    /// Completes the transition identified by `handle`.
    ///
    /// A stale handle (cancelled by a later render, or already completed) has
    /// no effect and yields `false`.
    pub fn complete_transition_for(&mut self, handle: &TransitionHandle) -> ChartResult<bool> {
        if !handle.is_pending() || self.transition_handle() != Some(handle) {
            debug!(transition = handle.id(), "ignoring stale transition completion");
            return Ok(false);
        }
        self.complete_transition()
    }

    fn complete(&mut self, transition: Transition) -> ChartResult<()> {
        self.chart.set_render_animation_start(false);
        let frame = build_render_frame(&self.chart, FramePhase::End)?;
        self.renderer.render(&frame)?;
        transition.finish();
        self.chart.is_animating = false;
        self.finish_render(true);
        Ok(())
    }

    /// No transition is in flight after a failed render.
    fn clear_animation(&mut self) {
        self.cancel_transition();
        self.chart.is_animating = false;
        self.chart.set_render_animation_start(false);
    }

    fn cancel_transition(&mut self) {
        if let Some(transition) = self.transition.take() {
            debug!(
                chart = %self.chart.id(),
                transition = transition.handle().id(),
                "cancelled pending transition"
            );
            transition.cancel();
        }
    }

    fn finish_render(&mut self, animated: bool) {
        notify_render_end(&mut self.chart, animated);
        self.state = RenderState::RenderEnd;
    }

    /// Paints a single centered "No data found" label on the base panel.
    fn render_no_data(&mut self) -> ChartResult<()> {
        debug!(chart = %self.chart.id(), "no data, painting fallback message");
        let chart = &mut self.chart;
        if chart.panels.base().is_none() {
            chart.panels = PanelComposer::base_panel(&chart.options, chart.panel_placement())?;
        }
        let Some(base) = chart.panels.base() else {
            return Err(ChartError::OperationInvalid(
                "no base panel for the no-data message".to_owned(),
            ));
        };
        let (base_id, bounds) = (base.id(), base.content_box());
        let label = chart.panels.insert(
            PanelKind::Label {
                text: NO_DATA_MESSAGE.to_owned(),
            },
            Some(base_id),
            bounds,
        );
        apply_extensions(
            chart.panels.get_mut(label),
            NO_DATA_EXTENSION_PREFIX,
            Some(&chart.options.extension_points),
        )?;

        chart.is_animating = false;
        chart.set_render_animation_start(false);
        let frame = build_render_frame(chart, FramePhase::End)?;
        self.renderer.render(&frame)?;
        self.state = RenderState::RenderEnd;
        Ok(())
    }
}

fn notify_render_end(chart: &mut ChartNode, animated: bool) {
    let variant = std::rc::Rc::clone(&chart.variant);
    variant.on_render_end(chart, animated);
    for facet in &mut chart.facets {
        notify_render_end(&mut facet.chart, animated);
    }
}
