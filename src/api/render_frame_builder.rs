use serde_json::Value;

use crate::core::{BoxRect, GroupByOptions, Viewport};
use crate::error::ChartResult;
use crate::render::{
    Color, FramePhase, LinePrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
};

use super::{Alignment, ChartNode, LegendSettings, PanelKind, PanelNode};

const DEFAULT_FONT_SIZE_PX: f64 = 12.0;
const TITLE_FONT_SIZE_PX: f64 = 14.0;
const DEFAULT_LEGEND_MARKER_SIZE: f64 = 10.0;
const DEFAULT_LEGEND_TEXT_MARGIN: f64 = 6.0;
const DEFAULT_LEGEND_PADDING: f64 = 24.0;
const LEGEND_LINE_WIDTH: f64 = 1.5;
const TEXT_COLOR: Color = Color::rgb(0.2, 0.2, 0.2);

/// Paints the whole chart tree of `chart` into one frame.
pub(super) fn build_render_frame(chart: &ChartNode, phase: FramePhase) -> ChartResult<RenderFrame> {
    let options = chart.options();
    let viewport = Viewport::new(
        options.width.round().max(0.0) as u32,
        options.height.round().max(0.0) as u32,
    );
    let mut frame = RenderFrame::new(viewport, phase);
    paint_chart(chart, &mut frame)?;
    Ok(frame)
}

fn paint_chart(chart: &ChartNode, frame: &mut RenderFrame) -> ChartResult<()> {
    for panel in chart.panels().iter() {
        match panel.kind() {
            PanelKind::Base { .. } => paint_base(panel, frame),
            PanelKind::Title(settings) => {
                let font_size = settings
                    .size
                    .map_or(TITLE_FONT_SIZE_PX, |size| (size * 0.6).max(1.0));
                paint_text(&settings.text, panel.bounds(), settings.align, font_size, frame);
            }
            PanelKind::Legend(settings) => paint_legend(chart, panel.bounds(), settings, frame)?,
            PanelKind::Content => {}
            PanelKind::Label { text } => {
                let color = style_color(panel, "textStyle").unwrap_or(TEXT_COLOR);
                let (x, y) = panel.bounds().center();
                if !text.is_empty() {
                    frame.texts.push(TextPrimitive::new(
                        text.clone(),
                        x,
                        y,
                        DEFAULT_FONT_SIZE_PX,
                        color,
                        TextHAlign::Center,
                    ));
                }
            }
        }
    }

    chart.variant.paint_content(chart, frame)?;

    for facet in chart.facets() {
        paint_chart(&facet.chart, frame)?;
    }
    Ok(())
}

fn paint_base(panel: &PanelNode, frame: &mut RenderFrame) {
    let Some(fill) = style_color(panel, "fillStyle") else {
        return;
    };
    let bounds = panel.bounds();
    frame.rects.push(
        RectPrimitive::new(bounds.left, bounds.top, bounds.width, bounds.height).with_fill(fill),
    );
}

fn paint_text(
    text: &str,
    bounds: BoxRect,
    align: Alignment,
    font_size: f64,
    frame: &mut RenderFrame,
) {
    if text.is_empty() {
        return;
    }
    let (center_x, center_y) = bounds.center();
    let (x, h_align) = match align {
        Alignment::Left => (bounds.left, TextHAlign::Left),
        Alignment::Right => (bounds.left + bounds.width, TextHAlign::Right),
        _ => (center_x, TextHAlign::Center),
    };
    frame
        .texts
        .push(TextPrimitive::new(text, x, center_y, font_size, TEXT_COLOR, h_align));
}

/// One marker and label per visible series; `drawLine` adds a stroke through
/// each marker.
fn paint_legend(
    chart: &ChartNode,
    bounds: BoxRect,
    settings: &LegendSettings,
    frame: &mut RenderFrame,
) -> ChartResult<()> {
    let Some(series) = chart.data_for("series", GroupByOptions::visible().lenient())? else {
        return Ok(());
    };
    let marker = settings.marker_size.unwrap_or(DEFAULT_LEGEND_MARKER_SIZE);
    let text_margin = settings.text_margin.unwrap_or(DEFAULT_LEGEND_TEXT_MARGIN);
    let padding = settings.padding.unwrap_or(DEFAULT_LEGEND_PADDING);
    let horizontal = settings.anchor.is_horizontal();
    let step = marker + text_margin + padding;

    let (_, center_y) = bounds.center();
    for (index, group) in series.leafs.iter().enumerate() {
        let (x, y) = if horizontal {
            (bounds.left + index as f64 * step * 2.0, center_y - marker / 2.0)
        } else {
            (bounds.left, bounds.top + index as f64 * (marker + text_margin))
        };
        let color = chart.colors().color_at(index);
        if settings.draw_line == Some(true) {
            let mid = y + marker / 2.0;
            frame.lines.push(LinePrimitive::new(
                (x - marker / 2.0, mid),
                (x + marker * 1.5, mid),
                LEGEND_LINE_WIDTH,
                color,
            ));
        }
        if settings.draw_marker.unwrap_or(true) {
            frame
                .rects
                .push(RectPrimitive::new(x, y, marker, marker).with_fill(color));
        }
        if !group.abs_label.is_empty() {
            frame.texts.push(TextPrimitive::new(
                group.abs_label.clone(),
                x + marker + text_margin,
                y + marker / 2.0,
                DEFAULT_FONT_SIZE_PX,
                TEXT_COLOR,
                TextHAlign::Left,
            ));
        }
    }
    Ok(())
}

fn style_color(panel: &PanelNode, property: &str) -> Option<Color> {
    panel
        .property(property)
        .and_then(Value::as_str)
        .and_then(Color::from_hex)
}
