use std::fmt;
use std::rc::Rc;

use tracing::info;

use crate::core::LabelFormatterFn;

use super::ChartNode;

pub type ValueFormatFn = Rc<dyn Fn(f64) -> String>;
pub type TooltipFormatFn = Rc<dyn Fn(&TooltipContext<'_>) -> String>;
pub type ClickActionFn = Rc<dyn Fn(&str, &str, f64)>;
pub type RenderCallbackFn = Rc<dyn Fn(&ChartNode)>;

/// Arguments of a tooltip formatter call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipContext<'a> {
    pub series: &'a str,
    pub category: &'a str,
    pub value: f64,
    pub percent_label: Option<&'a str>,
}

/// Formatter and interaction callbacks carried alongside the options.
///
/// These are consumed by drawing/formatting collaborators; the composition
/// engine only passes them through (label formatters reach the translation
/// step, the render callback runs at the start of every render).
/// Unset entries keep the default on merge.
#[derive(Clone, Default)]
pub struct ChartCallbacks {
    pub value_format: Option<ValueFormatFn>,
    pub percent_value_format: Option<ValueFormatFn>,
    pub tooltip_format: Option<TooltipFormatFn>,
    pub get_category_label: Option<LabelFormatterFn>,
    pub get_series_label: Option<LabelFormatterFn>,
    pub click_action: Option<ClickActionFn>,
    pub render_callback: Option<RenderCallbackFn>,
}

impl ChartCallbacks {
    /// Callbacks with the default number, percent, tooltip and click behavior.
    #[must_use]
    pub fn with_defaults() -> Self {
        let value_format: ValueFormatFn = Rc::new(format_number);
        let tooltip_value_format = Rc::clone(&value_format);
        Self {
            value_format: Some(value_format),
            percent_value_format: Some(Rc::new(|value: f64| format!("{}%", format_number(value)))),
            tooltip_format: Some(Rc::new(move |context: &TooltipContext<'_>| {
                let mut text = format!(
                    "{}, {}:  {}",
                    context.series,
                    context.category,
                    tooltip_value_format(context.value)
                );
                if let Some(percent) = context.percent_label {
                    text.push_str(&format!(" ({percent})"));
                }
                text
            })),
            get_category_label: None,
            get_series_label: None,
            click_action: Some(Rc::new(|series: &str, category: &str, value: f64| {
                info!(series, category, value, "clicked datum");
            })),
            render_callback: None,
        }
    }

    /// Overlays the callbacks set in `other`.
    pub fn merge(&mut self, other: &Self) {
        fn overlay<T: ?Sized>(target: &mut Option<Rc<T>>, source: &Option<Rc<T>>) {
            if let Some(source) = source {
                *target = Some(Rc::clone(source));
            }
        }
        overlay(&mut self.value_format, &other.value_format);
        overlay(&mut self.percent_value_format, &other.percent_value_format);
        overlay(&mut self.tooltip_format, &other.tooltip_format);
        overlay(&mut self.get_category_label, &other.get_category_label);
        overlay(&mut self.get_series_label, &other.get_series_label);
        overlay(&mut self.click_action, &other.click_action);
        overlay(&mut self.render_callback, &other.render_callback);
    }

    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        self.value_format
            .as_ref()
            .map_or_else(|| format_number(value), |format| format(value))
    }

    #[must_use]
    pub fn format_tooltip(&self, context: &TooltipContext<'_>) -> Option<String> {
        self.tooltip_format.as_ref().map(|format| format(context))
    }
}

impl PartialEq for ChartCallbacks {
    fn eq(&self, other: &Self) -> bool {
        fn same<T: ?Sized>(left: &Option<Rc<T>>, right: &Option<Rc<T>>) -> bool {
            match (left, right) {
                (Some(left), Some(right)) => Rc::ptr_eq(left, right),
                (None, None) => true,
                _ => false,
            }
        }
        same(&self.value_format, &other.value_format)
            && same(&self.percent_value_format, &other.percent_value_format)
            && same(&self.tooltip_format, &other.tooltip_format)
            && same(&self.get_category_label, &other.get_category_label)
            && same(&self.get_series_label, &other.get_series_label)
            && same(&self.click_action, &other.click_action)
            && same(&self.render_callback, &other.render_callback)
    }
}

impl fmt::Debug for ChartCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartCallbacks")
            .field("value_format", &self.value_format.is_some())
            .field("percent_value_format", &self.percent_value_format.is_some())
            .field("tooltip_format", &self.tooltip_format.is_some())
            .field("get_category_label", &self.get_category_label.is_some())
            .field("get_series_label", &self.get_series_label.is_some())
            .field("click_action", &self.click_action.is_some())
            .field("render_callback", &self.render_callback.is_some())
            .finish()
    }
}

/// Formats with between 0 and 2 fraction digits.
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}
