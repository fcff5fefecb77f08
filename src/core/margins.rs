use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::Insets;

/// Structured margins. A side value wins over `all`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginSides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

impl MarginSides {
    #[must_use]
    pub fn all(value: f64) -> Self {
        Self {
            all: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sides(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            all: None,
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
            left: Some(left),
        }
    }

    #[must_use]
    pub fn resolve(self) -> Insets {
        let all = self.all.unwrap_or(0.0);
        Insets {
            top: self.top.unwrap_or(all),
            right: self.right.unwrap_or(all),
            bottom: self.bottom.unwrap_or(all),
            left: self.left.unwrap_or(all),
        }
    }

    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let mut sides = Self::default();
        for (key, value) in object {
            let slot = match key.as_str() {
                "all" => &mut sides.all,
                "top" => &mut sides.top,
                "right" => &mut sides.right,
                "bottom" => &mut sides.bottom,
                "left" => &mut sides.left,
                _ => continue,
            };
            *slot = Some(number_of(value)?);
        }
        Some(sides)
    }
}

/// Caller-facing `margins` option value before normalization.
///
/// Accepts a CSS-like shorthand string, a number (all sides) or an object
/// with `all`/`top`/`right`/`bottom`/`left` keys. Anything else is kept as
/// `Invalid` so normalization can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum MarginsSpec {
    Uniform(f64),
    Shorthand(String),
    Sides(MarginSides),
    Invalid(Value),
}

impl From<Value> for MarginsSpec {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(ref number) => number
                .as_f64()
                .map_or(Self::Invalid(value.clone()), Self::Uniform),
            Value::String(text) => Self::Shorthand(text),
            Value::Object(ref object) => MarginSides::from_object(object)
                .map_or_else(|| Self::Invalid(value.clone()), Self::Sides),
            other => Self::Invalid(other),
        }
    }
}

impl From<MarginsSpec> for Value {
    fn from(spec: MarginsSpec) -> Self {
        match spec {
            MarginsSpec::Uniform(all) => serde_json::json!(all),
            MarginsSpec::Shorthand(text) => Value::String(text),
            MarginsSpec::Sides(sides) => serde_json::to_value(sides).unwrap_or(Value::Null),
            MarginsSpec::Invalid(value) => value,
        }
    }
}

impl From<&str> for MarginsSpec {
    fn from(text: &str) -> Self {
        Self::Shorthand(text.to_owned())
    }
}

impl From<f64> for MarginsSpec {
    fn from(all: f64) -> Self {
        Self::Uniform(all)
    }
}

impl From<MarginSides> for MarginsSpec {
    fn from(sides: MarginSides) -> Self {
        Self::Sides(sides)
    }
}

/// Converts a `margins` option value into structured sides.
///
/// Shorthand strings follow the CSS convention:
/// - `"1"`: all sides 1
/// - `"1 2"`: top/bottom 1, left/right 2
/// - `"1 2 3"`: top 1, left/right 2, bottom 3
/// - `"1 2 3 4"`: top 1, right 2, bottom 3, left 4
///
/// Any other token count, a non-numeric token, or a value that is neither a
/// string, a number nor an object yields `None` and logs a warning.
#[must_use]
pub fn parse_margins(spec: &MarginsSpec) -> Option<MarginSides> {
    match spec {
        MarginsSpec::Uniform(all) => Some(MarginSides::all(*all)),
        MarginsSpec::Sides(sides) => Some(*sides),
        MarginsSpec::Shorthand(text) => parse_shorthand(text),
        MarginsSpec::Invalid(value) => {
            warn!(margins = %value, "invalid 'margins' option value");
            None
        }
    }
}

fn parse_shorthand(text: &str) -> Option<MarginSides> {
    let mut tokens = Vec::with_capacity(4);
    for token in text.split_whitespace() {
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => tokens.push(value),
            _ => {
                warn!(margins = text, token, "invalid 'margins' option token");
                return None;
            }
        }
    }

    match tokens.as_slice() {
        [all] => Some(MarginSides::all(*all)),
        [vertical, horizontal] => Some(MarginSides::sides(
            *vertical,
            *horizontal,
            *vertical,
            *horizontal,
        )),
        [top, horizontal, bottom] => {
            Some(MarginSides::sides(*top, *horizontal, *bottom, *horizontal))
        }
        [top, right, bottom, left] => Some(MarginSides::sides(*top, *right, *bottom, *left)),
        _ => {
            warn!(
                margins = text,
                token_count = tokens.len(),
                "invalid 'margins' option value"
            );
            None
        }
    }
}

fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MarginSides, MarginsSpec, parse_margins};

    #[test]
    fn shorthand_accepts_surrounding_whitespace() {
        let parsed = parse_margins(&MarginsSpec::from("  5\t6 "));
        assert_eq!(parsed, Some(MarginSides::sides(5.0, 6.0, 5.0, 6.0)));
    }

    #[test]
    fn object_values_are_classified_as_sides() {
        let spec = MarginsSpec::from(json!({ "all": 4, "left": "8" }));
        assert_eq!(
            spec,
            MarginsSpec::Sides(MarginSides {
                all: Some(4.0),
                left: Some(8.0),
                ..MarginSides::default()
            })
        );
    }

    #[test]
    fn object_with_non_numeric_side_is_invalid() {
        let spec = MarginsSpec::from(json!({ "top": true }));
        assert!(matches!(spec, MarginsSpec::Invalid(_)));
        assert_eq!(parse_margins(&spec), None);
    }

    #[test]
    fn resolve_prefers_explicit_sides_over_all() {
        let insets = MarginSides {
            all: Some(2.0),
            top: Some(10.0),
            ..MarginSides::default()
        }
        .resolve();
        assert_eq!(insets.top, 10.0);
        assert_eq!(insets.left, 2.0);
    }
}
