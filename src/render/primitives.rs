use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses the `#rrggbb` and `#rgb` forms used by the `colors` option and
    /// `*_fillStyle`/`*_textStyle` extension points.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel =
            |hex: &str| u8::from_str_radix(hex, 16).ok().map(|v| f64::from(v) / 255.0);
        match digits.len() {
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |index: usize| {
                    let digit = &digits[index..=index];
                    channel(&format!("{digit}{digit}"))
                };
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        let channels = [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ];
        match channels
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            Some((channel, _)) => Err(ChartError::InvalidData(format!(
                "color channel `{channel}` must be in [0, 1]"
            ))),
            None => Ok(()),
        }
    }
}

fn ensure_finite(what: &str, values: &[f64]) -> ChartResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ChartError::InvalidData(format!("{what} must be finite")))
    }
}

/// Straight stroke in pixel space, such as a legend line marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(from: (f64, f64), to: (f64, f64), stroke_width: f64, color: Color) -> Self {
        Self {
            from,
            to,
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite(
            "line end points",
            &[self.from.0, self.from.1, self.to.0, self.to.1],
        )?;
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(ChartError::InvalidData(
                "line stroke width must be positive".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Filled and/or stroked box in pixel space: panel backgrounds, bars and
/// legend markers.
///
/// Zero-sized boxes are valid: they are the start state of grow-in transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
}

impl RectPrimitive {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: None,
            stroke: None,
        }
    }

    #[must_use]
    pub const fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    #[must_use]
    pub const fn with_stroke(mut self, color: Color) -> Self {
        self.stroke = Some(color);
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite("rect geometry", &[self.x, self.y, self.width, self.height])?;
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "rect size {}x{} is negative",
                self.width, self.height
            )));
        }
        self.fill.map_or(Ok(()), Color::validate)?;
        self.stroke.map_or(Ok(()), Color::validate)
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextHAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// One label in pixel space, vertically centered on `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData("empty text primitive".to_owned()));
        }
        ensure_finite("text anchor", &[self.x, self.y])?;
        if !(self.font_size_px.is_finite() && self.font_size_px > 0.0) {
            return Err(ChartError::InvalidData(format!(
                "font size {} is not positive",
                self.font_size_px
            )));
        }
        self.color.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

    #[test]
    fn hex_colors_parse_long_and_short_forms() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(Color::from_hex(" #fff "), Some(Color::rgb(1.0, 1.0, 1.0)));
        assert_eq!(Color::from_hex("red"), None);
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#ééé"), None);
    }

    #[test]
    fn zero_height_rect_is_valid() {
        assert!(RectPrimitive::new(1.0, 2.0, 10.0, 0.0).validate().is_ok());
        assert!(RectPrimitive::new(1.0, 2.0, -1.0, 0.0).validate().is_err());
        assert!(RectPrimitive::new(f64::NAN, 2.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        let rect =
            RectPrimitive::new(0.0, 0.0, 1.0, 1.0).with_fill(Color::rgba(1.0, 0.0, 0.0, 2.0));
        assert!(rect.validate().is_err());
        assert!(Color::rgb(f64::NAN, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn empty_text_and_degenerate_strokes_are_rejected() {
        let text = TextPrimitive::new("", 0.0, 0.0, 12.0, Color::BLACK, TextHAlign::Left);
        assert!(text.validate().is_err());
        let line = LinePrimitive::new((0.0, 0.0), (4.0, 0.0), 0.0, Color::BLACK);
        assert!(line.validate().is_err());
    }
}
