use tracing::warn;

use super::Color;

/// Category palette used when no `colors` option is set.
const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Ordered color palette indexed by series position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    colors: Vec<Color>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .filter_map(|hex| Color::from_hex(hex))
                .collect(),
        }
    }
}

impl ColorScheme {
    /// Builds a scheme from hex color strings; unparsable entries are skipped.
    ///
    /// Falls back to the default palette when nothing usable is given.
    #[must_use]
    pub fn from_hex_colors(colors: Option<&[String]>) -> Self {
        let Some(colors) = colors else {
            return Self::default();
        };
        let parsed: Vec<Color> = colors
            .iter()
            .filter_map(|hex| {
                let color = Color::from_hex(hex);
                if color.is_none() {
                    warn!(color = %hex, "skipping unparsable color");
                }
                color
            })
            .collect();
        if parsed.is_empty() {
            Self::default()
        } else {
            Self { colors: parsed }
        }
    }

    /// Color for position `index`, cycling through the palette.
    #[must_use]
    pub fn color_at(&self, index: usize) -> Color {
        self.colors
            .get(index % self.colors.len().max(1))
            .copied()
            .unwrap_or(Color::rgb(0.0, 0.0, 0.0))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ColorScheme;
    use crate::render::Color;

    #[test]
    fn palette_cycles_and_skips_invalid_entries() {
        let colors = vec!["#000000".to_owned(), "bogus".to_owned(), "#ffffff".to_owned()];
        let scheme = ColorScheme::from_hex_colors(Some(&colors));
        assert_eq!(scheme.len(), 2);
        assert_eq!(scheme.color_at(2), Color::rgb(0.0, 0.0, 0.0));
        assert_eq!(ColorScheme::from_hex_colors(None).len(), 10);
    }
}
