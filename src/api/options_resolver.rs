use tracing::debug;

use crate::core::{MarginsSpec, parse_margins};

use super::{ChartOptions, ChartVariant};

/// Normalizes merged options before every pre-render.
///
/// Resolution is idempotent: resolving already resolved options changes
/// nothing.
pub struct OptionsResolver<'a> {
    variant: &'a dyn ChartVariant,
    supports_transitions: bool,
}

impl<'a> OptionsResolver<'a> {
    #[must_use]
    pub fn new(variant: &'a dyn ChartVariant, supports_transitions: bool) -> Self {
        Self {
            variant,
            supports_transitions,
        }
    }

    pub fn resolve(&self, options: &mut ChartOptions) {
        self.variant.process_options(options);
        resolve_base(options, self.supports_transitions);
        debug!(variant = self.variant.name(), ?options, "resolved chart options");
    }
}

/// Normalization shared by every variant.
pub fn resolve_base(options: &mut ChartOptions, supports_transitions: bool) {
    if !supports_transitions {
        options.animate = false;
    }
    if let Some(margins) = options.margins.take() {
        options.margins = parse_margins(&margins).map(MarginsSpec::Sides);
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_base;
    use crate::api::ChartOptions;
    use crate::core::{MarginSides, MarginsSpec};

    #[test]
    fn backend_without_transitions_disables_animation() {
        let mut options = ChartOptions::default();
        resolve_base(&mut options, false);
        assert!(!options.animate);
    }

    #[test]
    fn invalid_margins_are_cleared() {
        let mut options = ChartOptions {
            margins: Some(MarginsSpec::from("1 2 3 4 5")),
            ..ChartOptions::default()
        };
        resolve_base(&mut options, true);
        assert_eq!(options.margins, None);

        options.margins = Some(MarginsSpec::from(6.0));
        resolve_base(&mut options, true);
        assert_eq!(options.margins, Some(MarginsSpec::Sides(MarginSides::all(6.0))));
    }
}
