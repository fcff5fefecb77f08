//! Opt-in `tracing` setup for hosts embedding `chart-compose`.
//!
//! The pre-render pipeline logs options, rows and panel composition at
//! `debug`/`trace`, dropped margins at `warn` and failed renders at `error`.
//! Hosts with their own subscriber can ignore this module.

/// Environment variable read for the filter directives, in `RUST_LOG` syntax.
pub const LOG_ENV_VAR: &str = "CHART_COMPOSE_LOG";

/// Filter used when `CHART_COMPOSE_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "chart_compose=warn";

/// Installs a compact global subscriber filtered by `CHART_COMPOSE_LOG`.
///
/// Returns `false` without the `telemetry` feature or when the host already
/// installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with(None)
}

/// Like [`init_default_tracing`], with explicit directives taking precedence
/// over the environment.
#[must_use]
pub fn init_tracing_with(directives: Option<&str>) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let parsed = match directives {
            Some(directives) => EnvFilter::try_new(directives).ok(),
            None => EnvFilter::try_from_env(LOG_ENV_VAR).ok(),
        };
        let filter = parsed.unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}
