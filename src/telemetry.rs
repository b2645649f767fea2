//! Logging setup and metric descriptions.

use std::sync::Once;

use anyhow::Result;
use metrics::{Unit, describe_counter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::cache_aside::{
    METRIC_CACHE_FAILURES, METRIC_CACHE_HITS, METRIC_CACHE_MISSES,
};

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` directives take precedence over `log_level`. `log_format` is
/// `json` for structured output, anything else selects the text formatter.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    describe_metrics();

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    Ok(())
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HITS,
            Unit::Count,
            "Entity lookups answered from the cache."
        );
        describe_counter!(
            METRIC_CACHE_MISSES,
            Unit::Count,
            "Entity lookups that fell through to the database."
        );
        describe_counter!(
            METRIC_CACHE_FAILURES,
            Unit::Count,
            "Cache steps that failed, labelled by step."
        );
    });
}
