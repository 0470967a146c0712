//! Logging setup for the CLI.
//!
//! Diagnostics go to stderr so the watch spinner and notifications on stdout
//! stay readable. When `RUST_LOG` is set it alone decides what is logged and
//! `--verbose` is ignored.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    }
}

/// Limits output to this crate at the `--verbose` level, unless `RUST_LOG`
/// provides its own directives.
fn crate_filter(verbose: bool, env_directives: bool) -> Option<Targets> {
    (!env_directives)
        .then(|| Targets::new().with_target(env!("CARGO_CRATE_NAME"), level_for(verbose)))
}

pub fn init_logging(verbose: bool) {
    let level = level_for(verbose);
    let env_filter = EnvFilter::try_from_default_env().ok();
    let crate_filter = crate_filter(verbose, env_filter.is_some());
    let env_filter =
        env_filter.unwrap_or_else(|| EnvFilter::new(level.to_string().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(crate_filter)
        .with(env_filter)
        .init();
}
