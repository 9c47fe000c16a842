use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. A valid `RUST_LOG` replaces the built-in
/// filters entirely; otherwise this crate logs at `debug` when verbose and
/// `info` when not, and other crates only at `warn`.
pub fn init_logging(verbose: bool) {
    let (env_filter, app_filter) = build_filters(verbose, std::env::var("RUST_LOG").ok());

    tracing_subscriber::registry()
        .with(fmt::layer().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}

fn build_filters(verbose: bool, rust_log: Option<String>) -> (EnvFilter, Option<Targets>) {
    if let Some(env_filter) = rust_log.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return (env_filter, None);
    }

    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::INFO, "info")
    };
    let app_filter = Targets::new()
        .with_target("crypto_analyzer", level_filter)
        .with_target("tower_http", level_filter)
        .with_default(LevelFilter::WARN);
    (EnvFilter::new(level), Some(app_filter))
}
