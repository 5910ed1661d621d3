use super::*;

const DEFAULT_FILTER: &str = "shovel=info,stratum=info";

/// Logs go to stderr so stdout stays free for machine-readable output.
pub(crate) fn init() -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = non_blocking(io::stderr());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(writer)
        .with_env_filter(filter)
        .init();

    guard
}
