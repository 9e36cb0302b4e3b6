use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the filter directives (e.g. `OHMS_LOG=ohms::sync=debug`).
pub const LOG_ENV_VAR: &str = "OHMS_LOG";

/// How diagnostics are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    /// One short line per event, no colors, no timestamps. Meant for a terminal next to
    /// the rendered transcript on stdout.
    #[default]
    Plain,
    /// One JSON object per event, for collection by another process.
    Json,
}

/// Install a stderr subscriber. Only warnings and errors are shown unless `OHMS_LOG` says
/// otherwise; that is where degraded records (garbled index times, dropped sync tokens at
/// `debug`) are reported.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter());

    let _ = match format {
        LogFormat::Plain => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .without_time()
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}

fn filter() -> EnvFilter {
    EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy()
}
