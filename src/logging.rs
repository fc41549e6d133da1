use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `YT_TRANSCRIPT_LOG=yt_transcript=debug`
pub const LOG_ENV: &str = "YT_TRANSCRIPT_LOG";

/// Initialize tracing on stderr.
///
/// Stdout carries the JSON result, so diagnostics never go there. Logging is
/// off unless `YT_TRANSCRIPT_LOG` is set.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(tracing::level_filters::LevelFilter::OFF.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
