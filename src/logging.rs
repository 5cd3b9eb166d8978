use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "DAYTASK_LOG";

/// Install the stderr log subscriber. Filter comes from `$DAYTASK_LOG`
/// (EnvFilter syntax), defaulting to `warn` so normal output stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
