//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing/telemetry. Loads environment from a `.env` file when
/// present, then installs a default env-filtered subscriber if none is set.
pub fn init_tracing() {
    let _ = dotenvy::dotenv();
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
