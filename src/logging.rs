// Tracing setup. Logs go to stderr so they never interleave with the
// prompts on stdout; the default filter keeps them quiet.

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Install the global subscriber. Call once, before the session starts.
pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_level(true)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        // a subscriber is already set; it receives this event instead
        tracing::debug!(error = %e, "logging already initialised");
    }
}
