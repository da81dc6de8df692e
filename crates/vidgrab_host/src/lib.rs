//! Vidgrab host: runs the coordinator state machine against the engine.
pub mod config;
mod effects;
mod host;
pub mod logging;

pub use config::{ConfigError, HostConfig, LogConfig, MediaBackend, PollConfig, RetryConfig};
pub use host::Host;
pub use logging::LogDestination;

/// Load `config`, install the configured logger and build a host around
/// `identity`.
pub fn start(
    config: &HostConfig,
    identity: std::sync::Arc<dyn vidgrab_engine::IdentityProvider>,
) -> Result<Host, ConfigError> {
    let level = config.log.level_filter()?;
    logging::initialize(config.log.destination, level, &config.log.file);
    Host::from_config(config, identity)
}
