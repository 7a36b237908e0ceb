//! Facilities for reading runtime configuration values
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};
use whois_rs::HopOptions;

#[derive(Debug, Default, Deserialize)]
/// Lookup client configuration
pub struct Config {
    /// Referral hops to follow
    pub follow: Option<u32>,
    /// Per server query timeout in milliseconds (0 disables it)
    pub timeout_ms: Option<u64>,
    /// Log every server response
    pub verbose: Option<bool>,
    /// A JSON server registry to use instead of the built-in one
    pub servers_path: Option<String>,
}

impl Config {
    /// Loads the configuration from a `toml` file and environment variables
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Figment::new()
            .merge(Toml::file("whois.toml"))
            .merge(Env::prefixed("WHOIS__").split("__"))
            .extract::<Self>()
            .inspect(|config| trace!("final config: {config:#?}"))
            .map_err(|err| {
                error!("Failed to validate configuration: {}", err);
                err.into()
            })
    }

    /// The client defaults this configuration describes
    pub fn hop_options(&self) -> HopOptions {
        let defaults = HopOptions::default();
        HopOptions {
            follow: self.follow.unwrap_or(defaults.follow),
            timeout: self
                .timeout_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or(defaults.timeout),
            verbose: self.verbose.unwrap_or(defaults.verbose),
        }
    }
}
