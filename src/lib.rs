//! WHOIS lookups with automatic referral following
//!
//! The first server is picked from a static registry keyed by TLD (or by
//! [`registry::IP_KEY`] for IP addresses). Responses naming another server,
//! like the `Registrar WHOIS Server:` line of a registry reply, are followed
//! up to a hop budget and the text of the last server queried is returned.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), whois_rs::WhoisError> {
//! let text = whois_rs::lookup("github.com", None).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod exchange;
pub mod referral;
pub mod registry;
pub mod resolver;
pub mod server;

pub use error::WhoisError;
pub use exchange::{Connect, TcpConnector};
pub use registry::{RegistryEntry, ServerRegistry};
pub use server::{ServerDescriptor, parse_server_uri};

use std::sync::Arc;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Referral hops allowed unless overridden
pub const DEFAULT_FOLLOW: u32 = 2;

/// Per exchange timeout unless overridden
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60000);

/// Fully specified options of a resolution chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopOptions {
    /// Remaining referral hops
    pub follow: u32,
    /// Per exchange timeout, zero disables it
    pub timeout: Duration,
    /// Emit one record per queried server
    pub verbose: bool,
}

impl Default for HopOptions {
    fn default() -> Self {
        Self {
            follow: DEFAULT_FOLLOW,
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
        }
    }
}

/// Caller overrides, unset fields take the client defaults
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    pub follow: Option<u32>,
    pub timeout: Option<Duration>,
    pub verbose: Option<bool>,
    /// Skip the registry and start from this server
    pub server: Option<ServerDescriptor>,
}

impl LookupOptions {
    fn merged_over(&self, defaults: &HopOptions) -> HopOptions {
        HopOptions {
            follow: self.follow.unwrap_or(defaults.follow),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            verbose: self.verbose.unwrap_or(defaults.verbose),
        }
    }
}

/// The outcome of a resolution chain
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Response of the last server queried
    pub response: String,
    /// Every server queried, in order
    pub hops: Vec<ServerDescriptor>,
}

/// A WHOIS client
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct Whois<C = TcpConnector> {
    registry: Arc<ServerRegistry>,
    connector: C,
    defaults: HopOptions,
}

impl Default for Whois {
    fn default() -> Self {
        Self::new()
    }
}

impl Whois {
    /// A TCP client using the built-in registry
    pub fn new() -> Self {
        Self {
            registry: ServerRegistry::builtin(),
            connector: TcpConnector,
            defaults: HopOptions::default(),
        }
    }
}

impl<C: Connect> Whois<C> {
    pub fn with_registry(mut self, registry: Arc<ServerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_defaults(mut self, defaults: HopOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replaces the transport
    pub fn with_connector<D: Connect>(self, connector: D) -> Whois<D> {
        Whois {
            registry: self.registry,
            connector,
            defaults: self.defaults,
        }
    }

    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    pub fn defaults(&self) -> &HopOptions {
        &self.defaults
    }

    /// Looks `target` up and returns the final response text
    pub async fn lookup(
        &self,
        target: &str,
        options: Option<&LookupOptions>,
    ) -> Result<String, WhoisError> {
        self.resolve(target, options).await.map(|r| r.response)
    }

    /// Like [`Whois::lookup`] but also reports the servers queried
    #[instrument(level = "debug", skip_all, fields(domain = target))]
    pub async fn resolve(
        &self,
        target: &str,
        options: Option<&LookupOptions>,
    ) -> Result<Resolution, WhoisError> {
        let mut opts = options
            .map(|o| o.merged_over(&self.defaults))
            .unwrap_or(self.defaults);
        let mut server = match options.and_then(|o| o.server.as_ref()) {
            Some(server) => server.clone(),
            None => resolver::resolve_server(&self.registry, target)?,
        };
        let mut hops = Vec::new();
        let mut log = Vec::new();
        let response = loop {
            let response =
                exchange::exchange(&self.connector, target, &server, opts.timeout).await?;
            let next = referral::next_hop(&response, &server, opts.follow);
            hops.push(server);
            match next {
                Some(next) => {
                    opts.follow -= 1;
                    debug!("Following referral to {} ({} hops left)", next, opts.follow);
                    if opts.verbose {
                        log.push(response);
                    }
                    server = next;
                }
                None => break response,
            }
        };
        if opts.verbose {
            for (server, text) in hops.iter().zip(log.iter().chain([&response])) {
                info!(domain = target, server = %server.host, response = %text, "whois response");
            }
        }
        Ok(Resolution { response, hops })
    }
}

/// Looks `target` up with the built-in registry over TCP
pub async fn lookup(target: &str, options: Option<&LookupOptions>) -> Result<String, WhoisError> {
    Whois::new().lookup(target, options).await
}
