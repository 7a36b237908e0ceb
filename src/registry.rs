//! The static TLD to WHOIS server mapping
use crate::error::WhoisError;
use crate::server::{ServerDescriptor, parse_server_uri};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// The registry key used for IP address targets
pub const IP_KEY: &str = "_";

/// A registry value as found in the registry document
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegistryEntry {
    /// A `host[:port]` string
    Uri(String),
    /// A partial descriptor, unspecified fields take the defaults
    Server {
        #[serde(default)]
        host: String,
        port: Option<u16>,
        query: Option<String>,
    },
}

impl RegistryEntry {
    fn into_descriptor(self) -> ServerDescriptor {
        match self {
            Self::Uri(uri) => parse_server_uri(&uri),
            Self::Server { host, port, query } => {
                let mut server = ServerDescriptor::new(host);
                if let Some(port) = port {
                    server = server.with_port(port);
                }
                if let Some(query) = query {
                    server = server.with_query(query);
                }
                server
            }
        }
    }
}

/// Read-only mapping from TLD (or [`IP_KEY`]) to the server to ask first
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    servers: HashMap<String, ServerDescriptor>,
}

static BUILTIN: LazyLock<Arc<ServerRegistry>> = LazyLock::new(|| {
    Arc::new(
        ServerRegistry::from_json(include_str!("../data/servers.json"))
            .expect("FATAL: embedded server registry is invalid"),
    )
});

impl ServerRegistry {
    /// Returns the registry shipped with the crate
    pub fn builtin() -> Arc<Self> {
        BUILTIN.clone()
    }

    /// Builds a registry out of `(key, entry)` pairs
    ///
    /// Keys are lowercased; entries are resolved to descriptors right away and
    /// entries without a host are rejected.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, WhoisError>
    where
        I: IntoIterator<Item = (K, RegistryEntry)>,
        K: Into<String>,
    {
        let servers = entries
            .into_iter()
            .map(|(key, entry)| {
                let key: String = key.into().to_lowercase();
                let server = entry.into_descriptor();
                if server.host.is_empty() {
                    return Err(WhoisError::InvalidRegistryEntry { key });
                }
                Ok((key, server))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { servers })
    }

    /// Parses a JSON registry document
    pub fn from_json(json: &str) -> Result<Self, WhoisError> {
        let entries: HashMap<String, RegistryEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Reads a JSON registry document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WhoisError> {
        let path = path.as_ref();
        debug!("Loading server registry from {}", path.display());
        let json = std::fs::read_to_string(path)
            .inspect_err(|e| warn!("Failed to read {}: {e}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn get(&self, key: &str) -> Option<&ServerDescriptor> {
        self.servers.get(key)
    }

    /// The server used for IP address targets
    pub fn ip_server(&self) -> Option<&ServerDescriptor> {
        self.get(IP_KEY)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::DEFAULT_QUERY;

    #[test]
    fn builtin() {
        let reg = ServerRegistry::builtin();
        assert!(!reg.is_empty());
        let com = reg.get("com").expect("com");
        assert_eq!(com.host, "whois.verisign-grs.com");
        assert_eq!(com.port, 43);
        assert_eq!(com.query, DEFAULT_QUERY);
        let ip = reg.ip_server().expect("ip");
        assert_eq!(ip.host, "whois.arin.net");
        assert_eq!(ip.query, "n + $addr\r\n");
        assert_eq!(reg.get("de").expect("de").query, "-T dn,ace $addr\r\n");
    }

    #[test]
    fn mixed_entries() {
        let reg = ServerRegistry::from_json(
            r#"{
                "ORG": "whois.example.org:4321",
                "net": { "host": "whois.example.net", "port": 4343 },
                "io": { "host": "whois.example.io", "query": "-q $addr\n" }
            }"#,
        )
        .expect("registry");
        assert_eq!(reg.len(), 3);
        assert_eq!(
            reg.get("org"),
            Some(&ServerDescriptor::new("whois.example.org").with_port(4321))
        );
        assert_eq!(
            reg.get("net"),
            Some(&ServerDescriptor::new("whois.example.net").with_port(4343))
        );
        assert_eq!(
            reg.get("io"),
            Some(&ServerDescriptor::new("whois.example.io").with_query("-q $addr\n"))
        );
        assert!(reg.ip_server().is_none());
    }

    #[test]
    fn entry_without_host() {
        let res = ServerRegistry::from_json(r#"{ "net": { "port": 4343 } }"#);
        assert!(matches!(
            res,
            Err(WhoisError::InvalidRegistryEntry { ref key }) if key == "net"
        ));
    }

    #[test]
    fn malformed_document() {
        assert!(matches!(
            ServerRegistry::from_json("[1, 2]"),
            Err(WhoisError::Registry(_))
        ));
    }

    #[test]
    fn load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(br#"{ "_": "whois.ripe.net", "eu": "whois.eu" }"#)?;
        let reg = ServerRegistry::load(file.path())?;
        assert_eq!(reg.ip_server().map(|s| s.host.as_str()), Some("whois.ripe.net"));
        assert_eq!(reg.get("eu").map(|s| s.host.as_str()), Some("whois.eu"));
        Ok(())
    }
}
