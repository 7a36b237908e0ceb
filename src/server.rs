//! WHOIS server descriptors and the lenient `host[:port]` parser
use std::fmt;

/// The well known WHOIS port
pub const DEFAULT_PORT: u16 = 43;

/// The placeholder replaced by the query target
pub const ADDR_PLACEHOLDER: &str = "$addr";

/// The query sent when a server has no template of its own
pub const DEFAULT_QUERY: &str = "$addr\r\n";

/// A WHOIS server to query and how to phrase the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub host: String,
    pub port: u16,
    /// Query template, `$addr` is replaced by the target
    pub query: String,
}

impl ServerDescriptor {
    /// Creates a descriptor with the default port and query template
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            query: DEFAULT_QUERY.to_string(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = query.into();
        self
    }

    /// Renders the query line for `target`
    pub fn query_for(&self, target: &str) -> String {
        self.query.replacen(ADDR_PLACEHOLDER, target, 1)
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Removes leading colons, whitespace and an `http(s)` scheme
///
/// If nothing is left the input is returned untouched.
fn strip_noise(uri: &str) -> &str {
    let s = uri.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let s = s
        .strip_prefix("https")
        .or_else(|| s.strip_prefix("http"))
        .filter(|rest| rest.starts_with([':', '/']))
        .map(|rest| rest.trim_start_matches([':', '/']))
        .unwrap_or(s);
    if s.is_empty() { uri } else { s }
}

/// Parses the leading digits of `s`, if any fit in a port number
fn parse_port(s: &str) -> Option<u16> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Turns a `host[:port]` string into a [`ServerDescriptor`]
///
/// This never fails: a missing or bogus port becomes [`DEFAULT_PORT`] and
/// anything unrecognized ends up in the host.
pub fn parse_server_uri(uri: &str) -> ServerDescriptor {
    let cleaned = strip_noise(uri);
    let mut parts = cleaned.split(':');
    let host = parts.next().unwrap_or_default().trim();
    let port = parts.next().and_then(parse_port).unwrap_or(DEFAULT_PORT);
    ServerDescriptor::new(host).with_port(port)
}
