//! Picks the first server to ask about a target
use crate::error::WhoisError;
use crate::registry::ServerRegistry;
use crate::server::ServerDescriptor;
use std::net::{IpAddr, Ipv6Addr};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Drops the leftmost label of `name`, up to and including the first dot
fn strip_label(name: &str) -> &str {
    name.split_once('.').map(|(_, rest)| rest).unwrap_or_default()
}

/// Looks up the longest suffix of `name` known to the registry
fn find_suffix<'a>(registry: &'a ServerRegistry, name: &str) -> Option<&'a ServerDescriptor> {
    let mut suffix = name;
    while !suffix.is_empty() {
        if let Some(server) = registry.get(suffix) {
            debug!("Registry match for {} is {}", name, suffix);
            return Some(server);
        }
        suffix = strip_label(suffix);
    }
    None
}

/// Tells whether `target` is an IP literal, IPv6 zone suffixes included
fn is_ip(target: &str) -> bool {
    if target.parse::<IpAddr>().is_ok() {
        return true;
    }
    match target.split_once('%') {
        Some((addr, zone)) => !zone.is_empty() && addr.parse::<Ipv6Addr>().is_ok(),
        None => false,
    }
}

/// Decides which server is queried first for `target`
///
/// IP literals go to the registry's IP entry; anything else is converted to
/// ASCII and matched against the registry from the most specific suffix down.
pub fn resolve_server(
    registry: &ServerRegistry,
    target: &str,
) -> Result<ServerDescriptor, WhoisError> {
    if target.contains('@') {
        return Err(WhoisError::UnsupportedTarget(target.to_string()));
    }
    let server = if is_ip(target) {
        debug!("{} is an IP address", target);
        registry.ip_server()
    } else {
        let ascii = idna::domain_to_ascii_cow(target.as_bytes(), idna::AsciiDenyList::URL)
            .map_err(|_| WhoisError::InvalidTarget(target.to_string()))?;
        let name = ascii.strip_suffix('.').unwrap_or(ascii.as_ref());
        debug!("ASCII name for {} is {}", target, name);
        find_suffix(registry, name)
    };
    server
        .cloned()
        .ok_or_else(|| WhoisError::NoServerKnown(target.to_string()))
}
