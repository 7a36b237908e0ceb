//! Referral detection in WHOIS responses
use crate::server::{ServerDescriptor, parse_server_uri};
use std::sync::LazyLock;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

static REFERRAL: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(ReferralServer|Registrar Whois|Whois Server|WHOIS Server|Registrar WHOIS Server):[^\S\n]*((?:r?whois|https?)://)?(.*)",
    )
    .unwrap()
});

/// Returns the server a response refers to, if any
pub fn find_referral(response: &str) -> Option<ServerDescriptor> {
    let text = response.replace('\r', "");
    REFERRAL.captures_iter(&text).find_map(|cap| {
        let uri = cap[3].trim();
        if uri.is_empty() {
            debug!("Empty referral in {} header", &cap[1]);
            return None;
        }
        Some(parse_server_uri(uri))
    })
}

/// Decides whether the chain continues after `response` came from `current`
///
/// Only referrals to a different host are followed, and only while `budget`
/// is positive. Longer cycles are bounded by the budget alone.
pub fn next_hop(
    response: &str,
    current: &ServerDescriptor,
    budget: u32,
) -> Option<ServerDescriptor> {
    if budget == 0 {
        return None;
    }
    let next = find_referral(response)?;
    if next.host == current.host {
        debug!("{} refers to itself", current);
        return None;
    }
    debug!("{} refers to {}", current, next);
    Some(next)
}
