mod config;

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::prelude::*;
use whois_rs::{LookupOptions, ServerRegistry, Whois, parse_server_uri};

/// Query WHOIS servers, following referrals
#[derive(Parser, Debug)]
#[command(name = "whois-rs")]
#[command(version, about, long_about = None)]
struct Args {
    /// Domain names or IP addresses to look up
    #[arg(required = true)]
    targets: Vec<String>,

    /// Ask this server (host[:port]) first instead of consulting the registry
    #[arg(short = 'H', long)]
    server: Option<String>,

    /// Referral hops to follow
    #[arg(short, long)]
    follow: Option<u32>,

    /// Per server timeout in milliseconds (0 disables it)
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Log every server response
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            follow: self.follow,
            timeout: self.timeout_ms.map(Duration::from_millis),
            verbose: self.verbose.then_some(true),
            server: self.server.as_deref().map(parse_server_uri),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::Config::new()?;
    let verbose = args.verbose || config.verbose.unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose { "whois_rs=info" } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let mut whois = Whois::new().with_defaults(config.hop_options());
    if let Some(path) = config.servers_path.as_deref() {
        whois = whois.with_registry(Arc::new(ServerRegistry::load(path)?));
    }
    let options = args.lookup_options();

    let mut failed = false;
    for target in &args.targets {
        info!("Checking {}", target);
        match whois.lookup(target, Some(&options)).await {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("Lookup of {} failed: {}", target, e);
                failed = true;
            }
        }
    }
    if failed {
        return Err("one or more lookups failed".into());
    }
    Ok(())
}
