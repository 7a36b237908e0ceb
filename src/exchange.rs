//! A single WHOIS query/response exchange
use crate::error::WhoisError;
use crate::server::ServerDescriptor;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Opens byte streams to WHOIS servers
pub trait Connect {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = std::io::Result<Self::Stream>> + Send;
}

/// Plain TCP
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    type Stream = tokio::net::TcpStream;

    async fn connect(&self, host: &str, port: u16) -> std::io::Result<Self::Stream> {
        tokio::net::TcpStream::connect((host, port)).await
    }
}

fn from_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&c| c as char).collect()
}

async fn transact<C: Connect>(
    connector: &C,
    target: &str,
    server: &ServerDescriptor,
) -> std::io::Result<String> {
    debug!("Connecting to {} for query on {}...", server, target);
    let mut stream = connector.connect(&server.host, server.port).await?;
    stream.write_all(server.query_for(target).as_bytes()).await?;
    stream.flush().await?;
    debug!("Query sent to {} for {}", server, target);
    let mut buf: Vec<u8> = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let _ = stream.shutdown().await;
    Ok(match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => from_latin1(e.as_bytes()),
    })
}

/// Queries `server` about `target` and returns everything it sends back
///
/// The exchange is abandoned, and the connection dropped, once `timeout`
/// elapses. A zero `timeout` waits forever.
pub async fn exchange<C: Connect>(
    connector: &C,
    target: &str,
    server: &ServerDescriptor,
    timeout: Duration,
) -> Result<String, WhoisError> {
    let res = if timeout.is_zero() {
        transact(connector, target, server).await
    } else {
        tokio::time::timeout(timeout, transact(connector, target, server))
            .await
            .map_err(|_| {
                warn!("Query to {} for {} timed out", server, target);
                WhoisError::Timeout {
                    server: server.clone(),
                    after: timeout,
                }
            })?
    };
    let reply = res.map_err(|e| {
        warn!("Query to {} for {} failed: {e}", server, target);
        WhoisError::Network {
            server: server.clone(),
            source: e,
        }
    })?;
    trace!("Response from {} for {}:\n{}", server, target, reply);
    Ok(reply)
}
