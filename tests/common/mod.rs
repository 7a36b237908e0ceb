//! In-memory WHOIS servers for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use whois_rs::{Connect, RegistryEntry, ServerRegistry};

/// How a fake server behaves once connected
#[derive(Clone, Debug)]
pub enum Reply {
    /// Read the query, send this text and close
    Text(String),
    /// Read the query and never answer
    Silent,
}

/// Routes connections to canned replies by host and records what was asked
#[derive(Clone, Default)]
pub struct MockConnector {
    replies: Arc<HashMap<String, Reply>>,
    connects: Arc<Mutex<Vec<(String, u16)>>>,
    queries: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockConnector {
    pub fn new<I, H>(replies: I) -> Self
    where
        I: IntoIterator<Item = (H, Reply)>,
        H: Into<String>,
    {
        Self {
            replies: Arc::new(replies.into_iter().map(|(h, r)| (h.into(), r)).collect()),
            ..Default::default()
        }
    }

    /// Hosts connected to, in order
    pub fn hosts(&self) -> Vec<String> {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .map(|(h, _)| h.clone())
            .collect()
    }

    pub fn connects(&self) -> Vec<(String, u16)> {
        self.connects.lock().unwrap().clone()
    }

    /// `(host, query line)` pairs as received by the fake servers
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

impl Connect for MockConnector {
    type Stream = DuplexStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream> {
        self.connects
            .lock()
            .unwrap()
            .push((host.to_string(), port));
        let reply = self.replies.get(host).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused")
        })?;
        let (client, server) = tokio::io::duplex(64 * 1024);
        let queries = self.queries.clone();
        let host = host.to_string();
        tokio::spawn(async move {
            let mut reader = BufReader::new(server);
            let mut query = String::new();
            if reader.read_line(&mut query).await.is_err() {
                return;
            }
            queries.lock().unwrap().push((host, query));
            match reply {
                Reply::Text(text) => {
                    let stream = reader.get_mut();
                    let _ = stream.write_all(text.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
                Reply::Silent => std::future::pending::<()>().await,
            }
        });
        Ok(client)
    }
}

pub fn text<S: Into<String>>(s: S) -> Reply {
    Reply::Text(s.into())
}

pub fn registry<'a, I>(entries: I) -> Arc<ServerRegistry>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    Arc::new(
        ServerRegistry::from_entries(
            entries
                .into_iter()
                .map(|(k, v)| (k, RegistryEntry::Uri(v.to_string()))),
        )
        .expect("registry"),
    )
}

/// Fields of every tracing event seen while installed, keyed by field name
#[derive(Clone, Default)]
pub struct EventCapture {
    events: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

struct FieldMap<'a>(&'a mut HashMap<String, String>);

impl tracing::field::Visit for FieldMap<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut fields = HashMap::new();
        event.record(&mut FieldMap(&mut fields));
        self.events.lock().unwrap().push(fields);
    }
}

impl EventCapture {
    /// Events whose message is `message`, in emission order
    pub fn with_message(&self, message: &str) -> Vec<HashMap<String, String>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.get("message").map(String::as_str) == Some(message))
            .cloned()
            .collect()
    }
}
