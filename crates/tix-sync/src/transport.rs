//! HTTP transport: snapshot over REST, live changes over a streaming
//! NDJSON endpoint.
//!
//! The backend serves `GET /tickets` (full table, newest first) and
//! `GET /tickets/stream`, a long-lived response writing one JSON change
//! envelope per line. Blank lines are keep-alives; a short read timeout is
//! treated as "nothing pending" so the runner can keep polling its shutdown
//! flag.

use crate::config::ApiConfig;
use crate::feed::{Transport, TransportError};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read};
use std::time::Duration;
use tix_core::model::Ticket;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(1);

type StreamReader = BufReader<Box<dyn Read + Send + Sync + 'static>>;

/// Blocking HTTP transport for the ticket feed.
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
    stream: Option<StreamReader>,
    /// Bytes of a line read so far. A read timeout can land mid-line; the
    /// fragment must survive until the rest arrives on a later poll.
    partial: String,
}

impl HttpTransport {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build();
        Self {
            base_url: config.base_url.clone(),
            agent,
            stream: None,
            partial: String::new(),
        }
    }

    fn ensure_stream(&mut self) -> Result<(), TransportError> {
        if self.stream.is_none() {
            let url = format!("{}/tickets/stream", self.base_url);
            debug!(url = %url, "opening change stream");
            let response = self
                .agent
                .get(&url)
                .call()
                .map_err(|err| TransportError::Stream(err.to_string()))?;
            self.stream = Some(BufReader::new(response.into_reader()));
            self.partial.clear();
        }
        Ok(())
    }

    fn parse_line(line: &str) -> Option<Value> {
        let payload = line.trim();
        // Blank lines and SSE-style prefixes are tolerated.
        let payload = payload.strip_prefix("data:").unwrap_or(payload).trim();
        if payload.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Some(value),
            // Hand unparseable text up as an envelope the feed will treat as
            // malformed (drop + resync).
            Err(_) => Some(Value::String(payload.to_string())),
        }
    }
}

impl Transport for HttpTransport {
    fn fetch_snapshot(&mut self) -> Result<Vec<Ticket>, TransportError> {
        let url = format!("{}/tickets", self.base_url);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| TransportError::Snapshot(err.to_string()))?;
        response
            .into_json::<Vec<Ticket>>()
            .map_err(|err| TransportError::Snapshot(err.to_string()))
    }

    fn next_change(&mut self) -> Result<Option<Value>, TransportError> {
        self.ensure_stream()?;
        let Some(reader) = self.stream.as_mut() else {
            return Err(TransportError::Stream("stream not open".to_string()));
        };

        // read_line appends to the carried buffer, resuming any fragment a
        // previous timeout left behind.
        match reader.read_line(&mut self.partial) {
            Ok(0) => {
                // Server closed the response; force a reconnect. A leftover
                // fragment is a finished line the server never terminated.
                self.stream = None;
                if self.partial.is_empty() {
                    Err(TransportError::Stream("change stream ended".to_string()))
                } else {
                    let line = std::mem::take(&mut self.partial);
                    Ok(Self::parse_line(&line))
                }
            }
            Ok(_) => {
                let line = std::mem::take(&mut self.partial);
                Ok(Self::parse_line(&line))
            }
            Err(err)
                if err.kind() == std::io::ErrorKind::WouldBlock
                    || err.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Partial bytes stay buffered until the rest arrives.
                Ok(None)
            }
            Err(err) => {
                self.stream = None;
                self.partial.clear();
                Err(TransportError::Stream(err.to_string()))
            }
        }
    }
}
