//! HTTP client for the three mutation endpoints (plus the read-side
//! snapshot and health checks).
//!
//! [`TicketApi`] is the seam the coordinator is generic over; tests swap in
//! a scripted implementation, production uses [`HttpApi`] over `ureq`.

use crate::config::ApiConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tix_core::error::ErrorCode;
use tix_core::model::{Ticket, TicketId};
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure taxonomy for backend requests.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed: DNS, refused connection, timeout.
    #[error("could not reach the backend: {message}")]
    Transport { message: String },

    /// The backend answered with a non-2xx status, possibly carrying a
    /// structured `detail` reason (FastAPI convention).
    #[error("backend rejected the request with status {status}")]
    Rejected { status: u16, detail: Option<String> },
}

impl ApiError {
    /// The backend-provided reason, when there is one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            Self::Transport { .. } => None,
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::ApiUnreachable,
            Self::Rejected { .. } => ErrorCode::ApiRejected,
        }
    }
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let detail = response
                    .into_json::<ErrorBody>()
                    .ok()
                    .and_then(|body| body.detail)
                    .filter(|d| !d.is_empty());
                Self::Rejected { status, detail }
            }
            ureq::Error::Transport(transport) => Self::Transport {
                message: transport.to_string(),
            },
        }
    }
}

/// Backend operations the dashboard needs. Success is any 2xx.
pub trait TicketApi {
    /// `POST /create-ticket` — classification happens asynchronously
    /// server-side; the created row arrives later via the stream.
    fn create_ticket(&self, description: &str) -> Result<(), ApiError>;

    /// `PUT /tickets/{id}` — the backend re-runs classification, so
    /// category/sentiment/processed change via a later stream update.
    fn update_ticket(&self, id: &TicketId, description: &str) -> Result<(), ApiError>;

    /// `DELETE /tickets/{id}` — removal is confirmed by the stream.
    fn delete_ticket(&self, id: &TicketId) -> Result<(), ApiError>;

    /// `GET /tickets` — full table read, newest first.
    fn fetch_tickets(&self) -> Result<Vec<Ticket>, ApiError>;

    /// `GET /health`.
    fn health(&self) -> Result<(), ApiError>;
}

/// Production implementation over a shared blocking agent.
pub struct HttpApi {
    config: ApiConfig,
    agent: ureq::Agent,
}

impl HttpApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build();
        Self { config, agent }
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl TicketApi for HttpApi {
    fn create_ticket(&self, description: &str) -> Result<(), ApiError> {
        let url = self.config.endpoint("/create-ticket");
        debug!(url = %url, "creating ticket");
        self.agent
            .post(&url)
            .send_json(json!({ "description": description }))?;
        Ok(())
    }

    fn update_ticket(&self, id: &TicketId, description: &str) -> Result<(), ApiError> {
        let url = self.config.endpoint(&format!("/tickets/{id}"));
        debug!(url = %url, "updating ticket");
        self.agent
            .put(&url)
            .send_json(json!({ "description": description }))?;
        Ok(())
    }

    fn delete_ticket(&self, id: &TicketId) -> Result<(), ApiError> {
        let url = self.config.endpoint(&format!("/tickets/{id}"));
        debug!(url = %url, "deleting ticket");
        self.agent.delete(&url).call()?;
        Ok(())
    }

    fn fetch_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        let url = self.config.endpoint("/tickets");
        let response = self.agent.get(&url).call()?;
        response
            .into_json::<Vec<Ticket>>()
            .map_err(|err| ApiError::Transport {
                message: err.to_string(),
            })
    }

    fn health(&self) -> Result<(), ApiError> {
        let url = self.config.endpoint("/health");
        self.agent.get(&url).call()?;
        Ok(())
    }
}
