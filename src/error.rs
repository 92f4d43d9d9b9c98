use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Errors surfaced by ring and storage operations.
#[derive(Debug, Error)]
pub enum ChordError {
    /// The owning node has no record under this key.
    #[error("key not found: {0}")]
    NotFound(String),

    /// A remote hop timed out or refused the connection.
    #[error("peer {address} is unreachable: {reason}")]
    UnreachablePeer { address: String, reason: String },

    /// A peer answered, but not with what the protocol expects.
    #[error("peer {address} answered with status {status}")]
    UnexpectedResponse { address: String, status: u16 },

    /// The owner of an identity could not be resolved.
    #[error("routing failed: {0}")]
    RoutingFailure(String),

    #[error("node is already a ring member")]
    AlreadyMember,

    #[error("invalid peer address: {0}")]
    InvalidAddress(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ChordError {
    pub fn unreachable(address: &str, reason: impl ToString) -> Self {
        Self::UnreachablePeer {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl ResponseError for ChordError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChordError::NotFound(_) => StatusCode::NOT_FOUND,
            ChordError::UnreachablePeer { .. } | ChordError::UnexpectedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ChordError::RoutingFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            ChordError::AlreadyMember => StatusCode::CONFLICT,
            ChordError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ChordError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
