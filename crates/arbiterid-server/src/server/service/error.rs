use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::types::Envelope;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Count {count} cannot exceed {max}")]
    BatchTooLarge { count: i64, max: usize },
    #[error("ID type {id_type} must be between 0 and {max}")]
    InvalidIdType { id_type: i64, max: u16 },
    #[error("Endpoint not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Failed to generate ID: {0}")]
    Generation(#[from] arbiterid::Error),
    #[error("Generation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BatchTooLarge { .. } | Self::InvalidIdType { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Generation(arbiterid::Error::ClockStalled { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Generation(e) if e.is_caller_error() => StatusCode::BAD_REQUEST,
            Self::Generation(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(Envelope::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiterid::{ArbiterId, Error};

    #[test]
    fn maps_generation_errors_to_status() {
        let stalled = ServiceError::from(Error::ClockStalled {
            timestamp: 1,
            observed: 1,
            attempts: 2_000,
        });
        assert_eq!(stalled.status(), StatusCode::SERVICE_UNAVAILABLE);

        let overflow = ServiceError::from(Error::TimestampOverflow {
            timestamp: ArbiterId::MAX_TIMESTAMP + 1,
            max: ArbiterId::MAX_TIMESTAMP,
        });
        assert_eq!(overflow.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let category = ServiceError::from(Error::InvalidCategory {
            category: 2_000,
            max: ArbiterId::MAX_CATEGORY,
        });
        assert_eq!(category.status(), StatusCode::BAD_REQUEST);
    }
}
