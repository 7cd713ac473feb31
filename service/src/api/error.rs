//! JSON error responses for the API layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::app::ServiceError;
use turnstile_ledger::LedgerError;

/// An API-level error: HTTP status plus a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Build an error with an explicit status
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Ledger(ledger) => match ledger {
                LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::AlreadyIssued(_) | LedgerError::AlreadyCheckedIn(_) => {
                    StatusCode::CONFLICT
                },
                LedgerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ServiceError::Aggregation(_) | ServiceError::Unavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            },
            ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnstile_ledger::{TicketId, ValidationError};

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let id = TicketId::new();

        let validation: ApiError =
            ServiceError::Ledger(ValidationError::MissingGuest.into()).into();
        assert_eq!(validation.status, StatusCode::UNPROCESSABLE_ENTITY);

        let not_found: ApiError = ServiceError::Ledger(LedgerError::NotFound(id)).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let duplicate: ApiError =
            ServiceError::Ledger(LedgerError::AlreadyCheckedIn(id)).into();
        assert_eq!(duplicate.status, StatusCode::CONFLICT);

        let unavailable: ApiError =
            ServiceError::Ledger(LedgerError::StoreUnavailable("down".into())).into();
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);

        let timeout: ApiError = ServiceError::Timeout.into();
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);
    }
}
