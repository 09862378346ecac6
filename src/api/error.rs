use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::wire::{AlreadyCompletedResponse, ErrorResponse};
use crate::error::TrackerError;

/// A store error on its way to the client.
///
/// Client errors keep their message. Storage failures are logged in full and
/// answered with a generic message so internals never leak.
#[derive(Debug)]
pub struct ApiError(pub TrackerError);

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Conflict(_) => StatusCode::CONFLICT,
            TrackerError::AlreadyCompleted(_) => StatusCode::OK,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.0.to_string();

        // Completing twice on one day is a benign no-op, not a failure.
        if let TrackerError::AlreadyCompleted(_) = self.0 {
            tracing::debug!("{}", msg);
            return (
                status,
                Json(AlreadyCompletedResponse {
                    success: true,
                    already_completed: true,
                    message: msg,
                }),
            )
                .into_response();
        }

        let error = if self.0.is_client_error() {
            tracing::warn!("Rejected request: {}", msg);
            msg
        } else {
            tracing::error!("Internal error: {}", msg);
            "Internal server error".to_string()
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_status_codes() {
        let cases = [
            (TrackerError::validation("bad"), StatusCode::BAD_REQUEST),
            (TrackerError::not_found("gone"), StatusCode::NOT_FOUND),
            (TrackerError::conflict("dup"), StatusCode::CONFLICT),
            (
                TrackerError::AlreadyCompleted("Run".to_string()),
                StatusCode::OK,
            ),
            (TrackerError::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
