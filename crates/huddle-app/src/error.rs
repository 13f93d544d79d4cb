use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;

use huddle_core::error::CoreError;
use huddle_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] huddle_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    /// A depot dependency that the middleware chain should have injected was
    /// absent. Always a wiring bug, never a caller problem.
    #[error("Missing request context: {0}")]
    MissingContext(&'static str),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// The outward status for this failure. Every error kind of the taxonomy
    /// stays distinguishable to the caller.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ServiceError(err) => service_status(err),
            Self::CoreError(err) => core_status(err),
            Self::DatabaseError(_) | Self::MissingContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::AuthorizationError(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::CoreError(err) => core_status(err),
        ServiceError::DatabaseError(_) | ServiceError::DieselError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::ValidationError(_) | CoreError::ParseError(_) => StatusCode::BAD_REQUEST,
        CoreError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        CoreError::AuthorizationError(_) => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::InvalidConfiguration(_) | CoreError::InvariantViolation(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    /// ## Summary
    /// Writes this error to the response as a JSON payload with the mapped
    /// status. Infrastructure faults are logged in full but never echoed
    /// back to the caller.
    pub fn render(self, res: &mut salvo::Response) {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Request failed");
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        res.status_code(status);
        res.render(Json(ErrorResponse { error: message }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_each_error_kind_maps_to_a_distinct_status() {
        let cases = [
            (
                ServiceError::ValidationError("bad".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (
                ServiceError::AuthorizationError("no".to_owned()),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::NotFound("gone".to_owned()),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Conflict("dup".to_owned()),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test_log::test]
    fn test_nested_core_errors_keep_their_status() {
        let err = AppError::from(ServiceError::from(CoreError::ValidationError(
            "bad".to_owned(),
        )));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(CoreError::InvariantViolation("corrupt blob"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test_log::test]
    fn test_missing_context_is_an_internal_fault() {
        let err = AppError::MissingContext("database provider");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
