use crate::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated | Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::Validation { .. } | Error::MissingInput(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Upstream(_) | Error::NoImage(_) => StatusCode::BAD_GATEWAY,
            Error::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageOperation;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::validation("prompt", "must not be empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::NoImage(ImageOperation::Generate).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::StorageUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Storage("upload failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
