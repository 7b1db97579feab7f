use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};
use dsl_monitor_supervisor::SupervisorError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("no data available yet")]
    NotReady,
    #[error("interactive authentication is disabled")]
    InteractiveAuthDisabled,
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    #[error("Creating the archive failed: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Encoding the data failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Writing the archive failed: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotReady => StatusCode::NOT_FOUND,
            AppError::InteractiveAuthDisabled | AppError::Supervisor(SupervisorError::NoCredentialRequired(_)) => {
                StatusCode::FORBIDDEN
            }
            AppError::Supervisor(SupervisorError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Supervisor(_) | AppError::Archive(_) | AppError::Encode(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }
        (status, axum::Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotReady.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InteractiveAuthDisabled.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::from(SupervisorError::NoCredentialRequired("password")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(SupervisorError::Closed).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
