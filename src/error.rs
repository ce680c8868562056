use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A record with the same unique name already exists. Carries the notice shown to the user.
    #[error("duplicate: {0}")]
    Duplicate(String),
    /// Invalid input provided by the client. Carries the notice shown to the user.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Credentials did not match. Carries the notice shown to the user.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Unexpected failure outside the store.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { collection } => {
                ServiceError::NotFound(format!("no such document in `{collection}`"))
            }
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        let notice = err
            .field_errors()
            .into_values()
            .flat_map(|errors| errors.iter())
            .find_map(|error| error.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "Please check the submitted values.".to_owned());
        ServiceError::InvalidInput(notice)
    }
}

/// Branded error page to render in place of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    /// 404 page.
    NotFound,
    /// 500 page.
    Internal,
}

impl ErrorPage {
    /// HTTP status served with the page.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorPage::NotFound => StatusCode::NOT_FOUND,
            ErrorPage::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested resource or route not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Unavailable(source) => AppError::Internal(format!("{source:#}")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(_: std::fmt::Error) -> Self {
        AppError::Internal("failed to render page".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let page = match &self {
            AppError::NotFound(message) => {
                debug!(%message, "responding with not found page");
                ErrorPage::NotFound
            }
            AppError::Internal(message) => {
                error!(%message, "request failed");
                ErrorPage::Internal
            }
        };

        // The body is replaced with the branded page by the error-page middleware.
        let mut response = (page.status(), page.status().canonical_reason().unwrap_or("error"))
            .into_response();
        response.extensions_mut().insert(page);
        response
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, message = "Please enter a name."))]
        name: String,
    }

    #[test]
    fn validation_errors_become_user_notices() {
        let err = Named { name: String::new() }.validate().unwrap_err();
        match ServiceError::from(err) {
            ServiceError::InvalidInput(notice) => assert_eq!(notice, "Please enter a name."),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_documents_map_to_not_found_page() {
        let err: AppError = ServiceError::from(StorageError::NotFound { collection: "games" }).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.extensions().get::<ErrorPage>(), Some(&ErrorPage::NotFound));
    }

    #[test]
    fn other_service_errors_map_to_internal_page() {
        let err: AppError = ServiceError::Internal("boom".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.extensions().get::<ErrorPage>(), Some(&ErrorPage::Internal));
    }
}
