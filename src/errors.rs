use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sqlx::Error as SqlxError;
use std::env::VarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("No user with this team leader email")]
    UnknownTeamLeader,

    #[error("No user with this chief email")]
    UnknownChief,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Password error: {0}")]
    PasswordError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Login error: {0}")]
    LoginError(#[from] actix_identity::error::LoginError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),
}

impl AppError {
    /// Errors that belong on the submitted form rather than on an error page.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::DuplicateEmail
                | AppError::UnknownTeamLeader
                | AppError::UnknownChief
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::DuplicateEmail
            | AppError::UnknownTeamLeader
            | AppError::UnknownChief => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PasswordError(_)
            | AppError::DatabaseError(_)
            | AppError::TemplateError(_)
            | AppError::LoginError(_)
            | AppError::ConfigError(_)
            | AppError::EnvVarError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Internal details stay in the log.
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{}", self);
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_errors_are_flagged() {
        assert!(AppError::DuplicateEmail.is_form_error());
        assert!(AppError::UnknownChief.is_form_error());
        assert!(AppError::ValidationError("x".into()).is_form_error());
        assert!(!AppError::NotFound.is_form_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::PasswordError("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
