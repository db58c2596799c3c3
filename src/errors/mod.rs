use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

pub mod config;
pub mod repository;
pub mod service;

pub use config::ConfigError;
pub use repository::RepositoryError;
pub use service::ServiceError;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    // Service-level domain errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found error: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal error: {0}")]
    Internal(String),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<DatabaseError> for AppError {
    fn from(e: DatabaseError) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::from(ServiceError::from(err))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ValidationError(msg) => AppError::Validation(msg),
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ServiceError::Forbidden(msg) => AppError::Forbidden(msg),
            ServiceError::InternalError(msg) => AppError::Internal(msg),
            ServiceError::Repository(e) => {
                error!("Repository failure: {}", e);
                AppError::Internal("A database error occurred".to_string())
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors))
    }
}

/// Flattens field, nested struct and list errors into `path: reason` pairs
pub fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join("; ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let reasons = errs
                    .iter()
                    .map(|e| e.message.clone().unwrap_or_else(|| e.code.clone()))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(format!("{}: {}", path, reasons));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_string = self.to_string();
        let (error_type, message) = error_string
            .split_once(":")
            .map(|(t, m)| (t.trim(), m.trim()))
            .unwrap_or(("Error", "An error occurred"));

        let error_message = if message.is_empty() {
            "An error occurred"
        } else {
            message
        };

        let code = self.status_code().as_u16();
        HttpResponse::build(self.status_code()).json(json!({
            "type": error_type.to_uppercase(),
            "message": error_message,
            "status_code": code,
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, message = "Amount must be at least 1"))]
        amount: i32,
    }

    #[derive(Validate)]
    struct Order {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn test_flatten_nested_errors() {
        let order = Order {
            name: String::new(),
            lines: vec![Line { amount: 2 }, Line { amount: 0 }],
        };
        let errors = order.validate().unwrap_err();
        let message = flatten_validation_errors(&errors);
        assert!(message.contains("name: Name is required"));
        assert!(message.contains("lines[1].amount: Amount must be at least 1"));
        assert!(!message.contains("lines[0]"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(ServiceError::NotFound("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn test_error_response_body() {
        let response = AppError::NotFound("Short link 'abcd' not found".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["type"], "NOT FOUND ERROR");
        assert_eq!(value["message"], "Short link 'abcd' not found");
        assert_eq!(value["status_code"], 404);
    }
}
