//! errors.rs
//! Error único de la API, serializado como "problem details" (RFC 9457).

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error asociado a un campo del payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation Error",
            _ => match self.status_code() {
                StatusCode::BAD_REQUEST => "Bad Request",
                StatusCode::UNAUTHORIZED => "Unauthorized",
                StatusCode::FORBIDDEN => "Forbidden",
                StatusCode::NOT_FOUND => "Not Found",
                _ => "Internal Server Error",
            },
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Validation(_) => "The submitted data failed validation.".to_string(),
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Database(e) => match classify_db_error(e) {
                DbErrorKind::Unique => "A record with these values already exists.".to_string(),
                DbErrorKind::ForeignKey => {
                    "The operation references a resource that does not exist or is still in use."
                        .to_string()
                }
                DbErrorKind::Check => "A value is outside its allowed range.".to_string(),
                DbErrorKind::NotFound => "Not found.".to_string(),
                DbErrorKind::Other => {
                    "An unexpected error occurred. Please try again later.".to_string()
                }
            },
            ApiError::Internal(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }

    /// Cuerpo problem+json; `instance` sólo se conoce cuando hay request a mano.
    pub fn problem_body(&self, instance: Option<&str>) -> serde_json::Value {
        let status = self.status_code().as_u16();
        let mut body = json!({
            "type": format!("https://httpstatuses.com/{}", status),
            "status": status,
            "title": self.title(),
            "detail": self.detail(),
        });

        if let Some(path) = instance {
            body["instance"] = json!(path);
        }
        if let ApiError::Validation(errors) = self {
            body["errors"] = json!(errors);
        }
        body
    }
}

enum DbErrorKind {
    Unique,
    ForeignKey,
    Check,
    NotFound,
    Other,
}

fn classify_db_error(err: &sqlx::Error) -> DbErrorKind {
    match err {
        sqlx::Error::RowNotFound => DbErrorKind::NotFound,
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                DbErrorKind::Unique
            } else if db_err.is_foreign_key_violation() {
                DbErrorKind::ForeignKey
            } else if db_err.is_check_violation() {
                DbErrorKind::Check
            } else {
                DbErrorKind::Other
            }
        }
        _ => DbErrorKind::Other,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(e) => match classify_db_error(e) {
                DbErrorKind::Unique | DbErrorKind::ForeignKey | DbErrorKind::Check => {
                    StatusCode::BAD_REQUEST
                }
                DbErrorKind::NotFound => StatusCode::NOT_FOUND,
                DbErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Error interno: {:?}", self);
        } else {
            log::debug!("Request rechazado ({}): {}", status, self);
        }

        HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "application/problem+json"))
            .body(self.problem_body(None).to_string())
    }
}

/// Respuesta de error que incluye la ruta del request.
fn problem_response(err: ApiError, req: &HttpRequest) -> actix_web::Error {
    let body = err.problem_body(Some(req.path()));
    let response = HttpResponse::build(err.status_code())
        .insert_header((header::CONTENT_TYPE, "application/problem+json"))
        .body(body.to_string());
    actix_web::error::InternalError::from_response(err, response).into()
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let api_err = match &err {
        JsonPayloadError::Deserialize(e) => ApiError::field("non_field_errors", e.to_string()),
        _ => ApiError::bad_request(format!("Malformed request body: {}", err)),
    };
    problem_response(api_err, req)
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    problem_response(
        ApiError::bad_request(format!("Invalid query parameters: {}", err)),
        req,
    )
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    problem_response(ApiError::not_found(format!("Not found: {}", err)), req)
}
