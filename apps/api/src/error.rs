//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Depot API                              │
//! │                                                                         │
//! │  POST /api/stock/add-sale                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: ApiResult<Json<T>>                                     │  │
//! │  │         │                                                        │  │
//! │  │  ValidationError ─────────────────────► 400 VALIDATION_ERROR     │  │
//! │  │  CoreError::ProductNotFound ──────────► 404 NOT_FOUND            │  │
//! │  │  CoreError::InsufficientStock ────────► 400 INSUFFICIENT_STOCK   │  │
//! │  │  DbError::* ──── logged, generic ─────► 500 DATABASE_ERROR       │  │
//! │  │  Missing / bad bearer token ──────────► 401 UNAUTHENTICATED      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use depot_core::{CoreError, ValidationError};
use depot_db::{DbError, LedgerError};
use serde::Serialize;

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Ball valve DN15: 15 available, 20 requested"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Sale exceeds stock on hand (400)
    InsufficientStock,

    /// Missing or invalid bearer token (401)
    Unauthenticated,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an authentication error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    /// Creates an internal error. The detail is logged, not returned.
    pub fn internal(detail: impl Into<String>) -> Self {
        tracing::error!("Internal error: {}", detail.into());
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                tracing::error!("Unique violation on {}: {}", field, value);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Busy(e) => {
                tracing::error!("Database busy: {}", e);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    "Database is busy, please retry the request",
                )
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InvoiceNotFound(id) => ApiError::not_found("Invoice", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            CoreError::InsufficientStock {
                title,
                available,
                requested,
                ..
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    title, available, requested
                ),
            ),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Core(e) => e.into(),
            LedgerError::Db(e) => e.into(),
        }
    }
}

/// Malformed JSON, wrong content type and similar body problems are the
/// caller's fault: 400, never 415/422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// A query string that does not deserialize at all, e.g. `?page=1&page=2`.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_names_product() {
        let err: ApiError = CoreError::InsufficientStock {
            product_id: "p1".to_string(),
            title: "Tee DN20".to_string(),
            available: 15,
            requested: 20,
        }
        .into();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Tee DN20"));
        assert!(err.message.contains("15 available"));
    }

    #[test]
    fn test_ledger_errors_map_through() {
        let not_found: ApiError =
            LedgerError::Core(CoreError::ProductNotFound("p9".to_string())).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let validation: ApiError = LedgerError::Core(CoreError::Validation(
            ValidationError::Required {
                field: "source".to_string(),
            },
        ))
        .into();
        assert_eq!(validation.code, ErrorCode::ValidationError);
        assert_eq!(validation.message, "source is required");
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err: ApiError = DbError::QueryFailed("no such table: stock_logs".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("stock_logs"));
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_value(ApiError::unauthenticated("nope")).unwrap();
        assert_eq!(json["code"], "UNAUTHENTICATED");
        assert_eq!(json["message"], "nope");
    }
}
