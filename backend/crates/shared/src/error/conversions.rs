//! Conversions into and out of [`AppError`]
//!
//! `sqlx::Error -> AppError` behind the `sqlx` feature, the JSON error body
//! behind the `axum` feature.

#[allow(unused_imports)]
use super::app_error::AppError;

/// Classify a database failure. Backend-neutral: constraint classes are read
/// through sqlx's `DatabaseError` helpers, so Postgres and SQLite agree.
#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let app_error = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("record not found"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::service_unavailable("database unavailable")
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("duplicate value")
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::conflict("referenced record missing")
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                AppError::bad_request("value rejected by constraint")
            }
            _ => AppError::internal("database error"),
        };
        app_error.with_source(err)
    }
}

/// `{"error": message, "status": code}` plus `"action"` when set
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = serde_json::json!({
            "error": self.message(),
            "status": self.status_code(),
        });
        if let Some(action) = self.action() {
            body["action"] = serde_json::Value::from(action);
        }

        (status, Json(body)).into_response()
    }
}
