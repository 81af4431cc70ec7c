//! Error Kind
//!
//! The HTTP-facing classification of an [`AppError`](super::app_error::AppError).

use serde::Serialize;

/// One variant per status code the backend ever returns.
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Forbidden.status_code(), 403);
/// assert!(ErrorKind::ServiceUnavailable.is_server_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed input, rejected enrollment, duplicate registration
    BadRequest,
    /// Missing or unusable credentials
    Unauthorized,
    /// Authenticated, but the role or second factor says no
    Forbidden,
    NotFound,
    Conflict,
    /// Body never carries internal detail
    InternalServerError,
    /// Database pool exhausted or unreachable
    ServiceUnavailable,
}

impl ErrorKind {
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// 5xx kinds are logged at error level by whoever produces them
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phrase = match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        };
        f.write_str(phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses() {
        let expected = [
            (ErrorKind::BadRequest, 400),
            (ErrorKind::Unauthorized, 401),
            (ErrorKind::Forbidden, 403),
            (ErrorKind::NotFound, 404),
            (ErrorKind::Conflict, 409),
            (ErrorKind::InternalServerError, 500),
            (ErrorKind::ServiceUnavailable, 503),
        ];
        for (kind, status) in expected {
            assert_eq!(kind.status_code(), status, "{kind}");
            assert_eq!(kind.is_server_error(), status >= 500);
        }
    }

    #[test]
    fn test_serialized_name() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::ServiceUnavailable).unwrap(),
            "\"SERVICE_UNAVAILABLE\""
        );
        assert_eq!(ErrorKind::NotFound.to_string(), "Not Found");
    }
}
