use std::sync::Arc;

use async_graphql::{Error, ErrorExtensions};
use platform_directory::DirectoryError;
use products_roster::RoleParseError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("unknown designation `{0}`")]
    UnknownRole(String),
    #[error("bad request: {0}")]
    InvalidInput(String),
    #[error("employee directory unavailable")]
    DirectoryUnavailable(Arc<DirectoryError>),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownRole(_) => "UNKNOWN_ROLE",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::DirectoryUnavailable(_) => "DIRECTORY_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<RoleParseError> for ApiError {
    fn from(value: RoleParseError) -> Self {
        match value {
            RoleParseError::Unknown(raw) => Self::UnknownRole(raw),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(value: DirectoryError) -> Self {
        // only the code reaches clients; keep the cause in the logs
        error!(error = %value, source = ?std::error::Error::source(&value), "employee directory call failed");
        Self::DirectoryUnavailable(Arc::new(value))
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        let mut err = Error::new(self.to_string());
        err = err.extend_with(|_err, e| {
            e.set("code", self.code());
        });
        if let ApiError::InvalidInput(_) | ApiError::UnknownRole(_) = self {
            err = err.extend_with(|_err, e| {
                e.set("type", "BAD_REQUEST");
            });
        }
        err
    }
}

/// Convert any error into a GraphQL error payload while hiding internals.
pub fn internal_error(err: impl Into<anyhow::Error>) -> Error {
    ApiError::internal(err.into()).extend()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn extension(err: &Error, key: &str) -> Option<Value> {
        err.extensions.as_ref().and_then(|map| map.get(key)).cloned()
    }

    #[test]
    fn internal_errors_are_masked() {
        let err = internal_error(anyhow::anyhow!("boom"));
        assert_eq!(err.message, "internal server error");
        assert_eq!(extension(&err, "code"), Some(Value::from("INTERNAL")));
    }

    #[test]
    fn unknown_roles_are_bad_requests() {
        let err = ApiError::from(RoleParseError::Unknown("Vet".into())).extend();
        assert_eq!(err.message, "unknown designation `Vet`");
        assert_eq!(extension(&err, "code"), Some(Value::from("UNKNOWN_ROLE")));
        assert_eq!(extension(&err, "type"), Some(Value::from("BAD_REQUEST")));
    }

    #[test]
    fn invalid_input_is_a_bad_request() {
        let err = ApiError::InvalidInput("missing field `viewer`".into()).extend();
        assert_eq!(err.message, "bad request: missing field `viewer`");
        assert_eq!(extension(&err, "code"), Some(Value::from("INVALID_INPUT")));
        assert_eq!(extension(&err, "type"), Some(Value::from("BAD_REQUEST")));
    }

    #[test]
    fn directory_failures_hide_their_cause() {
        let err = ApiError::from(DirectoryError::Status(503));
        assert_eq!(err.code(), "DIRECTORY_UNAVAILABLE");
        assert_eq!(err.extend().message, "employee directory unavailable");
    }
}
