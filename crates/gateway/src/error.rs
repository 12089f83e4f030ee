//! HTTP error mapping
//!
//! One error type for all handlers. Ledger submission and read failures map
//! to 502 (the upstream chain is the failing party), caller mistakes to 400,
//! missing resources to 404, duplicate inserts to 409, everything else 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use landchain_ledger::LedgerError;
use landchain_mirror::MirrorError;
use serde_json::{json, Value};

pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_INPUT",
            message: message.into(),
            details: None,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let (status, code) = match &e {
            LedgerError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            LedgerError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::Read { .. } => (StatusCode::BAD_GATEWAY, "LEDGER_READ_FAILURE"),
            LedgerError::Transaction { .. } => (StatusCode::BAD_GATEWAY, "LEDGER_CALL_FAILURE"),
            LedgerError::MissingEvent { .. } => (StatusCode::BAD_GATEWAY, "LEDGER_CALL_FAILURE"),
            LedgerError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
        };
        Self {
            status,
            code,
            message: e.to_string(),
            details: None,
        }
    }
}

impl From<MirrorError> for ApiError {
    fn from(e: MirrorError) -> Self {
        // Ledger failures keep their own mapping when surfaced through the
        // mirror layer
        if let MirrorError::Ledger(inner) = e {
            return Self::from(inner);
        }
        let (status, code) = match &e {
            MirrorError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            MirrorError::UnknownTable(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_TABLE"),
            MirrorError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            MirrorError::DuplicateKey { .. } => (StatusCode::CONFLICT, "DUPLICATE_KEY"),
            MirrorError::Database(_) | MirrorError::Ledger(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
        };
        Self {
            status,
            code,
            message: e.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // `endpoint` is filled in by the stamping middleware, which knows
        // the request path
        let body = json!({
            "success": false,
            "error": {
                "message": self.message,
                "details": self.details,
                "code": self.code,
                "timestamp": Utc::now().to_rfc3339(),
                "endpoint": Value::Null,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_error_status_mapping() {
        let e = ApiError::from(MirrorError::invalid_input("role", "bad"));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from(MirrorError::not_found("transfer request", 9));
        assert_eq!(e.status, StatusCode::NOT_FOUND);

        let e = ApiError::from(MirrorError::DuplicateKey {
            table: "land_parcel_registry".into(),
            id: 1,
        });
        assert_eq!(e.status, StatusCode::CONFLICT);

        let e = ApiError::from(MirrorError::UnknownTable("users".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ledger_error_maps_to_bad_gateway() {
        let e = ApiError::from(LedgerError::read("rpc down"));
        assert_eq!(e.status, StatusCode::BAD_GATEWAY);
        assert_eq!(e.code, "LEDGER_READ_FAILURE");

        let e = ApiError::from(LedgerError::transaction("reverted"));
        assert_eq!(e.status, StatusCode::BAD_GATEWAY);
        assert_eq!(e.code, "LEDGER_CALL_FAILURE");
    }

    #[test]
    fn test_wrapped_ledger_error_keeps_gateway_status() {
        let e = ApiError::from(MirrorError::Ledger(LedgerError::transaction("boom")));
        assert_eq!(e.status, StatusCode::BAD_GATEWAY);
    }

}
