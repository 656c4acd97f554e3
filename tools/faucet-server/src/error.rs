use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faucet_attestor::{ChainError, ClaimError};
use faucet_claim_types::{IdentityError, RecordError};
use serde::Serialize;
use tracing::error;

/// Everything a handler can fail with. Rendered as `{success: false, error, ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Claim(#[from] ClaimError),
    #[error("invalid or missing admin secret")]
    Unauthorized,
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Claim(ClaimError::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Claim(ClaimError::InvalidInput(_) | ClaimError::NotEligible { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Claim(
                ClaimError::UpstreamUnavailable(_) | ClaimError::ServerMisconfiguration(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::Claim(err.into())
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::Claim(err.into())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError::invalid(err.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds_until_claim: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, seconds_until_claim) = match &self {
            ApiError::Claim(ClaimError::NotEligible { seconds_until_claim }) => {
                ("Cannot claim yet".to_string(), Some(*seconds_until_claim))
            }
            ApiError::Claim(ClaimError::UpstreamUnavailable(detail)) => {
                error!(error = %detail, "upstream failure");
                ("Upstream service unavailable".to_string(), None)
            }
            ApiError::Claim(ClaimError::ServerMisconfiguration(detail)) => {
                error!(error = %detail, "server misconfiguration");
                ("Server configuration error".to_string(), None)
            }
            other => (other.to_string(), None),
        };
        let body = ErrorBody {
            success: false,
            error: message,
            seconds_until_claim,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            ApiError::invalid("bad address").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ClaimError::NotEligible {
                seconds_until_claim: 5
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ChainError::Rpc {
                code: -32000,
                message: "reverted".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(RecordError::ReadOnly).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_eligible_body_carries_the_countdown() {
        let body = ErrorBody {
            success: false,
            error: "Cannot claim yet".into(),
            seconds_until_claim: Some(100),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"success": false, "error": "Cannot claim yet", "secondsUntilClaim": 100})
        );
    }
}
