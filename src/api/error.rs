//! JSON error responses
//!
//! Every failure leaves the service as `{"error": ..., "details"?: ..., "result"?: ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::completion::GatewayError;
use crate::error::TrekPlanError;
use crate::planner::PlanError;
use crate::planner::service::join_issues;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
}

/// An error response with its status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
                result: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: Value) -> Self {
        self.body.result = Some(result);
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.body.error
    }

    /// Map a planning failure, naming the provider the way callers see it
    pub fn from_plan_error(err: PlanError, provider: &str) -> Self {
        match err {
            PlanError::Invalid(issues) => {
                Self::bad_request("Invalid trip request").with_details(join_issues(&issues))
            }
            PlanError::Gateway(err) => match err {
                GatewayError::Transport(details) | GatewayError::Decode(details) => Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{provider} API failed"),
                )
                .with_details(details),
                GatewayError::Timeout(_) => Self::new(
                    StatusCode::GATEWAY_TIMEOUT,
                    format!("{provider} API timed out"),
                )
                .with_details(err.to_string()),
                GatewayError::Status { status, body } => Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{provider} API returned status {status}"),
                )
                .with_result(body),
                GatewayError::NoContent { result } => Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("No content from {provider}"),
                )
                .with_result(result),
            },
        }
    }

    /// Map a catalog failure
    pub fn from_catalog_error(err: TrekPlanError) -> Self {
        match &err {
            TrekPlanError::Api { message } => {
                Self::new(StatusCode::BAD_GATEWAY, "Catalog unavailable").with_details(message.clone())
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.user_message())
                .with_details(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldIssue;
    use serde_json::json;
    use std::time::Duration;

    fn body_json(err: ApiError) -> Value {
        serde_json::to_value(&err.body).unwrap()
    }

    #[test]
    fn test_no_content_echoes_result() {
        let err = ApiError::from_plan_error(
            PlanError::Gateway(GatewayError::NoContent {
                result: json!({ "choices": [] }),
            }),
            "Groq",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(err),
            json!({ "error": "No content from Groq", "result": { "choices": [] } })
        );
    }

    #[test]
    fn test_transport_failure_has_details() {
        let err = ApiError::from_plan_error(
            PlanError::Gateway(GatewayError::Transport("connection refused".to_string())),
            "Groq",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(err),
            json!({ "error": "Groq API failed", "details": "connection refused" })
        );
    }

    #[test]
    fn test_timeout_is_gateway_timeout() {
        let err = ApiError::from_plan_error(
            PlanError::Gateway(GatewayError::Timeout(Duration::from_secs(60))),
            "Groq",
        );
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.message(), "Groq API timed out");
    }

    #[test]
    fn test_status_error_names_code() {
        let err = ApiError::from_plan_error(
            PlanError::Gateway(GatewayError::Status {
                status: 429,
                body: json!("slow down"),
            }),
            "Groq",
        );
        assert_eq!(err.message(), "Groq API returned status 429");
        assert_eq!(body_json(err)["result"], "slow down");
    }

    #[test]
    fn test_invalid_request_is_bad_request() {
        let issues = vec![FieldIssue {
            field: "tripDays",
            message: "is required".to_string(),
        }];
        let err = ApiError::from_plan_error(PlanError::Invalid(issues), "Groq");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(err),
            json!({ "error": "Invalid trip request", "details": "tripDays is required" })
        );
    }

    #[test]
    fn test_catalog_errors() {
        let err = ApiError::from_catalog_error(TrekPlanError::api("Catalog returned 500"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err = ApiError::from_catalog_error(TrekPlanError::cache("broken"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
