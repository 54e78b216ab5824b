use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use disbursement_adapters::Error;
use serde_json::{json, Value};

/// Adapter error carried out of a handler
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::UnsupportedRail(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::PartnerRejected { .. }
            | Error::AuthenticationFailed(_)
            | Error::Transport(_)
            | Error::Decode { .. } => StatusCode::BAD_GATEWAY,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        let status_code = self.status_code();
        let mut error = json!({
            "code": status_code.as_u16(),
            "message": self.0.to_string(),
            "type": self.0.kind(),
        });

        if let Some(body) = self.0.partner_body() {
            // Partner bodies are usually JSON; fall back to the raw text
            let partner_response = serde_json::from_str::<Value>(body)
                .unwrap_or_else(|_| Value::String(body.to_string()));
            error["partner_response"] = partner_response;
        }

        json!({ "error": error })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }
        (status_code, Json(self.body())).into_response()
    }
}
