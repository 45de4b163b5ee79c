use color_eyre::{Report, Result, eyre::WrapErr};
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Non-success answer from one of the remote endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service sent its JSON error object.
    #[error("API error {status} (code {code}): {message}")]
    Remote {
        status: StatusCode,
        code: String,
        message: String,
        body: String,
    },

    #[error("HTTP {status}: {body}")]
    Unstructured { status: StatusCode, body: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Value,
    message: String,
}

impl ApiError {
    pub fn from_response(status: StatusCode, body: String) -> Self {
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => Self::Remote {
                status,
                code: match error.code {
                    Value::String(code) => code,
                    Value::Null => "unknown".into(),
                    other => other.to_string(),
                },
                message: error.message,
                body,
            },
            Err(_) => Self::Unstructured { status, body },
        }
    }

    /// Raw body of a structured error, kept for diagnostics.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Remote { body, .. } => Some(body),
            Self::Unstructured { .. } => None,
        }
    }

    /// Looks through a report's chain for an API error carrying a body.
    pub fn body_in(report: &Report) -> Option<&str> {
        report
            .chain()
            .find_map(|cause| cause.downcast_ref::<ApiError>())
            .and_then(ApiError::body)
    }
}

/// Reads a JSON response, turning any non-success status into an [`ApiError`].
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::from_response(status, text).into());
    }

    serde_json::from_str(&text).wrap_err_with(|| format!("Unexpected response body: {text}"))
}
