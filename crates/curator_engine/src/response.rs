//! Shared response handling for the REST backend and the parse service.

use curator_logging::curator_warn;
use serde_json::{json, Value};
use thiserror::Error;

/// Wire-level failure taxonomy. Display text is user-facing; upstream
/// messages pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Failed to fetch {entity} due to a network error: {message}")]
    Network { entity: String, message: String },
    #[error("Failed to fetch {entity}. Status: {status}. Body: {body}")]
    Status {
        entity: String,
        status: u16,
        body: String,
    },
    #[error("Failed to parse JSON response for {entity}. The server returned an HTML page instead of JSON. This is often caused by a proxy or tunnel service like ngrok.")]
    HtmlBody { entity: String },
    #[error("Failed to parse JSON response for {entity}.")]
    MalformedJson { entity: String },
    /// `{success: false, error}` from the backend, passed through verbatim.
    #[error("{0}")]
    Upstream(String),
    #[error("Could not read {path}: {message}")]
    File { path: String, message: String },
    #[error("No API URL is configured.")]
    NotConfigured,
}

impl ApiError {
    pub(crate) fn network(entity: &str, err: &reqwest::Error) -> Self {
        ApiError::Network {
            entity: entity.to_string(),
            message: err.to_string(),
        }
    }
}

/// Decodes one backend response: non-2xx carries the body text, an empty
/// body counts as an empty object, an HTML doctype means a misconfigured
/// proxy/tunnel, anything else must be JSON.
pub(crate) async fn process_json_response(
    response: reqwest::Response,
    entity: &str,
) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| ApiError::network(entity, &err))?;

    if !status.is_success() {
        let body = if text.is_empty() {
            "Could not retrieve error details.".to_string()
        } else {
            text
        };
        return Err(ApiError::Status {
            entity: entity.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    if text.is_empty() {
        curator_warn!("received empty response for {entity}");
        return Ok(json!({}));
    }

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) if text.trim().to_lowercase().starts_with("<!doctype html>") => {
            Err(ApiError::HtmlBody {
                entity: entity.to_string(),
            })
        }
        Err(_) => Err(ApiError::MalformedJson {
            entity: entity.to_string(),
        }),
    }
}

/// Enforces the `{success: bool, error?}` envelope. A missing `success`
/// field counts as success; `false` surfaces the upstream error text.
pub(crate) fn expect_success(value: &Value, fallback: &str) -> Result<(), ApiError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(fallback);
        return Err(ApiError::Upstream(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_accepts_missing_flag() {
        assert!(expect_success(&json!({"requests": []}), "fallback").is_ok());
        assert!(expect_success(&json!({"success": true}), "fallback").is_ok());
    }

    #[test]
    fn success_envelope_surfaces_upstream_error() {
        let err = expect_success(&json!({"success": false, "error": "no such user"}), "fallback")
            .unwrap_err();
        assert_eq!(err.to_string(), "no such user");

        let err = expect_success(&json!({"success": false}), "fallback").unwrap_err();
        assert_eq!(err.to_string(), "fallback");
    }
}
