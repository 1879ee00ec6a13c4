//! Client for the external job-parse service.

use serde_json::{json, Value};

use crate::backend::{build_client, ClientSettings};
use crate::response::{process_json_response, ApiError};

/// The parse surface, a trait seam mirroring [`crate::CurationBackend`].
#[async_trait::async_trait]
pub trait JobParser: Send + Sync {
    /// Sends the free-text description (plus optional URL and extra hints)
    /// and returns the structured job details JSON.
    async fn parse_job(
        &self,
        description: &str,
        url: &str,
        extra_info: &str,
    ) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ParseClient {
    client: reqwest::Client,
    base_url: String,
}

impl ParseClient {
    pub fn new(base_url: &str, settings: &ClientSettings) -> Result<Self, ApiError> {
        let base_url = base_url
            .strip_suffix('/')
            .unwrap_or(base_url)
            .to_string();
        Ok(Self {
            client: build_client(settings)?,
            base_url,
        })
    }
}

#[async_trait::async_trait]
impl JobParser for ParseClient {
    async fn parse_job(
        &self,
        description: &str,
        url: &str,
        extra_info: &str,
    ) -> Result<Value, ApiError> {
        let entity = "job details";
        let body = json!({
            "jobDescription": description,
            "url": url,
            "extraInfo": extra_info,
        });
        let response = self
            .client
            .post(format!("{}/api/parseJob", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::network(entity, &err))?;
        let data = process_json_response(response, entity).await?;
        if let Some(message) = data.get("error").and_then(Value::as_str) {
            return Err(ApiError::Upstream(message.to_string()));
        }
        Ok(data)
    }
}
