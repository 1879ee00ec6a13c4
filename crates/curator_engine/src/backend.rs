//! REST client for the curation backend.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use curator_logging::{curator_debug, curator_info};
use futures_util::StreamExt;
use serde_json::{json, Value};

use crate::response::{expect_success, process_json_response, ApiError};
use crate::types::{ListMode, RequestRecord, ResumeRecord, StageBundle, UploadOutcome};

/// Fixed dashboard page size; must match the core's paging heuristic.
const PAGE_ENTRIES: u32 = 10;

/// Sent on every request so ngrok tunnel deployments return JSON instead of
/// an interstitial page.
const TUNNEL_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

/// Transport timeouts; explicit configuration, not reqwest defaults.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub(crate) fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, ApiError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        TUNNEL_SKIP_HEADER,
        reqwest::header::HeaderValue::from_static("true"),
    );
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .default_headers(headers)
        .build()
        .map_err(|err| ApiError::Network {
            entity: "client".to_string(),
            message: err.to_string(),
        })
}

/// The backend surface the engine drives. A trait seam so tests can swap in
/// a double without a server; [`BackendClient`] is the reqwest
/// implementation.
#[async_trait::async_trait]
pub trait CurationBackend: Send + Sync {
    async fn fetch_request_page(
        &self,
        user_id: &str,
        page: u32,
    ) -> Result<Vec<RequestRecord>, ApiError>;
    async fn fetch_request_state(&self, request_id: &str) -> Result<StageBundle, ApiError>;
    async fn approve_curation(
        &self,
        request_id: &str,
        edited_instructions: Option<&str>,
        custom_instructions: Option<&str>,
    ) -> Result<(), ApiError>;
    async fn curate_resume(
        &self,
        user_id: &str,
        resume_id: &str,
        job_desc: &Value,
    ) -> Result<(), ApiError>;
    async fn upload_resume(
        &self,
        user_id: &str,
        path: &Path,
        file_name: &str,
        target: Option<&str>,
    ) -> Result<UploadOutcome, ApiError>;
    async fn list_resumes(
        &self,
        user_id: &str,
        mode: ListMode,
    ) -> Result<Vec<ResumeRecord>, ApiError>;
    async fn rename_resume(&self, resume_id: &str, new_name: &str) -> Result<(), ApiError>;
    async fn download_resume(&self, resume_id: &str) -> Result<Bytes, ApiError>;
    async fn login(&self, name: &str, pin: &str) -> Result<Option<String>, ApiError>;
    async fn fetch_users(&self) -> Result<Vec<String>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Builds a client for `base_url`; one trailing slash is stripped so
    /// path joins are uniform.
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

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json(&self, path: &str, body: &Value, entity: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::network(entity, &err))?;
        process_json_response(response, entity).await
    }

    async fn post_form(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        entity: &str,
    ) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .multipart(form)
            .send()
            .await
            .map_err(|err| ApiError::network(entity, &err))?;
        process_json_response(response, entity).await
    }
}

#[async_trait::async_trait]
impl CurationBackend for BackendClient {
    async fn fetch_request_page(
        &self,
        user_id: &str,
        page: u32,
    ) -> Result<Vec<RequestRecord>, ApiError> {
        let entity = "user requests";
        let body = json!({
            "user_id": user_id,
            "page_num": page,
            "n": PAGE_ENTRIES,
        });
        let data = self.post_json("/user/fetch/request", &body, entity).await?;
        let rows = match data.get("requests") {
            Some(rows) => serde_json::from_value(rows.clone()).map_err(|_| {
                ApiError::MalformedJson {
                    entity: entity.to_string(),
                }
            })?,
            None => Vec::new(),
        };
        Ok(rows)
    }

    async fn fetch_request_state(&self, request_id: &str) -> Result<StageBundle, ApiError> {
        let entity = format!("request state for {request_id}");
        let body = json!({ "request_id": request_id });
        let data = self
            .post_json("/user/fetch/request/state", &body, &entity)
            .await?;
        expect_success(&data, "Failed to fetch request state details")?;
        let bundle = match data.get("agents") {
            Some(agents) => serde_json::from_value(agents.clone()).map_err(|_| {
                ApiError::MalformedJson { entity }
            })?,
            None => StageBundle::default(),
        };
        Ok(bundle)
    }

    async fn approve_curation(
        &self,
        request_id: &str,
        edited_instructions: Option<&str>,
        custom_instructions: Option<&str>,
    ) -> Result<(), ApiError> {
        let entity = format!("curation approval for {request_id}");
        let mut body = json!({ "request_id": request_id });
        if let Some(edited) = edited_instructions {
            body["edited_instructions"] = Value::String(edited.to_string());
        }
        if let Some(custom) = custom_instructions {
            body["custom_instructions"] = Value::String(custom.to_string());
        }
        let data = self
            .post_json("/resume/curate/approve", &body, &entity)
            .await?;
        expect_success(&data, "The approval request was rejected.")?;
        curator_info!("approval accepted for request {request_id}");
        Ok(())
    }

    async fn curate_resume(
        &self,
        user_id: &str,
        resume_id: &str,
        job_desc: &Value,
    ) -> Result<(), ApiError> {
        let entity = "curate resume request";
        let body = json!({
            "user_id": user_id,
            "resume_id": resume_id,
            "job_desc": job_desc,
        });
        let data = self.post_json("/resume/curate", &body, entity).await?;
        expect_success(&data, "The curation request was rejected.")?;
        Ok(())
    }

    async fn upload_resume(
        &self,
        user_id: &str,
        path: &Path,
        file_name: &str,
        target: Option<&str>,
    ) -> Result<UploadOutcome, ApiError> {
        let entity = "resume upload";
        let contents = std::fs::read(path).map_err(|err| ApiError::File {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new()
            .text("user_id", user_id.to_string())
            .part("file", part)
            .text("file_name", file_name.to_string());
        if let Some(resume_id) = target {
            form = form.text("ResumeId", resume_id.to_string());
        }
        let data = self.post_form("/resume/upload", form, entity).await?;
        expect_success(&data, "The upload was rejected.")?;
        Ok(UploadOutcome {
            resume_id: data
                .get("resume_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            message: data
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    async fn list_resumes(
        &self,
        user_id: &str,
        mode: ListMode,
    ) -> Result<Vec<ResumeRecord>, ApiError> {
        let entity = format!("{} resumes", mode.as_str());
        let form = reqwest::multipart::Form::new()
            .text("user_id", user_id.to_string())
            .text("mode", mode.as_str());
        let data = self.post_form("/resume/list", form, &entity).await?;
        let rows = match data.get("resumes") {
            Some(rows) => serde_json::from_value(rows.clone()).map_err(|_| {
                ApiError::MalformedJson { entity }
            })?,
            None => Vec::new(),
        };
        Ok(rows)
    }

    async fn rename_resume(&self, resume_id: &str, new_name: &str) -> Result<(), ApiError> {
        let entity = "resume rename";
        let form = reqwest::multipart::Form::new()
            .text("ResumeId", resume_id.to_string())
            .text("new_name", new_name.to_string());
        let data = self.post_form("/resume/rename", form, entity).await?;
        expect_success(&data, "The rename was rejected.")?;
        Ok(())
    }

    async fn download_resume(&self, resume_id: &str) -> Result<Bytes, ApiError> {
        let entity = format!("resume download for {resume_id}");
        let response = self
            .client
            .get(self.endpoint("/resume/download"))
            .query(&[("ResumeId", resume_id)])
            .send()
            .await
            .map_err(|err| ApiError::network(&entity, &err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Error bodies are JSON when the backend produced them itself.
            if let Ok(value) = serde_json::from_str::<Value>(&body) {
                if let Some(message) = value.get("error").and_then(Value::as_str) {
                    return Err(ApiError::Upstream(message.to_string()));
                }
            }
            return Err(ApiError::Status {
                entity,
                status: status.as_u16(),
                body,
            });
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| ApiError::network(&entity, &err))?;
            bytes.extend_from_slice(&chunk);
        }
        curator_debug!("downloaded {} bytes for resume {resume_id}", bytes.len());
        Ok(Bytes::from(bytes))
    }

    async fn login(&self, name: &str, pin: &str) -> Result<Option<String>, ApiError> {
        let entity = "login";
        let form = reqwest::multipart::Form::new()
            .text("Name", name.to_string())
            .text("Pin", pin.to_string());
        let data = self.post_form("/login", form, entity).await?;
        if data.get("success").and_then(Value::as_bool) != Some(true) {
            return Ok(None);
        }
        Ok(data.get("Id").and_then(Value::as_str).map(str::to_string))
    }

    async fn fetch_users(&self) -> Result<Vec<String>, ApiError> {
        let entity = "users";
        let response = self
            .client
            .get(self.endpoint("/users"))
            .send()
            .await
            .map_err(|err| ApiError::network(entity, &err))?;
        let data = process_json_response(response, entity).await?;
        let users = match data.get("users") {
            Some(users) => serde_json::from_value(users.clone()).map_err(|_| {
                ApiError::MalformedJson {
                    entity: entity.to_string(),
                }
            })?,
            None => Vec::new(),
        };
        Ok(users)
    }
}
