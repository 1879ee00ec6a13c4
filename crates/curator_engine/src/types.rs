use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::persist::PersistError;
use crate::response::ApiError;

/// Which resume library a list call targets; serialized as the backend's
/// `mode` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Default,
    Curated,
}

impl ListMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ListMode::Default => "default",
            ListMode::Curated => "curated",
        }
    }
}

/// Which part of the app asked for a resume list; echoed back so the shell
/// can route the completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    Selection,
    Library,
}

/// Which part of the app asked for a download; echoed back for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    Pipeline { request_id: String },
    Library,
}

/// Resume input for a curation submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    Existing(String),
    Upload { path: PathBuf, file_name: String },
}

/// One row of `POST /user/fetch/request`. Field names follow the backend's
/// mixed casing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestRecord {
    #[serde(rename = "RequestId")]
    pub request_id: String,
    pub endpoint: String,
    /// Label or numeric queue position; left undecoded for the core.
    pub status: Value,
    #[serde(rename = "resumeName", default)]
    pub resume_name: Option<String>,
}

/// One row of `POST /resume/list`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResumeRecord {
    #[serde(rename = "ResumeId")]
    pub resume_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "HasJson", default)]
    pub has_json: bool,
    /// JSON-encoded analysis payload, when one exists.
    #[serde(rename = "ResumeJson", default)]
    pub resume_json: Option<String>,
    /// `YYYYMMDD`.
    #[serde(rename = "CreatedOn", default)]
    pub created_on: Option<String>,
}

/// The `agents` object of `POST /user/fetch/request/state`: the four stage
/// outputs, raw. Each may be a JSON-encoded string, a decoded object, `null`
/// or the literal string `"None"`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StageBundle {
    #[serde(rename = "Agent2", default)]
    pub analysis: Option<Value>,
    #[serde(rename = "Agent3", default)]
    pub recruiter: Option<Value>,
    #[serde(rename = "Agent4", default)]
    pub coaching: Option<Value>,
    #[serde(rename = "Agent5", default)]
    pub tailored: Option<Value>,
}

/// Result of `POST /resume/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadOutcome {
    pub resume_id: Option<String>,
    pub message: Option<String>,
}

/// Work submitted to the engine by the shell's effect runner.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    ParseJob {
        description: String,
        url: String,
        extra_info: String,
    },
    ListResumes {
        user_id: String,
        mode: ListMode,
        target: ListTarget,
    },
    SubmitCuration {
        user_id: String,
        /// Validated job details JSON text.
        job_desc: String,
        resume: ResumeSource,
    },
    FetchRequestPage { user_id: String, page: u32 },
    FetchRequestState { request_id: String },
    ApproveCuration {
        request_id: String,
        edited_instructions: Option<String>,
        custom_instructions: Option<String>,
    },
    DownloadResume {
        resume_id: String,
        file_name: String,
        target: DownloadTarget,
    },
    UploadResume {
        user_id: String,
        path: PathBuf,
        file_name: String,
        /// Existing resume id when re-uploading in place.
        target: Option<String>,
    },
    RenameResume {
        resume_id: String,
        new_name: String,
    },
    Login { name: String, pin: String },
    FetchUsers,
}

/// Completions pumped back to the shell, one per command (plus progress
/// notes for the multi-step submission).
#[derive(Debug)]
pub enum EngineEvent {
    ParseFinished {
        /// The source URL the command carried, echoed for link backfill.
        source_url: String,
        result: Result<Value, ApiError>,
    },
    ResumesListed {
        mode: ListMode,
        target: ListTarget,
        result: Result<Vec<ResumeRecord>, ApiError>,
    },
    CurationProgress { note: String },
    CurationFinished { result: Result<(), ApiError> },
    RequestPageFetched {
        page: u32,
        result: Result<Vec<RequestRecord>, ApiError>,
    },
    RequestStateFetched {
        request_id: String,
        result: Result<StageBundle, ApiError>,
    },
    ApprovalFinished {
        request_id: String,
        result: Result<(), ApiError>,
    },
    DownloadFinished {
        resume_id: String,
        target: DownloadTarget,
        result: Result<PathBuf, DownloadError>,
    },
    UploadFinished { result: Result<UploadOutcome, ApiError> },
    RenameFinished {
        resume_id: String,
        result: Result<(), ApiError>,
    },
    LoginFinished {
        /// `Ok(Some(user_id))` on success, `Ok(None)` when the backend
        /// rejected the credentials.
        result: Result<Option<String>, ApiError>,
    },
    UsersFetched { result: Result<Vec<String>, ApiError> },
}

/// A download fails either on the wire or while writing the file.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
