//! Read-only projection of [`AppState`] for a rendering layer. Everything
//! derived (progress, readiness, checkpoint completion) is recomputed here
//! from the stage outputs, never stored.

use serde_json::Value;

use crate::pipeline::{Checkpoint, StageKey};
use crate::request_list::{QueueStatus, TaskKind};
use crate::state::{AppState, Notice, PendingUpload, ResumeEntry, ResumeMode};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub logged_in: bool,
    pub notify_new_request: bool,
    pub job_form: JobFormView,
    pub submission: SubmissionView,
    pub requests: RequestListView,
    /// Present while a request row is expanded.
    pub pipeline: Option<PipelineView>,
    pub library: LibraryView,
    pub upload: UploadView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobFormView {
    pub url: String,
    pub description: String,
    pub extra_info: String,
    pub parsing: bool,
    pub error: Option<String>,
    pub parsed_json: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionView {
    pub resumes: Option<Vec<ResumeEntry>>,
    pub fetch_error: Option<String>,
    pub selected_resume: Option<String>,
    pub pending_upload: Option<PendingUpload>,
    pub submitting: bool,
    pub status: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestListView {
    pub rows: Vec<RequestRowView>,
    pub page: u32,
    pub has_next: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub expanded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRowView {
    pub request_id: String,
    pub task: TaskKind,
    pub status: QueueStatus,
    pub resume_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineView {
    pub request_id: String,
    pub task: TaskKind,
    pub loading: bool,
    /// The five markers in track order.
    pub checkpoints: Vec<CheckpointView>,
    pub progress_percent: f32,
    pub ready_for_approval: bool,
    pub approved: bool,
    pub disclosed: Option<StageKey>,
    /// Decoded payload of the disclosed stage, if any.
    pub disclosed_payload: Option<Value>,
    pub edited_json: String,
    pub custom_instructions: String,
    pub approving: bool,
    pub downloading: bool,
    pub download_available: bool,
    /// Set when the last refresh failed and the shown data is stale.
    pub fetch_error: Option<String>,
    pub fault: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointView {
    pub checkpoint: Checkpoint,
    pub title: &'static str,
    pub complete: bool,
    /// Whether the detail panel may be opened. Always false for the
    /// approval gate.
    pub disclosable: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LibraryView {
    pub open: bool,
    pub tab: ResumeMode,
    pub rows: Vec<ResumeEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub renaming: Option<(String, String)>,
    pub rename_in_flight: bool,
    pub downloading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub open: bool,
    pub update_mode: bool,
    pub file_name: Option<String>,
    pub name: String,
    pub uploading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

pub(crate) fn build_view(state: &AppState) -> AppViewModel {
    AppViewModel {
        logged_in: state.user_id.is_some(),
        notify_new_request: state.notify_new_request,
        job_form: JobFormView {
            url: state.job_form.url.clone(),
            description: state.job_form.description.clone(),
            extra_info: state.job_form.extra_info.clone(),
            parsing: state.job_form.parsing,
            error: state.job_form.error.clone(),
            parsed_json: state.job_form.parsed_json.clone(),
        },
        submission: SubmissionView {
            resumes: state.submission.resumes.clone(),
            fetch_error: state.submission.fetch_error.clone(),
            selected_resume: state.submission.selected_resume.clone(),
            pending_upload: state.submission.pending_upload.clone(),
            submitting: state.submission.submitting,
            status: state.submission.status.clone(),
        },
        requests: RequestListView {
            rows: state
                .requests
                .rows
                .iter()
                .map(|row| RequestRowView {
                    request_id: row.request_id.clone(),
                    task: row.task(),
                    status: row.status.clone(),
                    resume_name: row.resume_name.clone(),
                })
                .collect(),
            page: state.requests.page,
            has_next: state.requests.has_next,
            loading: state.requests.loading,
            error: state.requests.error.clone(),
            expanded: state.requests.expanded.clone(),
        },
        pipeline: state.pipeline.as_ref().map(|pipeline| PipelineView {
            request_id: pipeline.request_id.clone(),
            task: pipeline.task.clone(),
            loading: pipeline.loading,
            checkpoints: Checkpoint::TRACK
                .iter()
                .map(|&checkpoint| CheckpointView {
                    checkpoint,
                    title: checkpoint.title(),
                    complete: pipeline.stages.checkpoint_complete(checkpoint),
                    disclosable: match checkpoint {
                        Checkpoint::Stage(stage) => pipeline.stages.get(stage).is_some(),
                        Checkpoint::Approval => false,
                    },
                })
                .collect(),
            progress_percent: pipeline.progress_percent(),
            ready_for_approval: pipeline.ready_for_approval(),
            approved: pipeline.approved(),
            disclosed: pipeline.disclosed,
            disclosed_payload: pipeline
                .disclosed
                .and_then(|stage| pipeline.stages.get(stage).cloned()),
            edited_json: pipeline.draft.edited_json.clone(),
            custom_instructions: pipeline.draft.custom_instructions.clone(),
            approving: pipeline.approving,
            downloading: pipeline.downloading,
            download_available: pipeline.tailored_content().is_some(),
            fetch_error: pipeline.fetch_error.clone(),
            fault: pipeline.fault.as_ref().map(|fault| fault.to_string()),
        }),
        library: LibraryView {
            open: state.library.open,
            tab: state.library.tab,
            rows: state.library.rows.clone(),
            loading: state.library.loading,
            error: state.library.error.clone(),
            renaming: state
                .library
                .renaming
                .as_ref()
                .map(|draft| (draft.resume_id.clone(), draft.name.clone())),
            rename_in_flight: state.library.rename_in_flight,
            downloading: state.library.downloading.clone(),
        },
        upload: UploadView {
            open: state.upload.open,
            update_mode: state.upload.target.is_some(),
            file_name: state.upload.file.as_ref().map(|f| f.file_name.clone()),
            name: state.upload.name.clone(),
            uploading: state.upload.uploading,
            error: state.upload.error.clone(),
            success: state.upload.success.clone(),
        },
        dirty: state.is_dirty(),
    }
}
