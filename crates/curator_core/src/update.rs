use serde_json::Value;

use crate::effect::{DownloadContext, Effect, ResumeChoice, ResumeListContext};
use crate::filename::{is_docx_name, truncate_file_name, MAX_RESUME_NAME_LEN};
use crate::job_post::{move_description_last, EMPTY_DESCRIPTION_MSG};
use crate::msg::Msg;
use crate::pipeline::{PipelineFault, PipelineState, StageOutputs};
use crate::request_list::{has_next_page, UNCONFIGURED_MSG};
use crate::state::{
    AppState, LibraryState, Notice, PendingUpload, RenameDraft, ResumeMode, ReuploadTarget,
    SubmissionState, UploadState,
};

const INVALID_JOB_JSON_MSG: &str = "The JSON is invalid. Please correct it before processing.";
const NO_RESUME_MSG: &str = "No resume has been selected or uploaded.";
const SUBMISSION_STARTED_MSG: &str = "Starting curation process...";
const SUBMISSION_QUEUED_MSG: &str = "Success! Your request has been queued.";
const EMPTY_RESUME_NAME_MSG: &str = "Resume name cannot be empty.";
const INVALID_FILE_TYPE_MSG: &str = "Invalid file type. Please upload a .docx file.";
const MISSING_UPLOAD_FIELDS_MSG: &str = "Please provide a file and a name for the resume.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::BackendConfigured(configured) => {
            state.backend_configured = configured;
            state.touch();
            Vec::new()
        }
        Msg::SessionStarted { user_id } => {
            state.user_id = Some(user_id);
            state.touch();
            Vec::new()
        }
        Msg::SessionEnded => {
            state.user_id = None;
            state.job_form.parsed_json.clear();
            state.job_form.error = None;
            state.submission = SubmissionState::default();
            state.requests = Default::default();
            state.pipeline = None;
            state.library = LibraryState::default();
            state.upload = UploadState::default();
            state.touch();
            Vec::new()
        }

        Msg::JobUrlEdited(text) => {
            state.job_form.url = text;
            state.touch();
            Vec::new()
        }
        Msg::JobDescriptionEdited(text) => {
            state.job_form.description = text;
            state.touch();
            Vec::new()
        }
        Msg::JobExtraInfoEdited(text) => {
            state.job_form.extra_info = text;
            state.touch();
            Vec::new()
        }
        Msg::ParseRequested => {
            if state.job_form.parsing {
                return (state, Vec::new());
            }
            state.job_form.error = None;
            state.job_form.parsed_json.clear();
            state.submission.status = None;
            state.touch();
            if state.job_form.description.trim().is_empty() {
                state.job_form.error = Some(EMPTY_DESCRIPTION_MSG.to_string());
                return (state, Vec::new());
            }
            state.job_form.parsing = true;
            vec![Effect::ParseJob {
                description: state.job_form.description.clone(),
                url: state.job_form.url.clone(),
                extra_info: state.job_form.extra_info.clone(),
            }]
        }
        Msg::ParseFinished { result } => {
            state.job_form.parsing = false;
            state.touch();
            match result {
                Ok(json_text) => {
                    state.job_form.parsed_json = json_text;
                    state.submission = SubmissionState::default();
                    // Offer existing resumes for selection alongside the
                    // fresh parse result.
                    match state.user_id.clone() {
                        Some(user_id) => vec![Effect::ListResumes {
                            user_id,
                            mode: ResumeMode::Default,
                            context: ResumeListContext::Selection,
                        }],
                        None => Vec::new(),
                    }
                }
                Err(message) => {
                    state.job_form.error =
                        Some(format!("Failed to parse job details. {message}"));
                    Vec::new()
                }
            }
        }
        Msg::ParsedJsonEdited(text) => {
            state.job_form.parsed_json = text;
            state.touch();
            Vec::new()
        }
        Msg::ReferralToggled(checked) => {
            // Rewrite the edited JSON in place; unparseable text is left
            // untouched so user edits are never clobbered.
            if let Ok(Value::Object(mut map)) =
                serde_json::from_str::<Value>(&state.job_form.parsed_json)
            {
                map.insert("referral".to_string(), Value::Bool(checked));
                move_description_last(&mut map);
                if let Ok(pretty) = serde_json::to_string_pretty(&Value::Object(map)) {
                    state.job_form.parsed_json = pretty;
                    state.touch();
                }
            }
            Vec::new()
        }

        Msg::SelectionResumesLoaded { result } => {
            state.touch();
            match result {
                Ok(resumes) => {
                    state.submission.fetch_error = None;
                    state.submission.resumes =
                        Some(resumes.into_iter().filter(|r| r.has_analysis).collect());
                }
                Err(message) => state.submission.fetch_error = Some(message),
            }
            Vec::new()
        }
        Msg::ResumeSelected(resume_id) => {
            if state.submission.selected_resume.as_deref() == Some(resume_id.as_str()) {
                state.submission.selected_resume = None;
            } else {
                state.submission.selected_resume = Some(resume_id);
            }
            state.submission.pending_upload = None;
            state.touch();
            Vec::new()
        }
        Msg::UploadCandidateChosen { path, file_name } => {
            state.touch();
            if !is_docx_name(&file_name) {
                state.submission.status = Some(Notice::error(INVALID_FILE_TYPE_MSG));
                return (state, Vec::new());
            }
            state.submission.pending_upload = Some(PendingUpload { path, file_name });
            state.submission.selected_resume = None;
            state.submission.status = None;
            Vec::new()
        }
        Msg::UploadCandidateCleared => {
            state.submission.pending_upload = None;
            state.touch();
            Vec::new()
        }
        Msg::SubmitCurationRequested => {
            if state.submission.submitting {
                return (state, Vec::new());
            }
            state.touch();
            state.submission.status = Some(Notice::info(SUBMISSION_STARTED_MSG));
            if serde_json::from_str::<Value>(&state.job_form.parsed_json).is_err() {
                state.submission.status = Some(Notice::error(INVALID_JOB_JSON_MSG));
                return (state, Vec::new());
            }
            let resume = match (
                state.submission.pending_upload.clone(),
                state.submission.selected_resume.clone(),
            ) {
                (Some(upload), _) => ResumeChoice::Upload {
                    path: upload.path,
                    file_name: truncate_file_name(&upload.file_name, MAX_RESUME_NAME_LEN),
                },
                (None, Some(resume_id)) => ResumeChoice::Existing(resume_id),
                (None, None) => {
                    state.submission.status =
                        Some(Notice::error(format!("Curation Failed: {NO_RESUME_MSG}")));
                    return (state, Vec::new());
                }
            };
            let Some(user_id) = state.user_id.clone() else {
                return (state, Vec::new());
            };
            state.submission.submitting = true;
            vec![Effect::SubmitCuration {
                user_id,
                job_desc: state.job_form.parsed_json.clone(),
                resume,
            }]
        }
        Msg::SubmissionProgress(note) => {
            state.submission.status = Some(Notice::info(note));
            state.touch();
            Vec::new()
        }
        Msg::SubmissionFinished { result } => {
            state.submission.submitting = false;
            state.touch();
            match result {
                Ok(()) => {
                    state.submission.status = Some(Notice::info(SUBMISSION_QUEUED_MSG));
                    state.notify_new_request = true;
                    state.job_form.parsed_json.clear();
                    state.submission.selected_resume = None;
                    state.submission.pending_upload = None;
                }
                Err(message) => {
                    state.submission.status =
                        Some(Notice::error(format!("Curation Failed: {message}")));
                }
            }
            Vec::new()
        }

        Msg::DashboardOpened => {
            state.notify_new_request = false;
            state.touch();
            Vec::new()
        }
        Msg::RequestPageRequested(page) => request_page(&mut state, page),
        Msg::RequestPageLoaded { page, result } => {
            if !state.requests.loading {
                return (state, Vec::new());
            }
            state.requests.loading = false;
            state.touch();
            match result {
                Ok(rows) => {
                    state.requests.has_next = has_next_page(rows.len());
                    state.requests.rows = rows;
                    state.requests.page = page;
                    state.requests.error = None;
                }
                Err(message) => {
                    state.requests.error = Some(message);
                    state.requests.rows.clear();
                    state.requests.has_next = false;
                }
            }
            Vec::new()
        }
        Msg::RequestRowToggled { request_id } => {
            state.touch();
            if state.requests.expanded.as_deref() == Some(request_id.as_str()) {
                state.requests.expanded = None;
                state.pipeline = None;
                return (state, Vec::new());
            }
            let Some(row) = state
                .requests
                .rows
                .iter()
                .find(|row| row.request_id == request_id)
            else {
                return (state, Vec::new());
            };
            let task = row.task();
            state.requests.expanded = Some(request_id.clone());
            // Fresh pipeline state: switching requests clears any unsaved
            // approval edits.
            state.pipeline = Some(PipelineState::new(request_id.clone(), task));
            vec![Effect::FetchRequestState { request_id }]
        }
        Msg::RefreshRequested => match state.requests.expanded.clone() {
            Some(request_id) => {
                let Some(pipeline) = state.pipeline.as_mut() else {
                    return (state, Vec::new());
                };
                pipeline.loading = true;
                pipeline.fault = None;
                state.touch();
                vec![Effect::FetchRequestState { request_id }]
            }
            None => {
                let page = state.requests.page;
                request_page(&mut state, page)
            }
        },
        Msg::StageOutputsFetched { request_id, result } => {
            // Fencing: a response for a request that is no longer expanded
            // must never overwrite the current panel.
            let Some(pipeline) = fenced_pipeline(&mut state, &request_id) else {
                return (state, Vec::new());
            };
            pipeline.loading = false;
            match result {
                Ok(raw) => {
                    pipeline.stages = StageOutputs::decode(raw);
                    pipeline.fetch_error = None;
                    // Last-fetch-wins: the editable JSON is overwritten from
                    // the server on every refresh, custom instructions kept.
                    let coaching = pipeline.stages.coaching.clone();
                    pipeline.draft.reseed(coaching.as_ref());
                }
                Err(message) => {
                    // Keep the stale stage data visible, but mark it.
                    pipeline.fetch_error = Some(message);
                }
            }
            state.touch();
            Vec::new()
        }

        Msg::StageDisclosureToggled(stage) => {
            let Some(pipeline) = state.pipeline.as_mut() else {
                return (state, Vec::new());
            };
            if pipeline.disclosed == Some(stage) {
                pipeline.disclosed = None;
            } else if pipeline.stages.get(stage).is_some() {
                pipeline.disclosed = Some(stage);
            } else {
                // Absent output: disclosure is blocked.
                return (state, Vec::new());
            }
            state.touch();
            Vec::new()
        }
        Msg::ApprovalJsonEdited(text) => {
            if let Some(pipeline) = state.pipeline.as_mut() {
                pipeline.draft.edited_json = text;
                state.touch();
            }
            Vec::new()
        }
        Msg::CustomInstructionsEdited(text) => {
            if let Some(pipeline) = state.pipeline.as_mut() {
                pipeline.draft.custom_instructions = text;
                state.touch();
            }
            Vec::new()
        }
        Msg::ApproveRequested => {
            let Some(pipeline) = state.pipeline.as_mut() else {
                return (state, Vec::new());
            };
            if pipeline.approving || !pipeline.ready_for_approval() {
                return (state, Vec::new());
            }
            pipeline.fault = None;
            let edited = pipeline.draft.edited_json.clone();
            let edited_instructions = if edited.is_empty() {
                None
            } else {
                // Validate locally before any network call.
                if serde_json::from_str::<Value>(&edited).is_err() {
                    pipeline.fault = Some(PipelineFault::InvalidInstructions);
                    state.touch();
                    return (state, Vec::new());
                }
                Some(edited)
            };
            let custom = pipeline.draft.custom_instructions.trim();
            let custom_instructions = if custom.is_empty() {
                None
            } else {
                Some(custom.to_string())
            };
            pipeline.approving = true;
            let request_id = pipeline.request_id.clone();
            state.touch();
            vec![Effect::ApproveCuration {
                request_id,
                edited_instructions,
                custom_instructions,
            }]
        }
        Msg::ApprovalFinished { request_id, result } => {
            let Some(pipeline) = fenced_pipeline(&mut state, &request_id) else {
                return (state, Vec::new());
            };
            pipeline.approving = false;
            let effects = match result {
                Ok(()) => {
                    // The new pipeline state is authoritative only from the
                    // server; mark the gate and re-fetch instead of
                    // fabricating the final output locally.
                    pipeline.approval_granted = true;
                    pipeline.loading = true;
                    vec![Effect::FetchRequestState { request_id }]
                }
                Err(message) => {
                    pipeline.fault = Some(PipelineFault::Approve(message));
                    Vec::new()
                }
            };
            state.touch();
            effects
        }
        Msg::DownloadRequested => {
            let Some(pipeline) = state.pipeline.as_mut() else {
                return (state, Vec::new());
            };
            if pipeline.downloading {
                return (state, Vec::new());
            }
            let Some(tailored) = pipeline.tailored_content() else {
                return (state, Vec::new());
            };
            pipeline.fault = None;
            pipeline.downloading = true;
            let request_id = pipeline.request_id.clone();
            state.touch();
            vec![Effect::DownloadResume {
                resume_id: tailored.resume_id,
                file_name: tailored.file_name,
                context: DownloadContext::Pipeline { request_id },
            }]
        }
        Msg::PipelineDownloadFinished { request_id, result } => {
            let Some(pipeline) = fenced_pipeline(&mut state, &request_id) else {
                return (state, Vec::new());
            };
            pipeline.downloading = false;
            if let Err(message) = result {
                pipeline.fault = Some(PipelineFault::Download(message));
            }
            state.touch();
            Vec::new()
        }

        Msg::LibraryOpened => {
            state.library.open = true;
            state.library.tab = ResumeMode::Default;
            state.touch();
            library_reload(&mut state)
        }
        Msg::LibraryClosed => {
            state.library = LibraryState::default();
            state.touch();
            Vec::new()
        }
        Msg::LibraryTabSelected(mode) => {
            if !state.library.open || state.library.tab == mode {
                return (state, Vec::new());
            }
            state.library.tab = mode;
            // Cancel any rename when switching tabs.
            state.library.renaming = None;
            state.touch();
            library_reload(&mut state)
        }
        Msg::LibraryLoaded { mode, result } => {
            // Discard responses for a tab that is no longer active.
            if !state.library.open || state.library.tab != mode {
                return (state, Vec::new());
            }
            state.library.loading = false;
            state.touch();
            match result {
                Ok(rows) => {
                    state.library.rows = rows;
                    state.library.error = None;
                }
                Err(message) => {
                    state.library.error = Some(message);
                    state.library.rows.clear();
                }
            }
            Vec::new()
        }
        Msg::RenameStarted { resume_id } => {
            let Some(row) = state
                .library
                .rows
                .iter()
                .find(|row| row.resume_id == resume_id)
            else {
                return (state, Vec::new());
            };
            state.library.renaming = Some(RenameDraft {
                resume_id,
                name: row.name.clone(),
            });
            state.touch();
            Vec::new()
        }
        Msg::RenameEdited(text) => {
            if let Some(draft) = state.library.renaming.as_mut() {
                draft.name = text;
                state.touch();
            }
            Vec::new()
        }
        Msg::RenameCancelled => {
            state.library.renaming = None;
            state.library.error = None;
            state.touch();
            Vec::new()
        }
        Msg::RenameSubmitted => {
            if state.library.rename_in_flight {
                return (state, Vec::new());
            }
            let Some(draft) = state.library.renaming.clone() else {
                return (state, Vec::new());
            };
            state.touch();
            let name = draft.name.trim();
            if name.is_empty() {
                state.library.error = Some(EMPTY_RESUME_NAME_MSG.to_string());
                return (state, Vec::new());
            }
            let mut new_name = name.to_string();
            if !is_docx_name(&new_name) {
                new_name.push_str(".docx");
            }
            state.library.rename_in_flight = true;
            state.library.error = None;
            vec![Effect::RenameResume {
                resume_id: draft.resume_id,
                new_name,
            }]
        }
        Msg::RenameFinished { resume_id: _, result } => {
            state.library.rename_in_flight = false;
            state.touch();
            match result {
                Ok(()) => {
                    state.library.renaming = None;
                    library_reload(&mut state)
                }
                Err(message) => {
                    state.library.error = Some(message);
                    Vec::new()
                }
            }
        }
        Msg::LibraryDownloadRequested { resume_id } => {
            if state.library.downloading.is_some() {
                return (state, Vec::new());
            }
            let Some(row) = state
                .library
                .rows
                .iter()
                .find(|row| row.resume_id == resume_id)
            else {
                return (state, Vec::new());
            };
            let file_name = row.name.clone();
            state.library.downloading = Some(resume_id.clone());
            state.library.error = None;
            state.touch();
            vec![Effect::DownloadResume {
                resume_id,
                file_name,
                context: DownloadContext::Library,
            }]
        }
        Msg::LibraryDownloadFinished { resume_id, result } => {
            if state.library.downloading.as_deref() != Some(resume_id.as_str()) {
                return (state, Vec::new());
            }
            state.library.downloading = None;
            if let Err(message) = result {
                state.library.error = Some(message);
            }
            state.touch();
            Vec::new()
        }

        Msg::UploadOpened { target } => {
            let target = target.map(|(resume_id, name)| ReuploadTarget { resume_id, name });
            let name = target
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_default();
            state.upload = UploadState {
                open: true,
                target,
                name,
                ..UploadState::default()
            };
            state.touch();
            Vec::new()
        }
        Msg::UploadClosed => {
            if state.upload.uploading {
                return (state, Vec::new());
            }
            state.upload = UploadState::default();
            state.touch();
            Vec::new()
        }
        Msg::UploadFileChosen { path, file_name } => {
            if !state.upload.open {
                return (state, Vec::new());
            }
            state.touch();
            state.upload.error = None;
            state.upload.success = None;
            if !is_docx_name(&file_name) {
                state.upload.error = Some(INVALID_FILE_TYPE_MSG.to_string());
                state.upload.file = None;
                return (state, Vec::new());
            }
            // Auto-fill the name from the file on new uploads only.
            if state.upload.target.is_none() {
                state.upload.name = file_name.clone();
            }
            state.upload.file = Some(PendingUpload { path, file_name });
            Vec::new()
        }
        Msg::UploadNameEdited(text) => {
            state.upload.name = text;
            state.touch();
            Vec::new()
        }
        Msg::UploadSubmitted => {
            if state.upload.uploading {
                return (state, Vec::new());
            }
            state.touch();
            let name = state.upload.name.trim().to_string();
            let file = match state.upload.file.clone() {
                Some(file) if !name.is_empty() => file,
                _ => {
                    state.upload.error = Some(MISSING_UPLOAD_FIELDS_MSG.to_string());
                    return (state, Vec::new());
                }
            };
            let Some(user_id) = state.user_id.clone() else {
                return (state, Vec::new());
            };
            state.upload.uploading = true;
            state.upload.error = None;
            state.upload.success = None;
            vec![Effect::UploadResume {
                user_id,
                path: file.path,
                file_name: truncate_file_name(&name, MAX_RESUME_NAME_LEN),
                target: state.upload.target.as_ref().map(|t| t.resume_id.clone()),
            }]
        }
        Msg::UploadFinished { result } => {
            if !state.upload.uploading {
                return (state, Vec::new());
            }
            state.upload.uploading = false;
            state.touch();
            match result {
                Ok(message) => {
                    let fallback = if state.upload.target.is_some() {
                        "Resume updated successfully!"
                    } else {
                        "Resume uploaded successfully!"
                    };
                    state.upload.success =
                        Some(message.unwrap_or_else(|| fallback.to_string()));
                    state.notify_new_request = true;
                    if state.library.open {
                        library_reload(&mut state)
                    } else {
                        Vec::new()
                    }
                }
                Err(message) => {
                    state.upload.error = Some(message);
                    Vec::new()
                }
            }
        }

        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Loads a request page, collapsing any expanded row. Gated on backend
/// configuration and an active session.
fn request_page(state: &mut AppState, page: u32) -> Vec<Effect> {
    if state.requests.loading || page == 0 {
        return Vec::new();
    }
    state.touch();
    if !state.backend_configured {
        state.requests.error = Some(UNCONFIGURED_MSG.to_string());
        return Vec::new();
    }
    let Some(user_id) = state.user_id.clone() else {
        return Vec::new();
    };
    state.requests.loading = true;
    state.requests.error = None;
    state.requests.expanded = None;
    state.pipeline = None;
    vec![Effect::FetchRequestPage { user_id, page }]
}

/// Reloads the active library tab; no-op without a session.
fn library_reload(state: &mut AppState) -> Vec<Effect> {
    let Some(user_id) = state.user_id.clone() else {
        return Vec::new();
    };
    state.library.loading = true;
    vec![Effect::ListResumes {
        user_id,
        mode: state.library.tab,
        context: ResumeListContext::Library,
    }]
}

/// Returns the pipeline only when it still belongs to `request_id`;
/// completion messages for any other request are discarded.
fn fenced_pipeline<'a>(
    state: &'a mut AppState,
    request_id: &str,
) -> Option<&'a mut PipelineState> {
    state
        .pipeline
        .as_mut()
        .filter(|pipeline| pipeline.request_id == request_id)
}
