use std::path::PathBuf;

use crate::pipeline::{RawStageOutputs, StageKey};
use crate::request_list::RequestSummary;
use crate::state::{ResumeEntry, ResumeMode};

/// Every input the state machine reacts to: user intents plus completion
/// events pumped back from the IO layer. Completion messages that answer a
/// per-request fetch carry the request id so stale responses can be fenced
/// off in `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // Session and configuration.
    /// Whether a backend base URL is currently configured.
    BackendConfigured(bool),
    /// A user logged in; request-list and resume effects are gated on this.
    SessionStarted { user_id: String },
    /// Logout: clears job-specific state.
    SessionEnded,

    // Job parse form.
    JobUrlEdited(String),
    JobDescriptionEdited(String),
    JobExtraInfoEdited(String),
    /// Submit the form to the external parse service.
    ParseRequested,
    /// Parse finished; `Ok` carries the post-processed pretty JSON text.
    ParseFinished { result: Result<String, String> },
    /// User edited the parsed JSON directly.
    ParsedJsonEdited(String),
    /// Referral checkbox; rewrites the parsed JSON when it is valid.
    ReferralToggled(bool),

    // Resume selection and curation submission.
    SelectionResumesLoaded { result: Result<Vec<ResumeEntry>, String> },
    /// Toggle selection of an existing resume.
    ResumeSelected(String),
    /// A new file was picked for the submission flow.
    UploadCandidateChosen { path: PathBuf, file_name: String },
    UploadCandidateCleared,
    SubmitCurationRequested,
    /// Progress note from the submission effect (upload, then curate).
    SubmissionProgress(String),
    SubmissionFinished { result: Result<(), String> },

    // Request dashboard.
    /// The dashboard panel was opened; clears the new-request badge.
    DashboardOpened,
    RequestPageRequested(u32),
    RequestPageLoaded {
        page: u32,
        result: Result<Vec<RequestSummary>, String>,
    },
    /// Expand or collapse one request row.
    RequestRowToggled { request_id: String },
    /// Refresh the expanded request, or the current page if none is open.
    RefreshRequested,
    StageOutputsFetched {
        request_id: String,
        result: Result<RawStageOutputs, String>,
    },

    // Curation pipeline.
    StageDisclosureToggled(StageKey),
    ApprovalJsonEdited(String),
    CustomInstructionsEdited(String),
    ApproveRequested,
    ApprovalFinished {
        request_id: String,
        result: Result<(), String>,
    },
    DownloadRequested,
    PipelineDownloadFinished {
        request_id: String,
        result: Result<(), String>,
    },

    // Resume library.
    LibraryOpened,
    LibraryClosed,
    LibraryTabSelected(ResumeMode),
    LibraryLoaded {
        mode: ResumeMode,
        result: Result<Vec<ResumeEntry>, String>,
    },
    RenameStarted { resume_id: String },
    RenameEdited(String),
    RenameCancelled,
    RenameSubmitted,
    RenameFinished {
        resume_id: String,
        result: Result<(), String>,
    },
    LibraryDownloadRequested { resume_id: String },
    LibraryDownloadFinished {
        resume_id: String,
        result: Result<(), String>,
    },

    // Upload dialog (new upload or re-upload of an existing resume).
    UploadOpened {
        target: Option<(String, String)>,
    },
    UploadClosed,
    UploadFileChosen { path: PathBuf, file_name: String },
    UploadNameEdited(String),
    UploadSubmitted,
    UploadFinished {
        result: Result<Option<String>, String>,
    },

    /// Fallback for placeholder wiring.
    NoOp,
}
