//! Application state: one struct per screen area, composed into [`AppState`].
//! All mutation happens in `update`; everything here is plain data plus a
//! few derived-state accessors.

use std::path::PathBuf;

use serde_json::Value;

use crate::pipeline::PipelineState;
use crate::request_list::RequestSummary;
use crate::view_model::AppViewModel;

/// User-facing notice attached to one component/action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Which resume library the backend should list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeMode {
    #[default]
    Default,
    Curated,
}

impl ResumeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeMode::Default => "default",
            ResumeMode::Curated => "curated",
        }
    }
}

/// One resume known to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeEntry {
    pub resume_id: String,
    pub name: String,
    /// Whether a stage-2-shaped analysis is available for this resume.
    pub has_analysis: bool,
    pub analysis: Option<Value>,
    /// Raw `YYYYMMDD` creation stamp; see [`format_created_on`].
    pub created_on: Option<String>,
}

/// Formats a `YYYYMMDD` stamp as `Mon DD, YYYY` for display. Invalid input
/// is omitted rather than shown broken.
pub fn format_created_on(stamp: &str) -> Option<String> {
    if stamp.len() != 8 || !stamp.is_ascii() {
        return None;
    }
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let year = &stamp[0..4];
    let month: usize = stamp[4..6].parse().ok()?;
    let day = &stamp[6..8];
    let month_name = MONTHS.get(month.checked_sub(1)?)?;
    Some(format!("{month_name} {day}, {year}"))
}

/// A file the user picked for upload, identified by path so the IO layer can
/// read it when the effect runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub path: PathBuf,
    pub file_name: String,
}

/// Job parse form plus its result text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobFormState {
    pub url: String,
    pub description: String,
    pub extra_info: String,
    pub parsing: bool,
    pub error: Option<String>,
    /// Pretty-printed, user-editable job details JSON; empty means no parse
    /// result is being shown.
    pub parsed_json: String,
}

/// Resume selection and curation submission for the current parse result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionState {
    /// Resumes offered for selection, filtered to those with an analysis.
    /// `None` until the first list response arrives.
    pub resumes: Option<Vec<ResumeEntry>>,
    pub fetch_error: Option<String>,
    pub selected_resume: Option<String>,
    pub pending_upload: Option<PendingUpload>,
    pub submitting: bool,
    pub status: Option<Notice>,
}

/// Paginated request dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestListState {
    pub rows: Vec<RequestSummary>,
    pub page: u32,
    pub has_next: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub expanded: Option<String>,
}

impl Default for RequestListState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            page: 1,
            has_next: false,
            loading: false,
            error: None,
            expanded: None,
        }
    }
}

/// In-progress rename of one library resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDraft {
    pub resume_id: String,
    pub name: String,
}

/// Resume library panel (default/curated tabs).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LibraryState {
    pub open: bool,
    pub tab: ResumeMode,
    pub rows: Vec<ResumeEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub renaming: Option<RenameDraft>,
    pub rename_in_flight: bool,
    /// Resume id with a download in flight, if any.
    pub downloading: Option<String>,
}

/// An existing resume being replaced by a new upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReuploadTarget {
    pub resume_id: String,
    pub name: String,
}

/// Upload dialog state, used both for new uploads and re-uploads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    pub open: bool,
    pub target: Option<ReuploadTarget>,
    pub file: Option<PendingUpload>,
    pub name: String,
    pub uploading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) user_id: Option<String>,
    pub(crate) backend_configured: bool,
    pub(crate) job_form: JobFormState,
    pub(crate) submission: SubmissionState,
    pub(crate) requests: RequestListState,
    /// Present while a request row is expanded; keyed by its request id.
    pub(crate) pipeline: Option<PipelineState>,
    pub(crate) library: LibraryState,
    pub(crate) upload: UploadState,
    /// Set when a curation or upload succeeds; cleared when the dashboard
    /// is opened.
    pub(crate) notify_new_request: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        crate::view_model::build_view(self)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub(crate) fn touch(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns and clears the dirty flag; the shell re-renders only when it
    /// was set.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
