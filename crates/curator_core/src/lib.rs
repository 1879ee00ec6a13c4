//! Curator core: pure state machine and view-model helpers.
//!
//! The IO-free half of the client. `update(state, msg)` consumes user
//! intents and completion events, mutates [`AppState`] and returns
//! [`Effect`]s for the shell to execute. Everything displayable comes out
//! of [`AppState::view`].
mod effect;
mod filename;
mod instructions;
mod job_post;
mod msg;
mod pipeline;
mod request_list;
mod state;
mod update;
mod view_model;

pub use effect::{DownloadContext, Effect, ResumeChoice, ResumeListContext};
pub use filename::{is_docx_name, truncate_file_name, MAX_RESUME_NAME_LEN};
pub use instructions::{EditInstruction, InstructionVisitor};
pub use job_post::{
    finalize_job_details, format_post_date, move_description_last, normalize_post_date,
    EMPTY_DESCRIPTION_MSG,
};
pub use msg::Msg;
pub use pipeline::{
    coaching_sections, decode_stage_output, is_approved, is_ready_for_approval, progress_percent,
    AnalysisContent, ApprovalDraft, Checkpoint, PipelineFault, PipelineState, RawStageOutputs,
    RecruiterContent, RecruiterPriorities, Replacement, ResumeChange, SectionFeedback,
    StageKey, StageOutputs, TailoredContent,
};
pub use request_list::{
    has_next_page, QueueStatus, RequestSummary, TaskKind, PAGE_SIZE, UNCONFIGURED_MSG,
};
pub use state::{
    format_created_on, AppState, JobFormState, LibraryState, Notice, NoticeKind, PendingUpload,
    RenameDraft, RequestListState, ResumeEntry, ResumeMode, ReuploadTarget, SubmissionState,
    UploadState,
};
pub use update::update;
pub use view_model::{
    AppViewModel, CheckpointView, JobFormView, LibraryView, PipelineView, RequestListView,
    RequestRowView, SubmissionView, UploadView,
};
