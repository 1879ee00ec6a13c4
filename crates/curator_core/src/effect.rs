use std::path::PathBuf;

use crate::state::ResumeMode;

/// IO requested by `update`, executed by the shell's effect runner. Effects
/// carry everything the runner needs; the core never touches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the job description to the external parse service.
    ParseJob {
        description: String,
        url: String,
        extra_info: String,
    },
    /// List resumes for selection or for the library panel.
    ListResumes {
        user_id: String,
        mode: ResumeMode,
        context: ResumeListContext,
    },
    /// Upload-if-needed, then submit the curation request.
    SubmitCuration {
        user_id: String,
        /// The edited job details JSON text, validated by the core.
        job_desc: String,
        resume: ResumeChoice,
    },
    FetchRequestPage { user_id: String, page: u32 },
    FetchRequestState { request_id: String },
    ApproveCuration {
        request_id: String,
        /// Raw edited coaching JSON, omitted when the editor is empty.
        edited_instructions: Option<String>,
        /// Trimmed free-text guidance, omitted when empty.
        custom_instructions: Option<String>,
    },
    DownloadResume {
        resume_id: String,
        file_name: String,
        context: DownloadContext,
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
}

/// Which component asked for a resume list; routes the completion message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeListContext {
    Selection,
    Library,
}

/// Which component asked for a download; routes the completion message.
/// Pipeline downloads carry the request id their completion answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadContext {
    Pipeline { request_id: String },
    Library,
}

/// How the curation submission obtains its resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeChoice {
    Existing(String),
    Upload { path: PathBuf, file_name: String },
}
