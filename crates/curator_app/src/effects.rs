//! Bridges the pure core and the IO engine: effects become engine commands,
//! engine events become messages (or shell events for the auth boundary,
//! which bypasses the core).

use std::path::PathBuf;

use chrono::Local;
use curator_core::{
    finalize_job_details, DownloadContext, Effect, Msg, QueueStatus, RawStageOutputs,
    RequestSummary, ResumeChoice, ResumeEntry, ResumeListContext, ResumeMode,
};
use curator_engine::{
    ApiError, CuratorHandle, DownloadTarget, EngineCommand, EngineConfig, EngineEvent, ListMode,
    ListTarget, RequestRecord, ResumeRecord, ResumeSource, StageBundle,
};
use curator_logging::curator_info;

use crate::persistence::AppConfig;

/// An engine completion, routed either into the core or to the shell's auth
/// handling.
#[derive(Debug)]
pub enum ShellEvent {
    Core(Msg),
    LoginFinished { result: Result<Option<String>, String> },
    UsersFetched { result: Result<Vec<String>, String> },
}

pub struct EffectRunner {
    engine: CuratorHandle,
}

impl EffectRunner {
    /// Builds the engine from the current config. Downloads land under
    /// `./downloads`.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let download_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("downloads");
        let optional = |url: &str| {
            let url = url.trim();
            (!url.is_empty()).then(|| url.to_string())
        };
        let engine = CuratorHandle::new(EngineConfig {
            api_url: optional(&config.api_url),
            parser_url: optional(&config.parser_url),
            download_dir,
            settings: Default::default(),
        })?;
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.engine.submit(map_effect(effect));
        }
    }

    pub fn submit_login(&self, name: String, pin: String) {
        self.engine.submit(EngineCommand::Login { name, pin });
    }

    pub fn submit_fetch_users(&self) {
        self.engine.submit(EngineCommand::FetchUsers);
    }

    /// Drains completed engine events without blocking.
    pub fn poll(&self) -> Vec<ShellEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            events.push(map_event(event));
        }
        events
    }
}

fn map_effect(effect: Effect) -> EngineCommand {
    match effect {
        Effect::ParseJob {
            description,
            url,
            extra_info,
        } => {
            curator_info!("parse requested (description {} chars)", description.len());
            EngineCommand::ParseJob {
                description,
                url,
                extra_info,
            }
        }
        Effect::ListResumes {
            user_id,
            mode,
            context,
        } => EngineCommand::ListResumes {
            user_id,
            mode: map_mode(mode),
            target: match context {
                ResumeListContext::Selection => ListTarget::Selection,
                ResumeListContext::Library => ListTarget::Library,
            },
        },
        Effect::SubmitCuration {
            user_id,
            job_desc,
            resume,
        } => EngineCommand::SubmitCuration {
            user_id,
            job_desc,
            resume: match resume {
                ResumeChoice::Existing(resume_id) => ResumeSource::Existing(resume_id),
                ResumeChoice::Upload { path, file_name } => {
                    ResumeSource::Upload { path, file_name }
                }
            },
        },
        Effect::FetchRequestPage { user_id, page } => {
            EngineCommand::FetchRequestPage { user_id, page }
        }
        Effect::FetchRequestState { request_id } => {
            EngineCommand::FetchRequestState { request_id }
        }
        Effect::ApproveCuration {
            request_id,
            edited_instructions,
            custom_instructions,
        } => EngineCommand::ApproveCuration {
            request_id,
            edited_instructions,
            custom_instructions,
        },
        Effect::DownloadResume {
            resume_id,
            file_name,
            context,
        } => EngineCommand::DownloadResume {
            resume_id,
            file_name,
            target: match context {
                DownloadContext::Pipeline { request_id } => {
                    DownloadTarget::Pipeline { request_id }
                }
                DownloadContext::Library => DownloadTarget::Library,
            },
        },
        Effect::UploadResume {
            user_id,
            path,
            file_name,
            target,
        } => EngineCommand::UploadResume {
            user_id,
            path,
            file_name,
            target,
        },
        Effect::RenameResume {
            resume_id,
            new_name,
        } => EngineCommand::RenameResume {
            resume_id,
            new_name,
        },
    }
}

fn map_event(event: EngineEvent) -> ShellEvent {
    match event {
        EngineEvent::ParseFinished { source_url, result } => {
            let result = match result {
                Ok(details) => {
                    // Post-process with the shell clock's date; the core
                    // stays clock-free.
                    let today = Local::now().date_naive();
                    let details = finalize_job_details(details, &source_url, today);
                    Ok(serde_json::to_string_pretty(&details)
                        .unwrap_or_else(|_| details.to_string()))
                }
                Err(err) => Err(err.to_string()),
            };
            ShellEvent::Core(Msg::ParseFinished { result })
        }
        EngineEvent::ResumesListed {
            mode,
            target,
            result,
        } => {
            let result = result
                .map(|rows| rows.into_iter().map(map_resume).collect())
                .map_err(|err| err.to_string());
            let msg = match target {
                ListTarget::Selection => Msg::SelectionResumesLoaded { result },
                ListTarget::Library => Msg::LibraryLoaded {
                    mode: unmap_mode(mode),
                    result,
                },
            };
            ShellEvent::Core(msg)
        }
        EngineEvent::CurationProgress { note } => {
            ShellEvent::Core(Msg::SubmissionProgress(note))
        }
        EngineEvent::CurationFinished { result } => ShellEvent::Core(Msg::SubmissionFinished {
            result: result.map_err(|err| err.to_string()),
        }),
        EngineEvent::RequestPageFetched { page, result } => {
            let result = result
                .map(|rows| rows.into_iter().map(map_request).collect())
                .map_err(|err| err.to_string());
            ShellEvent::Core(Msg::RequestPageLoaded { page, result })
        }
        EngineEvent::RequestStateFetched { request_id, result } => {
            ShellEvent::Core(Msg::StageOutputsFetched {
                request_id,
                result: result.map(map_stages).map_err(|err| err.to_string()),
            })
        }
        EngineEvent::ApprovalFinished { request_id, result } => {
            ShellEvent::Core(Msg::ApprovalFinished {
                request_id,
                result: result.map_err(|err| err.to_string()),
            })
        }
        EngineEvent::DownloadFinished {
            resume_id,
            target,
            result,
        } => {
            let result = result.map(|_| ()).map_err(|err| err.to_string());
            let msg = match target {
                DownloadTarget::Pipeline { request_id } => {
                    Msg::PipelineDownloadFinished { request_id, result }
                }
                DownloadTarget::Library => Msg::LibraryDownloadFinished { resume_id, result },
            };
            ShellEvent::Core(msg)
        }
        EngineEvent::UploadFinished { result } => ShellEvent::Core(Msg::UploadFinished {
            result: result
                .map(|outcome| outcome.message)
                .map_err(|err| err.to_string()),
        }),
        EngineEvent::RenameFinished { resume_id, result } => {
            ShellEvent::Core(Msg::RenameFinished {
                resume_id,
                result: result.map_err(|err| err.to_string()),
            })
        }
        EngineEvent::LoginFinished { result } => ShellEvent::LoginFinished {
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::UsersFetched { result } => ShellEvent::UsersFetched {
            result: result.map_err(|err| err.to_string()),
        },
    }
}

fn map_mode(mode: ResumeMode) -> ListMode {
    match mode {
        ResumeMode::Default => ListMode::Default,
        ResumeMode::Curated => ListMode::Curated,
    }
}

fn unmap_mode(mode: ListMode) -> ResumeMode {
    match mode {
        ListMode::Default => ResumeMode::Default,
        ListMode::Curated => ResumeMode::Curated,
    }
}

fn map_resume(record: ResumeRecord) -> ResumeEntry {
    let analysis = record
        .resume_json
        .as_deref()
        .and_then(|text| serde_json::from_str(text).ok());
    ResumeEntry {
        resume_id: record.resume_id,
        name: record.name,
        has_analysis: record.has_json,
        analysis,
        created_on: record.created_on,
    }
}

fn map_request(record: RequestRecord) -> RequestSummary {
    RequestSummary {
        request_id: record.request_id,
        endpoint: record.endpoint,
        status: QueueStatus::from_wire(&record.status),
        resume_name: record.resume_name,
    }
}

fn map_stages(bundle: StageBundle) -> RawStageOutputs {
    RawStageOutputs {
        analysis: bundle.analysis,
        recruiter: bundle.recruiter,
        coaching: bundle.coaching,
        tailored: bundle.tailored,
    }
}
