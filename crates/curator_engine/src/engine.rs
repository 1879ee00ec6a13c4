use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use curator_logging::{curator_debug, curator_info, Sensitive};
use serde_json::Value;

use crate::backend::{BackendClient, ClientSettings, CurationBackend};
use crate::parser::{JobParser, ParseClient};
use crate::persist::AtomicFileWriter;
use crate::response::ApiError;
use crate::types::{EngineCommand, EngineEvent, ResumeSource};

const UPLOADING_NOTE: &str = "Uploading new resume...";
const CURATING_NOTE: &str = "Sending job and resume for curation...";

/// Everything the engine needs at construction. URLs are optional; commands
/// that need a missing service complete with a not-configured error.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub api_url: Option<String>,
    pub parser_url: Option<String>,
    pub download_dir: PathBuf,
    pub settings: ClientSettings,
}

struct Services {
    backend: Option<BackendClient>,
    parser: Option<ParseClient>,
    writer: AtomicFileWriter,
}

/// Command/event handle over a background tokio runtime. The shell submits
/// commands from its loop and pumps completions back without ever blocking.
/// Reconfiguring the backend URL means building a new handle.
pub struct CuratorHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl CuratorHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let backend = match config.api_url.as_deref() {
            Some(url) => Some(BackendClient::new(url, &config.settings)?),
            None => None,
        };
        let parser = match config.parser_url.as_deref() {
            Some(url) => Some(ParseClient::new(url, &config.settings)?),
            None => None,
        };
        let services = Arc::new(Services {
            backend,
            parser,
            writer: AtomicFileWriter::new(config.download_dir),
        });

        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let services = services.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&services, command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    services: &Services,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = run_command(services, command, &event_tx).await;
    let _ = event_tx.send(event);
}

async fn run_command(
    services: &Services,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) -> EngineEvent {
    match command {
        EngineCommand::ParseJob {
            description,
            url,
            extra_info,
        } => {
            let result = match services.parser.as_ref() {
                Some(parser) => parser.parse_job(&description, &url, &extra_info).await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::ParseFinished {
                source_url: url,
                result,
            }
        }
        EngineCommand::ListResumes {
            user_id,
            mode,
            target,
        } => {
            let result = match services.backend.as_ref() {
                Some(backend) => backend.list_resumes(&user_id, mode).await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::ResumesListed {
                mode,
                target,
                result,
            }
        }
        EngineCommand::SubmitCuration {
            user_id,
            job_desc,
            resume,
        } => {
            let result = match services.backend.as_ref() {
                Some(backend) => {
                    submit_curation(backend, &user_id, &job_desc, resume, event_tx).await
                }
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::CurationFinished { result }
        }
        EngineCommand::FetchRequestPage { user_id, page } => {
            let result = match services.backend.as_ref() {
                Some(backend) => backend.fetch_request_page(&user_id, page).await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::RequestPageFetched { page, result }
        }
        EngineCommand::FetchRequestState { request_id } => {
            let result = match services.backend.as_ref() {
                Some(backend) => backend.fetch_request_state(&request_id).await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::RequestStateFetched { request_id, result }
        }
        EngineCommand::ApproveCuration {
            request_id,
            edited_instructions,
            custom_instructions,
        } => {
            let result = match services.backend.as_ref() {
                Some(backend) => {
                    backend
                        .approve_curation(
                            &request_id,
                            edited_instructions.as_deref(),
                            custom_instructions.as_deref(),
                        )
                        .await
                }
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::ApprovalFinished { request_id, result }
        }
        EngineCommand::DownloadResume {
            resume_id,
            file_name,
            target,
        } => {
            let result = match services.backend.as_ref() {
                Some(backend) => match backend.download_resume(&resume_id).await {
                    Ok(bytes) => services
                        .writer
                        .write(&file_name, &bytes)
                        .map_err(Into::into),
                    Err(err) => Err(err.into()),
                },
                None => Err(ApiError::NotConfigured.into()),
            };
            EngineEvent::DownloadFinished {
                resume_id,
                target,
                result,
            }
        }
        EngineCommand::UploadResume {
            user_id,
            path,
            file_name,
            target,
        } => {
            let result = match services.backend.as_ref() {
                Some(backend) => {
                    backend
                        .upload_resume(&user_id, &path, &file_name, target.as_deref())
                        .await
                }
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::UploadFinished { result }
        }
        EngineCommand::RenameResume {
            resume_id,
            new_name,
        } => {
            let result = match services.backend.as_ref() {
                Some(backend) => backend.rename_resume(&resume_id, &new_name).await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::RenameFinished { resume_id, result }
        }
        EngineCommand::Login { name, pin } => {
            curator_info!("login attempt for {name} with pin {}", Sensitive(&pin));
            let result = match services.backend.as_ref() {
                Some(backend) => backend.login(&name, &pin).await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::LoginFinished { result }
        }
        EngineCommand::FetchUsers => {
            let result = match services.backend.as_ref() {
                Some(backend) => backend.fetch_users().await,
                None => Err(ApiError::NotConfigured),
            };
            EngineEvent::UsersFetched { result }
        }
    }
}

/// Upload-if-needed, then curate. Progress notes are emitted between the
/// steps so the shell can surface them.
async fn submit_curation(
    backend: &dyn CurationBackend,
    user_id: &str,
    job_desc: &str,
    resume: ResumeSource,
    event_tx: &mpsc::Sender<EngineEvent>,
) -> Result<(), ApiError> {
    let resume_id = match resume {
        ResumeSource::Existing(resume_id) => resume_id,
        ResumeSource::Upload { path, file_name } => {
            let _ = event_tx.send(EngineEvent::CurationProgress {
                note: UPLOADING_NOTE.to_string(),
            });
            let outcome = backend
                .upload_resume(user_id, &path, &file_name, None)
                .await?;
            outcome.resume_id.ok_or_else(|| {
                ApiError::Upstream(
                    "Upload succeeded but no resume id was returned.".to_string(),
                )
            })?
        }
    };

    let _ = event_tx.send(EngineEvent::CurationProgress {
        note: CURATING_NOTE.to_string(),
    });
    // The core validated the text already.
    let details: Value =
        serde_json::from_str(job_desc).map_err(|_| ApiError::MalformedJson {
            entity: "job details".to_string(),
        })?;
    backend.curate_resume(user_id, &resume_id, &details).await?;
    curator_debug!("curation queued for resume {resume_id}");
    Ok(())
}
