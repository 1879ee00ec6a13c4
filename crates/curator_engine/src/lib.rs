//! Curator engine: async IO and effect execution.
//!
//! Wire clients for the curation backend and the external parse service,
//! atomic download persistence, and [`CuratorHandle`], the command/event
//! channel pair the shell drives.
mod backend;
mod engine;
mod parser;
mod persist;
mod response;
mod types;

pub use backend::{BackendClient, ClientSettings, CurationBackend};
pub use engine::{CuratorHandle, EngineConfig};
pub use parser::{JobParser, ParseClient};
pub use persist::{ensure_download_dir, AtomicFileWriter, PersistError};
pub use response::ApiError;
pub use types::{
    DownloadError, DownloadTarget, EngineCommand, EngineEvent, ListMode, ListTarget,
    RequestRecord, ResumeRecord, ResumeSource, StageBundle, UploadOutcome,
};
