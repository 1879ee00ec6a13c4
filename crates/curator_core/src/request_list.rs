//! Request-list rows, status classification and paging rules.

use serde_json::Value;

/// Fixed page size for the request dashboard.
pub const PAGE_SIZE: usize = 10;

/// Error shown when the backend base URL has not been configured yet.
pub const UNCONFIGURED_MSG: &str =
    "Please configure your API URL in settings to view requests.";

/// One submitted curation/analysis request, as read from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub request_id: String,
    pub endpoint: String,
    pub status: QueueStatus,
    pub resume_name: Option<String>,
}

impl RequestSummary {
    pub fn task(&self) -> TaskKind {
        TaskKind::from_endpoint(&self.endpoint)
    }
}

/// Backend queue status. The wire value is either a label or a numeric queue
/// position; unrecognized labels are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus {
    Finished,
    Pending,
    Queued(u32),
    Other(String),
}

impl QueueStatus {
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Number(number) => match number.as_u64() {
                Some(position) => QueueStatus::Queued(position as u32),
                None => QueueStatus::Other(number.to_string()),
            },
            Value::String(label) => match label.as_str() {
                "Finished" => QueueStatus::Finished,
                "Pending" => QueueStatus::Pending,
                other => match other.parse::<u32>() {
                    Ok(position) => QueueStatus::Queued(position),
                    Err(_) => QueueStatus::Other(other.to_string()),
                },
            },
            other => QueueStatus::Other(other.to_string()),
        }
    }
}

/// What kind of work a request represents, classified from its originating
/// endpoint. Only tailoring requests drive the curation pipeline; analysis
/// requests disclose the analysis payload alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Tailoring,
    Analysis,
    Other(String),
}

impl TaskKind {
    pub fn from_endpoint(endpoint: &str) -> Self {
        if endpoint.contains("tailor") || endpoint.contains("curate") {
            TaskKind::Tailoring
        } else if endpoint.contains("parse") || endpoint.contains("upload") {
            TaskKind::Analysis
        } else {
            TaskKind::Other(endpoint.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TaskKind::Tailoring => "Resume Tailoring",
            TaskKind::Analysis => "Resume Analysis",
            TaskKind::Other(endpoint) => endpoint,
        }
    }
}

/// The next-page heuristic: a full page is assumed to have a successor.
/// A final page that is exactly full will be misreported as having one;
/// the backend exposes no total count to do better.
pub fn has_next_page(returned: usize) -> bool {
    returned == PAGE_SIZE
}
