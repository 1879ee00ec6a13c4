//! Curation pipeline view-model: stage outputs, derived progress and the
//! editable approval draft.
//!
//! The backend never reports an explicit pipeline stage; the presence of each
//! stage output is the sole progress signal, and everything here is derived
//! from those four fields. Monotonic progress is an assumption, not a backend
//! guarantee: should an output ever disappear, the derived state simply
//! reflows.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::request_list::TaskKind;

/// The four sequential stage outputs of the backend pipeline.
/// Wire keys are `Agent2` through `Agent5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKey {
    /// Stage 2: resume analysis.
    Analysis,
    /// Stage 3: recruiter/ATS extraction.
    Recruiter,
    /// Stage 4: per-section edit feedback.
    Coaching,
    /// Stage 5: final tailored result.
    Tailored,
}

impl StageKey {
    pub const ALL: [StageKey; 4] = [
        StageKey::Analysis,
        StageKey::Recruiter,
        StageKey::Coaching,
        StageKey::Tailored,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            StageKey::Analysis => "Agent2",
            StageKey::Recruiter => "Agent3",
            StageKey::Coaching => "Agent4",
            StageKey::Tailored => "Agent5",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StageKey::Analysis => "Resume Feedback",
            StageKey::Recruiter => "Recruiter POV",
            StageKey::Coaching => "Resume Coach",
            StageKey::Tailored => "Tailor/Darji",
        }
    }
}

/// One of the five visual pipeline markers. Approval is a gate control
/// between coaching and tailoring, never a disclosure target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Stage(StageKey),
    Approval,
}

impl Checkpoint {
    pub const TRACK: [Checkpoint; 5] = [
        Checkpoint::Stage(StageKey::Analysis),
        Checkpoint::Stage(StageKey::Recruiter),
        Checkpoint::Stage(StageKey::Coaching),
        Checkpoint::Approval,
        Checkpoint::Stage(StageKey::Tailored),
    ];

    pub fn title(self) -> &'static str {
        match self {
            Checkpoint::Stage(stage) => stage.title(),
            Checkpoint::Approval => "Approve?",
        }
    }
}

/// Stage payloads exactly as received from the backend, before decoding.
/// Each entry may be a JSON-encoded string, an already-decoded object,
/// `null`, the literal string `"None"`, or empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStageOutputs {
    pub analysis: Option<Value>,
    pub recruiter: Option<Value>,
    pub coaching: Option<Value>,
    pub tailored: Option<Value>,
}

/// Decoded stage payloads. Absent means the pipeline has not produced that
/// stage yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageOutputs {
    pub analysis: Option<Value>,
    pub recruiter: Option<Value>,
    pub coaching: Option<Value>,
    pub tailored: Option<Value>,
}

impl StageOutputs {
    pub fn decode(raw: RawStageOutputs) -> Self {
        Self {
            analysis: decode_stage_output(raw.analysis),
            recruiter: decode_stage_output(raw.recruiter),
            coaching: decode_stage_output(raw.coaching),
            tailored: decode_stage_output(raw.tailored),
        }
    }

    pub fn get(&self, key: StageKey) -> Option<&Value> {
        match key {
            StageKey::Analysis => self.analysis.as_ref(),
            StageKey::Recruiter => self.recruiter.as_ref(),
            StageKey::Coaching => self.coaching.as_ref(),
            StageKey::Tailored => self.tailored.as_ref(),
        }
    }

    /// A checkpoint is complete once its output exists; the approval gate is
    /// complete as soon as coaching output exists.
    pub fn checkpoint_complete(&self, checkpoint: Checkpoint) -> bool {
        match checkpoint {
            Checkpoint::Stage(stage) => self.get(stage).is_some(),
            Checkpoint::Approval => self.coaching.is_some(),
        }
    }
}

/// Normalizes one wire payload. `null`, `"None"` and the empty string all
/// mean absent; a string that fails to parse as JSON degrades to
/// `{"raw": <text>}` instead of erroring out the whole view.
pub fn decode_stage_output(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(text) if text.is_empty() || text == "None" => None,
        Value::String(text) => {
            Some(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text })))
        }
        other => Some(other),
    }
}

/// Ready for the human gate: coaching output present, final result not yet.
pub fn is_ready_for_approval(stages: &StageOutputs) -> bool {
    stages.coaching.is_some() && stages.tailored.is_none()
}

/// The pipeline has produced its final result.
pub fn is_approved(stages: &StageOutputs) -> bool {
    stages.tailored.is_some()
}

/// Progress over the five checkpoints, as a fixed lookup rather than a
/// count. The approval gate occupies a visual half-step: granting approval
/// moves the track from 75 to 87.5 until the final output materializes.
pub fn progress_percent(stages: &StageOutputs, approval_granted: bool) -> f32 {
    if stages.tailored.is_some() {
        100.0
    } else if approval_granted && stages.coaching.is_some() {
        87.5
    } else if stages.coaching.is_some() {
        75.0
    } else if stages.recruiter.is_some() {
        50.0
    } else if stages.analysis.is_some() {
        25.0
    } else {
        0.0
    }
}

/// Client-local, ephemeral approval payload: the user-editable copy of the
/// coaching JSON plus free-text guidance. Overwritten from the latest fetch
/// on every refresh (last-fetch-wins; a deliberate trade-off, not a bug).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApprovalDraft {
    pub edited_json: String,
    pub custom_instructions: String,
}

impl ApprovalDraft {
    /// Re-seeds the editable JSON from the freshly fetched coaching output.
    /// Custom instructions are kept; they are cleared only when the expanded
    /// request changes.
    pub fn reseed(&mut self, coaching: Option<&Value>) {
        self.edited_json = coaching
            .map(|value| {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            })
            .unwrap_or_default();
    }
}

/// Per-action pipeline faults, locally scoped and cleared by the next
/// attempt of the same action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineFault {
    #[error("The provided JSON for instructions is invalid.")]
    InvalidInstructions,
    #[error("{0}")]
    Approve(String),
    #[error("{0}")]
    Download(String),
}

/// View-model state for one expanded request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub request_id: String,
    pub task: TaskKind,
    pub stages: StageOutputs,
    pub draft: ApprovalDraft,
    /// At most one stage detail panel open at a time.
    pub disclosed: Option<StageKey>,
    pub loading: bool,
    pub approving: bool,
    pub downloading: bool,
    /// Distinct "stale but shown" marker: the last refresh failed and the
    /// displayed stage data predates it.
    pub fetch_error: Option<String>,
    pub fault: Option<PipelineFault>,
    /// Optimistic mark set when an approval round-trip succeeds, before the
    /// final output materializes server-side.
    pub approval_granted: bool,
}

impl PipelineState {
    pub fn new(request_id: String, task: TaskKind) -> Self {
        Self {
            request_id,
            task,
            stages: StageOutputs::default(),
            draft: ApprovalDraft::default(),
            disclosed: None,
            loading: true,
            approving: false,
            downloading: false,
            fetch_error: None,
            fault: None,
            approval_granted: false,
        }
    }

    pub fn ready_for_approval(&self) -> bool {
        is_ready_for_approval(&self.stages)
    }

    pub fn approved(&self) -> bool {
        is_approved(&self.stages)
    }

    pub fn progress_percent(&self) -> f32 {
        progress_percent(&self.stages, self.approval_granted)
    }

    pub fn analysis_content(&self) -> Option<AnalysisContent> {
        let value = self.stages.analysis.clone()?;
        serde_json::from_value(value).ok()
    }

    pub fn recruiter_content(&self) -> Option<RecruiterContent> {
        let value = self.stages.recruiter.clone()?;
        serde_json::from_value(value).ok()
    }

    pub fn coaching_sections(&self) -> Option<Vec<(String, SectionFeedback)>> {
        coaching_sections(self.stages.coaching.as_ref()?)
    }

    pub fn tailored_content(&self) -> Option<TailoredContent> {
        let value = self.stages.tailored.clone()?;
        serde_json::from_value(value).ok()
    }
}

/// Best-effort typed view of the analysis payload. Unknown fields are kept
/// in `extra` so nothing the backend sends is dropped from display.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct AnalysisContent {
    #[serde(default)]
    pub title_impression: Option<String>,
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub resume_style: Option<String>,
    #[serde(default)]
    pub section_analysis: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct RecruiterContent {
    #[serde(default)]
    pub recruiter: RecruiterPriorities,
    #[serde(default)]
    pub ats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct RecruiterPriorities {
    #[serde(default)]
    pub must_haves: Vec<String>,
    #[serde(default)]
    pub good_to_haves: Vec<String>,
}

/// Per-section coaching feedback.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionFeedback {
    #[serde(default)]
    pub needs_editing: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub edit_instructions: Vec<Value>,
}

impl SectionFeedback {
    pub fn instructions(&self) -> Vec<crate::instructions::EditInstruction> {
        self.edit_instructions
            .iter()
            .map(crate::instructions::EditInstruction::from_value)
            .collect()
    }
}

/// Decodes the coaching payload into ordered `(section, feedback)` pairs.
/// Returns `None` for the `{"raw": ...}` fallback shape or any section that
/// does not decode, leaving the raw text path to the caller.
pub fn coaching_sections(value: &Value) -> Option<Vec<(String, SectionFeedback)>> {
    let map = value.as_object()?;
    if map.contains_key("raw") {
        return None;
    }
    let mut sections = Vec::with_capacity(map.len());
    for (name, entry) in map {
        let feedback: SectionFeedback = serde_json::from_value(entry.clone()).ok()?;
        sections.push((name.clone(), feedback));
    }
    Some(sections)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TailoredContent {
    pub resume_id: String,
    pub file_name: String,
    #[serde(default)]
    pub resume_changes: Vec<ResumeChange>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResumeChange {
    pub section: String,
    pub replace: Replacement,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Replacement {
    pub original: String,
    pub updated: String,
}
