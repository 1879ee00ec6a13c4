use std::path::PathBuf;
use std::sync::Once;

use curator_core::{
    update, AppState, Effect, Msg, NoticeKind, ResumeChoice, ResumeEntry, ResumeListContext,
    ResumeMode, EMPTY_DESCRIPTION_MSG,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(curator_logging::initialize_for_tests);
}

fn logged_in() -> AppState {
    let (state, _) = update(AppState::new(), Msg::BackendConfigured(true));
    let (state, _) = update(
        state,
        Msg::SessionStarted {
            user_id: "user-1".to_string(),
        },
    );
    state
}

fn resume(resume_id: &str, has_analysis: bool) -> ResumeEntry {
    ResumeEntry {
        resume_id: resume_id.to_string(),
        name: format!("{resume_id}.docx"),
        has_analysis,
        analysis: None,
        created_on: None,
    }
}

/// Drives the form through a successful parse with a valid JSON result.
fn parsed(state: AppState) -> AppState {
    let (state, _) = update(
        state,
        Msg::JobDescriptionEdited("We need a Rust engineer.".to_string()),
    );
    let (state, _) = update(state, Msg::ParseRequested);
    let (state, _) = update(
        state,
        Msg::ParseFinished {
            result: Ok("{\n  \"title\": \"Rust Engineer\"\n}".to_string()),
        },
    );
    state
}

#[test]
fn empty_description_is_rejected_locally() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::JobDescriptionEdited("   ".to_string()));
    let (state, effects) = update(state, Msg::ParseRequested);

    assert!(effects.is_empty());
    let form = state.view().job_form;
    assert_eq!(form.error.as_deref(), Some(EMPTY_DESCRIPTION_MSG));
    assert!(!form.parsing);
}

#[test]
fn parse_request_carries_the_whole_form() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::JobUrlEdited("https://x.example".to_string()));
    let (state, _) = update(state, Msg::JobDescriptionEdited("desc".to_string()));
    let (state, _) = update(state, Msg::JobExtraInfoEdited("remote only".to_string()));

    let (state, effects) = update(state, Msg::ParseRequested);

    assert_eq!(
        effects,
        vec![Effect::ParseJob {
            description: "desc".to_string(),
            url: "https://x.example".to_string(),
            extra_info: "remote only".to_string(),
        }]
    );
    assert!(state.view().job_form.parsing);
}

#[test]
fn parse_success_loads_resumes_for_selection() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::JobDescriptionEdited("desc".to_string()));
    let (state, _) = update(state, Msg::ParseRequested);
    let (state, effects) = update(
        state,
        Msg::ParseFinished {
            result: Ok("{}".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::ListResumes {
            user_id: "user-1".to_string(),
            mode: ResumeMode::Default,
            context: ResumeListContext::Selection,
        }]
    );
    assert!(!state.view().job_form.parsing);

    // Only resumes with an analysis are offered.
    let (state, _) = update(
        state,
        Msg::SelectionResumesLoaded {
            result: Ok(vec![resume("a", true), resume("b", false), resume("c", true)]),
        },
    );
    let offered = state.view().submission.resumes.unwrap();
    let ids: Vec<&str> = offered.iter().map(|r| r.resume_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn parse_failure_is_prefixed_and_keeps_the_form() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::JobDescriptionEdited("desc".to_string()));
    let (state, _) = update(state, Msg::ParseRequested);
    let (state, _) = update(
        state,
        Msg::ParseFinished {
            result: Err("service unavailable".to_string()),
        },
    );

    let form = state.view().job_form;
    assert_eq!(
        form.error.as_deref(),
        Some("Failed to parse job details. service unavailable")
    );
    assert_eq!(form.description, "desc");
}

#[test]
fn referral_toggle_rewrites_valid_json_only() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ReferralToggled(true));

    let parsed_json = state.view().job_form.parsed_json;
    let value: serde_json::Value = serde_json::from_str(&parsed_json).unwrap();
    assert_eq!(value["referral"], serde_json::json!(true));

    // Broken user edits are never clobbered by the checkbox.
    let (state, _) = update(state, Msg::ParsedJsonEdited("{broken".to_string()));
    let (state, _) = update(state, Msg::ReferralToggled(false));
    assert_eq!(state.view().job_form.parsed_json, "{broken");
}

#[test]
fn referral_toggle_keeps_description_last() {
    init_logging();
    let (state, _) = update(
        logged_in(),
        Msg::ParsedJsonEdited(
            "{\"description\": \"long text\", \"title\": \"T\"}".to_string(),
        ),
    );
    let (state, _) = update(state, Msg::ReferralToggled(true));

    let parsed_json = state.view().job_form.parsed_json;
    let value: serde_json::Value = serde_json::from_str(&parsed_json).unwrap();
    let last_key = value.as_object().unwrap().keys().last().unwrap().clone();
    assert_eq!(last_key, "description");
}

#[test]
fn submit_rejects_invalid_job_json() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ParsedJsonEdited("{broken".to_string()));
    let (state, effects) = update(state, Msg::SubmitCurationRequested);

    assert!(effects.is_empty());
    let status = state.view().submission.status.unwrap();
    assert_eq!(status.kind, NoticeKind::Error);
    assert_eq!(
        status.text,
        "The JSON is invalid. Please correct it before processing."
    );
}

#[test]
fn submit_requires_a_resume() {
    init_logging();
    let state = parsed(logged_in());
    let (state, effects) = update(state, Msg::SubmitCurationRequested);

    assert!(effects.is_empty());
    let status = state.view().submission.status.unwrap();
    assert_eq!(status.kind, NoticeKind::Error);
    assert_eq!(
        status.text,
        "Curation Failed: No resume has been selected or uploaded."
    );
}

#[test]
fn submit_with_selected_resume_emits_the_curation_effect() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));
    let (state, effects) = update(state, Msg::SubmitCurationRequested);

    match &effects[..] {
        [Effect::SubmitCuration {
            user_id,
            job_desc,
            resume,
        }] => {
            assert_eq!(user_id, "user-1");
            assert!(job_desc.contains("Rust Engineer"));
            assert_eq!(resume, &ResumeChoice::Existing("res-1".to_string()));
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    assert!(state.view().submission.submitting);
}

#[test]
fn submit_truncates_overlong_upload_names() {
    init_logging();
    let state = parsed(logged_in());
    let long_name = format!("{}.docx", "x".repeat(200));
    let (state, _) = update(
        state,
        Msg::UploadCandidateChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: long_name,
        },
    );
    let (_state, effects) = update(state, Msg::SubmitCurationRequested);

    match &effects[..] {
        [Effect::SubmitCuration {
            resume: ResumeChoice::Upload { file_name, .. },
            ..
        }] => {
            assert!(file_name.ends_with(".docx"));
            assert!(file_name.chars().count() <= 100 + ".docx".len());
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn non_docx_upload_candidate_is_rejected() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(
        state,
        Msg::UploadCandidateChosen {
            path: PathBuf::from("/tmp/cv.pdf"),
            file_name: "cv.pdf".to_string(),
        },
    );

    let submission = state.view().submission;
    assert!(submission.pending_upload.is_none());
    let status = submission.status.unwrap();
    assert_eq!(status.kind, NoticeKind::Error);
    assert_eq!(status.text, "Invalid file type. Please upload a .docx file.");
}

#[test]
fn selecting_a_resume_clears_the_pending_upload_and_vice_versa() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(
        state,
        Msg::UploadCandidateChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: "cv.docx".to_string(),
        },
    );
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));

    let submission = state.view().submission;
    assert!(submission.pending_upload.is_none());
    assert_eq!(submission.selected_resume.as_deref(), Some("res-1"));

    let (state, _) = update(
        state,
        Msg::UploadCandidateChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: "cv.docx".to_string(),
        },
    );
    let submission = state.view().submission;
    assert!(submission.pending_upload.is_some());
    assert_eq!(submission.selected_resume, None);
}

#[test]
fn selecting_the_same_resume_again_deselects_it() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));
    assert_eq!(state.view().submission.selected_resume, None);
}

#[test]
fn successful_submission_resets_the_form_and_sets_the_badge() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));
    let (state, _) = update(state, Msg::SubmitCurationRequested);

    let (state, _) = update(
        state,
        Msg::SubmissionProgress("Sending job and resume for curation...".to_string()),
    );
    let (state, _) = update(state, Msg::SubmissionFinished { result: Ok(()) });

    let view = state.view();
    assert!(view.notify_new_request);
    assert_eq!(view.job_form.parsed_json, "");
    let submission = view.submission;
    assert!(!submission.submitting);
    assert_eq!(submission.selected_resume, None);
    let status = submission.status.unwrap();
    assert_eq!(status.kind, NoticeKind::Info);
    assert_eq!(status.text, "Success! Your request has been queued.");
}

#[test]
fn failed_submission_keeps_the_edited_json() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));
    let (state, _) = update(state, Msg::SubmitCurationRequested);
    let (state, _) = update(
        state,
        Msg::SubmissionFinished {
            result: Err("queue rejected the request".to_string()),
        },
    );

    let view = state.view();
    assert!(!view.notify_new_request);
    assert!(view.job_form.parsed_json.contains("Rust Engineer"));
    let status = view.submission.status.unwrap();
    assert_eq!(status.kind, NoticeKind::Error);
    assert_eq!(status.text, "Curation Failed: queue rejected the request");
}

#[test]
fn logout_clears_session_scoped_state() {
    init_logging();
    let state = parsed(logged_in());
    let (state, _) = update(state, Msg::ResumeSelected("res-1".to_string()));
    let (state, _) = update(state, Msg::SessionEnded);

    let view = state.view();
    assert!(!view.logged_in);
    assert_eq!(view.job_form.parsed_json, "");
    assert!(view.submission.resumes.is_none());
    assert!(view.pipeline.is_none());
}
