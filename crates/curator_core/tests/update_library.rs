use std::path::PathBuf;
use std::sync::Once;

use curator_core::{
    update, AppState, DownloadContext, Effect, Msg, ResumeEntry, ResumeMode,
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

fn resume(resume_id: &str, name: &str) -> ResumeEntry {
    ResumeEntry {
        resume_id: resume_id.to_string(),
        name: name.to_string(),
        has_analysis: true,
        analysis: None,
        created_on: Some("20250314".to_string()),
    }
}

fn open_library(state: AppState) -> AppState {
    let (state, effects) = update(state, Msg::LibraryOpened);
    assert_eq!(effects.len(), 1);
    let (state, _) = update(
        state,
        Msg::LibraryLoaded {
            mode: ResumeMode::Default,
            result: Ok(vec![resume("res-1", "old.docx"), resume("res-2", "cv.docx")]),
        },
    );
    state
}

#[test]
fn opening_the_library_loads_the_default_tab() {
    init_logging();
    let (state, effects) = update(logged_in(), Msg::LibraryOpened);

    match &effects[..] {
        [Effect::ListResumes { mode, .. }] => assert_eq!(*mode, ResumeMode::Default),
        other => panic!("unexpected effects: {other:?}"),
    }
    let library = state.view().library;
    assert!(library.open);
    assert!(library.loading);
}

#[test]
fn tab_switch_reloads_and_discards_stale_responses() {
    init_logging();
    let state = open_library(logged_in());
    let (state, effects) = update(state, Msg::LibraryTabSelected(ResumeMode::Curated));
    match &effects[..] {
        [Effect::ListResumes { mode, .. }] => assert_eq!(*mode, ResumeMode::Curated),
        other => panic!("unexpected effects: {other:?}"),
    }

    // A late response for the previous tab must not land in the new one.
    let (state, _) = update(
        state,
        Msg::LibraryLoaded {
            mode: ResumeMode::Default,
            result: Ok(vec![resume("stale", "stale.docx")]),
        },
    );
    let library = state.view().library;
    assert!(library.loading);
    assert!(!library.rows.iter().any(|r| r.resume_id == "stale"));
}

#[test]
fn rename_appends_docx_and_rejects_empty_names() {
    init_logging();
    let state = open_library(logged_in());
    let (state, _) = update(
        state,
        Msg::RenameStarted {
            resume_id: "res-1".to_string(),
        },
    );
    // The draft starts from the current name.
    assert_eq!(
        state.view().library.renaming,
        Some(("res-1".to_string(), "old.docx".to_string()))
    );

    let (state, _) = update(state, Msg::RenameEdited("   ".to_string()));
    let (state, effects) = update(state, Msg::RenameSubmitted);
    assert!(effects.is_empty());
    assert_eq!(
        state.view().library.error.as_deref(),
        Some("Resume name cannot be empty.")
    );

    let (state, _) = update(state, Msg::RenameEdited("new name".to_string()));
    let (state, effects) = update(state, Msg::RenameSubmitted);
    assert_eq!(
        effects,
        vec![Effect::RenameResume {
            resume_id: "res-1".to_string(),
            new_name: "new name.docx".to_string(),
        }]
    );
    assert!(state.view().library.rename_in_flight);
}

#[test]
fn rename_success_closes_the_draft_and_reloads() {
    init_logging();
    let state = open_library(logged_in());
    let (state, _) = update(
        state,
        Msg::RenameStarted {
            resume_id: "res-1".to_string(),
        },
    );
    let (state, _) = update(state, Msg::RenameEdited("better.docx".to_string()));
    let (state, _) = update(state, Msg::RenameSubmitted);

    let (state, effects) = update(
        state,
        Msg::RenameFinished {
            resume_id: "res-1".to_string(),
            result: Ok(()),
        },
    );
    assert_eq!(effects.len(), 1);
    let library = state.view().library;
    assert_eq!(library.renaming, None);
    assert!(!library.rename_in_flight);
}

#[test]
fn rename_failure_keeps_the_draft_open() {
    init_logging();
    let state = open_library(logged_in());
    let (state, _) = update(
        state,
        Msg::RenameStarted {
            resume_id: "res-1".to_string(),
        },
    );
    let (state, _) = update(state, Msg::RenameEdited("better.docx".to_string()));
    let (state, _) = update(state, Msg::RenameSubmitted);

    let (state, effects) = update(
        state,
        Msg::RenameFinished {
            resume_id: "res-1".to_string(),
            result: Err("name already taken".to_string()),
        },
    );
    assert!(effects.is_empty());
    let library = state.view().library;
    assert!(library.renaming.is_some());
    assert_eq!(library.error.as_deref(), Some("name already taken"));
}

#[test]
fn library_download_is_tracked_per_resume() {
    init_logging();
    let state = open_library(logged_in());
    let (state, effects) = update(
        state,
        Msg::LibraryDownloadRequested {
            resume_id: "res-2".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadResume {
            resume_id: "res-2".to_string(),
            file_name: "cv.docx".to_string(),
            context: DownloadContext::Library,
        }]
    );
    assert_eq!(state.view().library.downloading.as_deref(), Some("res-2"));

    // A second download is blocked while one is in flight.
    let (state, effects) = update(
        state,
        Msg::LibraryDownloadRequested {
            resume_id: "res-1".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::LibraryDownloadFinished {
            resume_id: "res-2".to_string(),
            result: Ok(()),
        },
    );
    assert_eq!(state.view().library.downloading, None);
}

#[test]
fn upload_dialog_validates_file_and_name() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::UploadOpened { target: None });

    let (state, effects) = update(state, Msg::UploadSubmitted);
    assert!(effects.is_empty());
    assert_eq!(
        state.view().upload.error.as_deref(),
        Some("Please provide a file and a name for the resume.")
    );

    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/cv.pdf"),
            file_name: "cv.pdf".to_string(),
        },
    );
    let upload = state.view().upload;
    assert_eq!(
        upload.error.as_deref(),
        Some("Invalid file type. Please upload a .docx file.")
    );
    assert!(upload.file_name.is_none());
}

#[test]
fn upload_autofills_the_name_for_new_uploads_only() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::UploadOpened { target: None });
    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: "cv.docx".to_string(),
        },
    );
    assert_eq!(state.view().upload.name, "cv.docx");

    // Re-upload of an existing resume keeps that resume's name.
    let (state, _) = update(
        state,
        Msg::UploadOpened {
            target: Some(("res-1".to_string(), "kept.docx".to_string())),
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/other.docx"),
            file_name: "other.docx".to_string(),
        },
    );
    let upload = state.view().upload;
    assert_eq!(upload.name, "kept.docx");
    assert!(upload.update_mode);
}

#[test]
fn upload_submission_targets_the_reupload_resume() {
    init_logging();
    let (state, _) = update(
        logged_in(),
        Msg::UploadOpened {
            target: Some(("res-1".to_string(), "kept.docx".to_string())),
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/other.docx"),
            file_name: "other.docx".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::UploadSubmitted);

    match &effects[..] {
        [Effect::UploadResume {
            user_id,
            file_name,
            target,
            ..
        }] => {
            assert_eq!(user_id, "user-1");
            assert_eq!(file_name, "kept.docx");
            assert_eq!(target.as_deref(), Some("res-1"));
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    assert!(state.view().upload.uploading);
}

#[test]
fn upload_success_message_depends_on_mode() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::UploadOpened { target: None });
    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: "cv.docx".to_string(),
        },
    );
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, _) = update(state, Msg::UploadFinished { result: Ok(None) });

    let view = state.view();
    assert_eq!(
        view.upload.success.as_deref(),
        Some("Resume uploaded successfully!")
    );
    assert!(view.notify_new_request);

    // A server-provided message wins over the default.
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            result: Ok(Some("Stored as revision 2.".to_string())),
        },
    );
    assert_eq!(
        state.view().upload.success.as_deref(),
        Some("Stored as revision 2.")
    );
}

#[test]
fn upload_success_reloads_an_open_library() {
    init_logging();
    let state = open_library(logged_in());
    let (state, _) = update(state, Msg::UploadOpened { target: None });
    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: "cv.docx".to_string(),
        },
    );
    let (state, _) = update(state, Msg::UploadSubmitted);
    let (_state, effects) = update(state, Msg::UploadFinished { result: Ok(None) });

    match &effects[..] {
        [Effect::ListResumes { mode, .. }] => assert_eq!(*mode, ResumeMode::Default),
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn closing_the_dialog_is_blocked_while_uploading() {
    init_logging();
    let (state, _) = update(logged_in(), Msg::UploadOpened { target: None });
    let (state, _) = update(
        state,
        Msg::UploadFileChosen {
            path: PathBuf::from("/tmp/cv.docx"),
            file_name: "cv.docx".to_string(),
        },
    );
    let (state, _) = update(state, Msg::UploadSubmitted);

    let (state, _) = update(state, Msg::UploadClosed);
    assert!(state.view().upload.open);

    let (state, _) = update(state, Msg::UploadFinished { result: Err("x".to_string()) });
    let (state, _) = update(state, Msg::UploadClosed);
    assert!(!state.view().upload.open);
}
