//! End-to-end flows across the session store, analysis service,
//! conversation thread and report renderer.

mod common;

use common::{CountingBackend, app, document};
use ryoao_application::{ReportRenderer, SessionStore};
use ryoao_core::analysis::Severity;
use ryoao_core::conversation::ChatTurn;
use ryoao_core::session::{Mode, ModeSignal, Session};
use ryoao_core::storage::TokenStore;
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[tokio::test(start_paused = true)]
async fn login_then_dummy_analysis_renders_fixture_rows() {
    let app = app(CountingBackend::default());

    app.session.login_with_credentials("ryoma", "pw").await.unwrap();
    assert_eq!(app.tokens.load().unwrap().as_deref(), Some("jwt-ryoma"));

    app.session.observe_signal(&ModeSignal::dummy()).unwrap();
    let result = app.analysis.analyze(None).await.unwrap();

    let report = ReportRenderer::default().render(result.records(), "nda.pdf");
    let rows: Vec<_> = report.rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].severity, Severity::High.as_str());
    assert!(rows[0].highlighted);
    assert!(!rows[1].highlighted);
    assert_eq!(rows[0].title, result.records()[0].title);
    assert_eq!(rows[1].title, result.records()[1].title);
}

#[tokio::test(start_paused = true)]
async fn dummy_mode_never_touches_the_backend() {
    let app = app(CountingBackend::default());
    app.session.resume_from_storage(&ModeSignal::from_fragment("#dummy")).unwrap();

    let result = app.analysis.analyze(Some(document())).await.unwrap();
    assert_eq!(result.len(), 2);

    let err = app.thread.send("Can I negotiate this?").await.unwrap_err();
    assert!(err.is_chat());
    let err = app.analysis.chat(&result, "").await.unwrap_err();
    assert!(err.is_chat());

    assert_eq!(app.backend.network_calls(), 0);
    assert!(app.thread.turns().is_empty());
}

#[tokio::test]
async fn logout_discards_analysis_and_conversation() {
    let app = app(CountingBackend::default());
    app.session.login_with_credentials("ryoma", "pw").await.unwrap();
    let result = app.analysis.analyze(Some(document())).await.unwrap();
    app.thread.send("Why is this low?").await.unwrap();

    app.session.logout().unwrap();

    assert!(app.analysis.current().is_none());
    assert!(app.thread.turns().is_empty());
    assert_eq!(app.tokens.load().unwrap(), None);
    assert!(app.thread.send("Still there?").await.unwrap_err().is_chat());
    assert!(app.analysis.chat(&result, "Still there?").await.unwrap_err().is_chat());
}

#[tokio::test(start_paused = true)]
async fn replies_are_appended_in_request_order() {
    let backend = CountingBackend::with_chat_delays(&[("M1", 300), ("M2", 10)]);
    let app = app(backend);
    app.session.login_with_credentials("ryoma", "pw").await.unwrap();
    app.analysis.analyze(Some(document())).await.unwrap();

    let (r1, r2) = tokio::join!(app.thread.send("M1"), app.thread.send("M2"));

    assert_eq!(r1.unwrap(), "R:M1");
    assert_eq!(r2.unwrap(), "R:M2");
    assert_eq!(
        app.thread.turns(),
        vec![
            ChatTurn::user("M1"),
            ChatTurn::assistant("R:M1"),
            ChatTurn::user("M2"),
            ChatTurn::assistant("R:M2"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn dummy_signal_overrides_live_session_until_removed() {
    let app = app(CountingBackend::default());
    app.session.login_with_credentials("ryoma", "pw").await.unwrap();
    let live = app.analysis.analyze(Some(document())).await.unwrap();
    assert_eq!(live.records()[0].title, "Governing law");
    let calls_before = app.backend.network_calls();

    app.session.observe_signal(&ModeSignal::dummy()).unwrap();
    assert!(app.analysis.current().is_none());
    assert_eq!(app.session.current().token(), None);

    let dummy = app.analysis.analyze(Some(document())).await.unwrap();
    assert_eq!(dummy.len(), 2);
    assert!(app.thread.send("Hello?").await.is_err());
    assert!(app.session.login_with_credentials("ryoma", "pw").await.is_err());
    assert_eq!(app.backend.network_calls(), calls_before);

    let session = app.session.observe_signal(&ModeSignal::none()).unwrap();
    assert_eq!(session, Session::Live { token: "jwt-ryoma".into() });
    assert!(app.analysis.current().is_none());

    app.analysis.analyze(Some(document())).await.unwrap();
    assert_eq!(app.backend.analyses.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stored_token_survives_restart() {
    let app = app(CountingBackend::default());
    app.session.login_with_credentials("ryoma", "pw").await.unwrap();

    let restarted = SessionStore::new(app.backend.clone(), app.tokens.clone());
    let resumed = restarted.resume_from_storage(&ModeSignal::none()).unwrap();

    assert_eq!(resumed.and_then(|s| s.mode()), Some(Mode::Live));
    assert_eq!(restarted.current().token(), Some("jwt-ryoma"));
    assert_eq!(app.backend.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn new_analysis_starts_a_fresh_conversation() {
    let app = app(CountingBackend::default());
    app.session.login_with_credentials("ryoma", "pw").await.unwrap();
    app.analysis.analyze(Some(document())).await.unwrap();
    app.thread.send("First").await.unwrap();
    assert_eq!(app.thread.turns().len(), 2);

    let second = app.analysis.analyze(Some(document())).await.unwrap();

    assert!(app.thread.turns().is_empty());
    assert_eq!(app.analysis.current(), Some(Arc::clone(&second)));
}
