//! End-to-end portal flow in virtual time: login, review, certificate.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use tramite::certificate::CertificateBuilder;
use tramite::orchestrator::{OrchestratorError, ReviewTiming, RunEvent};
use tramite::phases::review_phases;
use tramite::{Portal, ProcedureStatus, Session, TramiteError, sample_record};

fn portal() -> Portal {
    Portal::new(
        review_phases(),
        ReviewTiming::default(),
        CertificateBuilder::without_assets(),
    )
}

fn issued_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_review_issues_certificate_after_confirmation_delay() {
    let portal = portal();
    let mut session = Session::new();
    session.login("ana").unwrap();
    let record = sample_record(issued_on(), 1234);

    let started = Instant::now();
    let mut events = Vec::new();
    let document = portal
        .run_review(&mut session, &record, |event| events.push(event.clone()))
        .await
        .unwrap();

    // 4 × 3000 ms + 500 ms settle + 1000 ms confirmation
    assert_eq!(started.elapsed(), Duration::from_millis(13_500));
    assert_eq!(document.registration_code(), "PF010-2025-001234");
    assert_eq!(document.page_count(), 2);

    let procedure = session.procedure().unwrap();
    assert_eq!(procedure.status, ProcedureStatus::Completed);
    assert!(procedure.finished_at.is_some());

    let started_phases = events
        .iter()
        .filter(|e| matches!(e.event, RunEvent::PhaseStarted { .. }))
        .count();
    let revealed = events
        .iter()
        .filter(|e| matches!(e.event, RunEvent::ItemRevealed { .. }))
        .count();
    assert_eq!(started_phases, 4);
    assert_eq!(revealed, 12);
    assert_eq!(events.last().unwrap().event, RunEvent::AllPhasesCompleted);
    assert_eq!(events.last().unwrap().at, Duration::from_millis(12_500));
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_reported_per_phase() {
    let portal = portal();
    let mut session = Session::new();
    session.login("ana").unwrap();

    let mut progress = Vec::new();
    portal
        .run_review(&mut session, &sample_record(issued_on(), 1), |event| {
            if let RunEvent::PhaseCompleted {
                progress_percent, ..
            } = event.event
            {
                progress.push(progress_percent);
            }
        })
        .await
        .unwrap();

    assert_eq!(progress, vec![25, 50, 75, 100]);
}

#[tokio::test(start_paused = true)]
async fn test_review_requires_login() {
    let portal = portal();
    let mut session = Session::new();

    let err = portal
        .run_review(&mut session, &sample_record(issued_on(), 1), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, TramiteError::Session { .. }));
    assert!(session.procedure().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_review_leaves_procedure_in_progress() {
    let portal = portal();
    let mut session = Session::new();
    session.login("ana").unwrap();

    let mut handle = portal.begin_review(&mut session).unwrap();
    tokio::time::sleep(Duration::from_millis(4_000)).await;
    handle.cancel();

    let err = portal
        .finish_review(&mut session, &mut handle, &sample_record(issued_on(), 1), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TramiteError::Orchestrator(OrchestratorError::Cancelled { .. })
    ));
    assert_eq!(err.to_exit_code(), tramite::ExitCode::CANCELLED);
    assert_eq!(
        session.procedure().unwrap().status,
        ProcedureStatus::InProgress
    );
}

#[tokio::test(start_paused = true)]
async fn test_timing_that_cannot_fit_checklist_is_rejected() {
    let timing = ReviewTiming {
        phase_duration: Duration::from_millis(1_000),
        item_interval: Duration::from_millis(400),
        ..ReviewTiming::default()
    };
    let portal = Portal::new(review_phases(), timing, CertificateBuilder::without_assets());
    let mut session = Session::new();
    session.login("ana").unwrap();

    let err = portal.begin_review(&mut session).unwrap_err();

    assert!(matches!(
        err,
        TramiteError::Orchestrator(OrchestratorError::CascadeExceedsPhase { .. })
    ));
    assert_eq!(err.to_exit_code(), tramite::ExitCode::CLI_ARGS);
}

#[tokio::test(start_paused = true)]
async fn test_logout_after_review_clears_procedure() {
    let portal = portal();
    let mut session = Session::new();
    session.login("ana").unwrap();
    portal
        .run_review(&mut session, &sample_record(issued_on(), 1), |_| {})
        .await
        .unwrap();

    session.logout();

    assert!(!session.is_authenticated());
    assert!(session.procedure().is_none());
}
