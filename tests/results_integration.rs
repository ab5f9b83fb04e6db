//! Results, submission and export integration tests

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use spr_experiment::core::{ExperimentConfig, SessionContext, SessionSeed};
use spr_experiment::results::{self, SessionResult, SubmitOutcome, Submitter, TrialRecord};
use spr_experiment::runner::{ExperimentRunner, ScriptedPresenter};
use spr_experiment::schedule::TrialSequenceBuilder;
use spr_experiment::stimuli::builtin;

/// Fails the first `failures` requests, then accepts
#[derive(Clone)]
struct FlakyEndpoint {
    failures: usize,
    hits: Arc<AtomicUsize>,
    last_body: Arc<std::sync::Mutex<Option<Value>>>,
}

async fn flaky_submit(State(endpoint): State<FlakyEndpoint>, Json(body): Json<Value>) -> StatusCode {
    let hit = endpoint.hits.fetch_add(1, Ordering::SeqCst);
    *endpoint.last_body.lock().unwrap() = Some(body);
    if hit < endpoint.failures {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

fn finished_session() -> SessionContext {
    let mut session = SessionContext::begin("P007", "stimuli_1.csv", common::start_time()).unwrap();
    session.finish(common::start_time() + chrono::Duration::minutes(12));
    session
}

fn run_session(word_ms: f64, answers: Vec<usize>) -> SessionResult {
    let session = finished_session();
    let plan = TrialSequenceBuilder::default().build_plan(
        &builtin::default_experimental_items(),
        &builtin::default_filler_items(),
        &builtin::default_practice_items(),
        session.seed,
    );
    let presenter = ScriptedPresenter::new(word_ms).with_answers(answers);
    let records = ExperimentRunner::new(presenter).run_plan(&plan).unwrap();
    SessionResult::new(&session, records).unwrap()
}

#[test]
fn test_session_result_fields() {
    let result = run_session(100.0, vec![0, 0, 1, 0, 0, 1, 0, 0, 1, 0]);

    assert_eq!(result.user_id, "P007");
    assert_eq!(result.experiment_start_time, "2024-05-01T09:30:00.000Z");
    assert_eq!(result.experiment_duration_ms, 12 * 60 * 1000);
    assert_eq!(result.seed, SessionSeed::derive("P007", "2024-05-01T09:30:00.000Z"));

    // main phase only
    assert_eq!(result.sentences_completed, 11);
    assert_eq!(result.total_comprehension_questions, 8);
    assert_eq!(result.full_data.len(), 2 + 2 + 11 + 8);

    let json = serde_json::to_value(&result).unwrap();
    for field in [
        "user_id",
        "stimuli_file",
        "experiment_start_time",
        "experiment_end_time",
        "experiment_duration_ms",
        "sentences_completed",
        "average_reading_time_ms",
        "comprehension_accuracy_percent",
        "total_comprehension_questions",
        "correct_comprehension_answers",
        "seed",
        "full_data",
    ] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }
}

#[test]
fn test_all_correct_accuracy() {
    let result = run_session(120.0, Vec::new());
    assert_eq!(result.correct_comprehension_answers, 8);
    assert_eq!(result.comprehension_accuracy_percent, 100.0);
    assert!(result
        .full_data
        .iter()
        .filter_map(TrialRecord::as_reading)
        .all(|r| r.word_timings.iter().all(|t| t.reading_time == 120.0)));
}

#[tokio::test]
async fn test_submit_failure_then_retry() {
    let endpoint = FlakyEndpoint {
        failures: 1,
        hits: Arc::new(AtomicUsize::new(0)),
        last_body: Arc::new(std::sync::Mutex::new(None)),
    };
    let router = Router::new()
        .route("/api/submit", post(flaky_submit))
        .with_state(endpoint.clone());
    let base = common::serve(router).await;

    let result = run_session(100.0, Vec::new());
    let submitter = Submitter::new(format!("{}/api/submit", base), Duration::from_secs(5)).unwrap();

    let first = submitter.try_submit(&result).await;
    match &first {
        SubmitOutcome::Failed { reason } => assert!(reason.contains("500"), "reason was {}", reason),
        other => panic!("expected failure, got {:?}", other),
    }

    let second = submitter.try_submit(&result).await;
    assert_eq!(second, SubmitOutcome::Saved { status: 200 });
    assert_eq!(endpoint.hits.load(Ordering::SeqCst), 2);

    let body = endpoint.last_body.lock().unwrap().clone().unwrap();
    let array = body.as_array().expect("payload is a JSON array");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["user_id"], "P007");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_failure() {
    let result = run_session(100.0, Vec::new());
    // nothing listens on port 9 locally
    let submitter = Submitter::new("http://127.0.0.1:9/submit", Duration::from_secs(2)).unwrap();
    assert!(!submitter.try_submit(&result).await.is_success());
}

#[test]
fn test_download_files_written() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_session(100.0, Vec::new());

    let paths = results::write_download_files(dir.path(), &result, common::start_time()).unwrap();
    assert_eq!(paths.csv.file_name().unwrap(), "P007_20240501T093000.csv");
    assert_eq!(paths.jsonl.file_name().unwrap(), "P007_20240501T093000.jsonl");

    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 1 + result.full_data.len());

    let saved = results::read_jsonl(&paths.jsonl).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].user_id, result.user_id);
    assert_eq!(saved[0].full_data.len(), result.full_data.len());
}

/// Records how many files the output directory held when the request landed
#[derive(Clone)]
struct DirWatchingEndpoint {
    dir: PathBuf,
    files_seen: Arc<std::sync::Mutex<Option<usize>>>,
}

async fn watching_submit(State(endpoint): State<DirWatchingEndpoint>) -> StatusCode {
    let count = std::fs::read_dir(&endpoint.dir).map(|d| d.count()).unwrap_or(0);
    *endpoint.files_seen.lock().unwrap() = Some(count);
    StatusCode::SERVICE_UNAVAILABLE
}

fn save_config(output_dir: Option<String>, endpoint: Option<String>) -> ExperimentConfig {
    ExperimentConfig {
        output_dir,
        save_endpoint: endpoint,
        request_timeout_secs: 5,
        ..ExperimentConfig::default()
    }
}

#[tokio::test]
async fn test_download_files_written_before_submit() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = DirWatchingEndpoint {
        dir: dir.path().to_path_buf(),
        files_seen: Arc::new(std::sync::Mutex::new(None)),
    };
    let router = Router::new()
        .route("/api/submit", post(watching_submit))
        .with_state(endpoint.clone());
    let base = common::serve(router).await;

    let result = run_session(100.0, Vec::new());
    let config = save_config(
        Some(dir.path().to_str().unwrap().to_string()),
        Some(format!("{}/api/submit", base)),
    );
    let report = results::save_session(&config, &result, common::start_time()).await;

    // both files already existed when the server saw the request
    assert_eq!(*endpoint.files_seen.lock().unwrap(), Some(2));
    let paths = report.files.clone().expect("download files written");
    assert!(paths.csv.exists());
    assert!(paths.jsonl.exists());
    match &report.outcome {
        Some(SubmitOutcome::Failed { reason }) => assert!(reason.contains("503"), "reason was {}", reason),
        other => panic!("expected a failed submission, got {:?}", other),
    }
    assert!(report.is_saved());
}

#[tokio::test]
async fn test_unreachable_endpoint_keeps_download_files() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_session(100.0, Vec::new());
    let config = save_config(
        Some(dir.path().to_str().unwrap().to_string()),
        Some("http://127.0.0.1:9/submit".to_string()),
    );
    let report = results::save_session(&config, &result, common::start_time()).await;

    assert!(report.files.is_some());
    assert!(report.file_error.is_none());
    assert!(!report.outcome.unwrap().is_success());
    let saved = results::read_jsonl(&dir.path().join("P007_20240501T093000.jsonl")).unwrap();
    assert_eq!(saved[0].user_id, "P007");
}

#[tokio::test]
async fn test_unwritable_output_dir_still_submits() {
    let endpoint = FlakyEndpoint {
        failures: 0,
        hits: Arc::new(AtomicUsize::new(0)),
        last_body: Arc::new(std::sync::Mutex::new(None)),
    };
    let router = Router::new()
        .route("/api/submit", post(flaky_submit))
        .with_state(endpoint.clone());
    let base = common::serve(router).await;

    // a regular file where the output directory should be
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let config = save_config(
        Some(blocker.path().to_str().unwrap().to_string()),
        Some(format!("{}/api/submit", base)),
    );
    let result = run_session(100.0, Vec::new());
    let report = results::save_session(&config, &result, common::start_time()).await;

    assert!(report.files.is_none());
    assert!(report.file_error.is_some());
    assert_eq!(report.outcome, Some(SubmitOutcome::Saved { status: 200 }));
    assert_eq!(endpoint.hits.load(Ordering::SeqCst), 1);
    assert!(report.is_saved());
}
