//! Session tests driven through the library API

use mq::core::{
    Advance, Config, JsonScoreStore, MeasurementKind, Outcome, Script, ScriptRunner, Session,
    SessionMode, Step, SyntheticDevice,
};
use mq::entities::question::{MeasurementQuestion, QuestionSet};
use tempfile::TempDir;

fn single_question() -> QuestionSet {
    QuestionSet::new(vec![MeasurementQuestion {
        id: 7,
        kind: MeasurementKind::Length,
        prompt: "Measure the shelf".to_string(),
        target: 30.0,
        unit: "cm".to_string(),
        tolerance: 1.0,
    }])
    .unwrap()
}

fn calibration_steps() -> Vec<Step> {
    vec![
        Step::StartCamera,
        Step::Detect("marker".to_string()),
        Step::Tap(0.0, 0.0),
        Step::Tap(0.0, 21.0),
        Step::Calibrate,
    ]
}

// ============================================================================
// Completion
// ============================================================================

#[test]
fn test_single_question_round_writes_json_store() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("scores.json");
    let mut config = Config::default();
    config.player_name = "Cai".to_string();

    let mut session = Session::new(
        config,
        single_question(),
        Box::new(JsonScoreStore::new(path.clone())),
    );

    let mut steps = calibration_steps();
    steps.extend([Step::Tap(0.0, 0.0), Step::Tap(300.0, 0.0), Step::Submit]);
    let script = Script {
        player: None,
        camera_unavailable: None,
        steps,
    };
    let reports = ScriptRunner::new(&script).run(&script.steps, &mut session);

    assert!(matches!(
        reports.last().map(|r| &r.result),
        Some(Ok(Outcome::Evaluated {
            advance: Advance::Completed { final_score: 20 },
            ..
        }))
    ));
    assert_eq!(session.mode(), SessionMode::Completed);
    assert!(!session.holds_device());

    let records = JsonScoreStore::new(path).load().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].score, 20);
    assert_eq!(records[0].player_name, "Cai");
}

#[test]
fn test_tolerance_boundary_is_inclusive() {
    let tmp = TempDir::new().unwrap();
    let mut session = Session::new(
        Config::default(),
        single_question(),
        Box::new(JsonScoreStore::new(tmp.path().join("scores.json"))),
    );

    let mut steps = calibration_steps();
    // 310 px at 10 px/cm is 31 cm, exactly at the edge of 30 ± 1
    steps.extend([Step::Tap(0.0, 0.0), Step::Tap(310.0, 0.0), Step::Submit]);
    let script = Script {
        player: None,
        camera_unavailable: None,
        steps,
    };
    ScriptRunner::new(&script).run(&script.steps, &mut session);

    assert_eq!(session.score(), 20);
    assert_eq!(session.mode(), SessionMode::Completed);
}

// ============================================================================
// Device lifecycle
// ============================================================================

#[test]
fn test_device_stopped_once_across_end() {
    let (device, feed) = SyntheticDevice::new();
    let mut session = Session::new(
        Config::default(),
        single_question(),
        Box::new(mq::core::MemoryScoreStore::new()),
    );
    session.start_camera(Box::new(device)).unwrap();
    feed.detect("marker");
    feed.tap(0.0, 0.0);
    feed.tap(0.0, 21.0);
    let outcomes = session.pump();
    assert_eq!(outcomes.len(), 3);
    session.calibrate(None).unwrap();
    assert_eq!(session.mode(), SessionMode::Measuring);

    let summary = session.end();
    assert_eq!(summary.score, 0);
    assert!(!summary.completed);
    assert_eq!(feed.starts(), 1);
    assert_eq!(feed.stops(), 1);
}

#[test]
fn test_taps_without_camera_change_nothing() {
    let mut session = Session::new(
        Config::default(),
        single_question(),
        Box::new(mq::core::MemoryScoreStore::new()),
    );
    let outcome = session
        .capture_point(mq::core::Point::new(4.0, 4.0))
        .unwrap();
    assert!(matches!(outcome, Outcome::Ignored { .. }));
    assert!(session.start_point().is_none());
    assert_eq!(session.mode(), SessionMode::Idle);
}
