//! Integration tests: admission endpoint → inbox → controller, and
//! controller → event log → notification backend.

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::put;
use axum::Router;
use tower::ServiceExt;

use quietguard::adapters::event_log::EventLog;
use quietguard::adapters::http::{router, AdmissionState};
use quietguard::adapters::notify::{self, Backend};
use quietguard::app::events::AlarmEvent;
use quietguard::app::service::AlarmController;
use quietguard::channels::SubmissionInbox;
use quietguard::config::{DatastoreConfig, SystemConfig};
use quietguard::fsm::StateId;

use super::mock_board::{fast_config, MockBoard, Rig};

async fn get(app: Router, uri: &str) -> (StatusCode, usize) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.len())
}

#[tokio::test]
async fn endpoint_defuses_an_alerting_controller() {
    let mut rig = Rig::fast();
    let app = router(AdmissionState::new(rig.inbox.clone(), 10));
    rig.clap();
    assert_eq!(rig.ctl.state(), StateId::Alerting);

    let (status, len) = get(app, "/alarm?code=1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(len, 0, "submission responses carry no body");

    rig.run_until(120);
    assert_eq!(rig.ctl.state(), StateId::Settling);
}

#[tokio::test]
async fn response_is_identical_for_right_and_wrong_codes() {
    let rig = Rig::fast();
    let app = router(AdmissionState::new(rig.inbox.clone(), 10));

    let right = get(app.clone(), "/disable?code=1234").await;
    let wrong = get(app, "/disable?code=0000").await;
    assert_eq!(right, wrong);
}

#[tokio::test]
async fn disable_over_http_then_defuse_over_json() {
    let mut rig = Rig::fast();
    let app = router(AdmissionState::new(rig.inbox.clone(), 10));

    get(app.clone(), "/disable?code=1234").await;
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Disabled);

    let request = Request::post("/submit")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"code":"1234","purpose":"defuse"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Settling);
    assert!(!rig.ctl.is_disabled());
}

#[tokio::test]
async fn submissions_while_settling_answer_ok_and_vanish() {
    let mut rig = Rig::fast();
    let app = router(AdmissionState::new(rig.inbox.clone(), 10));
    get(app.clone(), "/alarm?code=1234").await;
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Settling);
    rig.sink.take();

    let (status, _) = get(app, "/alarm?code=9999").await;
    assert_eq!(status, StatusCode::OK);
    rig.step();
    assert!(rig.sink.events.is_empty());
}

#[tokio::test]
async fn request_without_code_is_logged_invalid() {
    let mut rig = Rig::fast();
    let app = router(AdmissionState::new(rig.inbox.clone(), 10));
    rig.sink.take();

    let (status, _) = get(app, "/disable").await;
    assert_eq!(status, StatusCode::OK);
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Monitoring);
    assert_eq!(rig.sink.take(), vec![AlarmEvent::InvalidCode(String::new())]);
}

// ── Event log → datastore ─────────────────────────────────────

type Bodies = Arc<Mutex<Vec<serde_json::Value>>>;

async fn logger(State(bodies): State<Bodies>, body: String) -> StatusCode {
    if let Ok(value) = serde_json::from_str(&body) {
        bodies.lock().unwrap().push(value);
    }
    StatusCode::OK
}

#[tokio::test]
async fn transitions_reach_the_datastore_in_order() {
    let bodies = Bodies::default();
    let app = Router::new()
        .route("/logger", put(logger))
        .with_state(bodies.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let backend = Backend::Datastore(DatastoreConfig {
        url: format!("http://{addr}/logger"),
        token: "token".into(),
    });
    let (dispatcher, worker) = notify::channel(vec![backend]).unwrap();
    let worker = tokio::spawn(worker.run());

    let config = SystemConfig {
        noise_threshold: 30,
        ..fast_config()
    };
    let mut ctl = AlarmController::new(&config, SubmissionInbox::new());
    let mut board = MockBoard::quiet();
    let mut sink = EventLog::with_dispatcher(dispatcher);

    ctl.start(0, &mut board, &mut sink);
    board.level = Some(45);
    ctl.tick(20, &mut board, &mut sink);
    assert_eq!(ctl.state(), StateId::Alerting);

    drop(sink);
    worker.await.unwrap();

    let values: Vec<String> = bodies
        .lock()
        .unwrap()
        .iter()
        .filter_map(|v| v["value"].as_str().map(str::to_owned))
        .collect();
    assert_eq!(values.len(), 2);
    assert!(values[0].ends_with(&format!(" {}", AlarmEvent::LookingForNoise)));
    assert!(values[1].ends_with(" noise-detected"));
    assert!(values[1].contains('T') && values[1].contains("Z "));
}
