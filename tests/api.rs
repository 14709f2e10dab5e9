use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use share_timer::{
    api::create_router,
    connection::{Connection, Peer},
    session::Role,
    state::{AppState, TimerSession, TimerSnapshot},
    tasks::SessionDriver,
};
use tokio::{sync::oneshot, task::JoinHandle};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    peer: Peer,
    stop: oneshot::Sender<()>,
    driver: JoinHandle<TimerSession>,
}

async fn app(is_owner: bool) -> TestApp {
    let snapshot = TimerSnapshot::fresh("ABC123".parse().unwrap(), 60_000, is_owner);
    let client_id: share_timer::ClientId = "api-test".parse().unwrap();
    let session = TimerSession::new(client_id.clone(), &snapshot, 0);
    let (connection, peer) = Connection::pair();
    let (driver, handle) = SessionDriver::new(session, connection);
    let (stop, stop_rx) = oneshot::channel::<()>();
    let driver = tokio::spawn(driver.run(async move {
        let _ = stop_rx.await;
    }));

    let state = AppState::new(
        handle,
        client_id,
        Role::from_owner_flag(is_owner),
        20554,
        "127.0.0.1".to_string(),
    );
    TestApp {
        router: create_router(state),
        peer,
        stop,
        driver,
    }
}

async fn open(peer: &Peer) {
    peer.open().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test(start_paused = true)]
async fn health_and_status() {
    let app = app(true).await;

    let (status, body) = call(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app.router, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "owner");
    assert_eq!(body["client_id"], "api-test");
    assert_eq!(body["session"]["timerId"], "ABC123");
    assert_eq!(body["session"]["phase"], "created");
    assert_eq!(body["session"]["remaining"], "01:00");
    assert_eq!(body["session"]["clientCount"], 0);
}

#[tokio::test(start_paused = true)]
async fn owner_controls_over_http() {
    let mut app = app(true).await;

    let (status, body) = call(&app.router, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["message"], "connection is not open");

    open(&app.peer).await;
    app.peer.drain();

    let (status, body) = call(&app.router, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["phase"], "running");

    let (status, body) = call(&app.router, "POST", "/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["phase"], "paused");

    let (status, _) = call(&app.router, "POST", "/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app.router, "POST", "/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["phase"], "running");

    let (status, _) = call(&app.router, "POST", "/leave", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(
        app.peer.drain(),
        vec![
            "1:cmd:timer:start:ABC123",
            "1:cmd:timer:pause:ABC123",
            "1:cmd:timer:resume:ABC123",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn client_cannot_control() {
    let mut app = app(false).await;
    open(&app.peer).await;
    app.peer.drain();

    for uri in ["/create", "/start", "/pause", "/resume"] {
        let (status, body) = call(&app.router, "POST", uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT, "{uri}");
        assert_eq!(body["message"], "only the timer owner can do that");
    }

    let (status, _) = call(&app.router, "POST", "/leave", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.peer.drain(), vec!["1:cmd:timer:leave:ABC123"]);
}

#[tokio::test(start_paused = true)]
async fn snapshot_endpoint_resyncs() {
    let app = app(false).await;

    let snapshot = json!({
        "timerId": "ABC123",
        "isOwner": false,
        "duration": 60000,
        "isRunning": false,
        "startTime": 1000,
        "lastPause": 21000,
        "timeInPause": 0
    });
    let (status, body) = call(&app.router, "PUT", "/snapshot", Some(snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["phase"], "paused");
    assert_eq!(body["session"]["timeLeft"], 40_000);

    let foreign = json!({ "timerId": "QQQ111", "duration": 5 });
    let (status, body) = call(&app.router, "PUT", "/snapshot", Some(foreign)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "snapshot belongs to timer QQQ111");
}

#[tokio::test(start_paused = true)]
async fn stopped_session_is_unavailable() {
    let app = app(true).await;
    app.stop.send(()).unwrap();
    app.driver.await.unwrap();

    let (status, body) = call(&app.router, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");

    let (status, _) = call(&app.router, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
}
