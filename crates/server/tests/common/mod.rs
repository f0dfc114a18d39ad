use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use lesson_tracker_server::{
    config::{Config, DeliveryMode, TriggerPolicy},
    create_router,
    db::Database,
    AppState,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub dir: TempDir,
}

pub async fn create_test_app(policy: TriggerPolicy) -> TestApp {
    create_test_app_with(policy, DeliveryMode::Log).await
}

pub async fn create_test_app_with(policy: TriggerPolicy, delivery: DeliveryMode) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("lesson-tracker.db");

    let mut config = Config::default();
    config.database.path = db_path.to_string_lossy().to_string();
    config.notifications.policy = policy;
    config.notifications.delivery = delivery;

    let db = Database::new(&config.database.path)
        .await
        .expect("Failed to open test database");
    db.run_migrations().await.expect("Failed to run migrations");

    let router = create_router(AppState::new(db.clone(), &config));
    TestApp { router, db, dir }
}

/// Send one request through a router and decode the JSON body
pub async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

impl TestApp {
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(self.router.clone(), method, uri, body).await
    }

    pub async fn get<T: DeserializeOwned>(&self, uri: &str) -> T {
        let (status, json) = self.request("GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "GET {} returned {}", uri, json);
        serde_json::from_value(json).unwrap()
    }

    pub async fn post<T: DeserializeOwned>(&self, uri: &str, body: Value) -> T {
        let (status, json) = self.request("POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} returned {}", uri, json);
        serde_json::from_value(json).unwrap()
    }
}
