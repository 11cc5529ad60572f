use axum::{Json, Router, http::Method, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::version::VERSION;
use crate::watchdog::WatchdogEngine;

pub use error::AppError;

pub mod error;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub engine: WatchdogEngine,
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Pulse Check API is running",
        "version": VERSION,
    }))
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(engine: WatchdogEngine) -> Router {
    let app_state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_check_handler))
        .merge(routes::monitor_routes::create_monitor_router())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchdog::engine::tests::RecordingSink;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let engine = WatchdogEngine::new(sink.clone());
        (create_axum_router(engine), sink)
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn registration(id: &str, timeout: i64) -> Option<Value> {
        Some(json!({ "id": id, "timeout": timeout, "alert_email": "admin@critmon.com" }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_root_and_health() {
        let (router, _) = app();
        let (status, body) = send(&router, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Pulse Check API is running");
        assert_eq!(body["version"], VERSION);
        assert!(body.get("docs").is_none());

        let (status, body) = send(&router, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_and_duplicate() {
        let (router, _) = app();
        let (status, body) = send(&router, Method::POST, "/monitors", registration("device-123", 60)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["device_id"], "device-123");
        assert_eq!(body["timeout"], 60);
        assert_eq!(body["status"], "active");
        assert_eq!(body["message"], "Monitor created for device 'device-123'");

        let (status, body) = send(&router, Method::POST, "/monitors", registration("device-123", 60)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "DuplicateId");

        let (status, body) = send(&router, Method::POST, "/monitors", registration("other", 0)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidTimeout");

        let (_, body) = send(&router, Method::GET, "/monitors", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["monitors"][0]["id"], "device-123");
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_pause_and_history() {
        let (router, _) = app();
        send(&router, Method::POST, "/monitors", registration("d1", 30)).await;

        let (status, body) = send(&router, Method::POST, "/monitors/d1/heartbeat", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
        assert_eq!(body["timeout"], 30);
        assert!(body["last_heartbeat"].is_string());

        let (status, body) = send(&router, Method::POST, "/monitors/d1/pause", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paused");

        let (status, body) = send(&router, Method::POST, "/monitors/d1/pause", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "AlreadyPaused");

        let (status, body) = send(&router, Method::GET, "/monitors/d1/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["device_id"], "d1");
        assert_eq!(body["status"], "paused");
        assert_eq!(body["total_heartbeats"], 1);
        assert_eq!(body["first_heartbeat"], body["last_heartbeat"]);
        assert_eq!(body["history"][0]["event"], "heartbeat");
        assert_eq!(body["history"][0]["timer_reset_to"], 30);

        let (status, body) = send(&router, Method::GET, "/monitors/d1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alert_email"], "admin@critmon.com");
        assert_eq!(body["heartbeat_history"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_device_is_404() {
        let (router, _) = app();
        for (method, uri) in [
            (Method::GET, "/monitors/ghost"),
            (Method::GET, "/monitors/ghost/history"),
            (Method::POST, "/monitors/ghost/heartbeat"),
            (Method::POST, "/monitors/ghost/pause"),
        ] {
            let (status, body) = send(&router, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"], "NotFound");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_device_rejects_heartbeat_and_pause() {
        let (router, sink) = app();
        send(&router, Method::POST, "/monitors", registration("d1", 2)).await;
        tokio::time::sleep(Duration::from_secs(3)).await;

        let (_, body) = send(&router, Method::GET, "/monitors/d1", None).await;
        assert_eq!(body["status"], "down");

        let (status, body) = send(&router, Method::POST, "/monitors/d1/heartbeat", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "AlreadyDown");

        let (status, body) = send(&router, Method::POST, "/monitors/d1/pause", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "CannotPauseDown");

        assert_eq!(sink.device_ids(), vec!["d1".to_string()]);
    }
}
