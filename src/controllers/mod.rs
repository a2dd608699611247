pub mod bookings;
pub mod events;
pub mod extract;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(events::routes())
        .merge(bookings::routes())
}

/// Full application router: banner, health check and the JSON API under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "DevEvents API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Config, DatabaseConfig};
    use crate::database::ConnectionManager;
    use crate::store::memory::MemoryConnector;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            app: AppConfig {
                host: "127.0.0.1".into(),
                port: 0,
                environment: "test".into(),
                rust_log: "info".into(),
            },
            database: DatabaseConfig {
                url: "memory://".into(),
                pool_size: 1,
                connect_timeout_secs: 1,
                run_migrations: false,
            },
        };
        let connections = ConnectionManager::new(Arc::new(MemoryConnector::default()));
        AppState::with_connections(config, connections)
    }

    fn event_body(title: &str) -> Value {
        json!({
            "title": title,
            "description": "A gathering of developers",
            "overview": "Talks, workshops and networking",
            "image": "/images/event1.png",
            "venue": "Moscone Center",
            "location": "San Francisco, CA",
            "date": "March 15, 2024",
            "time": "9:00 AM",
            "mode": "offline",
            "audience": "Developers",
            "agenda": ["Keynote", "Lunch"],
            "organizer": "Meta",
            "tags": ["react", "frontend"]
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn create_then_fetch_by_slug() {
        let app = app(test_state());

        let (status, created) = send(&app, "POST", "/api/events", Some(event_body("React Conf 2024!"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["slug"], "react-conf-2024");
        assert_eq!(created["date"], "2024-03-15");
        assert_eq!(created["time"], "09:00");

        let (status, fetched) = send(&app, "GET", "/api/events/react-conf-2024", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], created["id"]);

        let (_, listed) = send(&app, "GET", "/api/events", None).await;
        assert_eq!(listed["count"], 1);
    }

    #[tokio::test]
    async fn blank_venue_is_unprocessable() {
        let app = app(test_state());
        let mut body = event_body("RustConf");
        body["venue"] = json!("  ");

        let (status, error) = send(&app, "POST", "/api/events", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "VALIDATION_ERROR");
        assert_eq!(error["field"], "venue");

        let (_, listed) = send(&app, "GET", "/api/events", None).await;
        assert_eq!(listed["count"], 0);
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let app = app(test_state());
        send(&app, "POST", "/api/events", Some(event_body("RustConf"))).await;
        let (status, error) = send(&app, "POST", "/api/events", Some(event_body("rustconf"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["code"], "DUPLICATE_SLUG");
    }

    #[tokio::test]
    async fn booking_for_unknown_event_is_rejected() {
        let app = app(test_state());
        let body = json!({
            "eventId": uuid::Uuid::new_v4(),
            "email": "dev@example.com"
        });
        let (status, error) = send(&app, "POST", "/api/bookings", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "REFERENTIAL_INTEGRITY_ERROR");
    }

    #[tokio::test]
    async fn booking_is_listed_under_its_event() {
        let app = app(test_state());
        let (_, event) = send(&app, "POST", "/api/events", Some(event_body("Next.js Summit"))).await;

        let body = json!({ "eventId": event["id"], "email": " Foo@Bar.COM " });
        let (status, booking) = send(&app, "POST", "/api/bookings", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(booking["email"], "foo@bar.com");

        let (status, listed) = send(&app, "GET", "/api/events/next-js-summit/bookings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["count"], 1);
    }

    #[tokio::test]
    async fn patch_with_bad_time_keeps_stored_event() {
        let app = app(test_state());
        send(&app, "POST", "/api/events", Some(event_body("RustConf"))).await;

        let (status, error) =
            send(&app, "PATCH", "/api/events/rustconf", Some(json!({ "time": "25:00" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "INVALID_FORMAT");

        let (_, fetched) = send(&app, "GET", "/api/events/rustconf", None).await;
        assert_eq!(fetched["time"], "09:00");
    }

    #[tokio::test]
    async fn malformed_body_gets_json_error() {
        let app = app(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/bookings")
            .header("content-type", "application/json")
            .body(Body::from("{\"eventId\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error["success"], false);
        assert_eq!(error["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn non_uuid_booking_id_gets_json_error() {
        let app = app(test_state());
        let (status, error) = send(
            &app,
            "PATCH",
            "/api/bookings/not-a-uuid",
            Some(json!({ "email": "dev@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "BAD_REQUEST");
        assert!(error["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let app = app(test_state());
        let (status, _) = send(&app, "GET", "/api/events/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
