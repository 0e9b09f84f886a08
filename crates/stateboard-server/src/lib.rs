//! HTTP API for Stateboard.
//!
//! Serves JSON views of Terraform states: the list of states, a single
//! version, the activity (version history) of a state, and the comparison of
//! two versions. Every response carries `Access-Control-Allow-Origin: *`.
//!
//! # Key Types
//!
//! - [`ServerConfig`] - Bind address, store selection, and logging settings
//! - [`StateboardServer`] - Binds a listener and serves the router
//! - [`AppState`] - Shared handler state around a [`stateboard_sdk::Stateboard`]
//! - [`ServerError`] - Maps failures to JSON `{error, details}` responses

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use auth::UserInfo;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::StateboardServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use stateboard_sdk::{InMemorySnapshotStore, Resource, ResourceKey, Serial, Snapshot, Stateboard};
    use tower::util::ServiceExt;

    fn app() -> axum::Router {
        let store = InMemorySnapshotStore::new();
        let at = |serial: u64| Utc.timestamp_opt(1_700_000_000 + serial as i64, 0).unwrap();
        let web = ResourceKey::managed("aws_instance", "web");

        store
            .insert(
                Snapshot::new("net", Serial::new(1), at(1)).with_resource(
                    web.clone(),
                    Resource::new("aws_instance", "web")
                        .with_attribute("ami", "x")
                        .with_attribute("size", "t2.micro"),
                ),
            )
            .unwrap();
        store
            .insert(
                Snapshot::new("net", Serial::new(2), at(2))
                    .with_resource(
                        web,
                        Resource::new("aws_instance", "web")
                            .with_attribute("ami", "y")
                            .with_attribute("size", "t2.micro"),
                    )
                    .with_resource(
                        ResourceKey::managed("aws_instance", "db"),
                        Resource::new("aws_instance", "db").with_attribute("ami", "z"),
                    ),
            )
            .unwrap();
        store
            .insert(Snapshot::new("prod/dns", Serial::new(5), at(5)))
            .unwrap();

        let state = AppState::new(Stateboard::with_store(store)).with_logout_url("/logout");
        build_router(state)
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        get_with(Request::builder().uri(uri)).await
    }

    async fn get_with(builder: axum::http::request::Builder) -> (StatusCode, Value) {
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn version_endpoint() {
        let (status, body) = get("/api/version").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["copyright"].as_str().unwrap().contains("Camptocamp"));
    }

    #[tokio::test]
    async fn user_endpoint_reads_forwarded_headers() {
        let (status, body) = get_with(
            Request::builder()
                .uri("/api/user")
                .header("X-Forwarded-User", "alice")
                .header("X-Forwarded-Email", "alice@example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "alice");
        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["logout_url"], "/logout");
    }

    #[tokio::test]
    async fn cors_header_present() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/states")
                    .header("Origin", "http://ui.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn states_listed_sorted() {
        let (status, body) = get("/api/states").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["net", "prod/dns"]));
    }

    #[tokio::test]
    async fn state_latest_by_default() {
        let (status, body) = get("/api/state/net").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serial"], 2);
    }

    #[tokio::test]
    async fn state_by_version_id() {
        let (status, body) = get("/api/state/net?versionid=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serial"], 1);
    }

    #[tokio::test]
    async fn state_name_with_slash() {
        let (status, body) = get("/api/state/prod/dns").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "prod/dns");
    }

    #[tokio::test]
    async fn activity_endpoint() {
        let (status, body) = get("/api/state/activity/net").await;
        assert_eq!(status, StatusCode::OK);
        let serials: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["serial"].as_u64().unwrap())
            .collect();
        assert_eq!(serials, vec![1, 2]);
    }

    #[tokio::test]
    async fn compare_endpoint() {
        let (status, body) = get("/api/state/compare/net?from=1&to=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "net");

        let changes = body["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0]["key"], "aws_instance.db");
        assert_eq!(changes[0]["kind"], "added");
        assert_eq!(changes[0]["new"]["ami"], "z");
        assert_eq!(changes[1]["key"], "aws_instance.web");
        assert_eq!(changes[1]["kind"], "modified");
        assert_eq!(changes[1]["attributes"][0]["name"], "ami");
        assert_eq!(changes[1]["attributes"][0]["old"], "x");
        assert_eq!(changes[1]["attributes"][0]["new"], "y");
    }

    #[tokio::test]
    async fn compare_defaults_to_latest() {
        let (status, body) = get("/api/state/compare/net?from=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["changes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_token_is_bad_request() {
        let (status, body) = get("/api/state/compare/net?from=abc&to=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(body["details"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn unknown_state_is_not_found() {
        let (status, _) = get("/api/state/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get("/api/state/activity/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_version_is_not_found() {
        let (status, _) = get("/api/state/net?versionid=9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unavailable_store_is_bad_gateway() {
        let store = stateboard_sdk::HttpSnapshotStore::new("http://127.0.0.1:9/").unwrap();
        let app = build_router(AppState::new(Stateboard::with_store(store)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/state/activity/net")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
