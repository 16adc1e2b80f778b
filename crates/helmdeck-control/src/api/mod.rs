//! HTTP API for the console service.
//!
//! Provides endpoints for:
//! - Fetching the editable values document with its derived templates
//! - Submitting edited values for deployment
//! - Confirming an upgrade of an existing release
//! - Health checks

mod deploy;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;

use crate::config::HelmConfig;
use crate::reconcile::Reconciler;
use crate::workfile::ValuesFile;

pub use deploy::{DeployBody, DeployResponse, UpgradeBody, ValuesResponse};

/// Shared application state for the console service.
#[derive(Clone)]
pub struct AppState {
    /// Reconciler driving deployments.
    pub reconciler: Arc<Reconciler>,
    /// Source values document presented for editing.
    pub values_path: PathBuf,
    /// Defaults applied when a request omits deployment fields.
    pub defaults: HelmConfig,
    /// Handle to the values persisted by the most recent deployment, which a
    /// confirmed upgrade applies.
    pub last_persisted: Arc<Mutex<Option<ValuesFile>>>,
}

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_check))
        // Editing surface
        .route("/values", get(deploy::editor_values))
        // Deployment
        .route("/deploy", post(deploy::deploy))
        .route("/upgrade", post(deploy::upgrade))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse { status: "healthy" })
}

/// Health response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterBackend, CommandOutput, MockCluster};
    use crate::workfile::ValuesWorkdir;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const SAMPLE_VALUES: &str = "\
amf:
  replicas: 1
subscribers:
  - imsi: '001010000000001'
    enabled: true
";

    fn make_app_state(mock: MockCluster, dir: &tempfile::TempDir) -> AppState {
        let values_path = dir.path().join("values.yaml");
        std::fs::write(&values_path, SAMPLE_VALUES).unwrap();

        let cluster: Arc<dyn ClusterBackend> = Arc::new(mock);
        let workdir = ValuesWorkdir::new(dir.path().join("updated_values.yaml"));
        let reconciler = Arc::new(Reconciler::new(cluster, workdir));

        AppState {
            reconciler,
            values_path,
            defaults: HelmConfig::default(),
            last_persisted: Arc::new(Mutex::new(None)),
        }
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(make_app_state(MockCluster::default(), &dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn values_endpoint_returns_document_and_templates() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(make_app_state(MockCluster::default(), &dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/values")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["values"]["amf"]["replicas"], 1);
        assert_eq!(json["templates"]["subscribers"]["imsi"], "");
        assert_eq!(json["templates"]["subscribers"]["enabled"], false);
    }

    #[tokio::test]
    async fn deploy_installs_a_fresh_release() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockCluster::default().with_namespace("default");
        let app = router(make_app_state(mock, &dir));

        let body = serde_json::json!({
            "values": { "amf": { "replicas": 2 } }
        });
        let response = app.oneshot(post_json("/deploy", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["output"], "installed");
    }

    #[tokio::test]
    async fn deploy_reports_an_existing_release() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockCluster::default()
            .with_namespace("default")
            .with_release("default", "5gcore");
        let app = router(make_app_state(mock, &dir));

        let body = serde_json::json!({
            "values": { "amf": { "replicas": 2 } }
        });
        let response = app.oneshot(post_json("/deploy", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "exists");
        assert!(json["message"].as_str().unwrap().contains("5gcore"));
    }

    #[tokio::test]
    async fn deploy_surfaces_tool_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockCluster::default()
            .with_namespace("default")
            .with_install_result(CommandOutput::failed("chart not found"));
        let app = router(make_app_state(mock, &dir));

        let body = serde_json::json!({
            "values": { "amf": { "replicas": 2 } }
        });
        let response = app.oneshot(post_json("/deploy", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["output"], "chart not found");
    }

    #[tokio::test]
    async fn upgrade_without_prior_deploy_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(make_app_state(MockCluster::default(), &dir));

        let body = serde_json::json!({});
        let response = app.oneshot(post_json("/upgrade", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn upgrade_after_deploy_applies_persisted_values() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockCluster::default()
            .with_namespace("default")
            .with_release("default", "5gcore");
        let state = make_app_state(mock, &dir);
        let app = router(state);

        let deploy_body = serde_json::json!({
            "values": { "amf": { "replicas": 2 } }
        });
        let response = app
            .clone()
            .oneshot(post_json("/deploy", &deploy_body))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["status"], "exists");

        let upgrade_body = serde_json::json!({});
        let response = app
            .oneshot(post_json("/upgrade", &upgrade_body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["output"], "upgraded");
    }
}
