//! Deployment and editing endpoints.

use std::path::PathBuf;

use axum::{extract::State, http::StatusCode, Json};
use helmdeck_values::{derive_templates, ConfigDocument, TemplateRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::reconcile::{DeployOutcome, DeployRequest, UpgradeRequest};

use super::AppState;

/// Request body for a deployment.
///
/// Deployment fields are optional and fall back to the configured defaults;
/// the edited document travels under `values`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployBody {
    /// Target namespace.
    pub helm_namespace: Option<String>,
    /// Release name.
    pub helm_release_name: Option<String>,
    /// Path to the chart.
    pub helm_chart_path: Option<PathBuf>,
    /// kubeconfig for namespace operations.
    pub kubectl_config_path: Option<PathBuf>,
    /// The edited values document.
    pub values: ConfigDocument,
}

/// Request body for a confirmed upgrade.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeBody {
    /// Target namespace.
    pub helm_namespace: Option<String>,
    /// Release name.
    pub helm_release_name: Option<String>,
    /// Path to the chart.
    pub helm_chart_path: Option<PathBuf>,
}

/// Response for deployment operations.
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    /// One of "exists", "success" or "error".
    pub status: &'static str,
    /// Operator-facing message (confirmation prompts and the like).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Captured tool output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Response for the editing surface.
#[derive(Debug, Serialize)]
pub struct ValuesResponse {
    /// The current values document.
    pub values: ConfigDocument,
    /// Zero-valued template records keyed by dotted path.
    pub templates: IndexMap<String, TemplateRecord>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Fetch the editable values document together with its derived templates.
pub async fn editor_values(
    State(state): State<AppState>,
) -> Result<Json<ValuesResponse>, (StatusCode, Json<ErrorResponse>)> {
    match ConfigDocument::load(&state.values_path) {
        Ok(values) => {
            let templates = derive_templates(&values);
            Ok(Json(ValuesResponse { values, templates }))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Submit edited values for deployment.
pub async fn deploy(
    State(state): State<AppState>,
    Json(body): Json<DeployBody>,
) -> Result<Json<DeployResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = DeployRequest {
        namespace: body
            .helm_namespace
            .unwrap_or_else(|| state.defaults.namespace.clone()),
        release: body
            .helm_release_name
            .unwrap_or_else(|| state.defaults.release.clone()),
        chart_path: body
            .helm_chart_path
            .unwrap_or_else(|| state.defaults.chart_path.clone()),
        kubeconfig: body
            .kubectl_config_path
            .unwrap_or_else(|| state.defaults.kubeconfig.clone()),
        values: body.values,
    };

    info!(
        namespace = %request.namespace,
        release = %request.release,
        "deployment requested via API"
    );

    match state.reconciler.reconcile(&request).await {
        Ok((outcome, values_file)) => {
            *state.last_persisted.lock().await = Some(values_file);
            Ok(Json(outcome_response(outcome)))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Apply a confirmed upgrade using the values persisted by the prior
/// deployment submission.
pub async fn upgrade(
    State(state): State<AppState>,
    Json(body): Json<UpgradeBody>,
) -> Result<Json<DeployResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = UpgradeRequest {
        namespace: body
            .helm_namespace
            .unwrap_or_else(|| state.defaults.namespace.clone()),
        release: body
            .helm_release_name
            .unwrap_or_else(|| state.defaults.release.clone()),
        chart_path: body
            .helm_chart_path
            .unwrap_or_else(|| state.defaults.chart_path.clone()),
    };

    let Some(values_file) = state.last_persisted.lock().await.clone() else {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "no values persisted yet; submit a deployment first".to_owned(),
            }),
        ));
    };

    info!(
        namespace = %request.namespace,
        release = %request.release,
        "upgrade confirmed via API"
    );

    match state.reconciler.upgrade(&request, &values_file).await {
        Ok(outcome) => Ok(Json(outcome_response(outcome))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Map a reconciliation outcome onto the wire response.
fn outcome_response(outcome: DeployOutcome) -> DeployResponse {
    match outcome {
        DeployOutcome::NamespaceCreated { namespace } => DeployResponse {
            status: "success",
            message: Some(format!("namespace '{namespace}' created")),
            output: None,
        },
        DeployOutcome::ReleaseExists { message } => DeployResponse {
            status: "exists",
            message: Some(message),
            output: None,
        },
        DeployOutcome::Install { output } | DeployOutcome::Upgrade { output } => DeployResponse {
            status: "success",
            message: None,
            output: Some(output),
        },
        DeployOutcome::Error { detail } => DeployResponse {
            status: "error",
            message: None,
            output: Some(detail),
        },
    }
}
