use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use tracing::debug;

use crate::middleware::auth::RequireSession;
use crate::service::DashboardView;
use crate::service::filter::SelectionRequest;
use crate::service::ingest::IngestReport;
use crate::{DashboardError, router::DashboardState};

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub report: IngestReport,
    pub view: DashboardView,
}

/// POST /api/upload -> multipart with a `file` field holding the CSV.
pub async fn upload(
    RequireSession(session): RequireSession,
    State(state): State<DashboardState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, DashboardError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(name = ?field.name(), "skipping multipart field");
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        debug!(file_name = ?file_name, size = bytes.len(), "received upload");

        let (report, view) = state.dashboard.on_upload(&session, &bytes).await?;
        return Ok(Json(UploadResponse { report, view }));
    }
    Err(DashboardError::MissingUpload)
}

/// GET /api/dashboard -> the unfiltered view.
pub async fn dashboard(
    RequireSession(session): RequireSession,
    State(state): State<DashboardState>,
) -> Result<Json<DashboardView>, DashboardError> {
    let view = state
        .dashboard
        .on_filter_change(&session, SelectionRequest::default())
        .await?;
    Ok(Json(view))
}

/// POST /api/dashboard/query -> the view under the given selection.
pub async fn query(
    RequireSession(session): RequireSession,
    State(state): State<DashboardState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<DashboardView>, DashboardError> {
    let view = state.dashboard.on_filter_change(&session, request).await?;
    Ok(Json(view))
}
