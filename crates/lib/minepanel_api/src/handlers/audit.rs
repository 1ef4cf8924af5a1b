//! Audit log retrieval (ADMIN only).

use axum::Json;
use axum::extract::{Query, State};
use minepanel_core::audit::PageRequest;
use minepanel_core::audit::queries::list_audit_records;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{AuditListResponse, AuditQuery};

/// `GET /audit?page&limit`: newest-first page of audit records.
pub async fn list_audit_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<AuditListResponse>> {
    let request = page_request(&query);
    let page = list_audit_records(&state.pool, request).await?;
    Ok(Json(page.into()))
}

/// Unparsable values fall back to defaults; the rest is clamped.
fn page_request(query: &AuditQuery) -> PageRequest {
    let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
    PageRequest::clamped(parse(&query.page), parse(&query.limit))
}
