//! Application HTTP handlers.
//!
//! Creation and updates are validated by the repository; deletion goes through
//! the cascade coordinator so dependent documents are removed as well.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use visa_core::{Application, ApplicationPatch, ApplicationWithDocuments, CreateApplicationRequest};

use super::parse_id;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::query_types::PageQuery;
use crate::AppState;

/// List applications, newest first.
///
/// GET /applications
#[utoipa::path(get, path = "/applications", tag = "Applications",
    params(PageQuery),
    responses(
        (status = 200, description = "Envelope with `data` holding the applications", body = [Application]),
        (status = 400, description = "Invalid pagination parameters")))]
pub async fn list_applications(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Application>>>, ApiError> {
    let Query(query) = query?;
    let (request, pagination) = query.list_request()?;
    let listing = state.db.applications.list(request).await?;
    Ok(Json(Envelope::listing(listing, pagination)))
}

/// Create an application.
///
/// POST /applications
#[utoipa::path(post, path = "/applications", tag = "Applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Created", body = Application),
        (status = 400, description = "Validation failed")))]
pub async fn create_application(
    State(state): State<AppState>,
    body: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Application>>), ApiError> {
    let Json(req) = body?;
    let application = state.db.applications.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(application).with_message("Application created successfully")),
    ))
}

/// Get an application together with its documents.
///
/// GET /applications/:id
#[utoipa::path(get, path = "/applications/{id}", tag = "Applications",
    params(("id" = uuid::Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application with nested documents", body = ApplicationWithDocuments),
        (status = 404, description = "Application does not exist")))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<ApplicationWithDocuments>>, ApiError> {
    let id = parse_id(&id, "application")?;
    let application = state.db.cascade.application_with_documents(id).await?;
    Ok(Json(Envelope::data(application)))
}

/// Update an application. Absent fields keep their stored values.
///
/// PUT /applications/:id
#[utoipa::path(put, path = "/applications/{id}", tag = "Applications",
    params(("id" = uuid::Uuid, Path, description = "Application id")),
    request_body = ApplicationPatch,
    responses(
        (status = 200, description = "Updated", body = Application),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Application does not exist")))]
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ApplicationPatch>, JsonRejection>,
) -> Result<Json<Envelope<Application>>, ApiError> {
    let id = parse_id(&id, "application")?;
    let Json(patch) = body?;
    let application = state.db.applications.update(id, patch).await?;
    Ok(Json(
        Envelope::data(application).with_message("Application updated successfully"),
    ))
}

/// Delete an application and all of its documents.
///
/// DELETE /applications/:id
#[utoipa::path(delete, path = "/applications/{id}", tag = "Applications",
    params(("id" = uuid::Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Deleted with its documents"),
        (status = 404, description = "Application does not exist")))]
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_id(&id, "application")?;
    let removed = state.db.cascade.delete_application(id).await?;
    info!(application_id = %id, cascade_count = removed, "Application removed");
    Ok(Json(Envelope::message(format!(
        "Application and {} associated document(s) deleted successfully",
        removed
    ))))
}
