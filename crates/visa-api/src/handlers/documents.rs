//! Document HTTP handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use visa_core::{CreateDocumentRequest, Document, DocumentPatch};

use super::parse_id;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::query_types::PageQuery;
use crate::AppState;

/// List the documents of an application, newest first.
///
/// GET /applications/:application_id/documents
#[utoipa::path(get, path = "/applications/{application_id}/documents", tag = "Documents",
    params(
        ("application_id" = uuid::Uuid, Path, description = "Owning application id"),
        PageQuery),
    responses(
        (status = 200, description = "Envelope with `data` holding the documents", body = [Document]),
        (status = 404, description = "Application does not exist")))]
pub async fn list_documents(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Document>>>, ApiError> {
    let application_id = parse_id(&application_id, "application")?;
    let Query(query) = query?;
    let (request, pagination) = query.list_request()?;

    // The repository returns an empty list for unknown parents.
    if !state.db.applications.exists(application_id).await? {
        return Err(visa_core::Error::ApplicationNotFound(application_id).into());
    }

    let listing = state
        .db
        .documents
        .list_by_application(application_id, request)
        .await?;
    Ok(Json(Envelope::listing(listing, pagination)))
}

/// Attach a document to an application.
///
/// POST /applications/:application_id/documents
#[utoipa::path(post, path = "/applications/{application_id}/documents", tag = "Documents",
    params(("application_id" = uuid::Uuid, Path, description = "Owning application id")),
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Created", body = Document),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Parent application does not exist")))]
pub async fn create_document(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    body: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Document>>), ApiError> {
    let application_id = parse_id(&application_id, "application")?;
    let Json(req) = body?;
    let document = state.db.cascade.create_document(application_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(document).with_message("Document added successfully")),
    ))
}

/// Get a single document.
///
/// GET /documents/:id
#[utoipa::path(get, path = "/documents/{id}", tag = "Documents",
    params(("id" = uuid::Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = Document),
        (status = 404, description = "Document does not exist")))]
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Document>>, ApiError> {
    let id = parse_id(&id, "document")?;
    let document = state.db.documents.get(id).await?;
    Ok(Json(Envelope::data(document)))
}

/// Update a document. The owning application cannot be changed.
///
/// PUT /documents/:id
#[utoipa::path(put, path = "/documents/{id}", tag = "Documents",
    params(("id" = uuid::Uuid, Path, description = "Document id")),
    request_body = DocumentPatch,
    responses(
        (status = 200, description = "Updated", body = Document),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Document does not exist")))]
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<DocumentPatch>, JsonRejection>,
) -> Result<Json<Envelope<Document>>, ApiError> {
    let id = parse_id(&id, "document")?;
    let Json(patch) = body?;
    let document = state.db.documents.update(id, patch).await?;
    Ok(Json(
        Envelope::data(document).with_message("Document updated successfully"),
    ))
}

/// Delete a single document.
///
/// DELETE /documents/:id
#[utoipa::path(delete, path = "/documents/{id}", tag = "Documents",
    params(("id" = uuid::Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Document does not exist")))]
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_id(&id, "document")?;
    state.db.documents.delete(id).await?;
    Ok(Json(Envelope::message("Document deleted successfully")))
}

/// Flip a document's readiness.
///
/// PATCH /documents/:id/toggle (PUT is accepted as well)
#[utoipa::path(patch, path = "/documents/{id}/toggle", tag = "Documents",
    params(("id" = uuid::Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Toggled", body = Document),
        (status = 404, description = "Document does not exist")))]
pub async fn toggle_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Document>>, ApiError> {
    let id = parse_id(&id, "document")?;
    let document = state.db.documents.toggle_ready(id).await?;
    let message = if document.is_ready {
        "Document marked as ready"
    } else {
        "Document marked as not ready"
    };
    Ok(Json(Envelope::data(document).with_message(message)))
}
