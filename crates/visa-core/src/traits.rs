//! Repository traits for visa-tracker.
//!
//! These traits define the persistence contract that concrete stores must
//! satisfy. The PostgreSQL and in-memory stores in `visa-db` both implement
//! them, so the API and the cascade logic never depend on a specific backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// LISTING
// =============================================================================

/// Request for listing records, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Maximum results (None returns everything from `offset` on)
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: i64,
}

impl ListRequest {
    /// Unbounded listing.
    pub fn all() -> Self {
        Self::default()
    }

    /// One page of `limit` items starting at `offset`.
    pub fn page(limit: i64, offset: i64) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }
}

/// A page of records plus the total number of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

// =============================================================================
// APPLICATION REPOSITORY
// =============================================================================

/// Repository for application CRUD operations.
///
/// Implementations validate with [`crate::validation::validate_application`]
/// before writing anything.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Validate and insert a new application.
    async fn create(&self, req: CreateApplicationRequest) -> Result<Application>;

    /// List applications ordered by `created_at` descending.
    async fn list(&self, req: ListRequest) -> Result<Listing<Application>>;

    /// Fetch an application by ID.
    async fn get(&self, id: Uuid) -> Result<Application>;

    /// Check if an application exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Merge a patch onto the stored application, validate, and persist.
    async fn update(&self, id: Uuid, patch: ApplicationPatch) -> Result<Application>;

    /// Delete the application row only. Dependent documents are removed by
    /// the cascade coordinator, never here.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

/// Repository for document CRUD operations.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Validate and insert a document under `application_id`.
    ///
    /// Does not check that the application exists; callers go through the
    /// cascade coordinator for that.
    async fn create(&self, application_id: Uuid, req: CreateDocumentRequest) -> Result<Document>;

    /// List the documents of one application ordered by `created_at` descending.
    ///
    /// A missing application and an application without documents both yield
    /// an empty listing.
    async fn list_by_application(
        &self,
        application_id: Uuid,
        req: ListRequest,
    ) -> Result<Listing<Document>>;

    /// Fetch a document by ID.
    async fn get(&self, id: Uuid) -> Result<Document>;

    /// Merge a patch onto the stored document, validate, and persist.
    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document>;

    /// Delete a single document.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Flip `is_ready` and return the updated document.
    ///
    /// Only sequential calls are guaranteed to observe each other: two
    /// toggles in a row restore the original value.
    async fn toggle_ready(&self, id: Uuid) -> Result<Document>;

    /// Delete every document of an application, returning how many were removed.
    async fn delete_for_application(&self, application_id: Uuid) -> Result<u64>;
}
