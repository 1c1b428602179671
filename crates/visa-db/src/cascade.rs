//! Parent/child integrity between applications and their documents.
//!
//! Every API path that creates a document or deletes an application goes
//! through [`CascadeCoordinator`]. Deletion is two sequential statements
//! (application, then its documents) rather than one transaction; a crash
//! between them leaves orphaned documents that no route can reach.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use visa_core::{
    ApplicationRepository, ApplicationWithDocuments, CreateDocumentRequest, Document,
    DocumentRepository, Error, ListRequest, Result,
};

/// Coordinates operations that span both repositories.
#[derive(Clone)]
pub struct CascadeCoordinator {
    applications: Arc<dyn ApplicationRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl CascadeCoordinator {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            applications,
            documents,
        }
    }

    /// Create a document after confirming its parent application exists.
    ///
    /// Returns [`Error::ParentNotFound`] and persists nothing when the parent
    /// is missing.
    pub async fn create_document(
        &self,
        application_id: Uuid,
        req: CreateDocumentRequest,
    ) -> Result<Document> {
        if !self.applications.exists(application_id).await? {
            warn!(
                subsystem = "db",
                component = "cascade",
                op = "create_document",
                application_id = %application_id,
                "Rejected document for missing application"
            );
            return Err(Error::ParentNotFound(application_id));
        }
        self.documents.create(application_id, req).await
    }

    /// Delete an application and then every document that references it.
    ///
    /// Returns the number of documents removed. A missing application fails
    /// before any document is touched.
    pub async fn delete_application(&self, id: Uuid) -> Result<u64> {
        let start = Instant::now();
        self.applications.delete(id).await?;
        let removed = self.documents.delete_for_application(id).await?;

        info!(
            subsystem = "db",
            component = "cascade",
            op = "delete_application",
            application_id = %id,
            cascade_count = removed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Application deleted with dependent documents"
        );
        Ok(removed)
    }

    /// Fetch an application with its documents, newest document first.
    pub async fn application_with_documents(&self, id: Uuid) -> Result<ApplicationWithDocuments> {
        let application = self.applications.get(id).await?;
        let documents = self
            .documents
            .list_by_application(id, ListRequest::all())
            .await?
            .items;
        Ok(ApplicationWithDocuments {
            application,
            documents,
        })
    }
}
