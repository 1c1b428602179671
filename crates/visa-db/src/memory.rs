//! In-memory storage backend.
//!
//! Backs local development and the API test suite. Both repositories share one
//! [`MemoryStore`], so the cascade coordinator sees the same state through
//! either handle.
//!
//! ## Usage
//!
//! ```rust
//! use visa_db::memory::MemoryStore;
//!
//! let store = MemoryStore::new().with_latency_ms(25);
//! let applications = store.applications();
//! let documents = store.documents();
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use visa_core::validation::{validate_application, validate_document};
use visa_core::{
    new_v7, Application, ApplicationPatch, ApplicationRepository, CreateApplicationRequest,
    CreateDocumentRequest, Document, DocumentPatch, DocumentRepository, Error, ListRequest,
    Listing, Result,
};

/// A record plus its insertion sequence, used to order records that share a
/// `created_at` timestamp.
#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    record: T,
}

#[derive(Debug, Default)]
struct StoreState {
    applications: HashMap<Uuid, Stored<Application>>,
    documents: HashMap<Uuid, Stored<Document>>,
    next_seq: u64,
}

impl StoreState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Shared in-memory state for applications and documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    latency: Duration,
}

impl MemoryStore {
    /// Create an empty store without latency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set simulated latency between the read and the write of a
    /// read-modify-write operation (readiness toggle).
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency = Duration::from_millis(latency_ms);
        self
    }

    /// Application repository over this store.
    pub fn applications(&self) -> MemoryApplicationRepository {
        MemoryApplicationRepository {
            store: self.clone(),
        }
    }

    /// Document repository over this store.
    pub fn documents(&self) -> MemoryDocumentRepository {
        MemoryDocumentRepository {
            store: self.clone(),
        }
    }

    /// Number of stored applications.
    pub fn application_count(&self) -> Result<usize> {
        Ok(self.lock()?.applications.len())
    }

    /// Number of stored documents across all applications.
    pub fn document_count(&self) -> Result<usize> {
        Ok(self.lock()?.documents.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }
}

/// Order newest first, then slice out the requested page.
fn paginate<T: Clone>(
    mut rows: Vec<&Stored<T>>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    req: ListRequest,
) -> Listing<T> {
    rows.sort_by(|a, b| {
        created_at(&b.record)
            .cmp(&created_at(&a.record))
            .then(b.seq.cmp(&a.seq))
    });

    let total = rows.len() as i64;
    let offset = req.offset.max(0) as usize;
    let limit = req
        .limit
        .map(|l| l.max(0) as usize)
        .unwrap_or(usize::MAX);

    let items = rows
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|s| s.record.clone())
        .collect();
    Listing { items, total }
}

// =============================================================================
// APPLICATIONS
// =============================================================================

/// In-memory implementation of ApplicationRepository.
#[derive(Debug, Clone)]
pub struct MemoryApplicationRepository {
    store: MemoryStore,
}

#[async_trait]
impl ApplicationRepository for MemoryApplicationRepository {
    async fn create(&self, req: CreateApplicationRequest) -> Result<Application> {
        let now = Utc::now();
        let draft = req.into_draft();
        validate_application(&draft, None, now)?;

        let application = Application {
            id: new_v7(),
            title: draft.title,
            visa_type: draft.visa_type,
            status: draft.status,
            appointment_date: draft.appointment_date,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.store.lock()?;
        let seq = state.next_seq();
        state.applications.insert(
            application.id,
            Stored {
                seq,
                record: application.clone(),
            },
        );

        info!(
            subsystem = "db",
            component = "memory",
            op = "create_application",
            application_id = %application.id,
            "Application created"
        );
        Ok(application)
    }

    async fn list(&self, req: ListRequest) -> Result<Listing<Application>> {
        let state = self.store.lock()?;
        let listing = paginate(
            state.applications.values().collect(),
            |a: &Application| a.created_at,
            req,
        );
        debug!(
            subsystem = "db",
            component = "memory",
            op = "list_applications",
            result_count = listing.items.len(),
            total = listing.total,
            "Listed applications"
        );
        Ok(listing)
    }

    async fn get(&self, id: Uuid) -> Result<Application> {
        self.store
            .lock()?
            .applications
            .get(&id)
            .map(|s| s.record.clone())
            .ok_or(Error::ApplicationNotFound(id))
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.store.lock()?.applications.contains_key(&id))
    }

    async fn update(&self, id: Uuid, patch: ApplicationPatch) -> Result<Application> {
        let current = self.get(id).await?;
        let now = Utc::now();
        let draft = patch.merge(&current);
        validate_application(&draft, Some(&current), now)?;

        let mut state = self.store.lock()?;
        let stored = state
            .applications
            .get_mut(&id)
            .ok_or(Error::ApplicationNotFound(id))?;

        let record = &mut stored.record;
        record.title = draft.title;
        record.visa_type = draft.visa_type;
        record.status = draft.status;
        record.appointment_date = draft.appointment_date;
        record.notes = draft.notes;
        record.updated_at = now;

        info!(
            subsystem = "db",
            component = "memory",
            op = "update_application",
            application_id = %id,
            "Application updated"
        );
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.store
            .lock()?
            .applications
            .remove(&id)
            .ok_or(Error::ApplicationNotFound(id))?;

        info!(
            subsystem = "db",
            component = "memory",
            op = "delete_application",
            application_id = %id,
            "Application deleted"
        );
        Ok(())
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// In-memory implementation of DocumentRepository.
#[derive(Debug, Clone)]
pub struct MemoryDocumentRepository {
    store: MemoryStore,
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn create(&self, application_id: Uuid, req: CreateDocumentRequest) -> Result<Document> {
        let now = Utc::now();
        let draft = req.into_draft();
        validate_document(&draft, None, now)?;

        let document = Document {
            id: new_v7(),
            application_id,
            name: draft.name,
            is_ready: draft.is_ready,
            notes: draft.notes,
            deadline: draft.deadline,
            file_url: draft.file_url,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.store.lock()?;
        let seq = state.next_seq();
        state.documents.insert(
            document.id,
            Stored {
                seq,
                record: document.clone(),
            },
        );

        info!(
            subsystem = "db",
            component = "memory",
            op = "create_document",
            document_id = %document.id,
            application_id = %application_id,
            "Document created"
        );
        Ok(document)
    }

    async fn list_by_application(
        &self,
        application_id: Uuid,
        req: ListRequest,
    ) -> Result<Listing<Document>> {
        let state = self.store.lock()?;
        let rows = state
            .documents
            .values()
            .filter(|s| s.record.application_id == application_id)
            .collect();
        Ok(paginate(rows, |d: &Document| d.created_at, req))
    }

    async fn get(&self, id: Uuid) -> Result<Document> {
        self.store
            .lock()?
            .documents
            .get(&id)
            .map(|s| s.record.clone())
            .ok_or(Error::DocumentNotFound(id))
    }

    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let current = self.get(id).await?;
        let now = Utc::now();
        let draft = patch.merge(&current);
        validate_document(&draft, Some(&current), now)?;

        let mut state = self.store.lock()?;
        let stored = state
            .documents
            .get_mut(&id)
            .ok_or(Error::DocumentNotFound(id))?;

        let record = &mut stored.record;
        record.name = draft.name;
        record.is_ready = draft.is_ready;
        record.notes = draft.notes;
        record.deadline = draft.deadline;
        record.file_url = draft.file_url;
        record.updated_at = now;

        info!(
            subsystem = "db",
            component = "memory",
            op = "update_document",
            document_id = %id,
            "Document updated"
        );
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.store
            .lock()?
            .documents
            .remove(&id)
            .ok_or(Error::DocumentNotFound(id))?;

        info!(
            subsystem = "db",
            component = "memory",
            op = "delete_document",
            document_id = %id,
            "Document deleted"
        );
        Ok(())
    }

    async fn toggle_ready(&self, id: Uuid) -> Result<Document> {
        // Read, then write the negation of what was read. Concurrent callers
        // that read the same value write the same result.
        let observed = self.get(id).await?.is_ready;

        if !self.store.latency.is_zero() {
            tokio::time::sleep(self.store.latency).await;
        }

        let mut state = self.store.lock()?;
        let stored = state
            .documents
            .get_mut(&id)
            .ok_or(Error::DocumentNotFound(id))?;
        stored.record.is_ready = !observed;
        stored.record.updated_at = Utc::now();

        debug!(
            subsystem = "db",
            component = "memory",
            op = "toggle_ready",
            document_id = %id,
            is_ready = stored.record.is_ready,
            "Document readiness toggled"
        );
        Ok(stored.record.clone())
    }

    async fn delete_for_application(&self, application_id: Uuid) -> Result<u64> {
        let mut state = self.store.lock()?;
        let before = state.documents.len();
        state
            .documents
            .retain(|_, s| s.record.application_id != application_id);
        let removed = (before - state.documents.len()) as u64;

        debug!(
            subsystem = "db",
            component = "memory",
            op = "delete_for_application",
            application_id = %application_id,
            cascade_count = removed,
            "Deleted documents of application"
        );
        Ok(removed)
    }
}
