//! Document repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use visa_core::validation::validate_document;
use visa_core::{
    new_v7, CreateDocumentRequest, Document, DocumentPatch, DocumentRepository, Error, ListRequest,
    Listing, Result,
};

const DOCUMENT_COLUMNS: &str =
    "id, application_id, name, is_ready, notes, deadline, file_url, created_at, updated_at";

/// PostgreSQL implementation of DocumentRepository.
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    /// Create a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: PgRow) -> Document {
        Document {
            id: row.get("id"),
            application_id: row.get("application_id"),
            name: row.get("name"),
            is_ready: row.get("is_ready"),
            notes: row.get("notes"),
            deadline: row.get("deadline"),
            file_url: row.get("file_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, application_id: Uuid, req: CreateDocumentRequest) -> Result<Document> {
        let now = Utc::now();
        let draft = req.into_draft();
        validate_document(&draft, None, now)?;

        let id = new_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO document (id, application_id, name, is_ready, notes, deadline, file_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(application_id)
        .bind(&draft.name)
        .bind(draft.is_ready)
        .bind(&draft.notes)
        .bind(draft.deadline)
        .bind(&draft.file_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "documents",
            op = "create",
            document_id = %id,
            application_id = %application_id,
            "Document created"
        );
        Ok(Self::parse_row(row))
    }

    async fn list_by_application(
        &self,
        application_id: Uuid,
        req: ListRequest,
    ) -> Result<Listing<Document>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document WHERE application_id = $1")
                .bind(application_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS}
             FROM document
             WHERE application_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(application_id)
        .bind(req.limit)
        .bind(req.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items: Vec<Document> = rows.into_iter().map(Self::parse_row).collect();
        debug!(
            subsystem = "db",
            component = "documents",
            op = "list_by_application",
            application_id = %application_id,
            result_count = items.len(),
            total,
            "Listed documents"
        );
        Ok(Listing { items, total })
    }

    async fn get(&self, id: Uuid) -> Result<Document> {
        let row = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM document WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::DocumentNotFound(id))?;

        Ok(Self::parse_row(row))
    }

    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let current = self.get(id).await?;
        let now = Utc::now();
        let draft = patch.merge(&current);
        validate_document(&draft, Some(&current), now)?;

        // application_id is never part of the SET list
        let row = sqlx::query(&format!(
            "UPDATE document
             SET name = $2, is_ready = $3, notes = $4, deadline = $5, file_url = $6, updated_at = $7
             WHERE id = $1
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(draft.is_ready)
        .bind(&draft.notes)
        .bind(draft.deadline)
        .bind(&draft.file_url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::DocumentNotFound(id))?;

        info!(
            subsystem = "db",
            component = "documents",
            op = "update",
            document_id = %id,
            "Document updated"
        );
        Ok(Self::parse_row(row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM document WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::DocumentNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "documents",
            op = "delete",
            document_id = %id,
            "Document deleted"
        );
        Ok(())
    }

    async fn toggle_ready(&self, id: Uuid) -> Result<Document> {
        // Single statement: the negation happens inside the row lock, so
        // concurrent toggles on PostgreSQL do not lose updates.
        let row = sqlx::query(&format!(
            "UPDATE document
             SET is_ready = NOT is_ready, updated_at = $2
             WHERE id = $1
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::DocumentNotFound(id))?;

        let document = Self::parse_row(row);
        info!(
            subsystem = "db",
            component = "documents",
            op = "toggle_ready",
            document_id = %id,
            is_ready = document.is_ready,
            "Document readiness toggled"
        );
        Ok(document)
    }

    async fn delete_for_application(&self, application_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM document WHERE application_id = $1")
            .bind(application_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let removed = result.rows_affected();
        debug!(
            subsystem = "db",
            component = "documents",
            op = "delete_for_application",
            application_id = %application_id,
            cascade_count = removed,
            "Deleted documents of application"
        );
        Ok(removed)
    }
}
