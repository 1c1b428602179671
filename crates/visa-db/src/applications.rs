//! Application repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use visa_core::validation::validate_application;
use visa_core::{
    new_v7, Application, ApplicationPatch, ApplicationRepository, CreateApplicationRequest, Error,
    ListRequest, Listing, Result,
};

const APPLICATION_COLUMNS: &str =
    "id, title, visa_type, status, appointment_date, notes, created_at, updated_at";

/// PostgreSQL implementation of ApplicationRepository.
pub struct PgApplicationRepository {
    pool: Pool<Postgres>,
}

impl PgApplicationRepository {
    /// Create a new PgApplicationRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Parse an application row. Enum columns are constrained in the schema,
    /// so a parse failure means the table was written by something else.
    fn parse_row(row: PgRow) -> Result<Application> {
        let visa_type: String = row.get("visa_type");
        let status: String = row.get("status");
        Ok(Application {
            id: row.get("id"),
            title: row.get("title"),
            visa_type: visa_type.parse().map_err(Error::Internal)?,
            status: status.parse().map_err(Error::Internal)?,
            appointment_date: row.get("appointment_date"),
            notes: row.get("notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, req: CreateApplicationRequest) -> Result<Application> {
        let now = Utc::now();
        let draft = req.into_draft();
        validate_application(&draft, None, now)?;

        let id = new_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO application (id, title, visa_type, status, appointment_date, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(draft.visa_type.as_str())
        .bind(draft.status.as_str())
        .bind(draft.appointment_date)
        .bind(&draft.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "applications",
            op = "create",
            application_id = %id,
            visa_type = %draft.visa_type,
            "Application created"
        );
        Self::parse_row(row)
    }

    async fn list(&self, req: ListRequest) -> Result<Listing<Application>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM application")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        // LIMIT NULL is LIMIT ALL
        let rows = sqlx::query(&format!(
            "SELECT {APPLICATION_COLUMNS}
             FROM application
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(req.limit)
        .bind(req.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items = rows
            .into_iter()
            .map(Self::parse_row)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "applications",
            op = "list",
            result_count = items.len(),
            total,
            "Listed applications"
        );
        Ok(Listing { items, total })
    }

    async fn get(&self, id: Uuid) -> Result<Application> {
        let row = sqlx::query(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM application WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::ApplicationNotFound(id))?;

        Self::parse_row(row)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM application WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn update(&self, id: Uuid, patch: ApplicationPatch) -> Result<Application> {
        let current = self.get(id).await?;
        let now = Utc::now();
        let draft = patch.merge(&current);
        validate_application(&draft, Some(&current), now)?;

        let row = sqlx::query(&format!(
            "UPDATE application
             SET title = $2, visa_type = $3, status = $4, appointment_date = $5, notes = $6, updated_at = $7
             WHERE id = $1
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(draft.visa_type.as_str())
        .bind(draft.status.as_str())
        .bind(draft.appointment_date)
        .bind(&draft.notes)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        // Deleted between the read and the write
        .ok_or(Error::ApplicationNotFound(id))?;

        info!(
            subsystem = "db",
            component = "applications",
            op = "update",
            application_id = %id,
            status = %draft.status,
            "Application updated"
        );
        Self::parse_row(row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM application WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ApplicationNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "applications",
            op = "delete",
            application_id = %id,
            "Application deleted"
        );
        Ok(())
    }
}
