//! # visa-db
//!
//! Storage layer for visa-tracker.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for applications and documents
//! - An in-memory store for development and tests
//! - The cascade coordinator that keeps documents tied to live applications
//!
//! ## Example
//!
//! ```rust,ignore
//! use visa_db::{CreateApplicationRequest, Database, PoolConfig, VisaType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect_with_config("postgres://localhost/visa_tracker", PoolConfig::new()).await?;
//!
//!     let application = db.applications.create(CreateApplicationRequest {
//!         title: "Blue Card for Berlin".to_string(),
//!         visa_type: VisaType::BlueCard,
//!         status: None,
//!         appointment_date: None,
//!         notes: None,
//!     }).await?;
//!
//!     println!("Created application: {}", application.id);
//!     db.close().await;
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use tracing::debug;

pub mod applications;
pub mod cascade;
pub mod documents;
pub mod memory;
pub mod pool;

// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use visa_core::*;

pub use applications::PgApplicationRepository;
pub use cascade::CascadeCoordinator;
pub use documents::PgDocumentRepository;
pub use memory::{MemoryApplicationRepository, MemoryDocumentRepository, MemoryStore};
pub use pool::{close_pool, create_pool_with_config, PoolConfig};

/// Combined storage context handed to the API layer.
///
/// Cloning is cheap: repositories are shared behind `Arc`s and the pool is
/// itself a handle.
#[derive(Clone)]
pub struct Database {
    /// Application repository.
    pub applications: Arc<dyn ApplicationRepository>,
    /// Document repository.
    pub documents: Arc<dyn DocumentRepository>,
    /// Cross-repository operations (parent checks, cascade delete).
    pub cascade: CascadeCoordinator,
    /// The PostgreSQL pool, absent for the in-memory backend.
    pool: Option<sqlx::Pool<sqlx::Postgres>>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        let applications: Arc<dyn ApplicationRepository> =
            Arc::new(PgApplicationRepository::new(pool.clone()));
        let documents: Arc<dyn DocumentRepository> =
            Arc::new(PgDocumentRepository::new(pool.clone()));
        Self::from_parts(applications, documents, Some(pool))
    }

    /// Create a Database backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::with_memory_store(MemoryStore::new())
    }

    /// Create a Database over an existing in-memory store.
    pub fn with_memory_store(store: MemoryStore) -> Self {
        Self::from_parts(
            Arc::new(store.applications()),
            Arc::new(store.documents()),
            None,
        )
    }

    fn from_parts(
        applications: Arc<dyn ApplicationRepository>,
        documents: Arc<dyn DocumentRepository>,
        pool: Option<sqlx::Pool<sqlx::Postgres>>,
    ) -> Self {
        Self {
            cascade: CascadeCoordinator::new(applications.clone(), documents.clone()),
            applications,
            documents,
            pool,
        }
    }

    /// Connect to `url` with the given pool sizing.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations. No-op for the in-memory backend.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        let Some(pool) = &self.pool else {
            debug!(
                subsystem = "db",
                op = "migrate",
                "In-memory backend, skipping migrations"
            );
            return Ok(());
        };
        sqlx::migrate!("../../migrations")
            .run(pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Backend name for logs and health output.
    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Release the storage backend. Closing the pool waits for in-flight
    /// queries to return their connections.
    pub async fn close(&self) {
        match &self.pool {
            Some(pool) => close_pool(pool).await,
            None => debug!(
                subsystem = "db",
                op = "close",
                "In-memory backend, nothing to close"
            ),
        }
    }
}
