//! # annot-db
//!
//! PostgreSQL storage for annot notes.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgNoteRepository`], the tenant-scoped [`NoteStore`] implementation
//! - Schema migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use annot_db::{Database, NoteStore, ResourceRef, ResourceType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/annot").await?;
//!     let total = db
//!         .notes
//!         .count(1, ResourceRef::new(ResourceType::Event, 5), false)
//!         .await?;
//!     println!("{} public notes", total);
//!     Ok(())
//! }
//! ```
pub mod notes;
pub mod pool;

// Test fixtures for integration tests; needs migrations to build each test schema
#[cfg(feature = "migrations")]
pub mod test_fixtures;

// Re-export core types
pub use annot_core::*;

pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Pool plus the note repository sharing it.
pub struct Database {
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub notes: PgNoteRepository,
}

impl Database {
    /// Wrap an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool with default settings.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Open a pool with explicit settings.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations that have not run yet.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Consume the context, keeping only the note repository.
    pub fn into_notes(self) -> PgNoteRepository {
        self.notes
    }
}
