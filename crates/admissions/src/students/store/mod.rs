use std::future::Future;

use tracing::info;

use super::domain::{NewStudent, StudentRecord};
use crate::config::{StorageBackend, StorageConfig};

mod postgres;
mod sqlite;

pub use postgres::PostgresStudentStore;
pub use sqlite::SqliteStudentStore;

/// Persistence for the `students` table.
///
/// Rows are created once and never updated or deleted.
pub trait StudentStore: Send + Sync {
    /// Create the table when it does not exist yet. Safe to call on every start.
    fn initialize(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert one applicant and return the generated id.
    fn insert(
        &self,
        student: &NewStudent,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Every stored record, ascending by id.
    fn list_all(&self) -> impl Future<Output = Result<Vec<StudentRecord>, StoreError>> + Send;
}

/// Error enumeration for record store failures.
///
/// The display text stays generic so driver details never reach HTTP clients; callers log the
/// source chain instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable")]
    Unavailable(#[source] sqlx::Error),
    #[error("record store rejected the statement")]
    Statement(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => Self::Unavailable(value),
            other => Self::Statement(other),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Unavailable(sqlx::Error::Io(value))
    }
}

/// Store selected by configuration.
#[derive(Debug, Clone)]
pub enum DatabaseStore {
    Sqlite(SqliteStudentStore),
    Postgres(PostgresStudentStore),
}

impl DatabaseStore {
    /// Open the configured backend and make sure the table exists.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let store = match &config.backend {
            StorageBackend::Sqlite { path } => {
                Self::Sqlite(SqliteStudentStore::open(path, config.max_connections).await?)
            }
            StorageBackend::Postgres { url } => {
                Self::Postgres(PostgresStudentStore::connect(url, config.max_connections).await?)
            }
        };

        store.initialize().await?;
        info!(
            backend = config.backend.label(),
            max_connections = config.max_connections,
            "record store ready"
        );
        Ok(store)
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Close the underlying pool; later statements fail as unavailable.
    pub async fn close(&self) {
        match self {
            Self::Sqlite(store) => store.close().await,
            Self::Postgres(store) => store.close().await,
        }
    }
}

impl StudentStore for DatabaseStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(store) => store.initialize().await,
            Self::Postgres(store) => store.initialize().await,
        }
    }

    async fn insert(&self, student: &NewStudent) -> Result<i64, StoreError> {
        match self {
            Self::Sqlite(store) => store.insert(student).await,
            Self::Postgres(store) => store.insert(student).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        match self {
            Self::Sqlite(store) => store.list_all().await,
            Self::Postgres(store) => store.list_all().await,
        }
    }
}
