//! Collection-scoped access to persisted documents.
//!
//! Each collection sits behind its own trait so handlers can be exercised
//! against in-memory stores. [`PgStore`] implements all of them on top of
//! the diesel pool.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CcApplication, NewCcApplication, NewMailRecord, NewStorageFile, StorageFile,
    StorageFileChanges,
};

mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record conflicts with an existing record")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(String),
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ApplicationStore: Send + Sync + 'static {
    async fn find_for_year(&self, uid: &str, year: i32) -> StoreResult<Option<CcApplication>>;

    /// Fails with [`StoreError::Conflict`] when `(uid, apply_year)` is taken.
    async fn insert(&self, application: NewCcApplication) -> StoreResult<CcApplication>;

    /// Ordered by `sent_time`; `None` lists every year.
    async fn list(&self, year: Option<i32>) -> StoreResult<Vec<CcApplication>>;
}

#[async_trait]
pub trait StorageFileStore: Send + Sync + 'static {
    async fn get(&self, id: Uuid) -> StoreResult<Option<StorageFile>>;

    /// Case-insensitive title lookup, optionally ignoring one record.
    async fn find_by_title(
        &self,
        title: &str,
        excluding: Option<Uuid>,
    ) -> StoreResult<Option<StorageFile>>;

    /// Ordered by `creation_time`.
    async fn list_by_filetype(&self, filetype: &str) -> StoreResult<Vec<StorageFile>>;

    /// Fails with [`StoreError::Conflict`] when the title is taken.
    async fn insert(&self, file: NewStorageFile) -> StoreResult<StorageFile>;

    /// Returns `None` when no record has this id.
    async fn update(&self, id: Uuid, changes: StorageFileChanges)
        -> StoreResult<Option<StorageFile>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait MailLog: Send + Sync + 'static {
    async fn record(&self, mail: NewMailRecord) -> StoreResult<()>;
}
