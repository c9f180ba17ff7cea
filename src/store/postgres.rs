use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;
use uuid::Uuid;

use super::{ApplicationStore, MailLog, StorageFileStore, StoreError, StoreResult};
use crate::db::PgPool;
use crate::models::{
    CcApplication, NewCcApplication, NewMailRecord, NewStorageFile, StorageFile,
    StorageFileChanges,
};
use crate::schema::{cc_recruitments, mails, storage_files};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Diesel is synchronous; queries run on the blocking thread pool.
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| StoreError::Pool(err.to_string()))?;
            f(&mut conn)
        })
        .await?
    }
}

fn map_unique_violation(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::Conflict,
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn find_for_year(&self, uid: &str, year: i32) -> StoreResult<Option<CcApplication>> {
        let uid = uid.to_owned();
        self.with_conn(move |conn| {
            let found = cc_recruitments::table
                .filter(cc_recruitments::uid.eq(&uid))
                .filter(cc_recruitments::apply_year.eq(year))
                .select(CcApplication::as_select())
                .first(conn)
                .optional()?;
            Ok(found)
        })
        .await
    }

    async fn insert(&self, application: NewCcApplication) -> StoreResult<CcApplication> {
        self.with_conn(move |conn| {
            diesel::insert_into(cc_recruitments::table)
                .values(&application)
                .returning(CcApplication::as_returning())
                .get_result(conn)
                .map_err(map_unique_violation)
        })
        .await
    }

    async fn list(&self, year: Option<i32>) -> StoreResult<Vec<CcApplication>> {
        self.with_conn(move |conn| {
            let mut query = cc_recruitments::table
                .select(CcApplication::as_select())
                .into_boxed();
            if let Some(year) = year {
                query = query.filter(cc_recruitments::apply_year.eq(year));
            }
            let rows = query.order(cc_recruitments::sent_time.asc()).load(conn)?;
            Ok(rows)
        })
        .await
    }
}

#[async_trait]
impl StorageFileStore for PgStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<StorageFile>> {
        self.with_conn(move |conn| {
            let found = storage_files::table
                .find(id)
                .select(StorageFile::as_select())
                .first(conn)
                .optional()?;
            Ok(found)
        })
        .await
    }

    async fn find_by_title(
        &self,
        title: &str,
        excluding: Option<Uuid>,
    ) -> StoreResult<Option<StorageFile>> {
        let needle = title.to_owned();
        self.with_conn(move |conn| {
            let mut query = storage_files::table
                .filter(lower(storage_files::title).eq(lower(needle)))
                .select(StorageFile::as_select())
                .into_boxed();
            if let Some(id) = excluding {
                query = query.filter(storage_files::id.ne(id));
            }
            let found = query.first(conn).optional()?;
            Ok(found)
        })
        .await
    }

    async fn list_by_filetype(&self, filetype: &str) -> StoreResult<Vec<StorageFile>> {
        let filetype = filetype.to_owned();
        self.with_conn(move |conn| {
            let rows = storage_files::table
                .filter(storage_files::filetype.eq(&filetype))
                .order(storage_files::creation_time.asc())
                .select(StorageFile::as_select())
                .load(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn insert(&self, file: NewStorageFile) -> StoreResult<StorageFile> {
        self.with_conn(move |conn| {
            diesel::insert_into(storage_files::table)
                .values(&file)
                .returning(StorageFile::as_returning())
                .get_result(conn)
                .map_err(map_unique_violation)
        })
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: StorageFileChanges,
    ) -> StoreResult<Option<StorageFile>> {
        self.with_conn(move |conn| {
            diesel::update(storage_files::table.find(id))
                .set(&changes)
                .returning(StorageFile::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_unique_violation)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(storage_files::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl MailLog for PgStore {
    async fn record(&self, mail: NewMailRecord) -> StoreResult<()> {
        self.with_conn(move |conn| {
            diesel::insert_into(mails::table)
                .values(&mail)
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
