use std::sync::Arc;

use crate::{
    config::AppConfig,
    files::FileService,
    store::{ApplicationStore, MailLog, PgStore, StorageFileStore},
    tasks::TaskQueue,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub applications: Arc<dyn ApplicationStore>,
    pub storage_files: Arc<dyn StorageFileStore>,
    /// Present only when `MAIL_LOG_ENABLED` is set.
    pub mail_log: Option<Arc<dyn MailLog>>,
    pub files: Arc<dyn FileService>,
    pub tasks: TaskQueue,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        applications: Arc<dyn ApplicationStore>,
        storage_files: Arc<dyn StorageFileStore>,
        mail_log: Option<Arc<dyn MailLog>>,
        files: Arc<dyn FileService>,
        tasks: TaskQueue,
    ) -> Self {
        Self {
            config: Arc::new(config),
            applications,
            storage_files,
            mail_log,
            files,
            tasks,
        }
    }

    /// Wires every collection to the same Postgres store.
    pub fn with_postgres(
        config: AppConfig,
        store: PgStore,
        files: Arc<dyn FileService>,
        tasks: TaskQueue,
    ) -> Self {
        let store = Arc::new(store);
        let mail_log: Option<Arc<dyn MailLog>> = if config.mail_log_enabled {
            Some(store.clone())
        } else {
            None
        };
        Self::new(config, store.clone(), store, mail_log, files, tasks)
    }
}
