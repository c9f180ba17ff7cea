use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower::make::Shared;
use tracing_subscriber::EnvFilter;

use interfaces::config::AppConfig;
use interfaces::db;
use interfaces::files::HttpFileService;
use interfaces::mailer::GraphMailer;
use interfaces::routes::create_router;
use interfaces::state::AppState;
use interfaces::store::PgStore;
use interfaces::tasks::{MailWorker, TaskQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "interfaces",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        files_service_url = %config.files_service_url,
        mail_sender = %config.mail.sender_email,
        mail_log_enabled = config.mail_log_enabled,
        "loaded interfaces configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    {
        let pool = pool.clone();
        tokio::task::spawn_blocking(move || db::run_migrations(&pool)).await??;
    }

    let files = Arc::new(HttpFileService::new(
        config.files_service_url.clone(),
        config.inter_communication_secret.clone(),
    ));
    let mailer = Arc::new(GraphMailer::new(config.mail.clone()));
    let (tasks, receiver) = TaskQueue::new();
    tokio::spawn(MailWorker::new(receiver, mailer).run());

    let listen_addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let state = AppState::with_postgres(config, PgStore::new(pool), files, tasks);
    let router = create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, Shared::new(router))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
