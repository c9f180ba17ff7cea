use std::env;

use anyhow::{Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;

pub const DEFAULT_FILES_SERVICE_URL: &str = "http://files";
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.microsoft.com";
pub const DEFAULT_CC_NOTIFICATION_EMAIL: &str = "clubs@iiit.ac.in";
pub const DEFAULT_SIGNED_URL_MAX_SIZE_MB: u32 = 20;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub inter_communication_secret: String,
    pub files_service_url: String,
    pub signed_url_max_size_mb: u32,
    pub mail: MailConfig,
    pub cc_notification_email: String,
    pub mail_log_enabled: bool,
}

/// Client-credentials registration used to send mail through Microsoft Graph.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub sender_email: String,
    pub authority_url: String,
    pub graph_api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let inter_communication_secret = env::var("INTER_COMMUNICATION_SECRET")
            .context("INTER_COMMUNICATION_SECRET must be set")?;
        let files_service_url = env::var("FILES_SERVICE_URL")
            .unwrap_or_else(|_| DEFAULT_FILES_SERVICE_URL.to_string());
        let signed_url_max_size_mb = match env::var("SIGNED_URL_MAX_SIZE_MB") {
            Ok(value) => value
                .parse()
                .context("SIGNED_URL_MAX_SIZE_MB must be a positive integer")?,
            Err(_) => DEFAULT_SIGNED_URL_MAX_SIZE_MB,
        };
        let mail = MailConfig::from_env()?;
        let cc_notification_email = env::var("CC_NOTIFICATION_EMAIL")
            .unwrap_or_else(|_| DEFAULT_CC_NOTIFICATION_EMAIL.to_string());
        let mail_log_enabled = env::var("MAIL_LOG_ENABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            cors_allowed_origin,
            inter_communication_secret,
            files_service_url,
            signed_url_max_size_mb,
            mail,
            cc_notification_email,
            mail_log_enabled,
        })
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

impl MailConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            tenant_id: env::var("AD_TENANT_ID").context("AD_TENANT_ID must be set")?,
            client_id: env::var("AD_CLIENT_ID").context("AD_CLIENT_ID must be set")?,
            client_secret: env::var("AD_CLIENT_SECRET").context("AD_CLIENT_SECRET must be set")?,
            sender_email: env::var("AD_CLIENT_EMAIL").context("AD_CLIENT_EMAIL must be set")?,
            authority_url: env::var("AD_AUTHORITY_URL")
                .unwrap_or_else(|_| DEFAULT_AUTHORITY_URL.to_string()),
            graph_api_url: env::var("GRAPH_API_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_API_URL.to_string()),
        })
    }
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            let _ = parsed.set_password(Some("*****"));
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
