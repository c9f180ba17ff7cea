pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod files;
pub mod identity;
pub mod mailer;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;
pub mod tasks;
