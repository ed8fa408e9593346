use std::sync::Arc;

use sqlx::PgPool;

pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod ordering;
pub mod response;
pub mod services;
pub mod validate;

/// Shared application state, built once at startup and cloned into handlers.
/// Services are constructed from it per request; there is no DI container.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub mailer: Arc<dyn mail::Mailer>,
}
