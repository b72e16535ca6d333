pub mod audit;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod money;
pub mod pricing;
pub mod response;
pub mod routes;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::audit::{ActivityRegistry, SessionStore};

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub sessions: SessionStore,
    pub activities: Arc<ActivityRegistry>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let sessions = SessionStore::new(config.session_idle);
        AppState {
            db,
            config,
            sessions,
            activities: Arc::new(routes::activity_registry()),
        }
    }
}
