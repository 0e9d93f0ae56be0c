pub mod api;
pub mod booking;
pub mod config;
pub mod db;
pub mod notifications;

pub use db::DbPool;

use config::Config;
use notifications::NotificationService;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub notifier: Arc<NotificationService>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, notifier: Arc<NotificationService>) -> Self {
        Self {
            config,
            db,
            notifier,
        }
    }
}
