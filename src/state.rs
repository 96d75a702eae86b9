use std::sync::Arc;

use sqlx::SqlitePool;

use crate::notify::Notifier;
use crate::services::attendance::Requirement;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notifier: Arc<dyn Notifier>,
    pub default_requirement: Requirement,
}
