pub mod config;
pub mod controllers;
pub mod database;
pub mod errors;
pub mod models;
pub mod presentation;
pub mod services;
pub mod store;

use std::sync::Arc;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub store: store::PgAttendeeStore,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> Result<Arc<Self>, sqlx::Error> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        let store = store::PgAttendeeStore::new(db.pool.clone());
        Ok(Arc::new(Self { db, store, config }))
    }
}
