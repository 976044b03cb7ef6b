use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{notify::TracingNotifier, store::SqliteTripStore, trips::TripService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub trips: TripService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let store = SqliteTripStore::new(db);
        let trips = TripService::new(
            Arc::new(store),
            Arc::new(TracingNotifier),
            config.duration_match,
        );
        Self { config, trips }
    }
}
