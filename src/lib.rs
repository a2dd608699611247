pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod normalize;
pub mod services;
pub mod store;
pub mod validation;

use std::sync::Arc;

pub use error::{Error, Result};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub connections: database::ConnectionManager,
    pub events: services::EventService,
    pub bookings: services::BookingService,
}

impl AppState {
    /// Builds the state with a connector chosen from `config.database.url`.
    /// No connection is opened until the first store access.
    pub fn new(config: config::Config) -> Arc<Self> {
        let connector = database::connector_for(&config.database);
        Self::with_connections(config, database::ConnectionManager::new(connector))
    }

    pub fn with_connections(
        config: config::Config,
        connections: database::ConnectionManager,
    ) -> Arc<Self> {
        Arc::new(Self {
            events: services::EventService::new(connections.clone()),
            bookings: services::BookingService::new(connections.clone()),
            connections,
            config,
        })
    }
}
