//! Store connection lifecycle.
//!
//! [`ConnectionManager`] is created once at startup and cloned into every
//! layer that needs the store. It holds either nothing, the single in-flight
//! connection attempt, or the established connection.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::store::{memory::MemoryConnector, postgres::PgStore, DocumentStore};

pub type Connection = Arc<dyn DocumentStore>;

type PendingConnection = Shared<BoxFuture<'static, Result<Connection, String>>>;

/// Opens a new store connection. Called at most once per attempt by the manager.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Connection>;
}

/// Postgres connector with pool sizing, acquire timeout and optional migrations.
#[derive(Debug, Clone)]
pub struct PgConnector {
    url: String,
    pool_size: u32,
    acquire_timeout: Duration,
    run_migrations: bool,
}

impl PgConnector {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            pool_size: config.pool_size,
            acquire_timeout: Duration::from_secs(config.connect_timeout_secs),
            run_migrations: config.run_migrations,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> Result<Connection> {
        let store = PgStore::connect(&self.url, self.pool_size, self.acquire_timeout).await?;
        if self.run_migrations {
            store.run_migrations().await?;
        }
        Ok(Arc::new(store))
    }
}

/// Picks the connector for the configured URL scheme.
pub fn connector_for(config: &DatabaseConfig) -> Arc<dyn Connector> {
    if config.url.starts_with("memory://") {
        info!("Using in-memory document store");
        Arc::new(MemoryConnector::default())
    } else {
        Arc::new(PgConnector::from_config(config))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connecting,
    Connected,
}

enum Slot {
    Unconnected,
    Connecting(PendingConnection),
    Connected(Connection),
}

#[derive(Clone)]
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    slot: Arc<Mutex<Slot>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slot: Arc::new(Mutex::new(Slot::Unconnected)),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        match &*self.slot.lock().await {
            Slot::Unconnected => ConnectionState::Unconnected,
            Slot::Connecting(_) => ConnectionState::Connecting,
            Slot::Connected(_) => ConnectionState::Connected,
        }
    }

    /// Returns the established connection, joining an attempt already in
    /// flight or starting one. A failed attempt leaves the manager
    /// `Unconnected` and every caller waiting on it receives the error.
    pub async fn get(&self) -> Result<Connection> {
        let pending = {
            let mut slot = self.slot.lock().await;
            let joined = match &*slot {
                Slot::Connected(conn) => return Ok(conn.clone()),
                Slot::Connecting(pending) => Some(pending.clone()),
                Slot::Unconnected => None,
            };
            match joined {
                Some(pending) => pending,
                None => {
                    info!("Connecting to document store");
                    let connector = self.connector.clone();
                    let pending = async move {
                        connector.connect().await.map_err(|e| match e {
                            Error::Connection(message) => message,
                            other => other.to_string(),
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Slot::Connecting(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.slot.lock().await;
        // Only the attempt we awaited may move the state; close() or a newer
        // attempt may have replaced it meanwhile.
        let current = matches!(&*slot, Slot::Connecting(p) if p.ptr_eq(&pending));
        match outcome {
            Ok(conn) => {
                if current {
                    info!("Document store connected");
                    *slot = Slot::Connected(conn.clone());
                    return Ok(conn);
                }
                // Another waiter on the same attempt already installed it
                if matches!(&*slot, Slot::Connected(c) if Arc::ptr_eq(c, &conn)) {
                    return Ok(conn);
                }
                // The attempt was discarded by close(); nobody owns this connection
                drop(slot);
                warn!("Closing connection established after teardown");
                conn.close().await;
                Err(Error::Connection("connection closed during connect".into()))
            }
            Err(message) => {
                if current {
                    warn!("Document store connection failed: {}", message);
                    *slot = Slot::Unconnected;
                }
                Err(Error::Connection(message))
            }
        }
    }

    /// Drops the cached connection (closing it) or the pending attempt. A
    /// discarded attempt that still succeeds is closed by its waiters.
    pub async fn close(&self) {
        let previous = {
            let mut slot = self.slot.lock().await;
            std::mem::replace(&mut *slot, Slot::Unconnected)
        };
        if let Slot::Connected(conn) = previous {
            conn.close().await;
            info!("Document store connection closed");
        }
    }
}
