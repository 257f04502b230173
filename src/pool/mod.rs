pub mod manager;
pub mod params;

pub use manager::{GaussManager, GaussPool};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GaussDbError;
use crate::types::RowValues;

/// Executes finished SQL on behalf of the ORM.
///
/// The dialect only needs statement execution (savepoints, migrations); anything that can
/// run a statement with bound values can stand in as the pool, including a transaction
/// handle owned by the host.
#[async_trait]
pub trait ConnPool: Send + Sync {
    /// Run `sql` with `vars` bound and return the number of rows affected.
    ///
    /// # Errors
    /// Returns an error if a connection cannot be acquired or the server rejects the statement.
    async fn exec(&self, sql: &str, vars: &[RowValues]) -> Result<u64, GaussDbError>;
}

/// Opens a pool for a data source string.
pub type DriverOpener =
    Arc<dyn Fn(&str) -> Result<Arc<dyn ConnPool>, GaussDbError> + Send + Sync>;

/// Named drivers that can open a pool from a data source string.
///
/// Used when the dialect is configured with a driver name instead of relying on the
/// built-in tokio-postgres pool.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, DriverOpener>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `opener` under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, opener: F)
    where
        F: Fn(&str) -> Result<Arc<dyn ConnPool>, GaussDbError> + Send + Sync + 'static,
    {
        self.drivers.insert(name.into(), Arc::new(opener));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Open a pool through the driver registered as `name`.
    ///
    /// # Errors
    /// Returns `GaussDbError::ConfigError` for an unknown driver, or whatever the opener returns.
    pub fn open(&self, name: &str, dsn: &str) -> Result<Arc<dyn ConnPool>, GaussDbError> {
        let opener = self.drivers.get(name).ok_or_else(|| {
            GaussDbError::ConfigError(format!("unknown driver {name:?} (forgotten register?)"))
        })?;
        opener(dsn)
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.drivers.keys().collect();
        names.sort();
        f.debug_struct("DriverRegistry")
            .field("drivers", &names)
            .finish()
    }
}
