use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use bb8::{ManageConnection, Pool};
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use super::ConnPool;
use super::params::{bind_params, interpolate_literals};
use crate::dsn::NativeConfig;
use crate::error::GaussDbError;
use crate::types::{QueryExecMode, RowValues};

/// bb8 manager for GaussDB clients.
pub struct GaussManager {
    pub(crate) config: tokio_postgres::Config,
}

impl GaussManager {
    #[must_use]
    pub fn new(config: tokio_postgres::Config) -> Self {
        Self { config }
    }
}

impl ManageConnection for GaussManager {
    type Connection = Client;
    type Error = tokio_postgres::Error;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let cfg = self.config.clone();
        async move {
            tracing::debug!(
                hosts = ?cfg.get_hosts(),
                dbname = ?cfg.get_dbname(),
                user = ?cfg.get_user(),
                "gaussdb connect start"
            );
            let (client, connection) = cfg.connect(NoTls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::warn!(error = %e, "gaussdb connection closed with error");
                }
            });
            Ok(client)
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move { conn.simple_query("SELECT 1").await.map(|_| ()) }
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_closed()
    }
}

/// Lazily connecting pool built from a parsed data source.
#[derive(Clone)]
pub struct GaussPool {
    pool: Pool<GaussManager>,
    exec_mode: QueryExecMode,
}

impl GaussPool {
    /// Build a pool from `config`. No connection is made until the first statement runs.
    ///
    /// Must be called from within a tokio runtime; bb8 spawns its reaper task here.
    #[must_use]
    pub fn open(config: NativeConfig) -> Self {
        let exec_mode = config.default_query_exec_mode;
        let manager = GaussManager::new(config.into_pg_config());
        let pool = Pool::builder().build_unchecked(manager);
        Self { pool, exec_mode }
    }

    #[must_use]
    pub fn exec_mode(&self) -> QueryExecMode {
        self.exec_mode
    }

    /// The mode a statement runs under: a leading marker overrides the pool default.
    fn mode_for(&self, vars: &[RowValues]) -> QueryExecMode {
        vars.first()
            .and_then(RowValues::as_exec_mode)
            .unwrap_or(self.exec_mode)
    }
}

// Manual Debug implementation because bb8::Pool's Debug needs the manager to be Debug
impl fmt::Debug for GaussPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaussPool")
            .field("state", &self.pool.state())
            .field("exec_mode", &self.exec_mode)
            .finish()
    }
}

#[async_trait]
impl ConnPool for GaussPool {
    async fn exec(&self, sql: &str, vars: &[RowValues]) -> Result<u64, GaussDbError> {
        let conn = self.pool.get().await?;
        if self.mode_for(vars).is_simple_protocol() {
            let sql = interpolate_literals(sql, vars)?;
            let messages = conn.simple_query(&sql).await?;
            let rows = messages
                .iter()
                .map(|m| match m {
                    SimpleQueryMessage::CommandComplete(n) => *n,
                    _ => 0,
                })
                .sum();
            return Ok(rows);
        }

        let params = bind_params(vars);
        Ok(conn.execute(sql, &params).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsn::parse_config;

    fn pool(mode: QueryExecMode) -> Result<GaussPool, GaussDbError> {
        let mut native = parse_config("host=127.0.0.1 port=1 user=gauss dbname=app")?;
        native.default_query_exec_mode = mode;
        Ok(GaussPool::open(native))
    }

    #[test]
    fn leading_marker_overrides_pool_mode() -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let pool = pool(QueryExecMode::CacheStatement)?;
            assert_eq!(pool.exec_mode(), QueryExecMode::CacheStatement);

            let plain = [RowValues::Int(1)];
            assert_eq!(pool.mode_for(&plain), QueryExecMode::CacheStatement);
            assert_eq!(pool.mode_for(&[]), QueryExecMode::CacheStatement);

            let marked = [
                RowValues::ExecMode(QueryExecMode::SimpleProtocol),
                RowValues::Int(1),
            ];
            assert_eq!(pool.mode_for(&marked), QueryExecMode::SimpleProtocol);

            // Only a leading marker counts
            let trailing = [
                RowValues::Int(1),
                RowValues::ExecMode(QueryExecMode::SimpleProtocol),
            ];
            assert_eq!(pool.mode_for(&trailing), QueryExecMode::CacheStatement);
            Ok::<(), GaussDbError>(())
        })?;
        Ok(())
    }

    #[test]
    fn pool_default_comes_from_config() -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let pool = pool(QueryExecMode::SimpleProtocol)?;
            assert_eq!(pool.exec_mode(), QueryExecMode::SimpleProtocol);
            assert!(pool.mode_for(&[RowValues::Int(1)]).is_simple_protocol());
            let marked = [RowValues::ExecMode(QueryExecMode::Exec)];
            assert_eq!(pool.mode_for(&marked), QueryExecMode::Exec);
            Ok::<(), GaussDbError>(())
        })?;
        Ok(())
    }
}
