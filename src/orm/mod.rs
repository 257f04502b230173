//! The slice of the ORM a dialect plugs into.
//!
//! These are the collaborator contracts: the dialect implements [`Dialector`], renders into
//! a [`Statement`], and configures a [`Migrator`]. The handle ([`Db`]) carries what
//! `initialize` sets up.

pub mod clause;
pub mod dialector;
pub mod explain;
pub mod migrator;
pub mod schema;
pub mod statement;

pub use clause::{
    Assignment, Clause, ClauseBuilder, ClauseExpression, Column, Expr, OnConflict, Var,
    assignment_columns,
};
pub use dialector::Dialector;
pub use migrator::{Migrator, MigratorConfig};
pub use schema::{DataType, Field, Index, NamingStrategy, Schema};
pub use statement::Statement;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::GaussDbError;
use crate::pool::{ConnPool, DriverRegistry};
use crate::types::RowValues;

/// ORM-wide settings, adjusted by [`Dialector::apply`].
#[derive(Debug, Clone, Default)]
pub struct OrmConfig {
    pub naming_strategy: Option<NamingStrategy>,
    pub drivers: DriverRegistry,
}

/// Clause order used when rendering each kind of statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackConfig {
    pub create_clauses: Vec<String>,
    pub update_clauses: Vec<String>,
    pub delete_clauses: Vec<String>,
}

/// A database handle: the dialect plus what it set up.
pub struct Db {
    pub config: OrmConfig,
    pub dialector: Arc<dyn Dialector>,
    pub conn_pool: Option<Arc<dyn ConnPool>>,
    pub clause_builders: HashMap<String, ClauseBuilder>,
    pub callbacks: CallbackConfig,
}

impl Db {
    /// Apply the dialect to `config`, then initialize a handle.
    ///
    /// # Errors
    /// Returns the dialect's initialization error.
    pub async fn open(dialector: Arc<dyn Dialector>, mut config: OrmConfig) -> Result<Self, GaussDbError> {
        dialector.apply(&mut config);
        let mut db = Db {
            config,
            dialector: Arc::clone(&dialector),
            conn_pool: None,
            clause_builders: HashMap::new(),
            callbacks: CallbackConfig::default(),
        };
        dialector.initialize(&mut db).await?;
        Ok(db)
    }

    /// A fresh statement bound to this handle's dialect and clause builders.
    #[must_use]
    pub fn statement(&self) -> Statement {
        Statement::new(
            Arc::clone(&self.dialector),
            Arc::new(self.clause_builders.clone()),
        )
    }

    #[must_use]
    pub fn statement_for(&self, schema: Arc<Schema>) -> Statement {
        self.statement().with_schema(schema)
    }

    pub fn build_create(&self, stmt: &mut Statement) {
        stmt.build(&self.callbacks.create_clauses);
    }

    pub fn build_update(&self, stmt: &mut Statement) {
        stmt.build(&self.callbacks.update_clauses);
    }

    pub fn build_delete(&self, stmt: &mut Statement) {
        stmt.build(&self.callbacks.delete_clauses);
    }

    #[must_use]
    pub fn naming_strategy(&self) -> NamingStrategy {
        self.config.naming_strategy.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn migrator(&self) -> Migrator {
        self.dialector.migrator(self)
    }

    /// Run a finished statement on the handle's pool.
    ///
    /// # Errors
    /// Returns `GaussDbError::ConnectionError` when the handle has no pool, or the pool's error.
    pub async fn exec(&self, sql: &str, vars: &[RowValues]) -> Result<u64, GaussDbError> {
        let pool = self.conn_pool.as_ref().ok_or_else(|| {
            GaussDbError::ConnectionError("database handle has no connection pool".into())
        })?;
        tracing::debug!(sql = %self.dialector.explain(sql, vars), "exec");
        pool.exec(sql, vars).await
    }

    /// # Errors
    /// Returns the dialect's execution error.
    pub async fn savepoint(&self, name: &str) -> Result<(), GaussDbError> {
        self.dialector.savepoint(self, name).await
    }

    /// # Errors
    /// Returns the dialect's execution error.
    pub async fn rollback_to(&self, name: &str) -> Result<(), GaussDbError> {
        self.dialector.rollback_to(self, name).await
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builders: Vec<&String> = self.clause_builders.keys().collect();
        builders.sort();
        f.debug_struct("Db")
            .field("dialect", &self.dialector.name())
            .field("config", &self.config)
            .field("has_conn_pool", &self.conn_pool.is_some())
            .field("clause_builders", &builders)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
