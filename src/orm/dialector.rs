use async_trait::async_trait;

use super::clause::Expr;
use super::migrator::Migrator;
use super::schema::Field;
use super::{Db, OrmConfig};
use crate::error::GaussDbError;
use crate::types::RowValues;

/// Everything the ORM asks of a database dialect.
#[async_trait]
pub trait Dialector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Adjust the ORM configuration before the database handle is created.
    fn apply(&self, config: &mut OrmConfig);

    /// Set up the handle's connection pool, callbacks and clause builders.
    ///
    /// # Errors
    /// Returns an error when no pool can be built from the dialect's configuration.
    async fn initialize(&self, db: &mut Db) -> Result<(), GaussDbError>;

    fn migrator(&self, db: &Db) -> Migrator;

    fn data_type_of(&self, field: &Field) -> String;

    /// Column type used when altering an existing column.
    fn alter_data_type_of(&self, field: &Field) -> String {
        self.data_type_of(field)
    }

    fn default_value_of(&self, field: &Field) -> Expr;

    /// Write the placeholder for the last entry of `vars`.
    fn bind_var_to(&self, writer: &mut String, vars: &[RowValues]);

    fn quote_to(&self, writer: &mut String, ident: &str);

    fn quote(&self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        self.quote_to(&mut out, ident);
        out
    }

    fn explain(&self, sql: &str, vars: &[RowValues]) -> String;

    /// # Errors
    /// Returns the execution error when the savepoint cannot be created.
    async fn savepoint(&self, tx: &Db, name: &str) -> Result<(), GaussDbError>;

    /// # Errors
    /// Returns the execution error when the rollback fails.
    async fn rollback_to(&self, tx: &Db, name: &str) -> Result<(), GaussDbError>;
}
