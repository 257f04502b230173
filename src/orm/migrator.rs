//! Generic DDL generation. Dialects pick the knobs in [`MigratorConfig`] and supply
//! column types through [`Dialector`].

use std::sync::Arc;

use super::dialector::Dialector;
use super::schema::{Field, Index, NamingStrategy, Schema};
use super::Db;
use crate::error::GaussDbError;
use crate::pool::ConnPool;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Emit indexes as separate `CREATE INDEX` statements after the table instead of
    /// inline in `CREATE TABLE`.
    pub create_index_after_create_table: bool,
}

pub struct Migrator {
    pub config: MigratorConfig,
    dialector: Arc<dyn Dialector>,
    naming: NamingStrategy,
    conn_pool: Option<Arc<dyn ConnPool>>,
}

impl Migrator {
    #[must_use]
    pub fn new(db: &Db, config: MigratorConfig) -> Self {
        Self {
            config,
            dialector: Arc::clone(&db.dialector),
            naming: db.naming_strategy(),
            conn_pool: db.conn_pool.clone(),
        }
    }

    /// Column type plus `NOT NULL`, `UNIQUE` and `DEFAULT` modifiers.
    #[must_use]
    pub fn full_data_type_of(&self, field: &Field) -> String {
        let mut sql = self.dialector.data_type_of(field);
        if field.not_null {
            sql.push_str(" NOT NULL");
        }
        if field.unique && !field.primary_key {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &field.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }

    fn index_name(&self, schema: &Schema, index: &Index) -> String {
        if index.name.is_empty() {
            self.naming.index_name(&schema.table, &index.columns.join("_"))
        } else {
            index.name.clone()
        }
    }

    fn quoted_list(&self, names: &[String]) -> String {
        let quoted: Vec<String> = names.iter().map(|n| self.dialector.quote(n)).collect();
        quoted.join(",")
    }

    /// Statements creating `schema`'s table, in execution order.
    #[must_use]
    pub fn create_table_statements(&self, schema: &Schema) -> Vec<String> {
        let mut columns: Vec<String> = schema
            .fields
            .iter()
            .map(|f| format!("{} {}", self.dialector.quote(&f.db_name), self.full_data_type_of(f)))
            .collect();

        let primary: Vec<String> = schema.primary_fields().map(|f| f.db_name.clone()).collect();
        if !primary.is_empty() {
            columns.push(format!("PRIMARY KEY ({})", self.quoted_list(&primary)));
        }

        if !self.config.create_index_after_create_table {
            for index in &schema.indexes {
                let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
                columns.push(format!(
                    "{kind} {} ({})",
                    self.dialector.quote(&self.index_name(schema, index)),
                    self.quoted_list(&index.columns)
                ));
            }
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} ({})",
            self.dialector.quote(&schema.table),
            columns.join(",")
        )];
        if self.config.create_index_after_create_table {
            statements.extend(
                schema
                    .indexes
                    .iter()
                    .map(|index| self.create_index_statement(schema, index)),
            );
        }
        statements
    }

    #[must_use]
    pub fn create_index_statement(&self, schema: &Schema, index: &Index) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {unique}INDEX IF NOT EXISTS {} ON {} ({})",
            self.dialector.quote(&self.index_name(schema, index)),
            self.dialector.quote(&schema.table),
            self.quoted_list(&index.columns)
        )
    }

    #[must_use]
    pub fn drop_table_statement(&self, schema: &Schema) -> String {
        format!(
            "DROP TABLE IF EXISTS {} CASCADE",
            self.dialector.quote(&schema.table)
        )
    }

    #[must_use]
    pub fn alter_column_statement(&self, schema: &Schema, field: &Field) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.dialector.quote(&schema.table),
            self.dialector.quote(&field.db_name),
            self.dialector.alter_data_type_of(field)
        )
    }

    async fn exec_all(&self, statements: &[String]) -> Result<(), GaussDbError> {
        let pool = self.conn_pool.as_ref().ok_or_else(|| {
            GaussDbError::ConnectionError("migrator has no connection pool".into())
        })?;
        for sql in statements {
            tracing::debug!(%sql, "migrate");
            pool.exec(sql, &[]).await?;
        }
        Ok(())
    }

    /// # Errors
    /// Returns the first execution error; later statements are not run.
    pub async fn create_table(&self, schema: &Schema) -> Result<(), GaussDbError> {
        self.exec_all(&self.create_table_statements(schema)).await
    }

    /// # Errors
    /// Returns the execution error.
    pub async fn drop_table(&self, schema: &Schema) -> Result<(), GaussDbError> {
        self.exec_all(&[self.drop_table_statement(schema)]).await
    }

    /// # Errors
    /// Returns `GaussDbError::ExecutionError` for an unknown column, or the execution error.
    pub async fn alter_column(&self, schema: &Schema, column: &str) -> Result<(), GaussDbError> {
        let field = schema.field_by_db_name(column).ok_or_else(|| {
            GaussDbError::ExecutionError(format!(
                "failed to look up field with name: {column}"
            ))
        })?;
        self.exec_all(&[self.alter_column_statement(schema, field)]).await
    }
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("dialect", &self.dialector.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
