//! The GaussDB dialect.

pub mod data_type;
pub mod on_conflict;
pub mod quote;

pub use on_conflict::{CLAUSE_ON_CONFLICT, build_on_conflict, is_primary_or_unique_key};

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use crate::config::Config;
use crate::dsn::{NativeConfig, parse_config, time_zone_of};
use crate::error::GaussDbError;
use crate::orm::explain::explain_sql;
use crate::orm::{
    CallbackConfig, ClauseBuilder, Db, Dialector, Expr, Field, Migrator, MigratorConfig,
    NamingStrategy, OrmConfig,
};
use crate::pool::{ConnPool, GaussPool};
use crate::types::{QueryExecMode, RowValues};

/// Longest identifier the server accepts.
pub const DEFAULT_IDENTIFIER_LENGTH: usize = 63;

static NUMERIC_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("placeholder pattern is valid"));

/// GaussDB implementation of [`Dialector`].
#[derive(Debug, Clone, Default)]
pub struct GaussDialect {
    pub config: Config,
}

impl GaussDialect {
    /// Dialect for `dsn` with default settings.
    #[must_use]
    pub fn open(dsn: impl Into<String>) -> Arc<dyn Dialector> {
        Arc::new(Self {
            config: Config::new(dsn),
        })
    }

    #[must_use]
    pub fn new(config: Config) -> Arc<dyn Dialector> {
        Arc::new(Self { config })
    }

    /// Clause builders this dialect contributes, keyed by clause name.
    #[must_use]
    pub fn clause_builders(&self) -> HashMap<String, ClauseBuilder> {
        let mut builders: HashMap<String, ClauseBuilder> = HashMap::new();
        builders.insert(CLAUSE_ON_CONFLICT.to_string(), Arc::new(build_on_conflict));
        builders
    }

    fn callback_config(&self) -> CallbackConfig {
        let to_vec = |names: &[&str]| names.iter().map(|n| (*n).to_string()).collect::<Vec<_>>();
        let mut callbacks = CallbackConfig {
            create_clauses: to_vec(&["INSERT", "VALUES", "MERGE", "ON CONFLICT"]),
            update_clauses: to_vec(&["UPDATE", "SET", "FROM", "WHERE"]),
            delete_clauses: to_vec(&["DELETE", "FROM", "WHERE"]),
        };
        if !self.config.without_returning {
            callbacks.create_clauses.push("RETURNING".into());
            callbacks.update_clauses.push("RETURNING".into());
            callbacks.delete_clauses.push("RETURNING".into());
        }
        callbacks
    }

    fn open_pool(&self, db: &Db) -> Result<Arc<dyn ConnPool>, GaussDbError> {
        if let Some(conn) = &self.config.conn {
            tracing::debug!("using caller-supplied connection pool");
            return Ok(Arc::clone(conn));
        }

        if let Some(driver) = self.config.driver_name.as_deref().filter(|d| !d.is_empty()) {
            tracing::debug!(driver, "opening pool through registered driver");
            return db.config.drivers.open(driver, &self.config.dsn);
        }

        let native = self.native_config()?;
        tracing::debug!(
            exec_mode = ?native.default_query_exec_mode,
            runtime_params = ?native.runtime_params,
            "opening gaussdb pool"
        );
        Ok(Arc::new(GaussPool::open(native)))
    }

    /// Driver configuration for the built-in pool: the parsed DSN, the forced
    /// simple protocol and the time zone as the `timezone` runtime parameter.
    ///
    /// # Errors
    /// Returns `GaussDbError::ConfigError` when the DSN cannot be parsed.
    pub fn native_config(&self) -> Result<NativeConfig, GaussDbError> {
        let mut native = parse_config(&self.config.dsn)?;
        if self.config.prefer_simple_protocol {
            native.default_query_exec_mode = QueryExecMode::SimpleProtocol;
        }
        if let Some(tz) = time_zone_of(&self.config.dsn) {
            native.runtime_params.insert("timezone".into(), tz.to_string());
        }
        Ok(native)
    }
}

#[async_trait]
impl Dialector for GaussDialect {
    fn name(&self) -> &'static str {
        "gaussdb"
    }

    fn apply(&self, config: &mut OrmConfig) {
        match config.naming_strategy.as_mut() {
            None => {
                config.naming_strategy = Some(NamingStrategy {
                    identifier_max_length: DEFAULT_IDENTIFIER_LENGTH,
                });
            }
            Some(naming) if naming.identifier_max_length == 0 => {
                naming.identifier_max_length = DEFAULT_IDENTIFIER_LENGTH;
            }
            Some(_) => {}
        }
    }

    async fn initialize(&self, db: &mut Db) -> Result<(), GaussDbError> {
        db.callbacks = self.callback_config();
        db.conn_pool = Some(self.open_pool(db)?);
        for (name, builder) in self.clause_builders() {
            db.clause_builders.entry(name).or_insert(builder);
        }
        Ok(())
    }

    fn migrator(&self, db: &Db) -> Migrator {
        Migrator::new(
            db,
            MigratorConfig {
                create_index_after_create_table: true,
            },
        )
    }

    fn data_type_of(&self, field: &Field) -> String {
        data_type::data_type_of(field)
    }

    fn alter_data_type_of(&self, field: &Field) -> String {
        data_type::alter_data_type_of(field)
    }

    fn default_value_of(&self, _field: &Field) -> Expr {
        Expr::new("DEFAULT")
    }

    fn bind_var_to(&self, writer: &mut String, vars: &[RowValues]) {
        let marker = usize::from(vars.first().is_some_and(RowValues::is_exec_mode));
        writer.push('$');
        writer.push_str(&(vars.len() - marker).to_string());
    }

    fn quote_to(&self, writer: &mut String, ident: &str) {
        if self.config.without_quoting_check {
            writer.push_str(ident);
            return;
        }
        quote::quote_to(writer, ident);
    }

    fn explain(&self, sql: &str, vars: &[RowValues]) -> String {
        explain_sql(sql, &NUMERIC_PLACEHOLDER, "'", vars)
    }

    async fn savepoint(&self, tx: &Db, name: &str) -> Result<(), GaussDbError> {
        tracing::debug!(savepoint = name, "create savepoint");
        tx.exec(&format!("SAVEPOINT {name}"), &[]).await?;
        Ok(())
    }

    async fn rollback_to(&self, tx: &Db, name: &str) -> Result<(), GaussDbError> {
        tracing::debug!(savepoint = name, "rollback to savepoint");
        tx.exec(&format!("ROLLBACK TO SAVEPOINT {name}"), &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::{Column, DataType, Var};

    fn statement(dialect: GaussDialect) -> crate::orm::Statement {
        crate::orm::Statement::new(Arc::new(dialect), Arc::new(HashMap::new()))
    }

    #[test]
    fn name_is_fixed() {
        assert_eq!(GaussDialect::default().name(), "gaussdb");
    }

    #[test]
    fn apply_sets_identifier_limit() {
        let dialect = GaussDialect::default();
        let mut config = OrmConfig::default();
        dialect.apply(&mut config);
        assert_eq!(
            config.naming_strategy.as_ref().unwrap().identifier_max_length,
            DEFAULT_IDENTIFIER_LENGTH
        );

        let mut config = OrmConfig {
            naming_strategy: Some(NamingStrategy {
                identifier_max_length: 0,
            }),
            ..OrmConfig::default()
        };
        dialect.apply(&mut config);
        assert_eq!(config.naming_strategy.unwrap().identifier_max_length, 63);
    }

    #[test]
    fn apply_keeps_configured_limit() {
        let mut config = OrmConfig {
            naming_strategy: Some(NamingStrategy {
                identifier_max_length: 30,
            }),
            ..OrmConfig::default()
        };
        GaussDialect::default().apply(&mut config);
        assert_eq!(config.naming_strategy.unwrap().identifier_max_length, 30);
    }

    #[test]
    fn placeholders_count_bound_vars() {
        let mut stmt = statement(GaussDialect::default());
        stmt.add_var(&Var::Value(RowValues::Int(1)));
        stmt.write_str(", ");
        stmt.add_var(&Var::Value(RowValues::Text("a".into())));
        assert_eq!(stmt.sql, "$1, $2");
    }

    #[test]
    fn placeholders_skip_leading_exec_mode() {
        let mut stmt =
            statement(GaussDialect::default()).with_exec_mode(QueryExecMode::SimpleProtocol);
        stmt.add_var(&Var::Value(RowValues::Int(1)));
        stmt.write_char(' ');
        stmt.add_var(&Var::Value(RowValues::Int(2)));
        assert_eq!(stmt.sql, "$1 $2");
        assert_eq!(stmt.vars.len(), 3);
    }

    #[test]
    fn quoting_can_be_bypassed() {
        let dialect = GaussDialect {
            config: Config::default().without_quoting_check(true),
        };
        assert_eq!(dialect.quote("\"Weird\".name"), "\"Weird\".name");
        assert_eq!(GaussDialect::default().quote("a.b"), "\"a\".\"b\"");
    }

    #[test]
    fn default_value_is_keyword() {
        let dialect = GaussDialect::default();
        let field = Field::new("created_at", DataType::Time);
        assert_eq!(dialect.default_value_of(&field), Expr::new("DEFAULT"));

        let mut stmt = statement(dialect);
        stmt.add_default_value(&field);
        assert_eq!(stmt.sql, "DEFAULT");
    }

    #[test]
    fn explain_inlines_values() {
        let dialect = GaussDialect::default();
        let sql = "INSERT INTO \"users\" (\"name\",\"age\") VALUES ($1,$2)";
        let vars = [RowValues::Text("jinzhu".into()), RowValues::Int(18)];
        assert_eq!(
            dialect.explain(sql, &vars),
            "INSERT INTO \"users\" (\"name\",\"age\") VALUES ('jinzhu',18)"
        );
    }

    #[test]
    fn callbacks_include_returning_unless_disabled() {
        let with = GaussDialect::default().callback_config();
        assert_eq!(with.create_clauses.last().map(String::as_str), Some("RETURNING"));
        assert_eq!(with.delete_clauses, vec!["DELETE", "FROM", "WHERE", "RETURNING"]);

        let without = GaussDialect {
            config: Config::default().without_returning(true),
        }
        .callback_config();
        assert_eq!(without.create_clauses, vec!["INSERT", "VALUES", "MERGE", "ON CONFLICT"]);
        assert_eq!(without.update_clauses, vec!["UPDATE", "SET", "FROM", "WHERE"]);
    }

    #[test]
    fn native_config_forces_simple_protocol_and_time_zone() {
        let dialect = GaussDialect {
            config: Config::default()
                .with_dsn("postgres://gauss:pw@localhost:8000/app?sslmode=disable&time_zone=UTC&connect_timeout=5")
                .prefer_simple_protocol(true),
        };
        let native = dialect.native_config().unwrap();
        assert_eq!(native.default_query_exec_mode, QueryExecMode::SimpleProtocol);
        assert_eq!(native.runtime_params.get("timezone").map(String::as_str), Some("UTC"));
        assert_eq!(native.pg_config.get_dbname(), Some("app"));
        assert_eq!(
            native.into_pg_config().get_options(),
            Some("-c timezone=UTC")
        );
    }

    #[test]
    fn native_config_defaults() {
        let dialect = GaussDialect {
            config: Config::new("host=localhost user=gauss dbname=app"),
        };
        let native = dialect.native_config().unwrap();
        assert_eq!(native.default_query_exec_mode, QueryExecMode::CacheStatement);
        assert!(native.runtime_params.is_empty());

        let empty_tz = GaussDialect {
            config: Config::new("host=localhost dbname=app TimeZone="),
        };
        assert!(empty_tz.native_config().unwrap().runtime_params.is_empty());
    }

    #[test]
    fn native_config_rejects_bad_dsn() {
        let dialect = GaussDialect {
            config: Config::new("host=localhost port=notaport"),
        };
        assert!(matches!(
            dialect.native_config(),
            Err(GaussDbError::ConfigError(_))
        ));
    }

    #[test]
    fn quoted_columns_go_through_dialect() {
        let mut stmt = statement(GaussDialect::default());
        stmt.write_quoted(&Column::qualified("public.users", "name"));
        assert_eq!(stmt.sql, "\"public\".\"users\".\"name\"");
    }
}
