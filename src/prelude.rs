//! Convenient imports for common functionality.

pub use crate::config::Config;
pub use crate::dialect::GaussDialect;
pub use crate::error::GaussDbError;
pub use crate::orm::{
    Assignment, Clause, ClauseExpression, Column, DataType, Db, Dialector, Expr, Field, Index,
    Migrator, NamingStrategy, OnConflict, OrmConfig, Schema, Statement, Var, assignment_columns,
};
pub use crate::pool::{ConnPool, DriverRegistry, GaussPool};
pub use crate::types::{QueryExecMode, RowValues};
