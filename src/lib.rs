//! GaussDB dialect for a GORM-style ORM.
//!
//! [`GaussDialect`] plugs into the ORM through [`orm::Dialector`]: it sets up a bb8 pool of
//! tokio-postgres connections (or adopts one the caller supplies), quotes identifiers,
//! numbers placeholders `$1..$n`, maps schema fields to column types and renders upserts as
//! `ON DUPLICATE KEY UPDATE`.
//!
//! ```rust,no_run
//! use gaussdb_dialect::prelude::*;
//!
//! # async fn run() -> Result<(), GaussDbError> {
//! let db = Db::open(
//!     GaussDialect::open("host=localhost port=8000 user=gauss dbname=app TimeZone=Asia/Shanghai"),
//!     OrmConfig::default(),
//! )
//! .await?;
//! db.savepoint("sp1").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod dsn;
pub mod error;
pub mod orm;
pub mod pool;
pub mod prelude;
pub mod types;

pub use config::Config;
pub use dialect::GaussDialect;
pub use error::GaussDbError;
pub use types::{QueryExecMode, RowValues};
