use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::pool::ConnPool;

/// How the dialect connects and renders.
///
/// Loadable from any serde format; an externally owned pool can only be attached in code:
/// ```rust
/// use gaussdb_dialect::Config;
///
/// let config: Config = serde_json::from_str(
///     r#"{"dsn": "host=localhost user=gauss dbname=app", "prefer_simple_protocol": true}"#,
/// )
/// .unwrap();
/// assert!(config.prefer_simple_protocol);
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open the pool through this registered driver instead of the built-in one.
    pub driver_name: Option<String>,
    pub dsn: String,
    /// Write identifiers verbatim; the caller guarantees they are already safe.
    pub without_quoting_check: bool,
    /// Run statements over the simple query protocol.
    pub prefer_simple_protocol: bool,
    /// Leave `RETURNING` out of the create/update/delete clause lists.
    pub without_returning: bool,
    /// A pool owned by the caller; takes precedence over everything else.
    #[serde(skip)]
    pub conn: Option<Arc<dyn ConnPool>>,
}

impl Config {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = dsn.into();
        self
    }

    #[must_use]
    pub fn with_driver_name(mut self, name: impl Into<String>) -> Self {
        self.driver_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_conn(mut self, conn: Arc<dyn ConnPool>) -> Self {
        self.conn = Some(conn);
        self
    }

    #[must_use]
    pub fn without_quoting_check(mut self, enabled: bool) -> Self {
        self.without_quoting_check = enabled;
        self
    }

    #[must_use]
    pub fn prefer_simple_protocol(mut self, enabled: bool) -> Self {
        self.prefer_simple_protocol = enabled;
        self
    }

    #[must_use]
    pub fn without_returning(mut self, enabled: bool) -> Self {
        self.without_returning = enabled;
        self
    }
}

// Manual Debug implementation because the attached pool is a trait object
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("driver_name", &self.driver_name)
            .field("dsn", &self.dsn)
            .field("without_quoting_check", &self.without_quoting_check)
            .field("prefer_simple_protocol", &self.prefer_simple_protocol)
            .field("without_returning", &self.without_returning)
            .field("conn", &self.conn.as_ref().map(|_| "<ConnPool>"))
            .finish()
    }
}
