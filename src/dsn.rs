//! Data source string parsing.
//!
//! GaussDB data sources come in the libpq key/value form (`host=... user=...`) or as a
//! `postgres://` URL. Both may carry a `time_zone`/`TimeZone` pair, which the server
//! expects as the `timezone` runtime parameter. tokio-postgres rejects keys it does not
//! know, so the pair is lifted out before the rest is handed to the driver.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::GaussDbError;
use crate::types::QueryExecMode;

static TIME_ZONE_MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(time_zone|TimeZone)=(.*?)($|&| )").expect("time zone pattern is valid")
});

// libpq quoting, e.g. `TimeZone='America/New York'`
static QUOTED_TIME_ZONE_MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(time_zone|TimeZone)='([^']*)'($|&| )").expect("time zone pattern is valid")
});

/// The time-zone pair in `dsn`; a quoted value wins over the bare form.
fn time_zone_captures(dsn: &str) -> Option<regex::Captures<'_>> {
    QUOTED_TIME_ZONE_MATCHER
        .captures(dsn)
        .or_else(|| TIME_ZONE_MATCHER.captures(dsn))
}

/// Extract the time zone carried by `dsn`, if any.
#[must_use]
pub fn time_zone_of(dsn: &str) -> Option<&str> {
    time_zone_captures(dsn)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|tz| !tz.is_empty())
}

/// Remove the first time-zone pair (and its separator) from `dsn`.
fn strip_time_zone(dsn: &str) -> String {
    let Some(found) = time_zone_captures(dsn).and_then(|caps| caps.get(0)) else {
        return dsn.to_string();
    };
    let mut out = String::with_capacity(dsn.len());
    out.push_str(&dsn[..found.start()]);
    out.push_str(&dsn[found.end()..]);
    let trimmed = out.trim_end_matches(['&', '?', ' ']);
    trimmed.to_string()
}

/// Driver configuration parsed from a data source string.
#[derive(Debug, Clone)]
pub struct NativeConfig {
    pub pg_config: tokio_postgres::Config,
    pub default_query_exec_mode: QueryExecMode,
    /// Server settings applied at connection startup (`-c key=value`).
    pub runtime_params: BTreeMap<String, String>,
}

impl NativeConfig {
    /// Fold runtime parameters into the startup `options` and return the driver config.
    #[must_use]
    pub fn into_pg_config(self) -> tokio_postgres::Config {
        let mut pg_config = self.pg_config;
        if self.runtime_params.is_empty() {
            return pg_config;
        }
        let mut options = pg_config.get_options().unwrap_or_default().to_string();
        for (key, value) in &self.runtime_params {
            if !options.is_empty() {
                options.push(' ');
            }
            options.push_str("-c ");
            options.push_str(key);
            options.push('=');
            options.push_str(&value.replace('\\', "\\\\").replace(' ', "\\ "));
        }
        pg_config.options(&options);
        pg_config
    }
}

/// Parse a data source string into a driver configuration.
///
/// # Errors
/// Returns `GaussDbError::ConfigError` when the driver cannot parse the data source.
pub fn parse_config(dsn: &str) -> Result<NativeConfig, GaussDbError> {
    let stripped = strip_time_zone(dsn);
    let pg_config = tokio_postgres::Config::from_str(&stripped)
        .map_err(|e| GaussDbError::ConfigError(format!("cannot parse data source: {e}")))?;
    Ok(NativeConfig {
        pg_config,
        default_query_exec_mode: QueryExecMode::default(),
        runtime_params: BTreeMap::new(),
    })
}
