use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values bound to a statement's placeholders.
///
/// A statement's variable list may start with [`RowValues::ExecMode`], which is not a
/// parameter but a per-statement override of how the driver runs the query. Placeholder
/// numbering skips it:
/// ```rust
/// use gaussdb_dialect::prelude::*;
///
/// let vars = vec![
///     RowValues::ExecMode(QueryExecMode::SimpleProtocol),
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
/// ];
/// # let _ = vars;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// Execution-mode marker; only meaningful as the first variable of a statement
    ExecMode(QueryExecMode),
}

impl RowValues {
    #[must_use]
    pub fn is_exec_mode(&self) -> bool {
        matches!(self, Self::ExecMode(_))
    }

    #[must_use]
    pub fn as_exec_mode(&self) -> Option<QueryExecMode> {
        if let RowValues::ExecMode(mode) = self {
            Some(*mode)
        } else {
            None
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

/// How the driver sends a statement to the server.
///
/// tokio-postgres always uses the extended protocol with an unnamed statement, so every
/// mode except [`QueryExecMode::SimpleProtocol`] executes the same way; the distinction
/// is kept so configurations written for other GaussDB drivers stay meaningful.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QueryExecMode {
    /// Prepare and cache statements (driver default)
    #[default]
    CacheStatement,
    /// Cache statement descriptions only
    CacheDescribe,
    /// Describe then execute on every call
    DescribeExec,
    /// Execute with text-encoded parameters, no describe round trip
    Exec,
    /// Simple query protocol; parameters are interpolated client side
    SimpleProtocol,
}

impl QueryExecMode {
    #[must_use]
    pub fn is_simple_protocol(self) -> bool {
        matches!(self, QueryExecMode::SimpleProtocol)
    }
}
