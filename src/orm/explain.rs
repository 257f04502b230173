use regex::{Captures, Regex};

use crate::types::RowValues;

/// Render `sql` for logging by replacing placeholders matched by `placeholder` with
/// literal forms of `vars`. The pattern's first capture group must be the 1-based ordinal.
///
/// Execution-mode markers are not values and are dropped before numbering. Placeholders
/// without a matching value are left untouched.
#[must_use]
pub fn explain_sql(sql: &str, placeholder: &Regex, escaper: &str, vars: &[RowValues]) -> String {
    let values: Vec<String> = vars
        .iter()
        .filter(|v| !v.is_exec_mode())
        .map(|v| format_value(v, escaper))
        .collect();

    placeholder
        .replace_all(sql, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| values.get(i))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn format_value(value: &RowValues, escaper: &str) -> String {
    let quote = |s: &str| {
        let doubled = format!("{escaper}{escaper}");
        format!("{escaper}{}{escaper}", s.replace(escaper, &doubled))
    };
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) => f.to_string(),
        RowValues::Text(s) => quote(s),
        RowValues::Bool(b) => b.to_string(),
        RowValues::Timestamp(dt) => quote(&dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
        RowValues::Null | RowValues::ExecMode(_) => "NULL".to_string(),
        RowValues::JSON(js) => quote(&js.to_string()),
        RowValues::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) if s.chars().all(|c| !c.is_control() || c.is_whitespace()) => quote(s),
            _ => quote("<binary>"),
        },
    }
}
