//! Canonical JSON output (RFC 8785 / JCS).

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize `value` as canonical JSON.
///
/// Keys are sorted and numbers normalized, so equal values always produce
/// identical text. All `--json` output of the CLI goes through here.
///
/// ```rust
/// use serde::Serialize;
/// use tramite_utils::canonicalization::emit_jcs;
///
/// #[derive(Serialize)]
/// struct Out { b: u8, a: &'static str }
///
/// let json = emit_jcs(&Out { b: 1, a: "x" }).unwrap();
/// assert_eq!(json, r#"{"a":"x","b":1}"#);
/// ```
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}
