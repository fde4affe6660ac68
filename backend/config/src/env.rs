//! Environment variable substitution for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${}` escapes to a literal `${}`.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

static ESCAPED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$\{[A-Z_][A-Z0-9_]*\})").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Walks the entire tree recursively; only string leaves are processed.
/// Returns an error if any referenced env var is not set or is empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    // Protect escaped references before substitution.
    const ESCAPE_MARKER: &str = "\u{0}ESC\u{0}";
    let protected = ESCAPED_PATTERN.replace_all(s, format!("{ESCAPE_MARKER}$1")).to_string();

    let mut out = String::with_capacity(protected.len());
    let mut last = 0;
    for caps in ENV_VAR_PATTERN.captures_iter(&protected) {
        let m = caps.get(0).unwrap();
        // Skip matches that were escape-protected.
        if protected[..m.start()].ends_with(ESCAPE_MARKER) {
            continue;
        }
        let var_name = &caps[1];
        let value = env
            .get(var_name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MissingEnvVarError {
                var_name: var_name.to_string(),
                config_path: path.to_string(),
            })?;
        out.push_str(&protected[last..m.start()]);
        out.push_str(value);
        last = m.end();
    }
    out.push_str(&protected[last..]);
    Ok(out.replace(ESCAPE_MARKER, ""))
}
