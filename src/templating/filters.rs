//! Custom Tera filters for role variable files.
//!
//! Role files are written for an Ansible-style workflow, where values coming
//! from charm config are frequently strings like `"yes"` or `"False"` that
//! need to be read as booleans.
//!
//! # Examples
//!
//! ```yaml
//! debug: {{ debug_mode | bool }}
//! use_ssl: {{ ssl_enabled | default(value="no") | bool }}
//! ```

use std::collections::HashMap;
use tera::{Tera, Value};

/// Register every filter in this module on `tera`.
pub fn register_all(tera: &mut Tera) {
    tera.register_filter("bool", bool_filter);
}

/// Coerce a value to a boolean the way Ansible's `bool` filter does.
///
/// - Booleans pass through
/// - Strings `yes`, `on`, `true`, `1`, `y` (any case) are true; other strings are false
/// - Numbers are true when non-zero
/// - `null` is false
///
/// Arrays and objects are rejected.
pub fn bool_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let truthy = match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "on" | "true" | "1" | "y")
        }
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Null => false,
        other => {
            return Err(tera::Error::msg(format!(
                "bool filter expects a scalar, got {}",
                if other.is_array() { "an array" } else { "an object" }
            )));
        }
    };
    Ok(Value::Bool(truthy))
}
