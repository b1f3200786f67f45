use crate::error::AgentError;
use serde_json::{Map, Value};

/// Config used when `CONFIG_JSON` is not set.
pub const DEFAULT_CONFIG_JSON: &str = "{}";

/// Hook configuration passed by Jobster in `CONFIG_JSON`.
///
/// This is the `with:` block of the hook entry in the job file, serialized
/// to JSON. It is kept as a loose JSON value: any well-formed JSON parses,
/// and shape problems only surface when the record reads `metrics` from it.
#[derive(Debug, Clone, PartialEq)]
pub struct HookConfig {
    raw: Value,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            raw: Value::Object(Map::new()),
        }
    }
}

impl HookConfig {
    /// Parse the raw `CONFIG_JSON` value, falling back to an empty object when unset.
    ///
    /// Only malformed JSON is an error here. Duplicate keys keep the last value.
    pub fn parse(raw: Option<&str>) -> Result<Self, AgentError> {
        let raw = raw.unwrap_or(DEFAULT_CONFIG_JSON);
        let raw = serde_json::from_str(raw).map_err(|e| AgentError::ConfigParse { source: e })?;
        Ok(Self { raw })
    }

    /// The `metrics` value to copy into the record's `custom` field.
    ///
    /// Present only when it is truthy (non-null, non-zero, non-empty). Fails
    /// when the config itself is not a JSON object.
    pub fn custom_metrics(&self) -> Result<Option<&Value>, AgentError> {
        let obj = self
            .raw
            .as_object()
            .ok_or_else(|| AgentError::ConfigNotObject {
                kind: json_kind(&self.raw),
            })?;
        Ok(obj.get("metrics").filter(|v| is_truthy(v)))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
