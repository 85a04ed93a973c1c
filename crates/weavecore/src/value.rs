use crate::NodeError;
use serde::{Deserialize, Serialize};

/// Dynamic value carried on ports and in node configuration.
pub type Value = serde_json::Value;

/// Output ports of a node, keyed by port name.
pub type PortMap = std::collections::BTreeMap<String, Value>;

/// Handler-specific configuration of a node (the `data` object on the wire).
///
/// The engine never looks inside. Handlers read it through the typed
/// accessors, which reject values of the wrong shape instead of coercing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeConfig(serde_json::Map<String, Value>);

impl NodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String value, or `None` when absent, null or empty.
    pub fn opt_str(&self, key: &str) -> Result<Option<String>, NodeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<String, NodeError> {
        self.opt_str(key)?
            .ok_or_else(|| NodeError::MissingConfig(key.to_string()))
    }

    pub fn str_or(&self, key: &str, default: &str) -> Result<String, NodeError> {
        Ok(self.opt_str(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, NodeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(default),
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(mismatch(key, "boolean", &Value::String(s.clone()))),
            },
            Some(other) => Err(mismatch(key, "boolean", other)),
        }
    }

    /// Float value; numeric strings are parsed, empty strings count as absent.
    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>, NodeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| mismatch(key, "number", &Value::Number(n.clone()))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| mismatch(key, "number", &Value::String(s.clone()))),
            Some(other) => Err(mismatch(key, "number", other)),
        }
    }

    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64, NodeError> {
        Ok(self.opt_f64(key)?.unwrap_or(default))
    }

    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64, NodeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| mismatch(key, "non-negative integer", &Value::Number(n.clone()))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(default),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| mismatch(key, "non-negative integer", &Value::String(s.clone()))),
            Some(other) => Err(mismatch(key, "non-negative integer", other)),
        }
    }
}

impl From<serde_json::Map<String, Value>> for NodeConfig {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Short type name of a JSON value for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(key: &str, expected: &str, actual: &Value) -> NodeError {
    NodeError::InvalidConfig {
        key: key.to_string(),
        expected: expected.to_string(),
        actual: format!("{} {}", type_name(actual), actual),
    }
}
