use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User record returned by `/auth/me`.
///
/// The backend owns the shape; only `is_superuser` is interpreted here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// True only when `is_superuser` is the JSON boolean `true`.
    pub fn is_superuser(&self) -> bool {
        matches!(self.get("is_superuser"), Some(Value::Bool(true)))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
