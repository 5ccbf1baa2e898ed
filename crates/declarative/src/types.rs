//! Core types for reconciliation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use yangpath::Path;

use crate::error::{Error, Result};

/// Reconciliation policy applied to the desired config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMode {
    /// Union desired fields into the current config
    #[default]
    Merged,
    /// Rewrite every entity named in the desired config
    Replaced,
    /// Rewrite the whole resource to match the desired config
    Overridden,
    /// Remove what the desired config names (everything when it names nothing)
    Deleted,
}

impl StateMode {
    pub const ALL: [StateMode; 4] = [
        StateMode::Merged,
        StateMode::Replaced,
        StateMode::Overridden,
        StateMode::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Replaced => "replaced",
            Self::Overridden => "overridden",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for StateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                Error::invalid(
                    "state",
                    format!("value of state must be one of: merged, replaced, overridden, deleted, got: {s}"),
                )
            })
    }
}

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Patch,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutation sent to the device
///
/// `delete` never carries a payload; `patch` and `post` always carry a
/// single-key body named after the module-qualified terminal segment of the
/// path. The constructors are the only way to build an operation, so the
/// invariant holds for every value of this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    path: Path,
    method: Method,
    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Operation {
    /// PATCH `value` at `path`
    pub fn patch(path: Path, value: Value) -> Self {
        let payload = wrap(&path, value);
        Self {
            path,
            method: Method::Patch,
            payload: Some(payload),
        }
    }

    /// POST `value` at `path`
    pub fn post(path: Path, value: Value) -> Self {
        let payload = wrap(&path, value);
        Self {
            path,
            method: Method::Post,
            payload: Some(payload),
        }
    }

    /// DELETE the subtree at `path`
    pub fn delete(path: Path) -> Self {
        Self {
            path,
            method: Method::Delete,
            payload: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Full request body, e.g. `{"openconfig-system-ext:ciphers": "aes256-ctr"}`
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// The value inside the body, without its wrapping key
    pub fn value(&self) -> Option<&Value> {
        self.payload
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|body| body.values().next())
    }

    pub fn is_delete(&self) -> bool {
        self.method == Method::Delete
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

fn wrap(path: &Path, value: Value) -> Value {
    let mut body = Map::new();
    body.insert(path.qualified_leaf().unwrap_or_default(), value);
    Value::Object(body)
}

/// Summary of executed operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub patched: usize,
    pub posted: usize,
    pub deleted: usize,
    /// Operations not sent because the run was declined
    pub skipped: usize,
}

impl ExecuteSummary {
    /// Total number of operations the device accepted
    pub fn total_changes(&self) -> usize {
        self.patched + self.posted + self.deleted
    }

    /// Record an accepted operation
    pub fn add(&mut self, method: Method) {
        match method {
            Method::Patch => self.patched += 1,
            Method::Post => self.posted += 1,
            Method::Delete => self.deleted += 1,
            Method::Get => {}
        }
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ExecuteSummary) {
        self.patched += other.patched;
        self.posted += other.posted;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
    }
}

/// Outcome of one reconciliation run, shaped like a network resource module
/// result: `before`, `commands`, and either `after` or `after(generated)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub resource: String,
    pub state: StateMode,
    pub changed: bool,
    pub before: Value,
    pub commands: Vec<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    #[serde(rename = "after(generated)", skip_serializing_if = "Option::is_none")]
    pub after_generated: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(resource: &str, state: StateMode, before: Value) -> Self {
        Self {
            resource: resource.to_string(),
            state,
            changed: false,
            before,
            commands: Vec::new(),
            after: None,
            after_generated: None,
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    #[test]
    fn test_state_mode_parse() {
        assert_eq!("merged".parse::<StateMode>().unwrap(), StateMode::Merged);
        assert_eq!("overridden".parse::<StateMode>().unwrap(), StateMode::Overridden);
        let err = "purged".parse::<StateMode>().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert_eq!(StateMode::default(), StateMode::Merged);
    }

    #[test]
    fn test_patch_payload_uses_qualified_leaf() {
        let op = Operation::patch(
            path("data/openconfig-system:system/openconfig-system-ext:ssh-client/config/ciphers"),
            json!("aes192-ctr"),
        );
        assert_eq!(op.method(), Method::Patch);
        assert_eq!(
            op.payload(),
            Some(&json!({"openconfig-system-ext:ciphers": "aes192-ctr"}))
        );
        assert_eq!(op.value(), Some(&json!("aes192-ctr")));
    }

    #[test]
    fn test_delete_has_no_payload() {
        let op = Operation::delete(path("data/openconfig-qos:qos/queues/queue=Eth1%2f5:1"));
        assert!(op.is_delete());
        assert_eq!(op.payload(), None);
        assert_eq!(op.value(), None);
        assert_eq!(
            op.to_string(),
            "DELETE data/openconfig-qos:qos/queues/queue=Eth1%2f5:1"
        );
    }

    #[test]
    fn test_operation_serializes_like_a_request() {
        let op = Operation::patch(path("data/openconfig-qos:qos/pfc-watchdog/poll/config/poll-interval"), json!(150));
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "path": "data/openconfig-qos:qos/pfc-watchdog/poll/config/poll-interval",
                "method": "patch",
                "data": {"openconfig-qos:poll-interval": 150}
            })
        );

        let op = Operation::delete(path("data/openconfig-qos:qos/pfc-watchdog"));
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"path": "data/openconfig-qos:qos/pfc-watchdog", "method": "delete"})
        );
    }

    #[test]
    fn test_execute_summary() {
        let mut summary = ExecuteSummary::default();
        summary.add(Method::Patch);
        summary.add(Method::Delete);
        summary.add(Method::Get);
        assert_eq!(summary.total_changes(), 2);

        let mut other = ExecuteSummary::default();
        other.add(Method::Post);
        other.skipped = 3;
        summary.merge(&other);
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.skipped, 3);
    }

    #[test]
    fn test_run_report_serialization() {
        let mut report = RunReport::new("ssh", StateMode::Merged, json!({}));
        report.after_generated = Some(json!({"client": {"cipher": "aes256-ctr"}}));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["state"], "merged");
        assert!(value.get("after(generated)").is_some());
        assert!(value.get("after").is_none());
        assert!(value.get("warnings").is_none());
    }
}
