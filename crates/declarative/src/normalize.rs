//! Normalization of device state into the argument shape
//!
//! Reads a [`Snapshot`] through a resource schema. Only declared fields are
//! read, so unknown device fields are ignored. A declared field whose value
//! cannot be decoded is reported as a [`SchemaMismatch`] and left out.

use std::fmt;

use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};
use yangpath::Path;

use crate::error::Result;
use crate::facts::Snapshot;
use crate::schema::{Body, ListSchema, Placement, ResourceSchema, Root, Scope, key_text};
use crate::tree;

/// A device value that does not fit its declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMismatch {
    /// Location in the argument shape
    pub at: String,
    pub message: String,
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.at, self.message)
    }
}

/// Normalized current config plus what could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facts {
    pub config: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<SchemaMismatch>,
}

/// Normalize `snapshot` into the argument shape of `schema`
pub fn normalize(schema: &ResourceSchema, snapshot: &Snapshot) -> Result<Facts> {
    let mut reader = Reader {
        tree: snapshot.tree(),
        mismatches: Vec::new(),
    };

    let config = match &schema.root {
        Root::Container(container) => {
            let path = Path::parse(container.path)?;
            let scope = Scope::at(path.clone());
            let body = match snapshot.lookup(&path) {
                Some(node) => reader.body(&container.body, &scope, node, "config")?,
                None => Map::new(),
            };
            Value::Object(body)
        }
        Root::List(list) => Value::Array(reader.list(list, &Scope::root(), None, "config")?),
    };

    Ok(Facts {
        config,
        mismatches: reader.mismatches,
    })
}

struct Reader<'a> {
    tree: &'a Value,
    mismatches: Vec<SchemaMismatch>,
}

impl Reader<'_> {
    fn mismatch(&mut self, at: String, message: String) {
        warn!("Ignoring device value at {at}: {message}");
        self.mismatches.push(SchemaMismatch { at, message });
    }

    fn body(&mut self, body: &Body, scope: &Scope, node: &Value, at: &str) -> Result<Map<String, Value>> {
        let mut out = Map::new();

        for field in body.fields {
            let Some(raw) = tree::descend_rel(node, field.path).filter(|v| !v.is_null()) else {
                continue;
            };
            match field.kind.decode(raw) {
                Ok(value) => {
                    out.insert(field.name.to_string(), value);
                }
                Err(message) => self.mismatch(format!("{at}.{}", field.name), message),
            }
        }

        for container in body.containers {
            let Some(child) = tree::descend_rel(node, container.path) else {
                continue;
            };
            let child_scope = scope.descend(container.path)?;
            let location = format!("{at}.{}", container.name);
            let members = self.body(&container.body, &child_scope, child, &location)?;
            if !members.is_empty() {
                out.insert(container.name.to_string(), Value::Object(members));
            }
        }

        for list in body.lists {
            let location = format!("{at}.{}", list.name);
            let entries = self.list(list, scope, Some(node), &location)?;
            if !entries.is_empty() {
                out.insert(list.name.to_string(), Value::Array(entries));
            }
        }

        Ok(out)
    }

    fn list(&mut self, list: &ListSchema, scope: &Scope, node: Option<&Value>, at: &str) -> Result<Vec<Value>> {
        let tree = self.tree;
        let wrapper = match (list.placement, node) {
            (Placement::Nested, Some(node)) => tree::descend_rel(node, list.path),
            _ => tree::lookup(tree, &list.wrapper_path(scope)?),
        };
        let Some(elements) = wrapper.and_then(|w| w.get(list.list)).and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for element in elements {
            let device_key = element
                .get(list.key_leaf)
                .or_else(|| tree::descend_rel(element, "config").and_then(|c| c.get(list.key_leaf)));
            let Some(device_key) = device_key else {
                self.mismatch(format!("{at}[]"), format!("entry without `{}`", list.key_leaf));
                continue;
            };
            let key = match list.argument_key(scope, device_key) {
                None => continue,
                Some(Err(message)) => {
                    self.mismatch(format!("{at}[]"), message);
                    continue;
                }
                Some(Ok(key)) => key,
            };

            let entry_scope = list.entry_scope(scope, &key)?;
            let location = format!("{at}[{}]", key_text(&key));
            let mut entry = self.body(&list.body, &entry_scope, element, &location)?;
            entry.insert(list.key.to_string(), key);
            entries.push(Value::Object(entry));
        }
        Ok(entries)
    }
}
