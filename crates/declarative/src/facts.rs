//! Fact fetching
//!
//! Issues one GET per schema-declared path and mounts every response into a
//! single prefix-stripped snapshot tree.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use yangpath::Path;

use crate::context::Device;
use crate::error::{Error, Result};
use crate::schema::ResourceSchema;
use crate::tree;
use crate::types::Method;

/// Raw device state for one resource, with module prefixes stripped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tree: Value,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from a tree rooted below `data`
    pub fn from_tree(tree: Value) -> Self {
        Self {
            tree: tree::strip_prefixes(tree),
        }
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn into_tree(self) -> Value {
        self.tree
    }

    /// Add one GET response for `path`
    ///
    /// The response is a single-key object named after the terminal segment;
    /// its value is mounted at `path`.
    pub fn add_response(&mut self, path: &Path, response: Value) {
        let stripped = tree::strip_prefixes(response);
        let value = match stripped {
            Value::Object(map) if map.len() == 1 => {
                map.into_iter().next().map_or(Value::Null, |(_, v)| v)
            }
            other => {
                warn!("Unexpected response shape for {path}, mounting as-is");
                other
            }
        };
        if tree::is_empty(&value) {
            return;
        }
        tree::mount(&mut self.tree, path, value);
    }

    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        tree::lookup(&self.tree, path)
    }
}

/// Fetch the current state of `schema` from `device`
///
/// A missing subtree (no body or HTTP 404) is empty, never an error.
pub fn fetch<D: Device + ?Sized>(schema: &ResourceSchema, device: &mut D) -> Result<Snapshot> {
    let mut snapshot = Snapshot::empty();

    for path in schema.fetch_paths()? {
        debug!("GET {path}");
        match device.get(&path) {
            Ok(Some(response)) => snapshot.add_response(&path, response),
            Ok(None) => debug!("{path} is empty"),
            Err(e) if e.is_not_found() => debug!("{path} not found, treating as empty"),
            Err(e) => {
                return Err(Error::Transport {
                    method: Method::Get,
                    path,
                    status: e.status,
                    message: e.message,
                    applied: 0,
                });
            }
        }
    }

    Ok(snapshot)
}
