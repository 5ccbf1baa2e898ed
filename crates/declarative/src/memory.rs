//! In-memory device
//!
//! Holds a prefix-stripped RESTCONF tree and applies PATCH, POST and DELETE to
//! it the way a switch does. Used to compute `after(generated)` in check mode,
//! to run offline against a saved snapshot, and as the device in tests.
//!
//! List entries are matched by key value against the top-level leaves of each
//! entry, so entries must carry their key leaf outside `config` as well.

use log::trace;
use serde_json::{Map, Value};
use yangpath::{Path, Segment};

use crate::context::{Device, DeviceError};
use crate::facts::Snapshot;
use crate::tree;
use crate::types::{Method, Operation};

/// A RESTCONF tree held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDevice {
    tree: Value,
    journal: Vec<Operation>,
    sends: usize,
    fail_on: Option<(usize, u16)>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device holding `tree` (rooted below `data`)
    pub fn from_tree(tree: Value) -> Self {
        Self {
            tree: tree::strip_prefixes(tree),
            ..Self::default()
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::from_tree(snapshot.tree().clone())
    }

    /// Answer the `index`-th send (0-based) with `status` without applying it
    pub fn fail_on(mut self, index: usize, status: u16) -> Self {
        self.fail_on = Some((index, status));
        self
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Current contents as a snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_tree(self.tree.clone())
    }

    /// Operations applied so far
    pub fn journal(&self) -> &[Operation] {
        &self.journal
    }

    fn apply(&mut self, op: &Operation) -> u16 {
        let segments = tree::tree_segments(op.path());
        match op.method() {
            Method::Patch | Method::Post => {
                let value = tree::strip_prefixes(op.value().cloned().unwrap_or(Value::Null));
                let Some(target) = navigate_create(&mut self.tree, segments) else {
                    return 404;
                };
                if op.method() == Method::Post && !tree::is_empty(target) {
                    return 409;
                }
                tree::deep_merge(target, value);
                if op.method() == Method::Post { 201 } else { 204 }
            }
            Method::Delete => {
                if remove(&mut self.tree, segments) {
                    204
                } else {
                    404
                }
            }
            Method::Get => 405,
        }
    }
}

impl Device for MemoryDevice {
    fn get(&mut self, path: &Path) -> Result<Option<Value>, DeviceError> {
        let Some(node) = tree::lookup(&self.tree, path) else {
            return Ok(None);
        };
        let Some(name) = path.qualified_leaf() else {
            return Ok(Some(self.tree.clone()));
        };
        let value = match path.last() {
            Some(last) if last.is_entry() => Value::Array(vec![node.clone()]),
            _ => node.clone(),
        };
        let mut body = Map::new();
        body.insert(name, value);
        Ok(Some(Value::Object(body)))
    }

    fn send(&mut self, op: &Operation) -> Result<u16, DeviceError> {
        let index = self.sends;
        self.sends += 1;
        if let Some((fail_index, status)) = self.fail_on
            && fail_index == index
        {
            return Ok(status);
        }

        let status = self.apply(op);
        trace!("{op} -> {status}");
        if (200..300).contains(&status) {
            self.journal.push(op.clone());
        }
        Ok(status)
    }
}

/// Walk to the node at `segments`, creating containers but not list entries
fn navigate_create<'a>(node: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    let mut current = node;
    for segment in segments {
        let map = tree::ensure_object(current);
        let child = map
            .entry(segment.name().to_string())
            .or_insert_with(|| {
                if segment.is_entry() {
                    Value::Array(Vec::new())
                } else {
                    Value::Object(Map::new())
                }
            });
        current = if segment.is_entry() {
            child
                .as_array_mut()?
                .iter_mut()
                .find(|entry| tree::entry_matches(entry, segment.keys()))?
        } else {
            child
        };
    }
    Some(current)
}

fn navigate<'a>(node: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    segments.iter().try_fold(node, |current, segment| {
        let child = current.get_mut(segment.name())?;
        if segment.is_entry() {
            child
                .as_array_mut()?
                .iter_mut()
                .find(|entry| tree::entry_matches(entry, segment.keys()))
        } else {
            Some(child)
        }
    })
}

/// Remove the node at `segments`; false when nothing was there
fn remove(node: &mut Value, segments: &[Segment]) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        let existed = !node.is_null();
        *node = Value::Null;
        return existed;
    };
    let Some(map) = navigate(node, parents).and_then(Value::as_object_mut) else {
        return false;
    };
    if last.is_entry() {
        let Some(entries) = map.get_mut(last.name()).and_then(Value::as_array_mut) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| !tree::entry_matches(entry, last.keys()));
        entries.len() != before
    } else {
        map.remove(last.name()).is_some()
    }
}
