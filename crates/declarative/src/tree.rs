//! Helpers over raw RESTCONF JSON trees
//!
//! Trees handled here have module prefixes stripped from every object key.
//! The leading `data` segment of a request path is not part of the tree.

use serde_json::{Map, Value};
use yangpath::{Path, Segment};

/// Remove `module:` prefixes from every object key, recursively
pub fn strip_prefixes(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (local_name(&key).to_string(), strip_prefixes(child)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_prefixes).collect()),
        other => other,
    }
}

fn local_name(key: &str) -> &str {
    key.split_once(':').map_or(key, |(_, local)| local)
}

/// Segments of `path` that address nodes inside a tree
pub fn tree_segments(path: &Path) -> &[Segment] {
    match path.segments() {
        [first, rest @ ..] if first.name() == "data" && first.module().is_none() => rest,
        all => all,
    }
}

/// Whether a list element is the entry identified by `keys`
///
/// Every key must equal the text of some top-level scalar of the element.
pub fn entry_matches(element: &Value, keys: &[String]) -> bool {
    let Some(map) = element.as_object() else {
        return false;
    };
    keys.iter().all(|key| map.values().any(|v| scalar_text(v).as_deref() == Some(key)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Follow `segments` from `node`
pub fn descend<'a>(node: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(node, |current, segment| {
        let child = current.get(segment.name())?;
        if segment.is_entry() {
            child
                .as_array()?
                .iter()
                .find(|element| entry_matches(element, segment.keys()))
        } else {
            Some(child)
        }
    })
}

/// Follow a relative path given as text, e.g. `config/ciphers`
pub fn descend_rel<'a>(node: &'a Value, rel: &str) -> Option<&'a Value> {
    rel.split('/')
        .filter(|part| !part.is_empty())
        .try_fold(node, |current, part| current.get(local_name(part)))
}

/// Node at an absolute request path
pub fn lookup<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    descend(tree, tree_segments(path))
}

/// Merge `value` into `tree` at `path`, creating containers on the way
///
/// Key predicates are ignored: fetch paths address containers.
pub fn mount(tree: &mut Value, path: &Path, value: Value) {
    let mut current = tree;
    for segment in tree_segments(path) {
        let map = ensure_object(current);
        current = map
            .entry(segment.name().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    deep_merge(current, value);
}

/// Make `value` an object if it is not one already
pub fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// Merge `source` into `target`
///
/// Objects merge key by key. Arrays merge element by element: a source
/// element updates the target element whose top-level scalars agree with all
/// of its own, and is appended otherwise. Anything else is replaced.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for element in source {
                if let Some(existing) = target.iter_mut().find(|existing| same_entry(existing, &element)) {
                    deep_merge(existing, element);
                } else if !target.contains(&element) {
                    target.push(element);
                }
            }
        }
        (target, source) => *target = source,
    }
}

fn same_entry(existing: &Value, element: &Value) -> bool {
    let (Some(existing), Some(element)) = (existing.as_object(), element.as_object()) else {
        return false;
    };
    let mut scalars = element
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .peekable();
    scalars.peek().is_some() && scalars.all(|(k, v)| existing.get(k) == Some(v))
}

/// Whether a normalized value carries no configuration
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
