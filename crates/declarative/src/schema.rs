//! Declarative field-schema tables
//!
//! A resource is described once as static data: which containers, lists and
//! fields it has, where each one lives on the device and how its values are
//! typed. The validator, normalizer and diff engine walk these tables
//! generically, so adding a resource never means adding per-resource branches.

use serde_json::{Map, Value, json};
use yangpath::{Path, Segment};

use crate::error::Result;
use crate::types::Operation;

/// How a field's value is typed in the argument shape and on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    /// Comma-joined string of values, e.g. `aes256-ctr,aes192-ctr`
    LeafList,
    /// Leaf-list held as an array of strings, e.g. VLAN ranges `["10", "20-30"]`
    Values,
    /// Fixed choices as `(argument value, device value)` pairs
    Enum(&'static [(&'static str, &'static str)]),
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            Self::Str => "str".to_string(),
            Self::Int => "int".to_string(),
            Self::Bool => "bool".to_string(),
            Self::LeafList => "comma-separated str".to_string(),
            Self::Values => "list of str".to_string(),
            Self::Enum(choices) => {
                let names: Vec<&str> = choices.iter().map(|(arg, _)| *arg).collect();
                format!("one of: {}", names.join(", "))
            }
        }
    }

    /// Convert a user-supplied value into its canonical form
    pub fn coerce(&self, value: &Value) -> std::result::Result<Value, String> {
        let coerced = match (self, value) {
            (Self::Str, Value::String(s)) => Some(Value::String(s.clone())),
            (Self::Str, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::Int, _) => parse_int(value).map(Value::from),
            (Self::Bool, _) => parse_bool(value).map(Value::Bool),
            (Self::LeafList, _) => join_leaf_list(value).map(Value::String),
            (Self::Values, _) => split_values(value).map(Value::from),
            (Self::Enum(choices), Value::String(s)) => choices
                .iter()
                .find(|(arg, _)| *arg == s)
                .map(|(arg, _)| Value::String((*arg).to_string())),
            _ => None,
        };
        coerced.ok_or_else(|| format!("expected {}, got {}", self.describe(), render(value)))
    }

    /// Convert a value read from the device into its canonical form
    ///
    /// More lenient than [`FieldKind::coerce`]: enum values may carry an
    /// identityref module prefix and differ in case.
    pub fn decode(&self, value: &Value) -> std::result::Result<Value, String> {
        let decoded = match (self, value) {
            (Self::Str, Value::String(s)) => Some(Value::String(s.clone())),
            (Self::Str, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::Int, _) => parse_int(value).map(Value::from),
            (Self::Bool, _) => parse_bool(value).map(Value::Bool),
            (Self::LeafList, _) => join_leaf_list(value).map(Value::String),
            (Self::Values, _) => split_values(value).map(Value::from),
            (Self::Enum(choices), Value::String(s)) => {
                let local = s.rsplit(':').next().unwrap_or(s);
                choices
                    .iter()
                    .find(|(arg, device)| {
                        let device = device.rsplit(':').next().unwrap_or(device);
                        device.eq_ignore_ascii_case(local) || arg.eq_ignore_ascii_case(local)
                    })
                    .map(|(arg, _)| Value::String((*arg).to_string()))
            }
            _ => None,
        };
        decoded.ok_or_else(|| format!("cannot read {} as {}", render(value), self.describe()))
    }

    /// Whether changing the value means deleting the old items first,
    /// since a PATCH of a leaf-list merges into it
    pub fn is_leaf_list(&self) -> bool {
        matches!(self, Self::LeafList | Self::Values)
    }

    /// Whether merging `value` into `current` leaves it unchanged
    ///
    /// A PATCH adds leaf-list items rather than replacing them, so a list
    /// already holding every desired item needs nothing.
    pub fn is_merged(&self, current: Option<&Value>, value: &Value) -> bool {
        match (self, current, value) {
            (Self::Values, Some(Value::Array(have)), Value::Array(want)) => {
                want.iter().all(|item| have.contains(item))
            }
            _ => current == Some(value),
        }
    }

    /// Convert a canonical value into the form the device expects
    pub fn encode(&self, value: &Value) -> Value {
        match (self, value) {
            (Self::Enum(choices), Value::String(s)) => choices
                .iter()
                .find(|(arg, _)| *arg == s)
                .map_or_else(|| value.clone(), |(_, device)| Value::String((*device).to_string())),
            _ => value.clone(),
        }
    }
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Normalize separators of a leaf-list value: items are trimmed, empty items
/// dropped, and the rest joined with `,`. Order is kept.
pub fn normalize_leaf_list(text: &str) -> String {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_leaf_list(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(normalize_leaf_list(s)),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => parts.push(s.clone()),
                    Value::Number(n) => parts.push(n.to_string()),
                    _ => return None,
                }
            }
            Some(normalize_leaf_list(&parts.join(",")))
        }
        _ => None,
    }
}

/// Items of a list-valued field, in order. A single string is read as a
/// comma-separated list.
fn split_values(value: &Value) -> Option<Vec<String>> {
    let items = match value {
        Value::String(s) => {
            let joined = normalize_leaf_list(s);
            return Some(joined.split(',').filter(|item| !item.is_empty()).map(String::from).collect());
        }
        Value::Array(items) => items,
        _ => return None,
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => format!("bool {value}"),
        Value::Number(_) => format!("number {value}"),
        Value::String(_) => format!("string {value}"),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "a mapping".to_string(),
    }
}

/// Text form of a list key, as it appears in paths
pub fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Value the device assumes when a field is not configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::from(i),
            Self::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// A scalar field of a container or list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    /// Argument name
    pub name: &'static str,
    /// Device path relative to the enclosing entity, e.g. `config/ciphers`
    pub path: &'static str,
    pub kind: FieldKind,
    pub default: Option<DefaultValue>,
}

impl FieldSchema {
    pub const fn new(name: &'static str, path: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            path,
            kind,
            default: None,
        }
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether `value` equals the device default for this field
    pub fn is_default(&self, value: &Value) -> bool {
        self.default.is_some_and(|d| d.to_value() == *value)
    }

    pub fn device_path(&self, scope: &Scope) -> Result<Path> {
        Ok(scope.path.join(&Path::parse(self.path)?))
    }
}

/// Members of a container or list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    pub fields: &'static [FieldSchema],
    pub containers: &'static [ContainerSchema],
    pub lists: &'static [ListSchema],
    /// Members of which at most one may be given
    pub exclusive: &'static [&'static str],
}

impl Body {
    pub const EMPTY: Body = Body::new(&[], &[], &[]);

    pub const fn new(
        fields: &'static [FieldSchema],
        containers: &'static [ContainerSchema],
        lists: &'static [ListSchema],
    ) -> Self {
        Self {
            fields,
            containers,
            lists,
            exclusive: &[],
        }
    }

    pub const fn exclusive(mut self, names: &'static [&'static str]) -> Self {
        self.exclusive = names;
        self
    }

    pub const fn fields(fields: &'static [FieldSchema]) -> Self {
        Self::new(fields, &[], &[])
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn container(&self, name: &str) -> Option<&ContainerSchema> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn list(&self, name: &str) -> Option<&ListSchema> {
        self.lists.iter().find(|l| l.name == name)
    }

    /// Argument names accepted in this body
    pub fn names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|f| f.name)
            .chain(self.containers.iter().map(|c| c.name))
            .chain(self.lists.iter().map(|l| l.name))
            .collect()
    }
}

/// A nested container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSchema {
    /// Argument name
    pub name: &'static str,
    /// Device path relative to the enclosing entity (absolute for a root)
    pub path: &'static str,
    /// Path, relative to the container, whose DELETE clears every field
    pub purge: Option<&'static str>,
    pub body: Body,
}

impl ContainerSchema {
    pub const fn new(name: &'static str, path: &'static str, body: Body) -> Self {
        Self {
            name,
            path,
            purge: None,
            body,
        }
    }

    pub const fn with_purge(mut self, purge: &'static str) -> Self {
        self.purge = Some(purge);
        self
    }
}

/// Where the entries of a list live on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Under the enclosing entity
    Nested,
    /// Under an absolute path, keyed by `<parent key><separator><key>`
    Detached { separator: char },
}

/// A keyed list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSchema {
    /// Argument name
    pub name: &'static str,
    /// Wrapper container: relative for nested lists, absolute for detached ones
    pub path: &'static str,
    /// YANG list node under the wrapper
    pub list: &'static str,
    /// Argument name of the key
    pub key: &'static str,
    pub key_kind: FieldKind,
    /// Device leaf holding the key
    pub key_leaf: &'static str,
    pub placement: Placement,
    pub body: Body,
}

impl ListSchema {
    pub const fn new(
        name: &'static str,
        path: &'static str,
        list: &'static str,
        key: (&'static str, FieldKind),
        key_leaf: &'static str,
        body: Body,
    ) -> Self {
        Self {
            name,
            path,
            list,
            key: key.0,
            key_kind: key.1,
            key_leaf,
            placement: Placement::Nested,
            body,
        }
    }

    pub const fn detached(mut self, separator: char) -> Self {
        self.placement = Placement::Detached { separator };
        self
    }

    /// Path of the wrapper container holding the entries
    pub fn wrapper_path(&self, scope: &Scope) -> Result<Path> {
        let rel = Path::parse(self.path)?;
        Ok(match self.placement {
            Placement::Nested => scope.path.join(&rel),
            Placement::Detached { .. } => rel,
        })
    }

    /// Key as stored on the device
    pub fn device_key(&self, scope: &Scope, key: &Value) -> Value {
        match (self.placement, &scope.parent_key) {
            (Placement::Detached { separator }, Some(parent)) => {
                Value::String(format!("{parent}{separator}{}", key_text(key)))
            }
            _ => key.clone(),
        }
    }

    /// Recover the argument key from a device key, or `None` when the entry
    /// belongs to another parent
    pub fn argument_key(&self, scope: &Scope, device_key: &Value) -> Option<std::result::Result<Value, String>> {
        match (self.placement, &scope.parent_key) {
            (Placement::Detached { separator }, Some(parent)) => {
                let text = device_key.as_str()?;
                let rest = text.strip_prefix(parent.as_str())?.strip_prefix(separator)?;
                Some(self.key_kind.decode(&Value::String(rest.to_string())))
            }
            _ => Some(self.key_kind.decode(device_key)),
        }
    }

    /// Scope of one entry
    pub fn entry_scope(&self, scope: &Scope, key: &Value) -> Result<Scope> {
        let device_key = key_text(&self.device_key(scope, key));
        let path = self
            .wrapper_path(scope)?
            .child(Segment::entry(self.list, [device_key.as_str()]))?;
        Ok(Scope {
            path,
            parent_key: Some(device_key),
        })
    }

    /// PATCH that creates an empty entry, sent before any field under it
    pub fn creation_op(&self, scope: &Scope, key: &Value) -> Result<Operation> {
        let device_key = self.device_key(scope, key);
        let mut config = Map::new();
        config.insert(self.key_leaf.to_string(), device_key.clone());
        let mut entry = Map::new();
        entry.insert(self.key_leaf.to_string(), device_key);
        entry.insert("config".to_string(), Value::Object(config));
        let mut wrapper = Map::new();
        wrapper.insert(self.list.to_string(), json!([entry]));
        Ok(Operation::patch(self.wrapper_path(scope)?, Value::Object(wrapper)))
    }

    /// Find the entry with `key` among canonical entries
    pub fn find<'a>(&self, entries: &'a [Value], key: &Value) -> Option<&'a Value> {
        entries.iter().find(|entry| entry.get(self.key) == Some(key))
    }
}

/// Top-level shape of a resource's `config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// `config` is a mapping (e.g. `ssh`); the container path is absolute
    Container(ContainerSchema),
    /// `config` is a list of entries (e.g. `qos_wred`)
    List(ListSchema),
}

/// A managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub description: &'static str,
    /// Paths fetched to build the current config
    pub fetch: &'static [&'static str],
    pub root: Root,
}

impl ResourceSchema {
    /// Canonical empty config: `{}` or `[]`
    pub fn empty_config(&self) -> Value {
        match self.root {
            Root::Container(_) => Value::Object(Map::new()),
            Root::List(_) => Value::Array(Vec::new()),
        }
    }

    pub fn fetch_paths(&self) -> Result<Vec<Path>> {
        self.fetch
            .iter()
            .map(|p| Path::parse(p).map_err(Into::into))
            .collect()
    }
}

/// Location of an entity on the device while walking a schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub path: Path,
    /// Device key of the nearest enclosing list entry
    pub parent_key: Option<String>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn at(path: Path) -> Self {
        Self {
            path,
            parent_key: None,
        }
    }

    /// Scope of a child container at `rel`
    pub fn descend(&self, rel: &str) -> Result<Self> {
        Ok(Self {
            path: self.path.join(&Path::parse(rel)?),
            parent_key: self.parent_key.clone(),
        })
    }
}
