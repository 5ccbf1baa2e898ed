//! Diff engine - compiles (desired, current, mode) into REST operations
//!
//! Both configs are in canonical argument shape: the desired one from
//! [`crate::validate`], the current one from [`crate::normalize`]. The engine
//! performs no I/O; its only failure is a malformed schema path.

use log::debug;
use serde::Serialize;
use serde_json::Value;
use yangpath::Path;

use crate::error::Result;
use crate::planner::Plan;
use crate::schema::{
    Body, ContainerSchema, FieldKind, FieldSchema, ListSchema, Placement, ResourceSchema, Root, Scope,
};
use crate::tree;
use crate::types::{Method, Operation, StateMode};

/// Compute the ordered operations that move `have` to `want` under `mode`
///
/// All DELETEs come before all PATCHes. Within each phase, fields follow
/// schema declaration order and list entries follow input order.
pub fn diff(schema: &ResourceSchema, want: &Value, have: &Value, mode: StateMode) -> Result<Vec<Operation>> {
    let mut differ = Differ { plan: Plan::new() };

    match &schema.root {
        Root::Container(root) => {
            let scope = Scope::at(Path::parse(root.path)?);
            let want = non_empty(want);
            let have = non_empty(have);
            match mode {
                StateMode::Merged => {
                    if let Some(want) = want {
                        differ.merge_body(&root.body, &scope, want, have)?;
                    }
                }
                StateMode::Replaced => {
                    if let Some(want) = want {
                        differ.replace_root(&root.body, &scope, want, have, false)?;
                    }
                }
                StateMode::Overridden => {
                    let empty = schema.empty_config();
                    differ.replace_root(&root.body, &scope, want.unwrap_or(&empty), have, true)?;
                }
                StateMode::Deleted => match (want, have) {
                    (_, None) => {}
                    (None, Some(have)) => differ.clear_container(root, &scope, have)?,
                    (Some(want), Some(have)) => differ.delete_body(&root.body, &scope, want, have)?,
                },
            }
        }
        Root::List(list) => {
            let scope = Scope::root();
            let want_entries = entries(Some(want));
            let have_entries = entries(Some(have));
            match mode {
                StateMode::Merged => differ.merge_list(list, &scope, want_entries, have_entries)?,
                StateMode::Replaced => differ.replace_list(list, &scope, want_entries, have_entries)?,
                StateMode::Overridden => differ.override_list(list, &scope, want_entries, have_entries)?,
                StateMode::Deleted if want_entries.is_empty() => {
                    differ.clear_list(list, &scope, have_entries)?;
                }
                StateMode::Deleted => differ.delete_list(list, &scope, want_entries, have_entries)?,
            }
        }
    }

    Ok(differ.plan.into_operations())
}

fn non_empty(value: &Value) -> Option<&Value> {
    (!tree::is_empty(value)).then_some(value)
}

fn member<'a>(value: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    value.and_then(|v| v.get(name)).filter(|v| !v.is_null())
}

fn entries(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

struct Differ {
    plan: Plan,
}

impl Differ {
    fn push(&mut self, op: Operation) {
        debug!("Planned {op}");
        self.plan.add(op);
    }

    fn patch_field(&mut self, field: &FieldSchema, scope: &Scope, value: &Value) -> Result<()> {
        let op = Operation::patch(field.device_path(scope)?, field.kind.encode(value));
        self.push(op);
        Ok(())
    }

    fn delete_field(&mut self, field: &FieldSchema, scope: &Scope) -> Result<()> {
        self.push(Operation::delete(field.device_path(scope)?));
        Ok(())
    }

    // merged

    fn merge_body(&mut self, body: &Body, scope: &Scope, want: &Value, have: Option<&Value>) -> Result<()> {
        for field in body.fields {
            let Some(value) = member(Some(want), field.name) else {
                continue;
            };
            if !field.kind.is_merged(member(have, field.name), value) {
                self.patch_field(field, scope, value)?;
            }
        }

        for container in body.containers {
            if let Some(value) = member(Some(want), container.name) {
                let child = scope.descend(container.path)?;
                self.merge_body(&container.body, &child, value, member(have, container.name))?;
            }
        }

        for list in body.lists {
            if let Some(value) = member(Some(want), list.name) {
                self.merge_list(list, scope, entries(Some(value)), entries(member(have, list.name)))?;
            }
        }
        Ok(())
    }

    fn merge_list(&mut self, list: &ListSchema, scope: &Scope, want: &[Value], have: &[Value]) -> Result<()> {
        for entry in want {
            let Some(key) = entry.get(list.key) else {
                continue;
            };
            let current = list.find(have, key);
            if current.is_none() {
                self.push(list.creation_op(scope, key)?);
            }
            let entry_scope = list.entry_scope(scope, key)?;
            self.merge_body(&list.body, &entry_scope, entry, current)?;
        }
        Ok(())
    }

    // replaced / overridden

    /// Replace the top-level container of a resource. Its child containers
    /// and lists are separate entities: only the ones named in `want` are
    /// touched unless `override_all` is set.
    fn replace_root(
        &mut self,
        body: &Body,
        scope: &Scope,
        want: &Value,
        have: Option<&Value>,
        override_all: bool,
    ) -> Result<()> {
        self.replace_fields(body, scope, want, have)?;

        for container in body.containers {
            let child = scope.descend(container.path)?;
            match (member(Some(want), container.name), member(have, container.name)) {
                (Some(value), current) => {
                    self.replace_body(&container.body, &child, value, current)?;
                }
                (None, Some(current)) if override_all => {
                    self.clear_container(container, &child, current)?;
                }
                _ => {}
            }
        }

        for list in body.lists {
            let want_entries = entries(member(Some(want), list.name));
            let have_entries = entries(member(have, list.name));
            if override_all {
                self.override_list(list, scope, want_entries, have_entries)?;
            } else if member(Some(want), list.name).is_some() {
                self.replace_list(list, scope, want_entries, have_entries)?;
            }
        }
        Ok(())
    }

    fn replace_fields(&mut self, body: &Body, scope: &Scope, want: &Value, have: Option<&Value>) -> Result<()> {
        for field in body.fields {
            match (member(Some(want), field.name), member(have, field.name)) {
                (None, Some(current)) if !field.is_default(current) => {
                    self.delete_field(field, scope)?;
                }
                (Some(value), Some(current)) if value != current => {
                    if field.kind.is_leaf_list() {
                        self.delete_field(field, scope)?;
                    }
                    self.patch_field(field, scope, value)?;
                }
                (Some(value), None) => self.patch_field(field, scope, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Rewrite one entity: fields, child containers and nested lists all
    /// end up exactly as in `want`.
    fn replace_body(&mut self, body: &Body, scope: &Scope, want: &Value, have: Option<&Value>) -> Result<()> {
        self.replace_fields(body, scope, want, have)?;

        for container in body.containers {
            let child = scope.descend(container.path)?;
            match (member(Some(want), container.name), member(have, container.name)) {
                (Some(value), current) => self.replace_body(&container.body, &child, value, current)?,
                (None, Some(current)) => self.clear_container(container, &child, current)?,
                (None, None) => {}
            }
        }

        for list in body.lists {
            self.override_list(
                list,
                scope,
                entries(member(Some(want), list.name)),
                entries(member(have, list.name)),
            )?;
        }
        Ok(())
    }

    /// Replace the entries named in `want`, leave the others alone
    fn replace_list(&mut self, list: &ListSchema, scope: &Scope, want: &[Value], have: &[Value]) -> Result<()> {
        for entry in want {
            let Some(key) = entry.get(list.key) else {
                continue;
            };
            let current = list.find(have, key);
            if current.is_none() {
                self.push(list.creation_op(scope, key)?);
            }
            let entry_scope = list.entry_scope(scope, key)?;
            self.replace_body(&list.body, &entry_scope, entry, current)?;
        }
        Ok(())
    }

    /// Make the list hold exactly the entries in `want`
    fn override_list(&mut self, list: &ListSchema, scope: &Scope, want: &[Value], have: &[Value]) -> Result<()> {
        for entry in have {
            let Some(key) = entry.get(list.key) else {
                continue;
            };
            if list.find(want, key).is_none() {
                self.delete_entry(list, scope, entry)?;
            }
        }
        self.replace_list(list, scope, want, have)
    }

    // deleted

    fn delete_body(&mut self, body: &Body, scope: &Scope, want: &Value, have: &Value) -> Result<()> {
        for field in body.fields {
            if let (Some(value), Some(current)) = (member(Some(want), field.name), member(Some(have), field.name))
                && value == current
                && !field.is_default(current)
            {
                self.delete_field(field, scope)?;
            }
        }

        for container in body.containers {
            let (Some(value), Some(current)) = (member(Some(want), container.name), member(Some(have), container.name))
            else {
                continue;
            };
            let child = scope.descend(container.path)?;
            if tree::is_empty(value) {
                self.clear_container(container, &child, current)?;
            } else {
                self.delete_body(&container.body, &child, value, current)?;
            }
        }

        for list in body.lists {
            let Some(value) = member(Some(want), list.name) else {
                continue;
            };
            let want_entries = entries(Some(value));
            let have_entries = entries(member(Some(have), list.name));
            if want_entries.is_empty() {
                self.clear_list(list, scope, have_entries)?;
            } else {
                self.delete_list(list, scope, want_entries, have_entries)?;
            }
        }
        Ok(())
    }

    /// An entry given with only its key is deleted whole; otherwise only
    /// the members it names are deleted.
    fn delete_list(&mut self, list: &ListSchema, scope: &Scope, want: &[Value], have: &[Value]) -> Result<()> {
        for entry in want {
            let Some(key) = entry.get(list.key) else {
                continue;
            };
            let Some(current) = list.find(have, key) else {
                continue;
            };
            let key_only = entry.as_object().is_some_and(|members| members.len() == 1);
            if key_only {
                self.delete_entry(list, scope, current)?;
            } else {
                let entry_scope = list.entry_scope(scope, key)?;
                self.delete_body(&list.body, &entry_scope, entry, current)?;
            }
        }
        Ok(())
    }

    // removal helpers

    /// Delete an entry and, before it, the entries of its detached lists
    fn delete_entry(&mut self, list: &ListSchema, scope: &Scope, entry: &Value) -> Result<()> {
        let Some(key) = entry.get(list.key) else {
            return Ok(());
        };
        let entry_scope = list.entry_scope(scope, key)?;
        self.delete_detached(&list.body, &entry_scope, entry)?;
        self.push(Operation::delete(entry_scope.path));
        Ok(())
    }

    /// Delete entries living outside the subtree of `scope`
    fn delete_detached(&mut self, body: &Body, scope: &Scope, have: &Value) -> Result<()> {
        for container in body.containers {
            if let Some(current) = member(Some(have), container.name) {
                let child = scope.descend(container.path)?;
                self.delete_detached(&container.body, &child, current)?;
            }
        }

        for list in body.lists {
            for entry in entries(member(Some(have), list.name)) {
                match list.placement {
                    Placement::Detached { .. } => self.delete_entry(list, scope, entry)?,
                    Placement::Nested => {
                        let Some(key) = entry.get(list.key) else {
                            continue;
                        };
                        let entry_scope = list.entry_scope(scope, key)?;
                        self.delete_detached(&list.body, &entry_scope, entry)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn clear_container(&mut self, container: &ContainerSchema, scope: &Scope, have: &Value) -> Result<()> {
        if tree::is_empty(have) {
            return Ok(());
        }
        match container.purge {
            Some(purge) => {
                self.delete_detached(&container.body, scope, have)?;
                self.push(Operation::delete(scope.path.join(&Path::parse(purge)?)));
                Ok(())
            }
            None => self.clear_body(&container.body, scope, have),
        }
    }

    fn clear_body(&mut self, body: &Body, scope: &Scope, have: &Value) -> Result<()> {
        for field in body.fields {
            if let Some(current) = member(Some(have), field.name)
                && !field.is_default(current)
            {
                self.delete_field(field, scope)?;
            }
        }

        for container in body.containers {
            if let Some(current) = member(Some(have), container.name) {
                let child = scope.descend(container.path)?;
                self.clear_container(container, &child, current)?;
            }
        }

        for list in body.lists {
            self.clear_list(list, scope, entries(member(Some(have), list.name)))?;
        }
        Ok(())
    }

    fn clear_list(&mut self, list: &ListSchema, scope: &Scope, have: &[Value]) -> Result<()> {
        for entry in have {
            self.delete_entry(list, scope, entry)?;
        }
        Ok(())
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Number of DELETE operations
    pub deletes: usize,
    /// Number of PATCH operations
    pub patches: usize,
    /// Number of POST operations
    pub posts: usize,
}

impl DiffSummary {
    /// Create a summary from a list of operations
    pub fn from_operations(ops: &[Operation]) -> Self {
        let mut summary = Self::default();
        for op in ops {
            match op.method() {
                Method::Delete => summary.deletes += 1,
                Method::Patch => summary.patches += 1,
                Method::Post => summary.posts += 1,
                Method::Get => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.deletes + self.patches + self.posts
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
