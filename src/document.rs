//! Desired-state documents
//!
//! A document is a list of tasks, either at the top level or under `tasks`:
//!
//! ```yaml
//! tasks:
//!   - resource: ssh
//!     state: replaced
//!     config:
//!       client:
//!         cipher: aes256-ctr,aes192-ctr
//!   - resource: qos_pfc
//!     config:
//!       poll_interval: 150
//! ```
//!
//! The format is picked from the file extension: `.yaml`/`.yml`, `.toml` or
//! `.json`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use declarative::{ResourceSchema, StateMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Cannot tell the format of {}: use a .yaml, .toml or .json extension",
                path.display()
            ),
        }
    }
}

/// One resource to reconcile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub resource: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub config: Value,
}

fn default_state() -> String {
    StateMode::default().as_str().to_string()
}

impl Task {
    pub fn schema(&self) -> Result<&'static ResourceSchema> {
        resources::lookup(&self.resource).with_context(|| {
            format!(
                "Unknown resource '{}' (supported: {})",
                self.resource,
                resources::names().join(", ")
            )
        })
    }

    pub fn mode(&self) -> declarative::Result<StateMode> {
        self.state.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Layout {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub tasks: Vec<Task>,
}

impl Document {
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content, format).with_context(|| format!("Invalid document {}", path.display()))
    }

    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let layout: Layout = match format {
            Format::Yaml => serde_yaml::from_str(content)?,
            Format::Toml => toml::from_str(content)?,
            Format::Json => serde_json::from_str(content)?,
        };
        let tasks = match layout {
            Layout::Wrapped { tasks } | Layout::Bare(tasks) => tasks,
        };
        if tasks.is_empty() {
            bail!("Document has no tasks");
        }
        Ok(Self { tasks })
    }

    /// Check every task against its schema without contacting the device
    pub fn validate(&self) -> Result<Vec<Checked<'_>>> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let schema = task.schema().with_context(|| format!("Task {}", index + 1))?;
                let mode = task
                    .mode()
                    .with_context(|| format!("Task {} ({})", index + 1, schema.name))?;
                declarative::validate(schema, &task.config)
                    .with_context(|| format!("Task {} ({})", index + 1, schema.name))?;
                Ok(Checked { task, schema, mode })
            })
            .collect()
    }
}

/// A task whose resource, state and config passed validation
#[derive(Debug, Clone, Copy)]
pub struct Checked<'a> {
    pub task: &'a Task,
    pub schema: &'static ResourceSchema,
    pub mode: StateMode,
}
