//! `sonicfg resources` - list resources and describe their fields

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::ResourceSchema;
use declarative::schema::{Body, Placement, Root};

use crate::Context;
use crate::resources;
use crate::ui;

pub fn run(ctx: &Context, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => describe(name),
        None => {
            list(ctx);
            Ok(())
        }
    }
}

fn list(ctx: &Context) {
    ui::header("Resources");
    for schema in resources::ALL {
        println!("  {:<16} {}", schema.name.bold(), schema.description);
    }
    if !ctx.quiet {
        println!();
        ui::dim("Run 'sonicfg resources <name>' to see the fields of a resource.");
    }
}

fn describe(name: &str) -> Result<()> {
    let schema = resources::lookup(name).with_context(|| {
        format!("Unknown resource '{name}' (supported: {})", resources::names().join(", "))
    })?;

    ui::header(&format!("{} - {}", schema.name, schema.description));
    for path in schema.fetch {
        ui::kv("reads", path);
    }
    println!();
    for line in outline(schema) {
        println!("  {line}");
    }
    Ok(())
}

/// Indented description of the `config` shape
pub fn outline(schema: &ResourceSchema) -> Vec<String> {
    let mut lines = Vec::new();
    match &schema.root {
        Root::Container(container) => {
            lines.push("config: mapping".to_string());
            describe_body(&container.body, 1, &mut lines);
        }
        Root::List(list) => {
            lines.push(format!("config: list keyed by {} ({})", list.key, list.key_kind.describe()));
            describe_body(&list.body, 1, &mut lines);
        }
    }
    lines
}

fn describe_body(body: &Body, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for field in body.fields {
        let default = field
            .default
            .map(|d| format!(" (default {})", d.to_value()))
            .unwrap_or_default();
        lines.push(format!("{indent}{}: {}{default}", field.name, field.kind.describe()));
    }
    for container in body.containers {
        lines.push(format!("{indent}{}: mapping", container.name));
        describe_body(&container.body, depth + 1, lines);
    }
    for list in body.lists {
        let placement = match list.placement {
            Placement::Nested => String::new(),
            Placement::Detached { .. } => format!(" at {}", list.path),
        };
        lines.push(format!(
            "{indent}{}: list keyed by {} ({}){placement}",
            list.name,
            list.key,
            list.key_kind.describe()
        ));
        describe_body(&list.body, depth + 1, lines);
    }
    if !body.exclusive.is_empty() {
        lines.push(format!("{indent}(only one of: {})", body.exclusive.join(", ")));
    }
}
