//! `sonicfg facts` - read the current configuration of resources

use anyhow::{Context as AnyhowContext, Result};
use declarative::ResourceSchema;
use serde_json::{Map, Value};

use crate::Context;
use crate::cli::FactsArgs;
use crate::commands::{Session, render};
use crate::config::Config;
use crate::progress;
use crate::resources;

pub fn run(ctx: &Context, config: &Config, args: FactsArgs) -> Result<()> {
    let schemas = select(&args.resources)?;
    let mut session = Session::open(config, &args.connection)?;

    let spinner = (!ctx.quiet).then(|| progress::spinner(&format!("Reading {}", session.describe())));
    let output = collect(&schemas, &mut session, args.raw);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    print!("{}", render(&output?, args.format)?);
    Ok(())
}

/// Schemas named on the command line, or all of them
fn select(names: &[String]) -> Result<Vec<&'static ResourceSchema>> {
    if names.is_empty() {
        return Ok(resources::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            resources::lookup(name).with_context(|| {
                format!("Unknown resource '{name}' (supported: {})", resources::names().join(", "))
            })
        })
        .collect()
}

/// Normalized facts keyed by resource name, or the merged raw device tree
fn collect(schemas: &[&ResourceSchema], session: &mut Session, raw: bool) -> Result<Value> {
    if raw {
        let mut tree = Value::Object(Map::new());
        for schema in schemas {
            let snapshot = declarative::fetch(schema, session)
                .with_context(|| format!("Failed to read {}", schema.name))?;
            declarative::tree::deep_merge(&mut tree, snapshot.into_tree());
        }
        return Ok(tree);
    }

    let mut facts = Map::new();
    for schema in schemas {
        let current = declarative::facts(schema, session)
            .with_context(|| format!("Failed to read {}", schema.name))?;
        for mismatch in &current.mismatches {
            log::warn!("{}: {mismatch}", schema.name);
        }
        facts.insert(schema.name.to_string(), current.config);
    }
    Ok(Value::Object(facts))
}
