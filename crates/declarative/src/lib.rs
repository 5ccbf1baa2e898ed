//! # Declarative
//!
//! Schema-driven desired-state reconciliation for RESTCONF devices.
//!
//! This crate compiles a desired configuration and the device's current
//! configuration into the minimal ordered list of PATCH/DELETE operations,
//! and sends them through a device session.
//!
//! ## Core Concepts
//!
//! - **ResourceSchema**: static table of a resource's containers, lists and fields
//! - **Snapshot**: raw device state fetched for a resource
//! - **Facts**: the snapshot normalized into the argument shape
//! - **StateMode**: merged, replaced, overridden or deleted
//! - **Operation**: one PATCH/POST/DELETE with its path and payload
//! - **Plan**: operations ordered into a delete phase and a write phase
//!
//! ## Example
//!
//! ```
//! use declarative::schema::{Body, ContainerSchema, FieldKind, FieldSchema, ResourceSchema, Root};
//! use declarative::{MemoryDevice, RunOptions, StateMode, run_simple};
//! use serde_json::json;
//!
//! const PFC: ResourceSchema = ResourceSchema {
//!     name: "qos_pfc",
//!     description: "PFC watchdog",
//!     fetch: &["data/openconfig-qos:qos/pfc-watchdog"],
//!     root: Root::Container(ContainerSchema::new(
//!         "pfc",
//!         "data/openconfig-qos:qos/pfc-watchdog",
//!         Body::fields(&[FieldSchema::new("poll_interval", "poll/config/poll-interval", FieldKind::Int)]),
//!     )),
//! };
//!
//! let mut device = MemoryDevice::new();
//! let report = run_simple(&PFC, &json!({"poll_interval": 150}), StateMode::Merged, &mut device, RunOptions::default())?;
//!
//! assert!(report.changed);
//! assert_eq!(report.commands[0].to_string(), "PATCH data/openconfig-qos:qos/pfc-watchdog/poll/config/poll-interval");
//! # Ok::<(), declarative::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`Device`]: an open session with one switch
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on a
//! specific HTTP client or UI framework.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod facts;
pub mod memory;
pub mod normalize;
pub mod planner;
pub mod reconcile;
pub mod schema;
pub mod tree;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use context::{
    AutoConfirm, AutoDecline, ConfirmCallback, Device, DeviceError, NoProgress, ProgressCallback,
};
pub use diff::{DiffSummary, diff};
pub use error::{Error, Result};
pub use executor::{execute, execute_simple};
pub use facts::{Snapshot, fetch};
pub use memory::MemoryDevice;
pub use normalize::{Facts, SchemaMismatch, normalize};
pub use planner::Plan;
pub use reconcile::{Planned, RunOptions, facts, plan, run, run_simple, simulate};
pub use schema::ResourceSchema;
pub use types::{ExecuteSummary, Method, Operation, RunReport, StateMode};
pub use validate::validate;
pub use yangpath::{Path, Segment};
