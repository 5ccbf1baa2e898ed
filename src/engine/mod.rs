//! Terminal front end of the reconciliation engine
//!
//! The `declarative` crate computes and sends operations; this module shows
//! them, asks before applying and reports progress.

pub mod differ;
pub mod executor;

pub use differ::{display_config_diff, display_operations};
pub use executor::{BarProgress, PromptConfirm, print_summary};
