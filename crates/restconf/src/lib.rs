//! # Restconf
//!
//! Blocking RESTCONF transport for SONiC switches.
//!
//! [`RestconfClient`] implements [`declarative::Device`]: GET requests go
//! through [`with_retry`] and are retried on transient errors, while PATCH,
//! POST and DELETE are sent exactly once. Bodies use the
//! `application/yang-data+json` media type and HTTP basic authentication.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::RestconfClient;
pub use error::{Error, ErrorCategory, Result};
pub use retry::{LogCallback, RetryCallback, with_retry};
pub use types::{ConnectionConfig, RetryConfig, YANG_JSON};
