//! # yangpath
//!
//! Hierarchical resource addresses for YANG-modeled RESTCONF APIs.
//!
//! A [`Path`] is a sequence of [`Segment`]s. Each segment names a node,
//! optionally qualified with its YANG module, and list entries carry their key
//! values as a predicate:
//!
//! ```
//! use yangpath::{Path, Segment};
//!
//! let queue = Path::parse("data/openconfig-qos:qos/queues")
//!     .unwrap()
//!     .child(Segment::entry("queue", ["Eth1/5:0"]))
//!     .unwrap();
//!
//! assert_eq!(queue.to_string(), "data/openconfig-qos:qos/queues/queue=Eth1%2f5:0");
//! assert_eq!(Path::parse(&queue.to_string()).unwrap(), queue);
//! ```
//!
//! Key values are percent-encoded on output and decoded on parse, so any key
//! (including ones containing `/`, `,` or `=`) survives a round trip.

pub mod encode;
pub mod error;
pub mod path;

pub use encode::{decode_key, encode_key};
pub use error::{Error, Result};
pub use path::{Path, Segment};
