//! Resource schemas known to the CLI
//!
//! Each resource is a static field table; the generic engine in the
//! `declarative` crate does the rest.

use declarative::ResourceSchema;

pub mod qos_interfaces;
pub mod qos_pfc;
pub mod qos_wred;
pub mod ssh;
pub mod stp;

/// Every supported resource, in display order
pub const ALL: &[&ResourceSchema] = &[
    &qos_interfaces::SCHEMA,
    &qos_pfc::SCHEMA,
    &qos_wred::SCHEMA,
    &ssh::SCHEMA,
    &stp::SCHEMA,
];

/// Find a resource by name; the `sonic_` module prefix is optional
pub fn lookup(name: &str) -> Option<&'static ResourceSchema> {
    let name = name.strip_prefix("sonic_").unwrap_or(name);
    ALL.iter().copied().find(|schema| schema.name == name)
}

/// Names of all resources, for error messages
pub fn names() -> Vec<&'static str> {
    ALL.iter().map(|schema| schema.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("ssh").unwrap().name, "ssh");
        assert_eq!(lookup("sonic_qos_wred").unwrap().name, "qos_wred");
        assert!(lookup("bgp").is_none());
    }

    #[test]
    fn test_names_unique() {
        let mut names = names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_schema_paths_parse() {
        for schema in ALL {
            assert!(!schema.fetch_paths().unwrap().is_empty(), "{}", schema.name);
            assert!(schema.empty_config().is_array() || schema.empty_config().is_object());
        }
    }
}
