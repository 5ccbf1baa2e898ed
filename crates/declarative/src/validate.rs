//! Desired config validation
//!
//! Checks a user-supplied config against a resource schema and returns it in
//! canonical form: `null` members dropped, values coerced to their declared
//! types, list entries in input order. Nothing here touches the device.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::schema::{Body, ListSchema, ResourceSchema, Root, key_text};

/// Validate `config` for `schema`
///
/// A `null` config stays `null`; it means "nothing specified".
pub fn validate(schema: &ResourceSchema, config: &Value) -> Result<Value> {
    if config.is_null() {
        return Ok(Value::Null);
    }
    match &schema.root {
        Root::Container(container) => validate_body(&container.body, config, "config"),
        Root::List(list) => validate_list(list, config, "config"),
    }
}

fn validate_body(body: &Body, value: &Value, at: &str) -> Result<Value> {
    let Some(map) = value.as_object() else {
        return Err(Error::invalid(at, "expected a mapping"));
    };

    let mut out = Map::new();
    for (name, member) in map {
        if member.is_null() {
            continue;
        }
        let location = format!("{at}.{name}");
        let canonical = if let Some(field) = body.field(name) {
            field
                .kind
                .coerce(member)
                .map_err(|message| Error::invalid(&location, message))?
        } else if let Some(container) = body.container(name) {
            validate_body(&container.body, member, &location)?
        } else if let Some(list) = body.list(name) {
            validate_list(list, member, &location)?
        } else {
            return Err(Error::invalid(
                location,
                format!(
                    "unsupported parameter, supported parameters are: {}",
                    body.names().join(", ")
                ),
            ));
        };
        out.insert(name.clone(), canonical);
    }

    let given: Vec<&str> = body.exclusive.iter().copied().filter(|name| out.contains_key(*name)).collect();
    if given.len() > 1 {
        return Err(Error::invalid(
            at,
            format!("parameters are mutually exclusive: {}", given.join(", ")),
        ));
    }
    Ok(Value::Object(out))
}

fn validate_list(list: &ListSchema, value: &Value, at: &str) -> Result<Value> {
    let Some(entries) = value.as_array() else {
        return Err(Error::invalid(at, "expected a list"));
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let location = format!("{at}[{i}]");
        let Some(map) = entry.as_object() else {
            return Err(Error::invalid(location, "expected a mapping"));
        };

        let key = match map.get(list.key) {
            None | Some(Value::Null) => {
                return Err(Error::invalid(
                    location,
                    format!("missing required key `{}`", list.key),
                ));
            }
            Some(key) => list
                .key_kind
                .coerce(key)
                .map_err(|message| Error::invalid(format!("{location}.{}", list.key), message))?,
        };
        if !seen.insert(key_text(&key)) {
            return Err(Error::invalid(
                location,
                format!("duplicate entry for {} {}", list.key, key_text(&key)),
            ));
        }

        let mut members = map.clone();
        members.remove(list.key);
        let Value::Object(mut canonical) = validate_body(&list.body, &Value::Object(members), &location)? else {
            return Err(Error::invalid(location, "expected a mapping"));
        };
        canonical.insert(list.key.to_string(), key);
        out.push(Value::Object(canonical));
    }
    Ok(Value::Array(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContainerSchema, FieldKind, FieldSchema};
    use serde_json::json;

    const PROFILES: ListSchema = ListSchema::new(
        "profiles",
        "data/example:profiles",
        "profile",
        ("name", FieldKind::Str),
        "name",
        Body::new(
            &[
                FieldSchema::new("ecn", "config/ecn", FieldKind::Enum(&[("green", "ECN_GREEN")])),
                FieldSchema::new("limit", "config/limit", FieldKind::Int),
            ],
            &[ContainerSchema::new(
                "green",
                "config",
                Body::fields(&[FieldSchema::new("enable", "green-enable", FieldKind::Bool)]),
            )],
            &[],
        ),
    );

    const SCHEMA: ResourceSchema = ResourceSchema {
        name: "profiles",
        description: "test profiles",
        fetch: &["data/example:profiles"],
        root: Root::List(PROFILES),
    };

    #[test]
    fn test_null_config() {
        assert_eq!(validate(&SCHEMA, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_canonical_form() {
        let config = json!([
            {"name": "p1", "limit": "100", "ecn": "green", "green": {"enable": "true"}},
            {"name": "p2", "limit": null}
        ]);
        assert_eq!(
            validate(&SCHEMA, &config).unwrap(),
            json!([
                {"name": "p1", "limit": 100, "ecn": "green", "green": {"enable": true}},
                {"name": "p2"}
            ])
        );
    }

    #[test]
    fn test_unknown_parameter() {
        let err = validate(&SCHEMA, &json!([{"name": "p1", "colour": "red"}])).unwrap_err();
        match err {
            Error::InvalidConfig { at, message } => {
                assert_eq!(at, "config[0].colour");
                assert!(message.contains("ecn, limit, green"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_enum_outside_choices() {
        let err = validate(&SCHEMA, &json!([{"name": "p1", "ecn": "red"}])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref at, .. } if at == "config[0].ecn"));
    }

    #[test]
    fn test_missing_and_duplicate_keys() {
        assert!(validate(&SCHEMA, &json!([{"limit": 1}])).is_err());
        let err = validate(&SCHEMA, &json!([{"name": "p1"}, {"name": "p1"}])).unwrap_err();
        assert!(err.to_string().contains("duplicate entry"));
    }

    #[test]
    fn test_exclusive_members() {
        const MODES: ResourceSchema = ResourceSchema {
            name: "modes",
            description: "test modes",
            fetch: &["data/example:modes"],
            root: Root::Container(ContainerSchema::new(
                "modes",
                "data/example:modes",
                Body::new(&[FieldSchema::new("name", "config/name", FieldKind::Str)], &[], &[PROFILES])
                    .exclusive(&["name", "profiles"]),
            )),
        };
        assert!(validate(&MODES, &json!({"name": "a"})).is_ok());
        assert!(validate(&MODES, &json!({"name": null, "profiles": []})).is_ok());
        let err = validate(&MODES, &json!({"name": "a", "profiles": []})).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive: name, profiles"), "{err}");
    }

    #[test]
    fn test_wrong_shape() {
        assert!(validate(&SCHEMA, &json!({"name": "p1"})).is_err());
        assert!(validate(&SCHEMA, &json!([{"name": "p1", "green": true}])).is_err());
    }
}
