//! WRED profiles (`sonic_qos_wred`)

use declarative::schema::{Body, ContainerSchema, FieldKind, FieldSchema, ListSchema, ResourceSchema, Root};

/// Green thresholds share the profile's `config` container on the device
const GREEN: ContainerSchema = ContainerSchema::new(
    "green",
    "config",
    Body::fields(&[
        FieldSchema::new("enable", "wred-green-enable", FieldKind::Bool),
        FieldSchema::new("min_threshold", "green-min-threshold", FieldKind::Int),
        FieldSchema::new("max_threshold", "green-max-threshold", FieldKind::Int),
        FieldSchema::new("drop_probability", "green-drop-probability", FieldKind::Int),
    ]),
);

pub const SCHEMA: ResourceSchema = ResourceSchema {
    name: "qos_wred",
    description: "QoS WRED profiles",
    fetch: &["data/openconfig-qos:qos/wred-profiles"],
    root: Root::List(ListSchema::new(
        "profiles",
        "data/openconfig-qos:qos/wred-profiles",
        "wred-profile",
        ("name", FieldKind::Str),
        "name",
        Body::new(
            &[FieldSchema::new("ecn", "config/ecn", FieldKind::Enum(&[("green", "ECN_GREEN")]))],
            &[GREEN],
            &[],
        ),
    )),
};

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{MemoryDevice, StateMode, plan};
    use serde_json::json;

    fn device() -> MemoryDevice {
        MemoryDevice::from_tree(json!({
            "openconfig-qos:qos": {"wred-profiles": {"wred-profile": [{
                "name": "profile1",
                "config": {
                    "name": "profile1",
                    "ecn": "ECN_GREEN",
                    "wred-green-enable": true,
                    "green-min-threshold": 3000,
                    "green-max-threshold": 9000,
                    "green-drop-probability": 40
                }
            }]}}
        }))
    }

    #[test]
    fn test_facts() {
        let facts = declarative::facts(&SCHEMA, &mut device()).unwrap();
        assert_eq!(
            facts.config,
            json!([{
                "name": "profile1",
                "ecn": "green",
                "green": {"enable": true, "min_threshold": 3000, "max_threshold": 9000, "drop_probability": 40}
            }])
        );
    }

    #[test]
    fn test_merged_new_profile() {
        let config = json!([{"name": "profile2", "green": {"enable": false}}]);
        let planned = plan(&SCHEMA, &config, StateMode::Merged, &mut device()).unwrap();
        let ops: Vec<String> = planned.operations.iter().map(ToString::to_string).collect();
        assert_eq!(
            ops,
            vec![
                "PATCH data/openconfig-qos:qos/wred-profiles",
                "PATCH data/openconfig-qos:qos/wred-profiles/wred-profile=profile2/config/wred-green-enable",
            ]
        );
        assert_eq!(
            planned.operations[0].payload(),
            Some(&json!({"openconfig-qos:wred-profiles": {"wred-profile": [
                {"name": "profile2", "config": {"name": "profile2"}}
            ]}}))
        );
    }

    #[test]
    fn test_overridden_removes_other_profiles() {
        let config = json!([{"name": "profile2", "ecn": "green"}]);
        let planned = plan(&SCHEMA, &config, StateMode::Overridden, &mut device()).unwrap();
        assert_eq!(
            planned.operations[0].to_string(),
            "DELETE data/openconfig-qos:qos/wred-profiles/wred-profile=profile1"
        );
        assert_eq!(
            planned.operations.last().unwrap().payload(),
            Some(&json!({"openconfig-qos:ecn": "ECN_GREEN"}))
        );
    }
}
