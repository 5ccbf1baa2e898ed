//! Spanning tree settings (`sonic_stp`)
//!
//! Global and per-interface settings, plus one section per protocol: MST
//! instances under `mstp`, per-VLAN instances under `pvst` and `rapid_pvst`.
//! Only one protocol section may be given per task.

use declarative::schema::{Body, ContainerSchema, FieldKind, FieldSchema, ListSchema, ResourceSchema, Root};

const PROTOCOLS: FieldKind = FieldKind::Enum(&[
    ("mst", "openconfig-spanning-tree-types:MSTP"),
    ("pvst", "openconfig-spanning-tree-ext:PVST"),
    ("rapid_pvst", "openconfig-spanning-tree-types:RAPID_PVST"),
]);

const GLOBAL: ContainerSchema = ContainerSchema::new(
    "global",
    "global",
    Body::fields(&[
        FieldSchema::new("enabled_protocol", "config/enabled-protocol", PROTOCOLS),
        FieldSchema::new("bpdu_filter", "config/bpdu-filter", FieldKind::Bool),
        FieldSchema::new("bridge_priority", "config/openconfig-spanning-tree-ext:bridge-priority", FieldKind::Int),
        FieldSchema::new("fwd_delay", "config/openconfig-spanning-tree-ext:forwarding-delay", FieldKind::Int),
        FieldSchema::new("hello_time", "config/openconfig-spanning-tree-ext:hello-time", FieldKind::Int),
        FieldSchema::new("max_age", "config/openconfig-spanning-tree-ext:max-age", FieldKind::Int),
        FieldSchema::new("loop_guard", "config/loop-guard", FieldKind::Bool),
        FieldSchema::new("portfast", "config/openconfig-spanning-tree-ext:portfast", FieldKind::Bool),
        FieldSchema::new(
            "root_guard_timeout",
            "config/openconfig-spanning-tree-ext:rootguard-timeout",
            FieldKind::Int,
        ),
        FieldSchema::new(
            "disabled_vlans",
            "config/openconfig-spanning-tree-ext:disabled-vlans",
            FieldKind::Values,
        ),
    ]),
)
.with_purge("config");

const INTERFACES: ListSchema = ListSchema::new(
    "interfaces",
    "interfaces",
    "interface",
    ("intf_name", FieldKind::Str),
    "name",
    Body::fields(&[
        FieldSchema::new("edge_port", "config/openconfig-spanning-tree-ext:edge-port", FieldKind::Bool),
        FieldSchema::new("link_type", "config/link-type", FieldKind::Enum(&[
            ("point-to-point", "P2P"),
            ("shared", "SHARED"),
        ])),
        FieldSchema::new("guard", "config/guard", FieldKind::Enum(&[
            ("loop", "LOOP"),
            ("root", "ROOT"),
            ("none", "NONE"),
        ])),
        FieldSchema::new("bpdu_guard", "config/bpdu-guard", FieldKind::Bool),
        FieldSchema::new("bpdu_filter", "config/bpdu-filter", FieldKind::Bool),
        FieldSchema::new("portfast", "config/openconfig-spanning-tree-ext:portfast", FieldKind::Bool),
        FieldSchema::new("uplink_fast", "config/openconfig-spanning-tree-ext:uplink-fast", FieldKind::Bool),
        FieldSchema::new(
            "shutdown",
            "config/openconfig-spanning-tree-ext:bpdu-guard-port-shutdown",
            FieldKind::Bool,
        ),
        FieldSchema::new("cost", "config/openconfig-spanning-tree-ext:cost", FieldKind::Int),
        FieldSchema::new("port_priority", "config/openconfig-spanning-tree-ext:port-priority", FieldKind::Int),
        FieldSchema::new(
            "stp_enable",
            "config/openconfig-spanning-tree-ext:spanning-tree-enable",
            FieldKind::Bool,
        ),
    ]),
);

/// Per-instance port settings, shared by every protocol section
const INSTANCE_INTERFACES: ListSchema = ListSchema::new(
    "interfaces",
    "interfaces",
    "interface",
    ("intf_name", FieldKind::Str),
    "name",
    Body::fields(&[
        FieldSchema::new("cost", "config/cost", FieldKind::Int),
        FieldSchema::new("port_priority", "config/port-priority", FieldKind::Int),
    ]),
);

const MST_INSTANCES: ListSchema = ListSchema::new(
    "mst_instances",
    "mst-instances",
    "mst-instance",
    ("mst_id", FieldKind::Int),
    "mst-id",
    Body::new(
        &[
            FieldSchema::new("bridge_priority", "config/bridge-priority", FieldKind::Int),
            FieldSchema::new("vlans", "config/vlan", FieldKind::Values),
        ],
        &[],
        &[INSTANCE_INTERFACES],
    ),
);

const MSTP: ContainerSchema = ContainerSchema::new(
    "mstp",
    "mstp",
    Body::new(
        &[
            FieldSchema::new("mst_name", "config/name", FieldKind::Str),
            FieldSchema::new("revision", "config/revision", FieldKind::Int),
            FieldSchema::new("max_hop", "config/max-hop", FieldKind::Int),
            FieldSchema::new("hello_time", "config/hello-time", FieldKind::Int),
            FieldSchema::new("max_age", "config/max-age", FieldKind::Int),
            FieldSchema::new("fwd_delay", "config/forwarding-delay", FieldKind::Int),
        ],
        &[],
        &[MST_INSTANCES],
    ),
);

const VLAN_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("bridge_priority", "config/bridge-priority", FieldKind::Int),
    FieldSchema::new("fwd_delay", "config/forwarding-delay", FieldKind::Int),
    FieldSchema::new("hello_time", "config/hello-time", FieldKind::Int),
    FieldSchema::new("max_age", "config/max-age", FieldKind::Int),
];

const PVST: ListSchema = ListSchema::new(
    "pvst",
    "openconfig-spanning-tree-ext:pvst",
    "vlans",
    ("vlan_id", FieldKind::Int),
    "vlan-id",
    Body::new(VLAN_FIELDS, &[], &[INSTANCE_INTERFACES]),
);

const RAPID_PVST: ListSchema = ListSchema::new(
    "rapid_pvst",
    "rapid-pvst",
    "vlan",
    ("vlan_id", FieldKind::Int),
    "vlan-id",
    Body::new(VLAN_FIELDS, &[], &[INSTANCE_INTERFACES]),
);

pub const SCHEMA: ResourceSchema = ResourceSchema {
    name: "stp",
    description: "Spanning tree global settings and interfaces",
    fetch: &[
        "data/openconfig-spanning-tree:stp/global",
        "data/openconfig-spanning-tree:stp/interfaces",
        "data/openconfig-spanning-tree:stp/mstp",
        "data/openconfig-spanning-tree:stp/openconfig-spanning-tree-ext:pvst",
        "data/openconfig-spanning-tree:stp/rapid-pvst",
    ],
    root: Root::Container(ContainerSchema::new(
        "stp",
        "data/openconfig-spanning-tree:stp",
        Body::new(&[], &[GLOBAL, MSTP], &[INTERFACES, PVST, RAPID_PVST])
            .exclusive(&["mstp", "pvst", "rapid_pvst"]),
    )),
};

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{MemoryDevice, RunOptions, StateMode, plan, run_simple};
    use serde_json::{Value, json};

    fn device() -> MemoryDevice {
        MemoryDevice::from_tree(json!({
            "openconfig-spanning-tree:stp": {
                "global": {"config": {
                    "enabled-protocol": ["openconfig-spanning-tree-types:MSTP"],
                    "openconfig-spanning-tree-ext:bridge-priority": 4096,
                    "openconfig-spanning-tree-ext:disabled-vlans": ["10", "20-30"]
                }},
                "interfaces": {"interface": [{
                    "name": "Ethernet0",
                    "config": {"name": "Ethernet0", "guard": "ROOT", "openconfig-spanning-tree-ext:cost": 20}
                }]}
            }
        }))
    }

    fn commands(config: &Value, mode: StateMode) -> Vec<String> {
        plan(&SCHEMA, config, mode, &mut device())
            .unwrap()
            .operations
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_facts_reports_unreadable_protocol() {
        let facts = declarative::facts(&SCHEMA, &mut device()).unwrap();
        // enabled-protocol arrives as an array on some releases
        assert_eq!(facts.mismatches.len(), 1);
        assert_eq!(
            facts.config,
            json!({
                "global": {"bridge_priority": 4096, "disabled_vlans": ["10", "20-30"]},
                "interfaces": [{"intf_name": "Ethernet0", "guard": "root", "cost": 20}]
            })
        );
    }

    #[test]
    fn test_deleted_all() {
        assert_eq!(
            commands(&Value::Null, StateMode::Deleted),
            vec![
                "DELETE data/openconfig-spanning-tree:stp/global/config",
                "DELETE data/openconfig-spanning-tree:stp/interfaces/interface=Ethernet0",
            ]
        );
    }

    #[test]
    fn test_replaced_untouched_sections() {
        let ops = commands(&json!({"interfaces": [{"intf_name": "Ethernet0", "cost": 20}]}), StateMode::Replaced);
        assert_eq!(
            ops,
            vec!["DELETE data/openconfig-spanning-tree:stp/interfaces/interface=Ethernet0/config/guard"]
        );
    }

    #[test]
    fn test_disabled_vlans_sent_as_list() {
        let planned = plan(
            &SCHEMA,
            &json!({"global": {"disabled_vlans": ["10", "20-30", "40"]}}),
            StateMode::Merged,
            &mut device(),
        )
        .unwrap();
        assert_eq!(planned.operations.len(), 1);
        assert_eq!(
            planned.operations[0].payload(),
            Some(&json!({"openconfig-spanning-tree-ext:disabled-vlans": ["10", "20-30", "40"]}))
        );

        // already a subset of what the device holds
        assert!(commands(&json!({"global": {"disabled_vlans": ["20-30"]}}), StateMode::Merged).is_empty());
    }

    #[test]
    fn test_replaced_disabled_vlans_deletes_first() {
        let ops = commands(
            &json!({"global": {"bridge_priority": 4096, "disabled_vlans": ["20-30", "10"]}}),
            StateMode::Replaced,
        );
        assert_eq!(
            ops,
            vec![
                "DELETE data/openconfig-spanning-tree:stp/global/config/openconfig-spanning-tree-ext:disabled-vlans",
                "PATCH data/openconfig-spanning-tree:stp/global/config/openconfig-spanning-tree-ext:disabled-vlans",
            ]
        );
    }

    #[test]
    fn test_mstp_merged_creates_nested_entries() {
        let config = json!({"mstp": {
            "mst_name": "region1",
            "mst_instances": [{
                "mst_id": 1,
                "bridge_priority": 8192,
                "vlans": ["100", "200-210"],
                "interfaces": [{"intf_name": "Ethernet8", "cost": 10}]
            }]
        }});
        assert_eq!(
            commands(&config, StateMode::Merged),
            vec![
                "PATCH data/openconfig-spanning-tree:stp/mstp/config/name",
                "PATCH data/openconfig-spanning-tree:stp/mstp/mst-instances",
                "PATCH data/openconfig-spanning-tree:stp/mstp/mst-instances/mst-instance=1/config/bridge-priority",
                "PATCH data/openconfig-spanning-tree:stp/mstp/mst-instances/mst-instance=1/config/vlan",
                "PATCH data/openconfig-spanning-tree:stp/mstp/mst-instances/mst-instance=1/interfaces",
                "PATCH data/openconfig-spanning-tree:stp/mstp/mst-instances/mst-instance=1/interfaces/interface=Ethernet8/config/cost",
            ]
        );

        let mut device = device();
        let first = run_simple(&SCHEMA, &config, StateMode::Merged, &mut device, RunOptions::default()).unwrap();
        assert_eq!(first.after.as_ref().map(|after| &after["mstp"]), Some(&config["mstp"]));
        let second = plan(&SCHEMA, &config, StateMode::Merged, &mut device).unwrap();
        assert!(second.operations.is_empty(), "{:?}", second.operations);
    }

    fn vlan_device() -> MemoryDevice {
        MemoryDevice::from_tree(json!({
            "openconfig-spanning-tree:stp": {
                "openconfig-spanning-tree-ext:pvst": {"vlans": [{
                    "vlan-id": 10,
                    "config": {"vlan-id": 10, "bridge-priority": 4096},
                    "interfaces": {"interface": [{"name": "Ethernet0", "config": {"name": "Ethernet0", "cost": 5}}]}
                }]},
                "rapid-pvst": {"vlan": [{
                    "vlan-id": 20,
                    "config": {"vlan-id": 20, "hello-time": 3},
                    "interfaces": {"interface": [{"name": "Ethernet4", "config": {"name": "Ethernet4", "port-priority": 64}}]}
                }]}
            }
        }))
    }

    fn vlan_commands(config: &Value, mode: StateMode) -> Vec<String> {
        plan(&SCHEMA, config, mode, &mut vlan_device())
            .unwrap()
            .operations
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_facts_read_vlan_instances() {
        let facts = declarative::facts(&SCHEMA, &mut vlan_device()).unwrap();
        assert_eq!(
            facts.config,
            json!({
                "pvst": [{"vlan_id": 10, "bridge_priority": 4096, "interfaces": [{"intf_name": "Ethernet0", "cost": 5}]}],
                "rapid_pvst": [{"vlan_id": 20, "hello_time": 3, "interfaces": [{"intf_name": "Ethernet4", "port_priority": 64}]}]
            })
        );
    }

    #[test]
    fn test_pvst_deleted() {
        assert_eq!(
            vlan_commands(&json!({"pvst": [{"vlan_id": 10}]}), StateMode::Deleted),
            vec!["DELETE data/openconfig-spanning-tree:stp/openconfig-spanning-tree-ext:pvst/vlans=10"]
        );
        assert_eq!(
            vlan_commands(
                &json!({"pvst": [{"vlan_id": 10, "interfaces": [{"intf_name": "Ethernet0"}]}]}),
                StateMode::Deleted
            ),
            vec!["DELETE data/openconfig-spanning-tree:stp/openconfig-spanning-tree-ext:pvst/vlans=10/interfaces/interface=Ethernet0"]
        );
    }

    #[test]
    fn test_rapid_pvst_replaced() {
        assert_eq!(
            vlan_commands(&json!({"rapid_pvst": [{"vlan_id": 20, "hello_time": 4}]}), StateMode::Replaced),
            vec![
                "DELETE data/openconfig-spanning-tree:stp/rapid-pvst/vlan=20/interfaces/interface=Ethernet4",
                "PATCH data/openconfig-spanning-tree:stp/rapid-pvst/vlan=20/config/hello-time",
            ]
        );
    }

    #[test]
    fn test_protocol_sections_are_exclusive() {
        let config = json!({"mstp": {"max_hop": 20}, "pvst": [{"vlan_id": 10}]});
        let err = plan(&SCHEMA, &config, StateMode::Merged, &mut device()).unwrap_err();
        assert!(err.is_pre_flight());
        assert!(err.to_string().contains("mutually exclusive: mstp, pvst"), "{err}");
    }

    #[test]
    fn test_merged_is_idempotent() {
        let config = json!({
            "global": {"enabled_protocol": "pvst", "disabled_vlans": ["10", "20-30", "40"]},
            "interfaces": [{"intf_name": "Ethernet4", "link_type": "shared"}]
        });
        let mut device = device();
        let first = run_simple(&SCHEMA, &config, StateMode::Merged, &mut device, RunOptions::default()).unwrap();
        assert!(first.changed);
        let second = plan(&SCHEMA, &config, StateMode::Merged, &mut device).unwrap();
        assert!(second.operations.is_empty(), "{:?}", second.operations);
    }
}
