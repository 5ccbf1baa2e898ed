//! Per-interface QoS: maps, PFC and queue WRED profiles (`sonic_qos_interfaces`)
//!
//! Queues are not stored under the interface on the device: they live in the
//! global queue list keyed `<interface>:<queue id>`.

use declarative::schema::{
    Body, ContainerSchema, DefaultValue, FieldKind, FieldSchema, ListSchema, ResourceSchema, Root,
};

const QOS_MAPS: ContainerSchema = ContainerSchema::new(
    "qos_maps",
    "openconfig-qos-maps-ext:interface-maps/config",
    Body::fields(&[
        FieldSchema::new("dscp_fwd_group", "dscp-to-forwarding-group", FieldKind::Str),
        FieldSchema::new("dot1p_fwd_group", "dot1p-to-forwarding-group", FieldKind::Str),
        FieldSchema::new("fwd_group_queue", "forwarding-group-to-queue", FieldKind::Str),
        FieldSchema::new("fwd_group_dscp", "forwarding-group-to-dscp", FieldKind::Str),
        FieldSchema::new("fwd_group_dot1p", "forwarding-group-to-dot1p", FieldKind::Str),
        FieldSchema::new("fwd_group_pg", "forwarding-group-to-priority-group", FieldKind::Str),
        FieldSchema::new("pfc_priority_queue", "pfc-priority-to-queue", FieldKind::Str),
        FieldSchema::new("pfc_priority_pg", "pfc-priority-to-priority-group", FieldKind::Str),
    ]),
);

const PRIORITIES: ListSchema = ListSchema::new(
    "priorities",
    "pfc-priorities",
    "pfc-priority",
    ("dot1p", FieldKind::Int),
    "dot1p",
    Body::fields(&[FieldSchema::new("enable", "config/enable", FieldKind::Bool)]),
);

const PFC: ContainerSchema = ContainerSchema::new(
    "pfc",
    "openconfig-qos-ext:pfc",
    Body::new(
        &[
            FieldSchema::new("asymmetric", "config/asymmetric", FieldKind::Bool)
                .with_default(DefaultValue::Bool(false)),
            FieldSchema::new(
                "watchdog_action",
                "watchdog/config/action",
                FieldKind::Enum(&[("drop", "openconfig-qos-ext:DROP"), ("alert", "openconfig-qos-ext:ALERT")]),
            ),
            FieldSchema::new("watchdog_detection_time", "watchdog/config/detection-time", FieldKind::Int),
            FieldSchema::new("watchdog_restoration_time", "watchdog/config/restoration-time", FieldKind::Int),
        ],
        &[],
        &[PRIORITIES],
    ),
);

const QUEUES: ListSchema = ListSchema::new(
    "queues",
    "data/openconfig-qos:qos/queues",
    "queue",
    ("id", FieldKind::Int),
    "name",
    Body::fields(&[FieldSchema::new("wred_profile", "wred/config/wred-profile", FieldKind::Str)]),
)
.detached(':');

const INTERFACES: ListSchema = ListSchema::new(
    "interfaces",
    "data/openconfig-qos:qos/interfaces",
    "interface",
    ("name", FieldKind::Str),
    "interface-id",
    Body::new(
        &[
            FieldSchema::new("scheduler_policy", "output/scheduler-policy/config/name", FieldKind::Str),
            FieldSchema::new("cable_length", "openconfig-qos-buffer:cable-length/config/length", FieldKind::Str),
        ],
        &[QOS_MAPS, PFC],
        &[QUEUES],
    ),
);

pub const SCHEMA: ResourceSchema = ResourceSchema {
    name: "qos_interfaces",
    description: "Interface QoS maps, scheduler policy, PFC and queue WRED profiles",
    fetch: &["data/openconfig-qos:qos/interfaces", "data/openconfig-qos:qos/queues"],
    root: Root::List(INTERFACES),
};
