//! Global PFC watchdog settings (`sonic_qos_pfc`)

use declarative::schema::{Body, ContainerSchema, DefaultValue, FieldKind, FieldSchema, ResourceSchema, Root};

pub const SCHEMA: ResourceSchema = ResourceSchema {
    name: "qos_pfc",
    description: "PFC watchdog flex counters and poll interval",
    fetch: &["data/openconfig-qos:qos/pfc-watchdog"],
    root: Root::Container(ContainerSchema::new(
        "pfc",
        "data/openconfig-qos:qos/pfc-watchdog",
        Body::fields(&[
            FieldSchema::new("counter_poll", "flex/config/counter-poll", FieldKind::Bool)
                .with_default(DefaultValue::Bool(true)),
            FieldSchema::new("poll_interval", "poll/config/poll-interval", FieldKind::Int),
        ]),
    )),
};
