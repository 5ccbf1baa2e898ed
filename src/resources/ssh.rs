//! SSH client algorithm lists (`sonic_ssh`)

use declarative::schema::{Body, ContainerSchema, FieldKind, FieldSchema, ResourceSchema, Root};

const CLIENT: ContainerSchema = ContainerSchema::new(
    "client",
    "openconfig-system-ext:ssh-client",
    Body::fields(&[
        FieldSchema::new("cipher", "config/ciphers", FieldKind::LeafList),
        FieldSchema::new("kex", "config/kexalgorithms", FieldKind::LeafList),
        FieldSchema::new("mac", "config/macs", FieldKind::LeafList),
    ]),
)
.with_purge("config");

pub const SCHEMA: ResourceSchema = ResourceSchema {
    name: "ssh",
    description: "SSH client ciphers, key exchange and MAC algorithms",
    fetch: &["data/openconfig-system:system/openconfig-system-ext:ssh-client/config"],
    root: Root::Container(ContainerSchema::new(
        "ssh",
        "data/openconfig-system:system",
        Body::new(&[], &[CLIENT], &[]),
    )),
};
