//! Snapshot store.
//!
//! A snapshot is one emulator build's extracted description of its machine
//! types and device types. Snapshots are loaded once per run, never mutated,
//! and owned by whoever loaded them; the checking engine only borrows them.
//!
//! ## Serialized form
//!
//! A JSON array of query records, oldest query first:
//!
//! ```json
//! [
//!   {"request": ["machine", "pc-i440fx-2.8"],
//!    "result": {"max_cpus": 255, "compat_props": [
//!        {"driver": "virtio-net-pci", "property": "mq", "value": "off"}]}},
//!   {"request": ["device-type", "virtio-net-pci"],
//!    "result": {"props": [{"name": "mq", "defval": true, "info": {"name": "bool"}}],
//!               "instance_props": []}},
//!   {"request": ["device-type", "isa-fdc"],
//!    "exception": {"type": "Exception", "message": "Can't find type isa-fdc"}}
//! ]
//! ```

pub mod model;
pub mod parse;
pub mod source;

pub use model::{
    CompatOverride, DeclaredProperty, DeviceTypeDescriptor, DeviceTypeRecord, InstanceProperty,
    MachineDescriptor, PropertyInfo, Snapshot,
};
pub use parse::{parse_snapshot_bytes, parse_snapshot_value};
pub use source::{GdbExtractorSource, RawFileSource, SnapshotSource, SourceSpec};
