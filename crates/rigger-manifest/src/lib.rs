//! Deployment manifest parsing and property normalization for rigger.
//!
//! This crate turns a YAML deployment manifest (networks, resource pools, disk
//! pools, jobs and properties) into a typed [`Manifest`]. Every dynamic block is
//! normalized into a [`Property`] tree by a single recursive pass, so downstream
//! code never deals with loosely typed YAML. Parsing is fail-fast: the first
//! error aborts and is reported as one path from the manifest down to the cause.

mod document;
pub mod model;
pub mod parser;
pub mod property;
pub mod sections;
pub mod source;
pub mod types;
pub mod watch_time;

pub use model::{DiskPool, Job, JobNetwork, Manifest, Network, ReleaseJobRef, ResourcePool, Update};
pub use parser::{
    parse_manifest, parse_manifest_bytes, parse_manifest_file, parse_manifest_str, ManifestError,
    ManifestErrorKind,
};
pub use property::{build_map, Property, PropertyError, PropertyMap};
pub use sections::{
    parse_disk_pools, parse_jobs, parse_networks, parse_resource_pools, EntryError, EntryLabel,
    Section, SectionError,
};
pub use source::{BytesSource, FileSource, ManifestSource};
pub use types::{JobLifecycle, NetworkDefault, NetworkType};
pub use watch_time::{WatchTime, WatchTimeError};
