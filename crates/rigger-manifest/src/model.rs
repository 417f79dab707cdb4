//! The typed deployment model produced by [`crate::parse_manifest`].
//!
//! All collections keep manifest declaration order. References between entities
//! (a resource pool's network, a job's disk pool, a template's release) are plain
//! names; resolving them is left to consumers.

use crate::property::PropertyMap;
use crate::types::{JobLifecycle, NetworkDefault, NetworkType};
use crate::watch_time::WatchTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub name: String,
    pub update: Update,
    pub networks: Vec<Network>,
    pub resource_pools: Vec<ResourcePool>,
    pub disk_pools: Vec<DiskPool>,
    pub jobs: Vec<Job>,
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Update {
    pub update_watch_time: WatchTime,
}

impl Default for Update {
    fn default() -> Self {
        Self {
            update_watch_time: WatchTime::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NetworkType,
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Vec<String>,
    pub cloud_properties: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcePool {
    pub name: String,
    pub network: String,
    pub cloud_properties: PropertyMap,
    pub env: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskPool {
    pub name: String,
    pub disk_size: u64,
    pub cloud_properties: PropertyMap,
}

/// A job group: `instances` identical VMs running the same templates.
///
/// `persistent_disk` and `persistent_disk_pool` may both be set; deciding which
/// one wins is up to the provisioner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub name: String,
    pub instances: u64,
    pub lifecycle: JobLifecycle,
    pub templates: Vec<ReleaseJobRef>,
    pub networks: Vec<JobNetwork>,
    pub persistent_disk: u64,
    pub persistent_disk_pool: Option<String>,
    pub properties: PropertyMap,
}

/// Unresolved reference to template `name` shipped by release `release`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseJobRef {
    pub name: String,
    pub release: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobNetwork {
    pub name: String,
    pub default: Vec<NetworkDefault>,
    pub static_ips: Vec<String>,
}

impl Manifest {
    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    pub fn resource_pool(&self, name: &str) -> Option<&ResourcePool> {
        self.resource_pools.iter().find(|p| p.name == name)
    }

    pub fn disk_pool(&self, name: &str) -> Option<&DiskPool> {
        self.disk_pools.iter().find(|p| p.name == name)
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

impl Job {
    pub fn network(&self, name: &str) -> Option<&JobNetwork> {
        self.networks.iter().find(|n| n.name == name)
    }
}

impl JobNetwork {
    /// Whether the job takes the given default-routing role from this network.
    pub fn is_default_for(&self, role: &str) -> bool {
        self.default.iter().any(|d| d == role)
    }
}
