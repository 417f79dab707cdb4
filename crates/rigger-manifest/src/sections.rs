//! Section parsers: one typed entity per raw section entry.
//!
//! Output index `i` always corresponds to input index `i`. The first failing
//! entry aborts the section and is reported with its index and, when it has
//! one, its name. No cross-entry checks (duplicate names, dangling references)
//! happen here.

use crate::document::{
    entry_name, RawDiskPool, RawJob, RawJobNetwork, RawNetwork, RawReleaseJobRef,
    RawResourcePool,
};
use crate::model::{DiskPool, Job, JobNetwork, Network, ReleaseJobRef, ResourcePool};
use crate::property::{build_map, PropertyError, PropertyMap};
use crate::types::{JobLifecycle, NetworkDefault, NetworkType};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Networks,
    ResourcePools,
    DiskPools,
    Jobs,
}

impl Section {
    /// Manifest key of the section.
    pub fn key(self) -> &'static str {
        match self {
            Section::Networks => "networks",
            Section::ResourcePools => "resource_pools",
            Section::DiskPools => "disk_pools",
            Section::Jobs => "jobs",
        }
    }

    /// What a single entry of the section is called in messages.
    pub fn entry_noun(self) -> &'static str {
        match self {
            Section::Networks => "network",
            Section::ResourcePools => "resource_pool",
            Section::DiskPools => "disk_pool",
            Section::Jobs => "job",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("decoding entry: {0}")]
    Decode(#[from] serde_yaml::Error),
    #[error("{block}: {source}")]
    Properties {
        block: &'static str,
        source: PropertyError,
    },
    #[error("template at index {index} has no name")]
    MissingTemplateName { index: usize },
    #[error("network at index {index} has no name")]
    MissingNetworkName { index: usize },
}

/// Failure of one entry inside a section.
#[derive(Debug, Error)]
#[error("parsing {section}: {noun} {label}: {source}", noun = .section.entry_noun())]
pub struct SectionError {
    pub section: Section,
    pub label: EntryLabel,
    pub source: EntryError,
}

/// Index and, when known, name of a section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLabel {
    pub index: usize,
    pub name: Option<String>,
}

impl fmt::Display for EntryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "'{name}' (index {})", self.index),
            None => write!(f, "at index {}", self.index),
        }
    }
}

pub fn parse_networks(entries: &[Value]) -> Result<Vec<Network>, SectionError> {
    parse_section(Section::Networks, entries, |raw: RawNetwork| {
        Ok(Network {
            cloud_properties: property_block("cloud_properties", &raw.cloud_properties)?,
            name: raw.name,
            kind: NetworkType::new(raw.kind),
            ip: raw.ip,
            netmask: raw.netmask,
            gateway: raw.gateway,
            dns: raw.dns,
        })
    })
}

pub fn parse_resource_pools(entries: &[Value]) -> Result<Vec<ResourcePool>, SectionError> {
    parse_section(Section::ResourcePools, entries, |raw: RawResourcePool| {
        Ok(ResourcePool {
            cloud_properties: property_block("cloud_properties", &raw.cloud_properties)?,
            env: property_block("env", &raw.env)?,
            name: raw.name,
            network: raw.network,
        })
    })
}

pub fn parse_disk_pools(entries: &[Value]) -> Result<Vec<DiskPool>, SectionError> {
    parse_section(Section::DiskPools, entries, |raw: RawDiskPool| {
        Ok(DiskPool {
            cloud_properties: property_block("cloud_properties", &raw.cloud_properties)?,
            name: raw.name,
            disk_size: raw.disk_size,
        })
    })
}

pub fn parse_jobs(entries: &[Value]) -> Result<Vec<Job>, SectionError> {
    parse_section(Section::Jobs, entries, |raw: RawJob| {
        Ok(Job {
            templates: release_job_refs(raw.templates)?,
            networks: job_networks(raw.networks)?,
            properties: property_block("properties", &raw.properties)?,
            lifecycle: raw
                .lifecycle
                .filter(|l| !l.is_empty())
                .map(JobLifecycle::new)
                .unwrap_or_default(),
            name: raw.name,
            instances: raw.instances,
            persistent_disk: raw.persistent_disk,
            persistent_disk_pool: raw.persistent_disk_pool.filter(|p| !p.is_empty()),
        })
    })
}

/// Decode each entry into `R`, then build `T` from it, tagging any failure
/// with the entry's position.
fn parse_section<R, T, F>(section: Section, entries: &[Value], build: F) -> Result<Vec<T>, SectionError>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<T, EntryError>,
{
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_yaml::from_value::<R>(entry.clone())
                .map_err(EntryError::from)
                .and_then(&build)
                .map_err(|source| SectionError {
                    section,
                    label: EntryLabel {
                        index,
                        name: entry_name(entry),
                    },
                    source,
                })
        })
        .collect()
}

fn property_block(block: &'static str, value: &Value) -> Result<PropertyMap, EntryError> {
    build_map(value).map_err(|source| EntryError::Properties { block, source })
}

fn release_job_refs(raw: Vec<RawReleaseJobRef>) -> Result<Vec<ReleaseJobRef>, EntryError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, template)| {
            if template.name.is_empty() {
                return Err(EntryError::MissingTemplateName { index });
            }
            Ok(ReleaseJobRef {
                name: template.name,
                release: template.release,
            })
        })
        .collect()
}

fn job_networks(raw: Vec<RawJobNetwork>) -> Result<Vec<JobNetwork>, EntryError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, network)| {
            if network.name.is_empty() {
                return Err(EntryError::MissingNetworkName { index });
            }
            Ok(JobNetwork {
                name: network.name,
                default: network.default.into_iter().map(NetworkDefault::new).collect(),
                static_ips: network.static_ips,
            })
        })
        .collect()
}
