use indexmap::IndexMap;
use rigger_manifest::property::merge;
use rigger_manifest::{Job, Manifest, NetworkDefault, PropertyMap};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("job '{job}' has {instances} instances, index {index} is out of range")]
    IndexOutOfRange {
        job: String,
        index: usize,
        instances: u64,
    },
}

/// Everything a template may see while rendering one job instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationContext {
    pub deployment: String,
    pub job_name: String,
    pub index: usize,
    /// Global properties with the job's own properties merged on top.
    pub properties: PropertyMap,
    pub networks: IndexMap<String, NetworkContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkContext {
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Vec<String>,
    pub default: Vec<NetworkDefault>,
}

impl EvaluationContext {
    /// Build the context for instance `index` of `job`.
    ///
    /// Network attachments that name a network missing from the manifest still
    /// appear, with only the job-level details filled in.
    pub fn for_instance(manifest: &Manifest, job: &Job, index: usize) -> Result<Self, ContextError> {
        if index as u64 >= job.instances {
            return Err(ContextError::IndexOutOfRange {
                job: job.name.clone(),
                index,
                instances: job.instances,
            });
        }

        let networks = job
            .networks
            .iter()
            .map(|attachment| {
                let network = manifest.network(&attachment.name);
                let ip = attachment
                    .static_ips
                    .get(index)
                    .cloned()
                    .or_else(|| network.and_then(|n| n.ip.clone()));
                let context = NetworkContext {
                    ip,
                    netmask: network.and_then(|n| n.netmask.clone()),
                    gateway: network.and_then(|n| n.gateway.clone()),
                    dns: network.map(|n| n.dns.clone()).unwrap_or_default(),
                    default: attachment.default.clone(),
                };
                (attachment.name.clone(), context)
            })
            .collect();

        Ok(Self {
            deployment: manifest.name.clone(),
            job_name: job.name.clone(),
            index,
            properties: merge(&manifest.properties, &job.properties),
            networks,
        })
    }
}
