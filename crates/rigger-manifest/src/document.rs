//! Intermediate, loosely typed shape of a manifest document.
//!
//! Only the top level is decoded in one go; section entries stay as YAML values
//! until their section parser decodes them one by one, so a bad entry can be
//! reported with its index and name.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Top-level keys this crate understands. Anything else is ignored.
pub(crate) const RECOGNIZED_KEYS: &[&str] = &[
    "name",
    "update",
    "networks",
    "resource_pools",
    "disk_pools",
    "jobs",
    "properties",
];

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawManifest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub update: RawUpdate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub networks: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_pools: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk_pools: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Value>,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawUpdate {
    #[serde(default)]
    pub update_watch_time: Option<RawWatchTime>,
}

/// Raw `update_watch_time` scalar. Numbers and strings are both accepted and
/// handed to the watch time parser as text, so a bad value such as `-5` or
/// `1.5` fails there rather than while decoding.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub(crate) struct RawWatchTime(Value);

impl RawWatchTime {
    pub fn expression(&self) -> String {
        match &self.0 {
            Value::String(expr) => expr.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => serde_yaml::to_string(other)
                .map(|text| text.trim_end().to_owned())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNetwork {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns: Vec<String>,
    #[serde(default)]
    pub cloud_properties: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawResourcePool {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub network: String,
    #[serde(default)]
    pub cloud_properties: Value,
    #[serde(default)]
    pub env: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDiskPool {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk_size: u64,
    #[serde(default)]
    pub cloud_properties: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawJob {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: u64,
    #[serde(default)]
    pub lifecycle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub templates: Vec<RawReleaseJobRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub networks: Vec<RawJobNetwork>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub persistent_disk: u64,
    #[serde(default)]
    pub persistent_disk_pool: Option<String>,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawReleaseJobRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawJobNetwork {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub static_ips: Vec<String>,
}

/// `key: ~` decodes the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Value of the `name` key of a section entry, if it has a string one.
pub(crate) fn entry_name(entry: &Value) -> Option<String> {
    entry
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
