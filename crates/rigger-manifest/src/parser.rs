use crate::document::{RawManifest, RawUpdate, RECOGNIZED_KEYS};
use crate::model::{Manifest, Update};
use crate::property::{build_map, PropertyError};
use crate::sections::{
    parse_disk_pools, parse_jobs, parse_networks, parse_resource_pools, SectionError,
};
use crate::source::{BytesSource, FileSource, ManifestSource};
use crate::watch_time::{WatchTime, WatchTimeError};
use serde_yaml::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Any failure while turning a manifest source into a [`Manifest`].
///
/// The message already spells out the whole chain down to the root cause, so
/// `kind` is not reported again as the error source; match on it instead.
#[derive(Debug, Error)]
#[error("parsing deployment manifest '{origin}': {kind}")]
pub struct ManifestError {
    pub origin: String,
    pub kind: ManifestErrorKind,
}

#[derive(Debug, Error)]
pub enum ManifestErrorKind {
    #[error("reading manifest: {0}")]
    Read(#[from] std::io::Error),
    #[error("decoding manifest: {0}")]
    Decode(#[from] serde_yaml::Error),
    #[error("deployment name must not be empty")]
    MissingName,
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error("parsing global properties: {0}")]
    Properties(#[from] PropertyError),
    #[error("parsing update watch time: {0}")]
    WatchTime(#[from] WatchTimeError),
}

pub fn parse_manifest(source: &impl ManifestSource) -> Result<Manifest, ManifestError> {
    let origin = source.origin();
    info!("parsing deployment manifest {origin}");
    let manifest = source
        .read()
        .map_err(ManifestErrorKind::from)
        .and_then(|bytes| parse_document(&origin, &bytes))
        .map_err(|kind| ManifestError {
            origin: origin.clone(),
            kind,
        })?;
    info!(
        "parsed deployment '{}': {} networks, {} resource pools, {} disk pools, {} jobs",
        manifest.name,
        manifest.networks.len(),
        manifest.resource_pools.len(),
        manifest.disk_pools.len(),
        manifest.jobs.len()
    );
    Ok(manifest)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    parse_manifest(&FileSource::new(path))
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    parse_manifest_bytes("<inline>", input.as_bytes())
}

pub fn parse_manifest_bytes(label: &str, bytes: &[u8]) -> Result<Manifest, ManifestError> {
    parse_manifest(&BytesSource::new(label, bytes))
}

fn parse_document(origin: &str, bytes: &[u8]) -> Result<Manifest, ManifestErrorKind> {
    let raw = decode(origin, bytes)?;
    if raw.name.trim().is_empty() {
        return Err(ManifestErrorKind::MissingName);
    }

    let networks = parse_networks(&raw.networks)?;
    let resource_pools = parse_resource_pools(&raw.resource_pools)?;
    let disk_pools = parse_disk_pools(&raw.disk_pools)?;
    let jobs = parse_jobs(&raw.jobs)?;
    let properties = build_map(&raw.properties)?;
    let update = resolve_update(&raw.update)?;

    Ok(Manifest {
        name: raw.name,
        update,
        networks,
        resource_pools,
        disk_pools,
        jobs,
        properties,
    })
}

fn decode(origin: &str, bytes: &[u8]) -> Result<RawManifest, ManifestErrorKind> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawManifest::default());
    }
    let mut document: Value = serde_yaml::from_slice(bytes)?;
    document.apply_merge()?;
    debug!("decoded manifest document {origin}: {document:?}");

    match &document {
        Value::Null => return Ok(RawManifest::default()),
        Value::Mapping(mapping) => {
            for key in mapping.keys() {
                match key.as_str() {
                    Some(k) if RECOGNIZED_KEYS.contains(&k) => {}
                    Some(k) => warn!("ignoring unrecognized top-level key '{k}' in {origin}"),
                    None => warn!("ignoring non-string top-level key {key:?} in {origin}"),
                }
            }
        }
        _ => {}
    }

    Ok(serde_yaml::from_value(document)?)
}

/// The default update policy, with the watch time replaced when the manifest
/// supplies one.
fn resolve_update(raw: &RawUpdate) -> Result<Update, WatchTimeError> {
    let mut update = Update::default();
    if let Some(watch_time) = &raw.update_watch_time {
        update.update_watch_time = WatchTime::parse(&watch_time.expression())?;
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;
    use crate::sections::Section;

    #[test]
    fn parses_minimal_manifest() {
        let manifest = parse_manifest_str("name: minimal\n").unwrap();
        assert_eq!(manifest.name, "minimal");
        assert_eq!(manifest.update, Update::default());
        assert!(manifest.networks.is_empty());
        assert!(manifest.jobs.is_empty());
        assert!(manifest.properties.is_empty());
    }

    #[test]
    fn missing_update_uses_default_watch_time() {
        let manifest = parse_manifest_str("name: d\nupdate: {}\n").unwrap();
        assert_eq!(
            manifest.update.update_watch_time,
            WatchTime { start: 0, end: 300_000 }
        );
    }

    #[test]
    fn watch_time_range_overrides_default() {
        let manifest =
            parse_manifest_str("name: d\nupdate:\n  update_watch_time: \"1000-2000\"\n").unwrap();
        assert_eq!(
            manifest.update.update_watch_time,
            WatchTime {
                start: 1000,
                end: 2000
            }
        );
    }

    #[test]
    fn watch_time_single_value_overrides_end() {
        let manifest =
            parse_manifest_str("name: d\nupdate:\n  update_watch_time: \"5000\"\n").unwrap();
        assert_eq!(
            manifest.update.update_watch_time,
            WatchTime { start: 0, end: 5000 }
        );
        let manifest =
            parse_manifest_str("name: d\nupdate:\n  update_watch_time: 5000\n").unwrap();
        assert_eq!(manifest.update.update_watch_time.end, 5000);
    }

    #[test]
    fn invalid_watch_time_fails_the_parse() {
        let err = parse_manifest_str("name: d\nupdate:\n  update_watch_time: 9-1\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ManifestErrorKind::WatchTime(WatchTimeError::InvalidInterval { start: 9, end: 1 })
        ));
        assert!(err.to_string().contains("parsing update watch time"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = parse_manifest_str("jobs: []\n").unwrap_err();
        assert!(matches!(err.kind, ManifestErrorKind::MissingName));
        let err = parse_manifest_str("").unwrap_err();
        assert!(matches!(err.kind, ManifestErrorKind::MissingName));
    }

    #[test]
    fn null_properties_is_empty_map() {
        let manifest = parse_manifest_str("name: d\nproperties:\n").unwrap();
        assert!(manifest.properties.is_empty());
    }

    #[test]
    fn global_property_failure_is_reported() {
        let err = parse_manifest_str("name: d\nproperties:\n  false: x\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ManifestErrorKind::Properties(PropertyError::UnsupportedKeyType { .. })
        ));
        assert!(err
            .to_string()
            .starts_with("parsing deployment manifest '<inline>': parsing global properties:"));
    }

    #[test]
    fn malformed_yaml_is_a_decode_error() {
        let err = parse_manifest_str("name: [unterminated\n").unwrap_err();
        assert!(matches!(err.kind, ManifestErrorKind::Decode(_)));
    }

    #[test]
    fn non_mapping_document_is_a_decode_error() {
        let err = parse_manifest_str("- just\n- a list\n").unwrap_err();
        assert!(matches!(err.kind, ManifestErrorKind::Decode(_)));
    }

    #[test]
    fn unrecognized_top_level_keys_are_ignored() {
        let manifest =
            parse_manifest_str("name: d\ndirector_uuid: 1234\ncompilation: {workers: 2}\n")
                .unwrap();
        assert_eq!(manifest.name, "d");
    }

    #[test]
    fn first_failing_section_wins() {
        let err = parse_manifest_str(
            "name: d\nnetworks:\n- name: n\n  cloud_properties: 5\njobs:\n- name: j\n  templates: [{}]\n",
        )
        .unwrap_err();
        match err.kind {
            ManifestErrorKind::Section(section) => assert_eq!(section.section, Section::Networks),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn error_chain_reads_from_root_to_cause() {
        let err = parse_manifest_bytes(
            "deploy.yml",
            b"name: d\njobs:\n- name: web\n  properties:\n    nested:\n      bad:\n        1.5: x\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "parsing deployment manifest 'deploy.yml': parsing jobs: job 'web' (index 0): \
             properties: unsupported key type 'float' in mapping at 'nested.bad'"
        );
    }

    #[test]
    fn negative_watch_time_is_malformed() {
        let err = parse_manifest_str("name: d\nupdate:\n  update_watch_time: -5\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ManifestErrorKind::WatchTime(WatchTimeError::Malformed { ref part, .. }) if part == "-5"
        ));
        assert!(err.to_string().contains("parsing update watch time: malformed watch time '-5'"));
    }

    #[test]
    fn fractional_watch_time_is_malformed() {
        let err = parse_manifest_str("name: d\nupdate:\n  update_watch_time: 1.5\n").unwrap_err();
        assert!(matches!(
            err.kind,
            ManifestErrorKind::WatchTime(WatchTimeError::Malformed { ref part, .. }) if part == "1.5"
        ));
    }

    #[test]
    fn merge_keys_are_resolved() {
        let manifest = parse_manifest_str(
            "name: d\nproperties:\n  base: &b\n    x: 1\n  derived:\n    <<: *b\n    y: 2\n",
        )
        .unwrap();
        let derived = manifest.properties["derived"].as_map().unwrap();
        assert_eq!(derived.len(), 2);
        assert_eq!(derived["x"], Property::Int(1));
        assert_eq!(derived["y"], Property::Int(2));
        assert!(!derived.contains_key("<<"));
    }

    #[test]
    fn merge_keys_do_not_override_explicit_values() {
        let manifest = parse_manifest_str(
            "name: d\njobs:\n- name: web\n  properties:\n    <<: {port: 80, host: a}\n    port: 8080\n",
        )
        .unwrap();
        let props = &manifest.jobs[0].properties;
        assert_eq!(props["port"], Property::Int(8080));
        assert_eq!(props["host"], Property::from("a"));
    }

    #[test]
    fn error_message_is_self_contained() {
        let err = parse_manifest_str("jobs: []\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parsing deployment manifest '<inline>': deployment name must not be empty"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn read_failure_carries_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        let err = parse_manifest_file(&path).unwrap_err();
        assert!(matches!(err.kind, ManifestErrorKind::Read(_)));
        assert_eq!(err.origin, path.display().to_string());
    }

    #[test]
    fn global_properties_keep_order() {
        let manifest =
            parse_manifest_str("name: d\nproperties:\n  b: 1\n  a: {c: true}\n").unwrap();
        let keys: Vec<&str> = manifest.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(
            crate::property::lookup(&manifest.properties, "a.c"),
            Some(&Property::Bool(true))
        );
    }
}
