//! Named volume collections
//!
//! A pod declares volumes as a map from name to shorthand; the platform
//! keeps them as a list of named structs. [`VolumeSet`] converts between
//! the two and tags every failure with the volume it came from.

use crate::domain::ports::ApiVersion;
use crate::error::{Error, Result, ResultExt};
use crate::platform::{PlatformVolume, RESOURCE};
use crate::volume::Volume;
use k8s_openapi::api::core::v1 as api;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Volumes keyed by name, in name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeSet(BTreeMap<String, Volume>);

fn volume_context(name: &str) -> String {
    format!("volume \"{}\"", name)
}

impl VolumeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a volume, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, volume: Volume) -> Option<Volume> {
        self.0.insert(name.into(), volume)
    }

    pub fn get(&self, name: &str) -> Option<&Volume> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Volume)> {
        self.0.iter()
    }

    // =========================================================================
    // Wire
    // =========================================================================

    /// Decode a `{name: shorthand}` map
    pub fn decode(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::MalformedInput {
                input: value.to_string(),
                reason: "expected a map of volume name to volume".to_string(),
            });
        };

        let mut set = Self::new();
        for (name, raw) in map {
            let volume = Volume::from_wire(raw).with_context(|| volume_context(name))?;
            set.insert(name.clone(), volume);
        }
        debug!("Decoded {} volumes", set.len());
        Ok(set)
    }

    /// Encode back to a `{name: shorthand}` map
    pub fn encode(&self) -> Result<Value> {
        let mut map = Map::new();
        for (name, volume) in &self.0 {
            let value = volume.to_wire().with_context(|| volume_context(name))?;
            map.insert(name.clone(), value);
        }
        Ok(Value::Object(map))
    }

    // =========================================================================
    // Platform
    // =========================================================================

    /// Import a platform volume list; names must be unique
    pub fn from_platform(volumes: &[PlatformVolume]) -> Result<Self> {
        let mut set = Self::new();
        for platform in volumes {
            let name = platform.name();
            let volume = Volume::from_platform(platform).with_context(|| volume_context(name))?;
            if set.insert(name, volume).is_some() {
                return Err(Error::schema(name, "duplicate volume name"));
            }
        }
        Ok(set)
    }

    /// Export as a platform volume list in the requested version
    pub fn to_platform(&self, version: &str) -> Result<Vec<PlatformVolume>> {
        // checked up front so an empty set still rejects a bad version
        ApiVersion::parse(version, RESOURCE)?;

        self.0
            .iter()
            .map(|(name, volume)| {
                volume
                    .to_platform(name, version)
                    .with_context(|| volume_context(name))
            })
            .collect()
    }

    /// Import a `v1` volume list
    pub fn from_v1(volumes: &[api::Volume]) -> Result<Self> {
        let tagged: Vec<PlatformVolume> = volumes.iter().cloned().map(PlatformVolume::V1).collect();
        Self::from_platform(&tagged)
    }

    /// Export as a `v1` volume list
    pub fn to_v1(&self) -> Result<Vec<api::Volume>> {
        self.0
            .iter()
            .map(|(name, volume)| volume.to_v1(name).with_context(|| volume_context(name)))
            .collect()
    }
}

impl FromIterator<(String, Volume)> for VolumeSet {
    fn from_iter<I: IntoIterator<Item = (String, Volume)>>(iter: I) -> Self {
        VolumeSet(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::volume::{NfsVolume, PvcVolume};
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "data": "pvc:data-claim",
            "scratch": {"vol_type": "empty_dir", "medium": "memory"},
            "shared": "nfs:files.local:/exports:ro"
        })
    }

    #[test]
    fn test_decode_encode() {
        let set = VolumeSet::decode(&sample()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.get("data"),
            Some(&Volume::Pvc(PvcVolume {
                claim: "data-claim".into(),
                read_only: false,
            }))
        );
        assert_eq!(set.encode().unwrap(), sample());
    }

    #[test]
    fn test_error_names_volume() {
        let err = VolumeSet::decode(&json!({"logs": "glusterfs:a:b:c"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.path(), vec!["volume \"logs\"", "selector"]);
        assert!(err.to_string().starts_with("volume \"logs\": selector: invalid value \"a:b:c\""));
    }

    #[test]
    fn test_decode_requires_map() {
        let err = VolumeSet::decode(&json!(["pvc:data"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_platform_round_trip() {
        let set = VolumeSet::decode(&sample()).unwrap();
        let platform = set.to_v1().unwrap();
        let names: Vec<&str> = platform.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["data", "scratch", "shared"]);
        assert_eq!(VolumeSet::from_v1(&platform).unwrap(), set);
    }

    #[test]
    fn test_duplicate_platform_names() {
        let shared = Volume::Nfs(NfsVolume::default()).to_v1("shared").unwrap();
        let err = VolumeSet::from_v1(&[shared.clone(), shared]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.token(), Some("shared"));
    }

    #[test]
    fn test_version_gate() {
        let err = VolumeSet::new().to_platform("v3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);

        let set: VolumeSet = [("a".to_string(), Volume::default())].into_iter().collect();
        assert_eq!(set.to_platform("v1").unwrap().len(), 1);
    }

    #[test]
    fn test_serde_transparent() {
        let set: VolumeSet = serde_json::from_value(sample()).unwrap();
        assert_eq!(serde_json::to_value(&set).unwrap(), sample());
    }
}
