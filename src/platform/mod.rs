//! Platform Adapter
//!
//! Converts between canonical volumes and the versioned platform `Volume`
//! struct (`k8s_openapi` `core/v1`). The platform struct is itself a one-of
//! with one optional field per source; import requires at most one to be
//! set, and maps "none set" to the default `empty_dir` volume.
//!
//! Every entry point takes a version identifier. Only `v1` (or the empty
//! string, matched case-insensitively) is accepted; there is no fallback.

use crate::domain::ports::ApiVersion;
use crate::error::{Error, Result, ResultExt};
use crate::volume::Volume;
use k8s_openapi::api::core::v1 as api;
use serde_json::Value;
use tracing::{debug, warn};

/// Platform resource name used in version errors
pub const RESOURCE: &str = "Volume";

// =============================================================================
// Platform Volume
// =============================================================================

/// A platform volume tagged with its API version
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformVolume {
    V1(api::Volume),
}

impl PlatformVolume {
    /// Parse a platform volume of the given version from JSON
    pub fn from_value(version: &str, value: Value) -> Result<Self> {
        match ApiVersion::parse(version, RESOURCE)? {
            ApiVersion::V1 => Ok(PlatformVolume::V1(serde_json::from_value(value)?)),
        }
    }

    /// Serialize back to JSON
    pub fn to_value(&self) -> Result<Value> {
        match self {
            PlatformVolume::V1(volume) => Ok(serde_json::to_value(volume)?),
        }
    }

    pub fn version(&self) -> ApiVersion {
        match self {
            PlatformVolume::V1(_) => ApiVersion::V1,
        }
    }

    /// Volume name as carried by the platform struct
    pub fn name(&self) -> &str {
        match self {
            PlatformVolume::V1(volume) => &volume.name,
        }
    }
}

// =============================================================================
// Import / Export
// =============================================================================

impl Volume {
    /// Import a platform volume of any supported version
    pub fn from_platform(source: &PlatformVolume) -> Result<Self> {
        match source {
            PlatformVolume::V1(volume) => Self::from_v1(volume),
        }
    }

    /// Export as a platform volume named `name` in the requested version
    pub fn to_platform(&self, name: &str, version: &str) -> Result<PlatformVolume> {
        let version = ApiVersion::parse(version, RESOURCE)?;

        let descriptor = self.descriptor();
        if !descriptor.supports(version) {
            return Err(Error::unsupported_variant(
                descriptor.discriminator,
                format!("no platform mapping for {}", version),
            ));
        }

        match version {
            ApiVersion::V1 => self.to_v1(name).map(PlatformVolume::V1),
        }
    }

    /// Import a `v1` platform volume
    pub fn from_v1(source: &api::Volume) -> Result<Self> {
        let mut populated = Volume::v1_populated(source);
        // sources with no canonical variant
        let unsupported: Vec<&str> = [
            ("csi", source.csi.is_some()),
            ("ephemeral", source.ephemeral.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        populated.extend(unsupported.iter().copied());

        if populated.len() > 1 {
            return Err(Error::InvariantViolation(format!(
                "volume \"{}\" sets {} sources: {}",
                source.name,
                populated.len(),
                populated.join(", ")
            )));
        }

        if let Some(volume) = Volume::from_v1_source(source) {
            let volume = volume?;
            debug!("Imported volume {} as {}", source.name, volume.kind());
            return Ok(volume);
        }

        if let Some(name) = unsupported.first() {
            return Err(Error::unsupported_variant(
                *name,
                "platform volume source has no shorthand",
            ));
        }

        warn!(
            "Volume {} sets no source, using the default {}",
            source.name,
            Volume::default().kind()
        );
        Ok(Volume::default())
    }

    /// Export as a `v1` platform volume
    pub fn to_v1(&self, name: &str) -> Result<api::Volume> {
        let mut target = api::Volume {
            name: name.to_string(),
            ..Default::default()
        };
        self.write_v1_source(&mut target)
            .with_context(|| self.kind().discriminator())?;
        Ok(target)
    }
}
