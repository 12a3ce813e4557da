//! Container volume devices
//!
//! A raw block volume exposed inside a container at a device path. The
//! shorthand is `{name, path}`; the platform calls the path `devicePath`.

use crate::domain::ports::ApiVersion;
use crate::error::Result;
use k8s_openapi::api::core::v1 as api;
use serde::{Deserialize, Serialize};

/// Platform resource name used in version errors
const RESOURCE: &str = "VolumeDevice";

/// Block device mapping of a named pod volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDevice {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

/// A platform volume device tagged with its API version
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformVolumeDevice {
    V1(api::VolumeDevice),
}

impl VolumeDevice {
    pub fn from_platform(source: &PlatformVolumeDevice) -> Self {
        match source {
            PlatformVolumeDevice::V1(device) => Self::from_v1(device),
        }
    }

    /// Export in the requested version (`""` or `v1`)
    pub fn to_platform(&self, version: &str) -> Result<PlatformVolumeDevice> {
        match ApiVersion::parse(version, RESOURCE)? {
            ApiVersion::V1 => Ok(PlatformVolumeDevice::V1(self.to_v1())),
        }
    }

    pub fn from_v1(device: &api::VolumeDevice) -> Self {
        Self {
            name: device.name.clone(),
            path: device.device_path.clone(),
        }
    }

    pub fn to_v1(&self) -> api::VolumeDevice {
        api::VolumeDevice {
            name: self.name.clone(),
            device_path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let device = VolumeDevice {
            name: "raw".into(),
            path: "/dev/xvda".into(),
        };
        let platform = device.to_platform("V1").unwrap();
        let PlatformVolumeDevice::V1(v1) = &platform;
        assert_eq!(v1.device_path, "/dev/xvda");
        assert_eq!(VolumeDevice::from_platform(&platform), device);
    }

    #[test]
    fn test_unknown_version() {
        let err = VolumeDevice::default().to_platform("v1alpha1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
        assert_eq!(err.to_string(), "unsupported api version \"v1alpha1\" for VolumeDevice");
    }

    #[test]
    fn test_shorthand_fields() {
        let device: VolumeDevice = serde_json::from_value(json!({"name": "raw", "path": "/dev/sdb"})).unwrap();
        assert_eq!(device.path, "/dev/sdb");
        assert_eq!(serde_json::to_value(VolumeDevice::default()).unwrap(), json!({}));
    }
}
