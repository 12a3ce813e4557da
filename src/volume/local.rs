//! Node-local and in-cluster volumes: host paths, scratch space, git
//! checkouts and persistent volume claims

use super::common::{non_empty, read_only, some_text, wire_enum};
use crate::domain::ports::{PlatformMapping, VolumeVariant};
use crate::error::{Result, ResultExt};
use crate::registry::VolumeKind;
use crate::wire::{MarshalledVolume, WireFields};
use k8s_openapi::api::core::v1 as api;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

// =============================================================================
// Host Path
// =============================================================================

wire_enum! {
    /// What the host path is expected to be
    pub enum HostPathType {
        Unset => ("", ""),
        DirectoryOrCreate => ("dir-or-create", "DirectoryOrCreate"),
        Directory => ("dir", "Directory"),
        FileOrCreate => ("file-or-create", "FileOrCreate"),
        File => ("file", "File"),
        Socket => ("socket", "Socket"),
        CharDevice => ("char-dev", "CharDevice"),
        BlockDevice => ("block-dev", "BlockDevice"),
    }
}

impl Default for HostPathType {
    fn default() -> Self {
        HostPathType::Unset
    }
}

/// `host_path:<path>:<type>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPathVolume {
    pub path: String,
    pub path_type: HostPathType,
}

impl VolumeVariant for HostPathVolume {
    const KIND: VolumeKind = VolumeKind::HostPath;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        let path = wire.segment("path")?;
        let path_type = HostPathType::from_wire(&wire.segment("type")?).context("type")?;
        Ok(Self { path, path_type })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("path", &self.path)?
            .segment("type", self.path_type.as_wire())
    }
}

impl PlatformMapping for HostPathVolume {
    type V1 = api::HostPathVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        let path_type = HostPathType::from_platform(source.type_.as_deref().unwrap_or_default())
            .context("type")?;
        Ok(Self {
            path: source.path.clone(),
            path_type,
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::HostPathVolumeSource {
            path: self.path.clone(),
            type_: some_text(self.path_type.as_platform()),
        })
    }
}

// =============================================================================
// Empty Dir
// =============================================================================

wire_enum! {
    /// Backing store of an empty dir
    pub enum StorageMedium {
        Memory => ("memory", "Memory"),
        HugePages => ("huge-pages", "HugePages"),
    }
}

/// Scratch space that lives as long as the pod; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyDirVolume {
    pub medium: Option<StorageMedium>,
    /// Size limit as a resource quantity (`"1Gi"`)
    pub max_size: Option<String>,
}

impl VolumeVariant for EmptyDirVolume {
    const KIND: VolumeKind = VolumeKind::EmptyDir;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            medium: wire.field("medium")?,
            max_size: wire.field("max_size")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .optional_field("medium", self.medium.as_ref())?
            .optional_field("max_size", self.max_size.as_ref())
    }
}

impl PlatformMapping for EmptyDirVolume {
    type V1 = api::EmptyDirVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        let medium = non_empty(&source.medium)
            .map(|m| StorageMedium::from_platform(&m))
            .transpose()
            .context("medium")?;
        Ok(Self {
            medium,
            max_size: source.size_limit.as_ref().map(|q| q.0.clone()),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::EmptyDirVolumeSource {
            medium: self.medium.map(|m| m.as_platform().to_string()),
            size_limit: self.max_size.clone().map(Quantity),
        })
    }
}

// =============================================================================
// Git Repo
// =============================================================================

/// `git:<repository>:<revision>`, checked out into `directory`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitVolume {
    pub repository: String,
    pub revision: String,
    pub directory: Option<String>,
}

impl VolumeVariant for GitVolume {
    const KIND: VolumeKind = VolumeKind::Git;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            repository: wire.segment("repository")?,
            revision: wire.segment("revision")?,
            directory: wire.field("directory")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("repository", &self.repository)?
            .segment("revision", &self.revision)?
            .optional_field("directory", self.directory.as_ref())
    }
}

impl PlatformMapping for GitVolume {
    type V1 = api::GitRepoVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            repository: source.repository.clone(),
            revision: source.revision.clone().unwrap_or_default(),
            directory: non_empty(&source.directory),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::GitRepoVolumeSource {
            repository: self.repository.clone(),
            revision: some_text(&self.revision),
            directory: self.directory.clone(),
        })
    }
}

// =============================================================================
// Persistent Volume Claim
// =============================================================================

/// `pvc:<claim>:ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PvcVolume {
    pub claim: String,
    pub read_only: bool,
}

impl VolumeVariant for PvcVolume {
    const KIND: VolumeKind = VolumeKind::Pvc;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            claim: wire.segment("claim")?,
            read_only: wire.flag_segment("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("claim", &self.claim)?
            .flag("ro", self.read_only)
    }
}

impl PlatformMapping for PvcVolume {
    type V1 = api::PersistentVolumeClaimVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            claim: source.claim_name.clone(),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::PersistentVolumeClaimVolumeSource {
            claim_name: self.claim.clone(),
            read_only: read_only(self.read_only),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::volume::Volume;
    use crate::wire;
    use serde_json::json;

    #[test]
    fn test_host_path_forms() {
        let volume = wire::decode(&json!("host_path:/var/log:dir")).unwrap();
        assert_eq!(
            volume,
            Volume::HostPath(HostPathVolume {
                path: "/var/log".into(),
                path_type: HostPathType::Directory,
            })
        );
        assert_eq!(wire::encode(&volume).unwrap(), json!("host_path:/var/log:dir"));

        let bare = wire::decode(&json!("host_path:/tmp")).unwrap();
        assert_eq!(wire::encode(&bare).unwrap(), json!("host_path:/tmp"));
    }

    #[test]
    fn test_host_path_bad_type() {
        let err = wire::decode(&json!("host_path:/tmp:folder")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.token(), Some("folder"));
        assert_eq!(err.path(), vec!["host_path", "type"]);
    }

    #[test]
    fn test_host_path_platform() {
        let volume = HostPathVolume {
            path: "/dev/sda".into(),
            path_type: HostPathType::BlockDevice,
        };
        let platform = volume.to_v1().unwrap();
        assert_eq!(platform.type_.as_deref(), Some("BlockDevice"));
        assert_eq!(HostPathVolume::from_v1(&platform).unwrap(), volume);

        let unset = HostPathVolume::from_v1(&api::HostPathVolumeSource {
            path: "/x".into(),
            type_: Some(String::new()),
        })
        .unwrap();
        assert_eq!(unset.path_type, HostPathType::Unset);
        assert_eq!(unset.to_v1().unwrap().type_, None);
    }

    #[test]
    fn test_empty_dir_object_form() {
        let volume = wire::decode(&json!({"vol_type": "empty_dir", "medium": "memory", "max_size": "1Gi"})).unwrap();
        let expected = EmptyDirVolume {
            medium: Some(StorageMedium::Memory),
            max_size: Some("1Gi".into()),
        };
        assert_eq!(volume, Volume::EmptyDir(expected.clone()));

        let platform = expected.to_v1().unwrap();
        assert_eq!(platform.medium.as_deref(), Some("Memory"));
        assert_eq!(platform.size_limit, Some(Quantity("1Gi".into())));
        assert_eq!(EmptyDirVolume::from_v1(&platform).unwrap(), expected);
    }

    #[test]
    fn test_empty_dir_default_medium() {
        let platform = api::EmptyDirVolumeSource {
            medium: Some(String::new()),
            size_limit: None,
        };
        assert_eq!(EmptyDirVolume::from_v1(&platform).unwrap(), EmptyDirVolume::default());
    }

    #[test]
    fn test_git_revision_and_directory() {
        let volume = wire::decode(&json!({"vol_type": "git", "vol_id": "repo:v1.2", "directory": "src"})).unwrap();
        let Volume::Git(git) = &volume else {
            panic!("expected git volume");
        };
        assert_eq!(git.revision, "v1.2");
        assert_eq!(git.directory.as_deref(), Some("src"));

        let platform = git.to_v1().unwrap();
        assert_eq!(platform.revision.as_deref(), Some("v1.2"));
        assert_eq!(&GitVolume::from_v1(&platform).unwrap(), git);
    }

    #[test]
    fn test_pvc_read_only() {
        let volume = PvcVolume::from_v1(&api::PersistentVolumeClaimVolumeSource {
            claim_name: "data".into(),
            read_only: Some(true),
        })
        .unwrap();
        assert_eq!(wire::encode(&Volume::Pvc(volume)).unwrap(), json!("pvc:data:ro"));
    }
}
