//! Cloud provider block and file volumes

use super::common::{local_ref, non_empty, read_only, ref_name, some_text, wire_enum};
use crate::domain::ports::{PlatformMapping, VolumeVariant};
use crate::error::{Result, ResultExt};
use crate::registry::VolumeKind;
use crate::wire::{MarshalledVolume, WireFields};
use k8s_openapi::api::core::v1 as api;

// =============================================================================
// GCE Persistent Disk
// =============================================================================

/// `gce_pd:<pd>` plus `fs`, `partition`, `ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcePdVolume {
    pub pd_name: String,
    pub fs_type: Option<String>,
    pub partition: Option<i32>,
    pub read_only: bool,
}

impl VolumeVariant for GcePdVolume {
    const KIND: VolumeKind = VolumeKind::GcePd;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            pd_name: wire.segment("pd")?,
            fs_type: wire.field("fs")?,
            partition: wire.field("partition")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("pd", &self.pd_name)?
            .optional_field("fs", self.fs_type.as_ref())?
            .optional_field("partition", self.partition.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for GcePdVolume {
    type V1 = api::GCEPersistentDiskVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            pd_name: source.pd_name.clone(),
            fs_type: non_empty(&source.fs_type),
            partition: source.partition,
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::GCEPersistentDiskVolumeSource {
            pd_name: self.pd_name.clone(),
            fs_type: self.fs_type.clone(),
            partition: self.partition,
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// AWS Elastic Block Store
// =============================================================================

/// `aws_ebs:<volume>` plus `fs`, `partition`, `ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsEbsVolume {
    pub volume_id: String,
    pub fs_type: Option<String>,
    pub partition: Option<i32>,
    pub read_only: bool,
}

impl VolumeVariant for AwsEbsVolume {
    const KIND: VolumeKind = VolumeKind::AwsEbs;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            volume_id: wire.segment("volume")?,
            fs_type: wire.field("fs")?,
            partition: wire.field("partition")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("volume", &self.volume_id)?
            .optional_field("fs", self.fs_type.as_ref())?
            .optional_field("partition", self.partition.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for AwsEbsVolume {
    type V1 = api::AWSElasticBlockStoreVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            volume_id: source.volume_id.clone(),
            fs_type: non_empty(&source.fs_type),
            partition: source.partition,
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::AWSElasticBlockStoreVolumeSource {
            volume_id: self.volume_id.clone(),
            fs_type: self.fs_type.clone(),
            partition: self.partition,
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// Azure Disk
// =============================================================================

wire_enum! {
    /// How an azure data disk is provisioned
    pub enum AzureDiskKind {
        Dedicated => ("dedicated", "Dedicated"),
        Shared => ("shared", "Shared"),
        Managed => ("managed", "Managed"),
    }
}

wire_enum! {
    /// Host caching mode of an azure data disk
    pub enum AzureCachingMode {
        None => ("none", "None"),
        ReadOnly => ("read-only", "ReadOnly"),
        ReadWrite => ("read-write", "ReadWrite"),
    }
}

/// `azure_disk:<disk>` plus `disk_uri`, `fs`, `kind`, `cache`, `ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureDiskVolume {
    pub disk_name: String,
    pub disk_uri: String,
    pub fs_type: Option<String>,
    pub kind: Option<AzureDiskKind>,
    pub caching_mode: Option<AzureCachingMode>,
    pub read_only: bool,
}

impl VolumeVariant for AzureDiskVolume {
    const KIND: VolumeKind = VolumeKind::AzureDisk;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            disk_name: wire.segment("disk")?,
            disk_uri: wire.field_or_default("disk_uri")?,
            fs_type: wire.field("fs")?,
            kind: wire.field("kind")?,
            caching_mode: wire.field("cache")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("disk", &self.disk_name)?
            .text_field("disk_uri", &self.disk_uri)?
            .optional_field("fs", self.fs_type.as_ref())?
            .optional_field("kind", self.kind.as_ref())?
            .optional_field("cache", self.caching_mode.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for AzureDiskVolume {
    type V1 = api::AzureDiskVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        let kind = non_empty(&source.kind)
            .map(|k| AzureDiskKind::from_platform(&k))
            .transpose()
            .context("kind")?;
        let caching_mode = non_empty(&source.caching_mode)
            .map(|c| AzureCachingMode::from_platform(&c))
            .transpose()
            .context("cache")?;

        Ok(Self {
            disk_name: source.disk_name.clone(),
            disk_uri: source.disk_uri.clone(),
            fs_type: non_empty(&source.fs_type),
            kind,
            caching_mode,
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::AzureDiskVolumeSource {
            disk_name: self.disk_name.clone(),
            disk_uri: self.disk_uri.clone(),
            fs_type: self.fs_type.clone(),
            kind: self.kind.map(|k| k.as_platform().to_string()),
            caching_mode: self.caching_mode.map(|c| c.as_platform().to_string()),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// Azure File
// =============================================================================

/// `azure_file:<secret>:<share>:ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureFileVolume {
    pub secret_name: String,
    pub share_name: String,
    pub read_only: bool,
}

impl VolumeVariant for AzureFileVolume {
    const KIND: VolumeKind = VolumeKind::AzureFile;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            secret_name: wire.segment("secret")?,
            share_name: wire.segment("share")?,
            read_only: wire.flag_segment("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("secret", &self.secret_name)?
            .segment("share", &self.share_name)?
            .flag("ro", self.read_only)
    }
}

impl PlatformMapping for AzureFileVolume {
    type V1 = api::AzureFileVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            secret_name: source.secret_name.clone(),
            share_name: source.share_name.clone(),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::AzureFileVolumeSource {
            secret_name: self.secret_name.clone(),
            share_name: self.share_name.clone(),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// Cinder
// =============================================================================

/// `cinder:<volume>` plus `fs`, `ro`, `secret`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CinderVolume {
    pub volume_id: String,
    pub fs_type: Option<String>,
    pub read_only: bool,
    pub secret: Option<String>,
}

impl VolumeVariant for CinderVolume {
    const KIND: VolumeKind = VolumeKind::Cinder;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            volume_id: wire.segment("volume")?,
            fs_type: wire.field("fs")?,
            read_only: wire.field_or_default("ro")?,
            secret: wire.field("secret")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("volume", &self.volume_id)?
            .optional_field("fs", self.fs_type.as_ref())?
            .flag_field("ro", self.read_only)?
            .optional_field("secret", self.secret.as_ref())
    }
}

impl PlatformMapping for CinderVolume {
    type V1 = api::CinderVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            volume_id: source.volume_id.clone(),
            fs_type: non_empty(&source.fs_type),
            read_only: source.read_only.unwrap_or_default(),
            secret: ref_name(&source.secret_ref),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::CinderVolumeSource {
            volume_id: self.volume_id.clone(),
            fs_type: self.fs_type.clone(),
            read_only: read_only(self.read_only),
            secret_ref: local_ref(&self.secret),
        })
    }
}

// =============================================================================
// Photon Persistent Disk
// =============================================================================

/// `photon_pd:<pd>:<fs>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotonPdVolume {
    pub pd_id: String,
    pub fs_type: String,
}

impl VolumeVariant for PhotonPdVolume {
    const KIND: VolumeKind = VolumeKind::PhotonPd;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            pd_id: wire.segment("pd")?,
            fs_type: wire.segment("fs")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("pd", &self.pd_id)?
            .segment("fs", &self.fs_type)
    }
}

impl PlatformMapping for PhotonPdVolume {
    type V1 = api::PhotonPersistentDiskVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            pd_id: source.pd_id.clone(),
            fs_type: source.fs_type.clone().unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::PhotonPersistentDiskVolumeSource {
            pd_id: self.pd_id.clone(),
            fs_type: some_text(&self.fs_type),
        })
    }
}

// =============================================================================
// vSphere
// =============================================================================

/// `vsphere:<path>` plus `fs` and storage policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VsphereVolume {
    pub volume_path: String,
    pub fs_type: Option<String>,
    pub policy_name: Option<String>,
    pub policy_id: Option<String>,
}

impl VolumeVariant for VsphereVolume {
    const KIND: VolumeKind = VolumeKind::Vsphere;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            volume_path: wire.segment("path")?,
            fs_type: wire.field("fs")?,
            policy_name: wire.field("policy_name")?,
            policy_id: wire.field("policy_id")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("path", &self.volume_path)?
            .optional_field("fs", self.fs_type.as_ref())?
            .optional_field("policy_name", self.policy_name.as_ref())?
            .optional_field("policy_id", self.policy_id.as_ref())
    }
}

impl PlatformMapping for VsphereVolume {
    type V1 = api::VsphereVirtualDiskVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            volume_path: source.volume_path.clone(),
            fs_type: non_empty(&source.fs_type),
            policy_name: non_empty(&source.storage_policy_name),
            policy_id: non_empty(&source.storage_policy_id),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::VsphereVirtualDiskVolumeSource {
            volume_path: self.volume_path.clone(),
            fs_type: self.fs_type.clone(),
            storage_policy_name: self.policy_name.clone(),
            storage_policy_id: self.policy_id.clone(),
        })
    }
}

// =============================================================================
// Portworx
// =============================================================================

/// `portworx:<volume>` plus `fs`, `ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortworxVolume {
    pub volume_id: String,
    pub fs_type: Option<String>,
    pub read_only: bool,
}

impl VolumeVariant for PortworxVolume {
    const KIND: VolumeKind = VolumeKind::Portworx;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            volume_id: wire.segment("volume")?,
            fs_type: wire.field("fs")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("volume", &self.volume_id)?
            .optional_field("fs", self.fs_type.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for PortworxVolume {
    type V1 = api::PortworxVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            volume_id: source.volume_id.clone(),
            fs_type: non_empty(&source.fs_type),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::PortworxVolumeSource {
            volume_id: self.volume_id.clone(),
            fs_type: self.fs_type.clone(),
            read_only: read_only(self.read_only),
        })
    }
}
