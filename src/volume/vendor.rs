//! Vendor storage systems and out-of-tree drivers

use super::common::{local_ref, non_empty, read_only, ref_name, some_text, wire_enum};
use crate::domain::ports::{PlatformMapping, VolumeVariant};
use crate::error::{Result, ResultExt};
use crate::registry::VolumeKind;
use crate::wire::{MarshalledVolume, WireFields};
use k8s_openapi::api::core::v1 as api;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// Flocker
// =============================================================================

/// `flocker:<dataset>` plus `uuid`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlockerVolume {
    pub dataset_name: String,
    pub dataset_uuid: Option<String>,
}

impl VolumeVariant for FlockerVolume {
    const KIND: VolumeKind = VolumeKind::Flocker;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            dataset_name: wire.segment("dataset")?,
            dataset_uuid: wire.field("uuid")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("dataset", &self.dataset_name)?
            .optional_field("uuid", self.dataset_uuid.as_ref())
    }
}

impl PlatformMapping for FlockerVolume {
    type V1 = api::FlockerVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            dataset_name: source.dataset_name.clone().unwrap_or_default(),
            dataset_uuid: non_empty(&source.dataset_uuid),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::FlockerVolumeSource {
            dataset_name: some_text(&self.dataset_name),
            dataset_uuid: self.dataset_uuid.clone(),
        })
    }
}

// =============================================================================
// ScaleIO
// =============================================================================

wire_enum! {
    /// ScaleIO volume provisioning
    pub enum ScaleIoStorageMode {
        Thick => ("thick", "ThickProvisioned"),
        Thin => ("thin", "ThinProvisioned"),
    }
}

/// ScaleIO volume; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleIoVolume {
    pub gateway: String,
    pub system: String,
    pub secret: String,
    pub ssl: bool,
    pub protection_domain: Option<String>,
    pub storage_pool: Option<String>,
    pub storage_mode: Option<ScaleIoStorageMode>,
    pub volume_name: Option<String>,
    pub fs_type: Option<String>,
    pub read_only: bool,
}

impl VolumeVariant for ScaleIoVolume {
    const KIND: VolumeKind = VolumeKind::ScaleIo;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            gateway: wire.field_or_default("gateway")?,
            system: wire.field_or_default("system")?,
            secret: wire.field_or_default("secret")?,
            ssl: wire.field_or_default("ssl")?,
            protection_domain: wire.field("protection_domain")?,
            storage_pool: wire.field("storage_pool")?,
            storage_mode: wire.field("storage_mode")?,
            volume_name: wire.field("vol_name")?,
            fs_type: wire.field("fs")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .text_field("gateway", &self.gateway)?
            .text_field("system", &self.system)?
            .text_field("secret", &self.secret)?
            .flag_field("ssl", self.ssl)?
            .optional_field("protection_domain", self.protection_domain.as_ref())?
            .optional_field("storage_pool", self.storage_pool.as_ref())?
            .optional_field("storage_mode", self.storage_mode.as_ref())?
            .optional_field("vol_name", self.volume_name.as_ref())?
            .optional_field("fs", self.fs_type.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for ScaleIoVolume {
    type V1 = api::ScaleIOVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        let storage_mode = non_empty(&source.storage_mode)
            .map(|m| ScaleIoStorageMode::from_platform(&m))
            .transpose()
            .context("storage_mode")?;

        Ok(Self {
            gateway: source.gateway.clone(),
            system: source.system.clone(),
            secret: source.secret_ref.name.clone().unwrap_or_default(),
            ssl: source.ssl_enabled.unwrap_or_default(),
            protection_domain: non_empty(&source.protection_domain),
            storage_pool: non_empty(&source.storage_pool),
            storage_mode,
            volume_name: non_empty(&source.volume_name),
            fs_type: non_empty(&source.fs_type),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::ScaleIOVolumeSource {
            gateway: self.gateway.clone(),
            system: self.system.clone(),
            secret_ref: api::LocalObjectReference {
                name: Some(self.secret.clone()),
            },
            ssl_enabled: self.ssl.then_some(true),
            protection_domain: self.protection_domain.clone(),
            storage_pool: self.storage_pool.clone(),
            storage_mode: self.storage_mode.map(|m| m.as_platform().to_string()),
            volume_name: self.volume_name.clone(),
            fs_type: self.fs_type.clone(),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// StorageOS
// =============================================================================

/// `storageos:<volume>` plus `vol_ns`, `fs`, `ro`, `secret`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageOsVolume {
    pub volume_name: String,
    pub volume_namespace: Option<String>,
    pub fs_type: Option<String>,
    pub read_only: bool,
    pub secret: Option<String>,
}

impl VolumeVariant for StorageOsVolume {
    const KIND: VolumeKind = VolumeKind::StorageOs;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            volume_name: wire.segment("volume")?,
            volume_namespace: wire.field("vol_ns")?,
            fs_type: wire.field("fs")?,
            read_only: wire.field_or_default("ro")?,
            secret: wire.field("secret")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("volume", &self.volume_name)?
            .optional_field("vol_ns", self.volume_namespace.as_ref())?
            .optional_field("fs", self.fs_type.as_ref())?
            .flag_field("ro", self.read_only)?
            .optional_field("secret", self.secret.as_ref())
    }
}

impl PlatformMapping for StorageOsVolume {
    type V1 = api::StorageOSVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            volume_name: source.volume_name.clone().unwrap_or_default(),
            volume_namespace: non_empty(&source.volume_namespace),
            fs_type: non_empty(&source.fs_type),
            read_only: source.read_only.unwrap_or_default(),
            secret: ref_name(&source.secret_ref),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::StorageOSVolumeSource {
            volume_name: some_text(&self.volume_name),
            volume_namespace: self.volume_namespace.clone(),
            fs_type: self.fs_type.clone(),
            read_only: read_only(self.read_only),
            secret_ref: local_ref(&self.secret),
        })
    }
}

// =============================================================================
// Flex
// =============================================================================

/// `flex:<driver>` plus `fs`, `secret`, `ro`, `options`.
///
/// Keys the registry does not declare are kept in `extra` and written back
/// unchanged on encode. They have no platform counterpart and are dropped
/// on export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexVolume {
    pub driver: String,
    pub fs_type: Option<String>,
    pub secret: Option<String>,
    pub read_only: bool,
    pub options: BTreeMap<String, String>,
    pub extra: BTreeMap<String, Value>,
}

impl VolumeVariant for FlexVolume {
    const KIND: VolumeKind = VolumeKind::Flex;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            driver: wire.segment("driver")?,
            fs_type: wire.field("fs")?,
            secret: wire.field("secret")?,
            read_only: wire.field_or_default("ro")?,
            options: wire.field_or_default("options")?,
            extra: wire.take_extra(),
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        let options = (!self.options.is_empty()).then_some(&self.options);
        MarshalledVolume::new(Self::KIND)
            .segment("driver", &self.driver)?
            .optional_field("fs", self.fs_type.as_ref())?
            .optional_field("secret", self.secret.as_ref())?
            .flag_field("ro", self.read_only)?
            .optional_field("options", options)?
            .passthrough(&self.extra)
    }
}

impl PlatformMapping for FlexVolume {
    type V1 = api::FlexVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            driver: source.driver.clone(),
            fs_type: non_empty(&source.fs_type),
            secret: ref_name(&source.secret_ref),
            read_only: source.read_only.unwrap_or_default(),
            options: source.options.clone().unwrap_or_default(),
            extra: BTreeMap::new(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        if !self.extra.is_empty() {
            debug!(
                "Dropping {} passthrough keys of flex driver {} on export",
                self.extra.len(),
                self.driver
            );
        }

        Ok(api::FlexVolumeSource {
            driver: self.driver.clone(),
            fs_type: self.fs_type.clone(),
            secret_ref: local_ref(&self.secret),
            read_only: read_only(self.read_only),
            options: (!self.options.is_empty()).then(|| self.options.clone()),
        })
    }
}
