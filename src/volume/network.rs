//! Network filesystems and network block devices

use super::common::{list_from_v1, list_to_v1, local_ref, non_empty, read_only, ref_name};
use crate::domain::ports::{PlatformMapping, VolumeVariant};
use crate::error::Result;
use crate::registry::VolumeKind;
use crate::wire::{MarshalledVolume, WireFields};
use k8s_openapi::api::core::v1 as api;

// =============================================================================
// NFS
// =============================================================================

/// `nfs:<server>:<path>:ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfsVolume {
    pub server: String,
    pub path: String,
    pub read_only: bool,
}

impl VolumeVariant for NfsVolume {
    const KIND: VolumeKind = VolumeKind::Nfs;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            server: wire.segment("server")?,
            path: wire.segment("path")?,
            read_only: wire.flag_segment("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("server", &self.server)?
            .segment("path", &self.path)?
            .flag("ro", self.read_only)
    }
}

impl PlatformMapping for NfsVolume {
    type V1 = api::NFSVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            server: source.server.clone(),
            path: source.path.clone(),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::NFSVolumeSource {
            server: self.server.clone(),
            path: self.path.clone(),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// GlusterFS
// =============================================================================

/// `glusterfs:<endpoints>:<path>` plus `ro`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlusterfsVolume {
    pub endpoints: String,
    pub path: String,
    pub read_only: bool,
}

impl VolumeVariant for GlusterfsVolume {
    const KIND: VolumeKind = VolumeKind::Glusterfs;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            endpoints: wire.segment("endpoints")?,
            path: wire.segment("path")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("endpoints", &self.endpoints)?
            .segment("path", &self.path)?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for GlusterfsVolume {
    type V1 = api::GlusterfsVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            endpoints: source.endpoints.clone(),
            path: source.path.clone(),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::GlusterfsVolumeSource {
            endpoints: self.endpoints.clone(),
            path: self.path.clone(),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// CephFS
// =============================================================================

/// CephFS mount; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CephFsVolume {
    pub monitors: Vec<String>,
    pub path: Option<String>,
    pub user: Option<String>,
    pub secret_file: Option<String>,
    pub secret: Option<String>,
    pub read_only: bool,
}

impl VolumeVariant for CephFsVolume {
    const KIND: VolumeKind = VolumeKind::CephFs;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            monitors: wire.field_or_default("monitors")?,
            path: wire.field("path")?,
            user: wire.field("user")?,
            secret_file: wire.field("secret_file")?,
            secret: wire.field("secret")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .list_field("monitors", &self.monitors)?
            .optional_field("path", self.path.as_ref())?
            .optional_field("user", self.user.as_ref())?
            .optional_field("secret_file", self.secret_file.as_ref())?
            .optional_field("secret", self.secret.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for CephFsVolume {
    type V1 = api::CephFSVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            monitors: source.monitors.clone(),
            path: non_empty(&source.path),
            user: non_empty(&source.user),
            secret_file: non_empty(&source.secret_file),
            secret: ref_name(&source.secret_ref),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::CephFSVolumeSource {
            monitors: self.monitors.clone(),
            path: self.path.clone(),
            user: self.user.clone(),
            secret_file: self.secret_file.clone(),
            secret_ref: local_ref(&self.secret),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// RBD
// =============================================================================

/// Ceph RADOS block device; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RbdVolume {
    pub monitors: Vec<String>,
    pub image: String,
    pub fs_type: Option<String>,
    pub pool: Option<String>,
    pub user: Option<String>,
    pub keyring: Option<String>,
    pub secret: Option<String>,
    pub read_only: bool,
}

impl VolumeVariant for RbdVolume {
    const KIND: VolumeKind = VolumeKind::Rbd;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            monitors: wire.field_or_default("monitors")?,
            image: wire.field_or_default("image")?,
            fs_type: wire.field("fs")?,
            pool: wire.field("pool")?,
            user: wire.field("user")?,
            keyring: wire.field("keyring")?,
            secret: wire.field("secret")?,
            read_only: wire.field_or_default("ro")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .list_field("monitors", &self.monitors)?
            .text_field("image", &self.image)?
            .optional_field("fs", self.fs_type.as_ref())?
            .optional_field("pool", self.pool.as_ref())?
            .optional_field("user", self.user.as_ref())?
            .optional_field("keyring", self.keyring.as_ref())?
            .optional_field("secret", self.secret.as_ref())?
            .flag_field("ro", self.read_only)
    }
}

impl PlatformMapping for RbdVolume {
    type V1 = api::RBDVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            monitors: source.monitors.clone(),
            image: source.image.clone(),
            fs_type: non_empty(&source.fs_type),
            pool: non_empty(&source.pool),
            user: non_empty(&source.user),
            keyring: non_empty(&source.keyring),
            secret: ref_name(&source.secret_ref),
            read_only: source.read_only.unwrap_or_default(),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::RBDVolumeSource {
            monitors: self.monitors.clone(),
            image: self.image.clone(),
            fs_type: self.fs_type.clone(),
            pool: self.pool.clone(),
            user: self.user.clone(),
            keyring: self.keyring.clone(),
            secret_ref: local_ref(&self.secret),
            read_only: read_only(self.read_only),
        })
    }
}

// =============================================================================
// iSCSI
// =============================================================================

/// iSCSI target; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IscsiVolume {
    pub target_portal: String,
    pub iqn: String,
    pub lun: i32,
    pub iscsi_interface: Option<String>,
    pub fs_type: Option<String>,
    pub read_only: bool,
    pub portals: Vec<String>,
    pub chap_discovery: bool,
    pub chap_session: bool,
    pub secret: Option<String>,
    pub initiator: Option<String>,
}

impl VolumeVariant for IscsiVolume {
    const KIND: VolumeKind = VolumeKind::Iscsi;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            target_portal: wire.field_or_default("target_portal")?,
            iqn: wire.field_or_default("iqn")?,
            lun: wire.field_or_default("lun")?,
            iscsi_interface: wire.field("iscsi_interface")?,
            fs_type: wire.field("fs")?,
            read_only: wire.field_or_default("ro")?,
            portals: wire.field_or_default("portals")?,
            chap_discovery: wire.field_or_default("chap_discovery")?,
            chap_session: wire.field_or_default("chap_session")?,
            secret: wire.field("secret")?,
            initiator: wire.field("initiator")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .text_field("target_portal", &self.target_portal)?
            .text_field("iqn", &self.iqn)?
            .field("lun", &self.lun)?
            .optional_field("iscsi_interface", self.iscsi_interface.as_ref())?
            .optional_field("fs", self.fs_type.as_ref())?
            .flag_field("ro", self.read_only)?
            .list_field("portals", &self.portals)?
            .flag_field("chap_discovery", self.chap_discovery)?
            .flag_field("chap_session", self.chap_session)?
            .optional_field("secret", self.secret.as_ref())?
            .optional_field("initiator", self.initiator.as_ref())
    }
}

impl PlatformMapping for IscsiVolume {
    type V1 = api::ISCSIVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            target_portal: source.target_portal.clone(),
            iqn: source.iqn.clone(),
            lun: source.lun,
            iscsi_interface: non_empty(&source.iscsi_interface),
            fs_type: non_empty(&source.fs_type),
            read_only: source.read_only.unwrap_or_default(),
            portals: list_from_v1(&source.portals),
            chap_discovery: source.chap_auth_discovery.unwrap_or_default(),
            chap_session: source.chap_auth_session.unwrap_or_default(),
            secret: ref_name(&source.secret_ref),
            initiator: non_empty(&source.initiator_name),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::ISCSIVolumeSource {
            target_portal: self.target_portal.clone(),
            iqn: self.iqn.clone(),
            lun: self.lun,
            iscsi_interface: self.iscsi_interface.clone(),
            fs_type: self.fs_type.clone(),
            read_only: read_only(self.read_only),
            portals: list_to_v1(&self.portals),
            chap_auth_discovery: self.chap_discovery.then_some(true),
            chap_auth_session: self.chap_session.then_some(true),
            secret_ref: local_ref(&self.secret),
            initiator_name: self.initiator.clone(),
        })
    }
}

// =============================================================================
// Fibre Channel
// =============================================================================

/// Fibre channel LUN, addressed by WWNs and LUN or by WWIDs; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FibreChannelVolume {
    pub target_wwns: Vec<String>,
    pub lun: Option<i32>,
    pub fs_type: Option<String>,
    pub read_only: bool,
    pub wwids: Vec<String>,
}

impl VolumeVariant for FibreChannelVolume {
    const KIND: VolumeKind = VolumeKind::FibreChannel;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            target_wwns: wire.field_or_default("target_wwns")?,
            lun: wire.field("lun")?,
            fs_type: wire.field("fs")?,
            read_only: wire.field_or_default("ro")?,
            wwids: wire.field_or_default("wwids")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .list_field("target_wwns", &self.target_wwns)?
            .optional_field("lun", self.lun.as_ref())?
            .optional_field("fs", self.fs_type.as_ref())?
            .flag_field("ro", self.read_only)?
            .list_field("wwids", &self.wwids)
    }
}

impl PlatformMapping for FibreChannelVolume {
    type V1 = api::FCVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            target_wwns: list_from_v1(&source.target_wwns),
            lun: source.lun,
            fs_type: non_empty(&source.fs_type),
            read_only: source.read_only.unwrap_or_default(),
            wwids: list_from_v1(&source.wwids),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::FCVolumeSource {
            target_wwns: list_to_v1(&self.target_wwns),
            lun: self.lun,
            fs_type: self.fs_type.clone(),
            read_only: read_only(self.read_only),
            wwids: list_to_v1(&self.wwids),
        })
    }
}

// =============================================================================
// Quobyte
// =============================================================================

/// `quobyte:<registry>:<volume>` plus `ro`, `user`, `group`, `tenant`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuobyteVolume {
    pub registry: String,
    pub volume: String,
    pub read_only: bool,
    pub user: Option<String>,
    pub group: Option<String>,
    pub tenant: Option<String>,
}

impl VolumeVariant for QuobyteVolume {
    const KIND: VolumeKind = VolumeKind::Quobyte;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            registry: wire.segment("registry")?,
            volume: wire.segment("volume")?,
            read_only: wire.field_or_default("ro")?,
            user: wire.field("user")?,
            group: wire.field("group")?,
            tenant: wire.field("tenant")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("registry", &self.registry)?
            .segment("volume", &self.volume)?
            .flag_field("ro", self.read_only)?
            .optional_field("user", self.user.as_ref())?
            .optional_field("group", self.group.as_ref())?
            .optional_field("tenant", self.tenant.as_ref())
    }
}

impl PlatformMapping for QuobyteVolume {
    type V1 = api::QuobyteVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            registry: source.registry.clone(),
            volume: source.volume.clone(),
            read_only: source.read_only.unwrap_or_default(),
            user: non_empty(&source.user),
            group: non_empty(&source.group),
            tenant: non_empty(&source.tenant),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::QuobyteVolumeSource {
            registry: self.registry.clone(),
            volume: self.volume.clone(),
            read_only: read_only(self.read_only),
            user: self.user.clone(),
            group: self.group.clone(),
            tenant: self.tenant.clone(),
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
    fn test_nfs_forms() {
        let volume = Volume::Nfs(NfsVolume {
            server: "files.local".into(),
            path: "/exports/home".into(),
            read_only: true,
        });
        assert_eq!(wire::encode(&volume).unwrap(), json!("nfs:files.local:/exports/home:ro"));

        let platform = NfsVolume::from_v1(&api::NFSVolumeSource {
            server: "files.local".into(),
            path: "/exports/home".into(),
            read_only: Some(true),
        })
        .unwrap();
        assert_eq!(Volume::Nfs(platform), volume);
    }

    #[test]
    fn test_glusterfs_overflow() {
        let err = wire::decode(&json!("glusterfs:a:b:c")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.path(), vec!["selector"]);
    }

    #[test]
    fn test_glusterfs_read_only_is_named() {
        let volume = wire::decode(&json!({"vol_type": "glusterfs", "vol_id": "ep:vol", "ro": true})).unwrap();
        assert_eq!(
            volume,
            Volume::Glusterfs(GlusterfsVolume {
                endpoints: "ep".into(),
                path: "vol".into(),
                read_only: true,
            })
        );
        assert_eq!(
            wire::encode(&volume).unwrap(),
            json!({"vol_type": "glusterfs", "vol_id": "ep:vol", "ro": true})
        );
    }

    #[test]
    fn test_cephfs_object_only() {
        let err = wire::decode(&json!("cephfs:mon")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormMismatch);

        let volume = wire::decode(&json!({
            "vol_type": "cephfs",
            "monitors": ["10.0.0.1:6789", "10.0.0.2:6789"],
            "secret": "ceph-admin"
        }))
        .unwrap();
        let Volume::CephFs(ceph) = &volume else {
            panic!("expected cephfs");
        };
        assert_eq!(ceph.monitors.len(), 2);
        let platform = ceph.to_v1().unwrap();
        assert_eq!(CephFsVolume::from_v1(&platform).unwrap(), *ceph);
    }

    #[test]
    fn test_rbd_platform() {
        let volume = RbdVolume {
            monitors: vec!["mon:6789".into()],
            image: "img".into(),
            pool: Some("kube".into()),
            read_only: true,
            ..Default::default()
        };
        let platform = volume.to_v1().unwrap();
        assert_eq!(platform.read_only, Some(true));
        assert_eq!(RbdVolume::from_v1(&platform).unwrap(), volume);
    }

    #[test]
    fn test_iscsi_round_trip() {
        let volume = IscsiVolume {
            target_portal: "10.0.0.5:3260".into(),
            iqn: "iqn.2001-04.com.example:storage".into(),
            lun: 0,
            portals: vec!["10.0.0.6:3260".into()],
            chap_session: true,
            secret: Some("chap".into()),
            ..Default::default()
        };
        let encoded = wire::encode(&Volume::Iscsi(volume.clone())).unwrap();
        assert_eq!(encoded["lun"], json!(0));
        assert_eq!(encoded["chap_session"], json!(true));
        assert_eq!(wire::decode(&encoded).unwrap(), Volume::Iscsi(volume.clone()));

        let platform = volume.to_v1().unwrap();
        assert_eq!(platform.chap_auth_discovery, None);
        assert_eq!(IscsiVolume::from_v1(&platform).unwrap(), volume);
    }

    #[test]
    fn test_fibre_channel_wwids() {
        let volume = FibreChannelVolume {
            wwids: vec!["3600508b400105e210000900000490000".into()],
            ..Default::default()
        };
        let platform = volume.to_v1().unwrap();
        assert_eq!(platform.target_wwns, None);
        assert_eq!(FibreChannelVolume::from_v1(&platform).unwrap(), volume);
    }

    #[test]
    fn test_quobyte_hybrid() {
        let volume = wire::decode(&json!({"vol_type": "quobyte", "vol_id": "reg:7861:vol"})).unwrap_err();
        assert_eq!(volume.kind(), ErrorKind::Schema);

        let volume = wire::decode(&json!({
            "vol_type": "quobyte",
            "registry": "reg:7861",
            "volume": "vol",
            "tenant": "t1"
        }))
        .unwrap();
        let Volume::Quobyte(quobyte) = &volume else {
            panic!("expected quobyte");
        };
        assert_eq!(quobyte.registry, "reg:7861");
        assert_eq!(
            wire::encode(&volume).unwrap(),
            json!({"vol_type": "quobyte", "registry": "reg:7861", "volume": "vol", "tenant": "t1"})
        );
    }
}
