//! Canonical Volume Union
//!
//! [`Volume`] is the closed sum of every supported volume source. It is the
//! one representation both the wire codecs and the platform adapter speak;
//! exactly one variant is populated by construction.

mod cloud;
mod common;
mod local;
mod network;
mod projection;
mod vendor;

pub use cloud::{
    AwsEbsVolume, AzureCachingMode, AzureDiskKind, AzureDiskVolume, AzureFileVolume, CinderVolume,
    GcePdVolume, PhotonPdVolume, PortworxVolume, VsphereVolume,
};
pub use common::{FileMode, KeyPath};
pub use local::{EmptyDirVolume, GitVolume, HostPathType, HostPathVolume, PvcVolume, StorageMedium};
pub use network::{
    CephFsVolume, FibreChannelVolume, GlusterfsVolume, IscsiVolume, NfsVolume, QuobyteVolume, RbdVolume,
};
pub use projection::{
    ConfigMapVolume, DownwardApiFile, DownwardApiProjection, DownwardApiVolume, KeyProjection,
    ObjectFieldRef, Projection, ProjectedVolume, ResourceFieldRef, SecretVolume,
    ServiceAccountTokenProjection,
};
pub use vendor::{FlexVolume, FlockerVolume, ScaleIoStorageMode, ScaleIoVolume, StorageOsVolume};

use crate::domain::ports::{PlatformMapping, VolumeVariant};
use crate::error::{Result, ResultExt};
use crate::registry::{VariantDescriptor, VolumeKind};
use crate::wire::{self, MarshalledVolume, WireFields};
use k8s_openapi::api::core::v1 as api;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Declare the union once: variant, payload type, and the field of the
/// platform `Volume` struct that carries it (with its wire name).
macro_rules! volume_union {
    ( $( $variant:ident($payload:ty) => $field:ident / $platform:literal, )+ ) => {
        /// One volume source in canonical form
        #[derive(Debug, Clone, PartialEq)]
        pub enum Volume {
            $( $variant($payload), )+
        }

        impl Volume {
            /// Registry kind of the populated variant
            pub fn kind(&self) -> VolumeKind {
                match self {
                    $( Volume::$variant(_) => <$payload as VolumeVariant>::KIND, )+
                }
            }

            /// Wire data of the populated variant, before a form is chosen
            pub fn marshal(&self) -> Result<MarshalledVolume> {
                let marshalled = match self {
                    $( Volume::$variant(payload) => payload.marshal(), )+
                };
                marshalled.context(self.kind().discriminator())
            }

            fn unmarshal_payload(wire: &mut WireFields) -> Result<Self> {
                match wire.descriptor().kind {
                    $( VolumeKind::$variant => <$payload as VolumeVariant>::unmarshal(wire).map(Volume::$variant), )+
                }
            }

            /// Platform field names of every source populated on `source`
            pub(crate) fn v1_populated(source: &api::Volume) -> Vec<&'static str> {
                let mut populated = Vec::new();
                $( if source.$field.is_some() { populated.push($platform); } )+
                populated
            }

            /// Import the populated source, `None` when no known source is set
            pub(crate) fn from_v1_source(source: &api::Volume) -> Option<Result<Self>> {
                $(
                    if let Some(inner) = &source.$field {
                        return Some(
                            <$payload as PlatformMapping>::from_v1(inner)
                                .map(Volume::$variant)
                                .context($platform),
                        );
                    }
                )+
                None
            }

            /// Set the matching source field on a platform volume
            pub(crate) fn write_v1_source(&self, target: &mut api::Volume) -> Result<()> {
                match self {
                    $(
                        Volume::$variant(payload) => {
                            target.$field = Some(payload.to_v1().context($platform)?);
                        }
                    )+
                }
                Ok(())
            }
        }
    };
}

volume_union! {
    HostPath(HostPathVolume) => host_path / "hostPath",
    EmptyDir(EmptyDirVolume) => empty_dir / "emptyDir",
    GcePd(GcePdVolume) => gce_persistent_disk / "gcePersistentDisk",
    AwsEbs(AwsEbsVolume) => aws_elastic_block_store / "awsElasticBlockStore",
    AzureDisk(AzureDiskVolume) => azure_disk / "azureDisk",
    AzureFile(AzureFileVolume) => azure_file / "azureFile",
    CephFs(CephFsVolume) => cephfs / "cephfs",
    Cinder(CinderVolume) => cinder / "cinder",
    FibreChannel(FibreChannelVolume) => fc / "fc",
    Flex(FlexVolume) => flex_volume / "flexVolume",
    Flocker(FlockerVolume) => flocker / "flocker",
    Glusterfs(GlusterfsVolume) => glusterfs / "glusterfs",
    Iscsi(IscsiVolume) => iscsi / "iscsi",
    Nfs(NfsVolume) => nfs / "nfs",
    PhotonPd(PhotonPdVolume) => photon_persistent_disk / "photonPersistentDisk",
    Portworx(PortworxVolume) => portworx_volume / "portworxVolume",
    Pvc(PvcVolume) => persistent_volume_claim / "persistentVolumeClaim",
    Quobyte(QuobyteVolume) => quobyte / "quobyte",
    ScaleIo(ScaleIoVolume) => scale_io / "scaleIO",
    Vsphere(VsphereVolume) => vsphere_volume / "vsphereVolume",
    ConfigMap(ConfigMapVolume) => config_map / "configMap",
    Secret(SecretVolume) => secret / "secret",
    DownwardApi(DownwardApiVolume) => downward_api / "downwardAPI",
    Projected(ProjectedVolume) => projected / "projected",
    Git(GitVolume) => git_repo / "gitRepo",
    Rbd(RbdVolume) => rbd / "rbd",
    StorageOs(StorageOsVolume) => storageos / "storageos",
}

impl Default for Volume {
    fn default() -> Self {
        Volume::EmptyDir(EmptyDirVolume::default())
    }
}

impl Volume {
    /// Registry entry of the populated variant
    pub fn descriptor(&self) -> &'static VariantDescriptor {
        self.kind().descriptor()
    }

    /// Decode the compact `type:segment:...` form
    pub fn from_selector_form(raw: &str) -> Result<Self> {
        wire::decode_selector(raw)
    }

    /// Decode the dictionary form
    pub fn from_object_form(raw: Map<String, Value>) -> Result<Self> {
        wire::decode_object(raw)
    }

    /// Decode a wire value of either form
    pub fn from_wire(value: &Value) -> Result<Self> {
        wire::decode(value)
    }

    /// Encode to the shortest faithful wire form
    pub fn to_wire(&self) -> Result<Value> {
        wire::encode(self)
    }

    /// Bind checked wire fields to the payload they name, requiring that
    /// every supplied field is consumed
    pub(crate) fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        let discriminator = wire.descriptor().discriminator;
        let volume = Self::unmarshal_payload(wire).context(discriminator)?;
        wire.finish()?;
        Ok(volume)
    }
}

impl Serialize for Volume {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire()
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Volume {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Volume::from_wire(&value).map_err(serde::de::Error::custom)
    }
}
