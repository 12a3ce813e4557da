//! Built-in variant table

use super::{VariantDescriptor, VolumeKind};
use crate::domain::ports::ApiVersion;

const V1: &[ApiVersion] = &[ApiVersion::V1];

pub(super) const DESCRIPTORS: &[VariantDescriptor] = &[
    VariantDescriptor {
        kind: VolumeKind::HostPath,
        discriminator: "host_path",
        selector: &["path", "type"],
        fields: &[],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::EmptyDir,
        discriminator: "empty_dir",
        selector: &[],
        fields: &["medium", "max_size"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::GcePd,
        discriminator: "gce_pd",
        selector: &["pd"],
        fields: &["fs", "partition", "ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::AwsEbs,
        discriminator: "aws_ebs",
        selector: &["volume"],
        fields: &["fs", "partition", "ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::AzureDisk,
        discriminator: "azure_disk",
        selector: &["disk"],
        fields: &["disk_uri", "fs", "kind", "cache", "ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::AzureFile,
        discriminator: "azure_file",
        selector: &["secret", "share", "ro"],
        fields: &[],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::CephFs,
        discriminator: "cephfs",
        selector: &[],
        fields: &["monitors", "path", "user", "secret_file", "secret", "ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Cinder,
        discriminator: "cinder",
        selector: &["volume"],
        fields: &["fs", "ro", "secret"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::FibreChannel,
        discriminator: "fc",
        selector: &[],
        fields: &["target_wwns", "lun", "fs", "ro", "wwids"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Flex,
        discriminator: "flex",
        selector: &["driver"],
        fields: &["fs", "secret", "ro", "options"],
        passthrough: true,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Flocker,
        discriminator: "flocker",
        selector: &["dataset"],
        fields: &["uuid"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Glusterfs,
        discriminator: "glusterfs",
        selector: &["endpoints", "path"],
        fields: &["ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Iscsi,
        discriminator: "iscsi",
        selector: &[],
        fields: &[
            "target_portal",
            "iqn",
            "lun",
            "iscsi_interface",
            "fs",
            "ro",
            "portals",
            "chap_discovery",
            "chap_session",
            "secret",
            "initiator",
        ],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Nfs,
        discriminator: "nfs",
        selector: &["server", "path", "ro"],
        fields: &[],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::PhotonPd,
        discriminator: "photon_pd",
        selector: &["pd", "fs"],
        fields: &[],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Portworx,
        discriminator: "portworx",
        selector: &["volume"],
        fields: &["fs", "ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Pvc,
        discriminator: "pvc",
        selector: &["claim", "ro"],
        fields: &[],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Quobyte,
        discriminator: "quobyte",
        selector: &["registry", "volume"],
        fields: &["ro", "user", "group", "tenant"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::ScaleIo,
        discriminator: "scaleio",
        selector: &[],
        fields: &[
            "gateway",
            "system",
            "secret",
            "ssl",
            "protection_domain",
            "storage_pool",
            "storage_mode",
            "vol_name",
            "fs",
            "ro",
        ],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Vsphere,
        discriminator: "vsphere",
        selector: &["path"],
        fields: &["fs", "policy_name", "policy_id"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::ConfigMap,
        discriminator: "config_map",
        selector: &["name"],
        fields: &["items", "mode", "required"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Secret,
        discriminator: "secret",
        selector: &["name"],
        fields: &["items", "mode", "required"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::DownwardApi,
        discriminator: "downward_api",
        selector: &[],
        fields: &["items", "mode"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Projected,
        discriminator: "projected",
        selector: &[],
        fields: &["sources", "mode"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Git,
        discriminator: "git",
        selector: &["repository", "revision"],
        fields: &["directory"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::Rbd,
        discriminator: "rbd",
        selector: &[],
        fields: &["monitors", "image", "fs", "pool", "user", "keyring", "secret", "ro"],
        passthrough: false,
        versions: V1,
    },
    VariantDescriptor {
        kind: VolumeKind::StorageOs,
        discriminator: "storageos",
        selector: &["volume"],
        fields: &["vol_ns", "fs", "ro", "secret"],
        passthrough: false,
        versions: V1,
    },
];
