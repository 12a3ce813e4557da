//! Variant Registry
//!
//! Static table mapping each volume type discriminator to its wire grammar:
//! the ordered selector segments accepted in the compact string form, the
//! named keys accepted in the object form, and whether unknown object keys
//! are kept as passthrough data.
//!
//! The table is compiled in and validated once on first use. A malformed
//! table (duplicate discriminator, reserved key collision, missing variant)
//! is a startup fault, never a runtime error.

mod builtin;

use crate::domain::ports::ApiVersion;
use crate::error::{Error, Result};
use crate::wire::{DELIMITER, DISCRIMINATOR_KEY, SELECTOR_KEY};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

// =============================================================================
// Volume Kind
// =============================================================================

/// Closed set of volume variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VolumeKind {
    HostPath,
    EmptyDir,
    GcePd,
    AwsEbs,
    AzureDisk,
    AzureFile,
    CephFs,
    Cinder,
    FibreChannel,
    Flex,
    Flocker,
    Glusterfs,
    Iscsi,
    Nfs,
    PhotonPd,
    Portworx,
    Pvc,
    Quobyte,
    ScaleIo,
    Vsphere,
    ConfigMap,
    Secret,
    DownwardApi,
    Projected,
    Git,
    Rbd,
    StorageOs,
}

impl VolumeKind {
    /// Every variant, in registry order
    pub const ALL: [VolumeKind; 27] = [
        VolumeKind::HostPath,
        VolumeKind::EmptyDir,
        VolumeKind::GcePd,
        VolumeKind::AwsEbs,
        VolumeKind::AzureDisk,
        VolumeKind::AzureFile,
        VolumeKind::CephFs,
        VolumeKind::Cinder,
        VolumeKind::FibreChannel,
        VolumeKind::Flex,
        VolumeKind::Flocker,
        VolumeKind::Glusterfs,
        VolumeKind::Iscsi,
        VolumeKind::Nfs,
        VolumeKind::PhotonPd,
        VolumeKind::Portworx,
        VolumeKind::Pvc,
        VolumeKind::Quobyte,
        VolumeKind::ScaleIo,
        VolumeKind::Vsphere,
        VolumeKind::ConfigMap,
        VolumeKind::Secret,
        VolumeKind::DownwardApi,
        VolumeKind::Projected,
        VolumeKind::Git,
        VolumeKind::Rbd,
        VolumeKind::StorageOs,
    ];

    /// Registry entry for this kind
    pub fn descriptor(&self) -> &'static VariantDescriptor {
        registry().descriptor(*self)
    }

    /// Wire discriminator (`vol_type` value)
    pub fn discriminator(&self) -> &'static str {
        self.descriptor().discriminator
    }
}

impl fmt::Display for VolumeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

// =============================================================================
// Variant Descriptor
// =============================================================================

/// Wire grammar of one volume variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// Variant this entry describes
    pub kind: VolumeKind,
    /// Unique `vol_type` value
    pub discriminator: &'static str,
    /// Positional segment names; empty means object form only
    pub selector: &'static [&'static str],
    /// Keys accepted by name in object form
    pub fields: &'static [&'static str],
    /// Keep undeclared object keys instead of rejecting them
    pub passthrough: bool,
    /// Platform versions this variant maps to
    pub versions: &'static [ApiVersion],
}

impl VariantDescriptor {
    /// Whether the compact `type:segment` string form applies
    pub fn has_selector_form(&self) -> bool {
        !self.selector.is_empty()
    }

    /// Position of a named selector segment
    pub fn segment_index(&self, name: &str) -> Option<usize> {
        self.selector.iter().position(|s| *s == name)
    }

    /// Whether `name` is a declared named object field
    pub fn declares_field(&self, name: &str) -> bool {
        self.fields.contains(&name)
    }

    /// Whether a platform mapping exists for `version`
    pub fn supports(&self, version: ApiVersion) -> bool {
        self.versions.contains(&version)
    }

    fn validate(&self) -> Result<()> {
        if self.discriminator.is_empty() || self.discriminator.contains(DELIMITER) {
            return Err(Error::InvariantViolation(format!(
                "invalid discriminator \"{}\" for {:?}",
                self.discriminator, self.kind
            )));
        }

        let mut seen = HashSet::new();
        for name in self.selector.iter().chain(self.fields.iter()) {
            if *name == DISCRIMINATOR_KEY || *name == SELECTOR_KEY {
                return Err(Error::InvariantViolation(format!(
                    "volume type \"{}\" declares reserved key \"{}\"",
                    self.discriminator, name
                )));
            }
            if !seen.insert(*name) {
                return Err(Error::InvariantViolation(format!(
                    "volume type \"{}\" declares \"{}\" twice",
                    self.discriminator, name
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Lookup table of variant descriptors
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    descriptors: Vec<VariantDescriptor>,
    by_discriminator: HashMap<&'static str, usize>,
    by_kind: HashMap<VolumeKind, usize>,
}

impl VariantRegistry {
    /// Build a registry, rejecting duplicate or malformed entries
    pub fn new(descriptors: Vec<VariantDescriptor>) -> Result<Self> {
        let mut by_discriminator = HashMap::with_capacity(descriptors.len());
        let mut by_kind = HashMap::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            descriptor.validate()?;

            if by_discriminator.insert(descriptor.discriminator, index).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "duplicate discriminator \"{}\"",
                    descriptor.discriminator
                )));
            }
            if by_kind.insert(descriptor.kind, index).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "duplicate registry entry for {:?}",
                    descriptor.kind
                )));
            }
        }

        Ok(Self {
            descriptors,
            by_discriminator,
            by_kind,
        })
    }

    /// Build the compiled-in registry, requiring one entry per variant
    pub fn builtin() -> Result<Self> {
        let registry = Self::new(builtin::DESCRIPTORS.to_vec())?;

        if let Some(missing) = VolumeKind::ALL
            .iter()
            .find(|kind| !registry.by_kind.contains_key(*kind))
        {
            return Err(Error::InvariantViolation(format!(
                "no registry entry for {:?}",
                missing
            )));
        }

        debug!("Volume registry initialized ({} variants)", registry.len());
        Ok(registry)
    }

    /// Look up a descriptor by discriminator
    pub fn get(&self, discriminator: &str) -> Option<&VariantDescriptor> {
        self.by_discriminator
            .get(discriminator)
            .map(|&index| &self.descriptors[index])
    }

    /// Look up a descriptor, failing with an unsupported-variant error
    pub fn lookup(&self, discriminator: &str) -> Result<&VariantDescriptor> {
        self.get(discriminator)
            .ok_or_else(|| Error::unsupported_variant(discriminator, "not a registered volume type"))
    }

    /// Number of registered variants
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All descriptors in table order
    pub fn iter(&self) -> impl Iterator<Item = &VariantDescriptor> {
        self.descriptors.iter()
    }

    fn descriptor(&self, kind: VolumeKind) -> &VariantDescriptor {
        // builtin() guarantees an entry for every kind
        &self.descriptors[self.by_kind[&kind]]
    }
}

/// Process-wide registry, built on first use and read-only afterwards
pub fn registry() -> &'static VariantRegistry {
    static REGISTRY: OnceLock<VariantRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        VariantRegistry::builtin()
            .unwrap_or_else(|e| panic!("compiled-in volume registry is malformed: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use assert_matches::assert_matches;

    const NFS: VariantDescriptor = VariantDescriptor {
        kind: VolumeKind::Nfs,
        discriminator: "nfs",
        selector: &["server", "path", "ro"],
        fields: &[],
        passthrough: false,
        versions: &[ApiVersion::V1],
    };

    #[test]
    fn test_builtin_registry_is_complete() {
        let registry = VariantRegistry::builtin().unwrap();
        assert_eq!(registry.len(), VolumeKind::ALL.len());

        for kind in VolumeKind::ALL {
            let descriptor = kind.descriptor();
            assert_eq!(descriptor.kind, kind);
            assert_eq!(registry.lookup(descriptor.discriminator).unwrap().kind, kind);
            assert!(descriptor.supports(ApiVersion::V1));
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let err = registry().lookup("bogus").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
        assert_eq!(err.token(), Some("bogus"));
    }

    #[test]
    fn test_descriptor_queries() {
        let gluster = registry().lookup("glusterfs").unwrap();
        assert!(gluster.has_selector_form());
        assert_eq!(gluster.segment_index("path"), Some(1));
        assert!(gluster.declares_field("ro"));
        assert!(!gluster.passthrough);

        let empty_dir = registry().lookup("empty_dir").unwrap();
        assert!(!empty_dir.has_selector_form());

        assert!(registry().lookup("flex").unwrap().passthrough);
    }

    #[test]
    fn test_duplicate_discriminator_rejected() {
        let other = VariantDescriptor {
            kind: VolumeKind::Glusterfs,
            ..NFS
        };
        let err = VariantRegistry::new(vec![NFS, other]).unwrap_err();
        assert_matches!(err, Error::InvariantViolation(msg) if msg.contains("duplicate discriminator"));
    }

    #[test]
    fn test_reserved_key_rejected() {
        let bad = VariantDescriptor {
            fields: &["vol_id"],
            ..NFS
        };
        let err = VariantRegistry::new(vec![bad]).unwrap_err();
        assert_matches!(err, Error::InvariantViolation(msg) if msg.contains("reserved key"));
    }

    #[test]
    fn test_field_declared_twice_rejected() {
        let bad = VariantDescriptor {
            fields: &["path"],
            ..NFS
        };
        assert!(VariantRegistry::new(vec![bad]).is_err());
    }

    #[test]
    fn test_delimiter_in_discriminator_rejected() {
        let bad = VariantDescriptor {
            discriminator: "nfs:v4",
            ..NFS
        };
        assert!(VariantRegistry::new(vec![bad]).unwrap_err().is_defect());
    }
}
