//! Domain Ports - Core trait definitions for volume conversion
//!
//! These traits define the two boundaries every volume variant sits between:
//! the compact wire form on one side and the versioned platform struct on the
//! other. Each variant payload implements both.

use crate::error::{Error, Result};
use crate::registry::VolumeKind;
use crate::wire::{MarshalledVolume, WireFields};
use std::fmt;

// =============================================================================
// Platform Versions
// =============================================================================

/// Platform API versions this crate can produce and consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
}

impl ApiVersion {
    /// Every supported version, newest first
    pub const ALL: &'static [ApiVersion] = &[ApiVersion::V1];

    /// Resolve a version identifier for `resource`.
    ///
    /// Matching is case-insensitive and the empty string means the current
    /// version. Anything else is rejected outright.
    pub fn parse(version: &str, resource: &str) -> Result<Self> {
        match version.to_lowercase().as_str() {
            "" | "v1" => Ok(ApiVersion::V1),
            _ => Err(Error::UnsupportedVersion {
                resource: resource.to_string(),
                version: version.to_string(),
            }),
        }
    }

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Wire Boundary
// =============================================================================

/// A volume variant that can be read from and written to the wire form.
///
/// The registry owns the grammar (which names are positional segments and
/// which are object keys); implementations only bind names to their fields.
pub trait VolumeVariant: Sized {
    /// Registry entry this payload belongs to
    const KIND: VolumeKind;

    /// Build the payload from already-validated wire fields
    fn unmarshal(wire: &mut WireFields) -> Result<Self>;

    /// Produce the intermediate record the dispatch layer serializes
    fn marshal(&self) -> Result<MarshalledVolume>;
}

// =============================================================================
// Platform Boundary
// =============================================================================

/// Field-level mapping between a variant payload and its platform struct
pub trait PlatformMapping: Sized {
    /// The `core/v1` volume source struct
    type V1;

    /// Import from the `v1` platform struct
    fn from_v1(source: &Self::V1) -> Result<Self>;

    /// Export to the `v1` platform struct
    fn to_v1(&self) -> Result<Self::V1>;
}
