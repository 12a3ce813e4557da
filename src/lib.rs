//! Volume Shorthand - Kubernetes volume source conversion
//!
//! Converts pod volume sources between three forms: the platform's
//! versioned `Volume` struct, a canonical one-of union, and a compact wire
//! shorthand that is either a `type:segment:segment` string or an object
//! keyed by `vol_type`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐           ┌──────────────────────────────┐
//! │        Wire shorthand        │           │       Platform Volume        │
//! │  "nfs:host:/export:ro"       │           │   k8s core/v1 (one-of)       │
//! │  {vol_type: nfs, ...}        │           │                              │
//! └──────────────┬───────────────┘           └───────────────┬──────────────┘
//!                │                                           │
//!   ┌────────────┴────────────┐                 ┌────────────┴────────────┐
//!   │     Dispatch Layer      │                 │    Platform Adapter     │
//!   │  selector / object      │                 │  version gate (v1)      │
//!   │  codecs + registry      │                 │                         │
//!   └────────────┬────────────┘                 └────────────┬────────────┘
//!                │                                           │
//!                └──────────────────┬────────────────────────┘
//!                                   │
//!                      ┌────────────┴────────────┐
//!                      │   Canonical Volume      │
//!                      │   (27 variants)         │
//!                      └─────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`wire`]: Dispatch layer, selector and object codecs
//! - [`registry`]: Compiled-in table of volume types
//! - [`volume`]: Canonical union and variant payloads
//! - [`platform`]: Versioned platform conversion
//! - [`volume_set`]: Named volume collections
//! - [`device`]: Container volume devices
//! - [`config`]: Conversion configuration
//! - [`error`]: Error types and handling

pub mod config;
pub mod device;
pub mod domain;
pub mod error;
pub mod platform;
pub mod registry;
pub mod volume;
pub mod volume_set;
pub mod wire;

// Re-export commonly used types
pub use config::{ConversionConfig, OutputFormat};

pub use device::{PlatformVolumeDevice, VolumeDevice};

pub use domain::ports::{ApiVersion, PlatformMapping, VolumeVariant};

pub use error::{Error, ErrorKind, Result, ResultExt, WireForm};

pub use platform::PlatformVolume;

pub use registry::{registry, VariantDescriptor, VariantRegistry, VolumeKind};

pub use volume::Volume;

pub use volume_set::VolumeSet;

pub use wire::{MarshalledVolume, WireFields};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
