//! Volumes that project API objects into files: config maps, secrets, the
//! downward API, and projected combinations of those

use super::common::{items_from_v1, items_to_v1, non_empty, some_text, FileMode, KeyPath};
use crate::domain::ports::{PlatformMapping, VolumeVariant};
use crate::error::{Error, Result, ResultExt};
use crate::registry::VolumeKind;
use crate::wire::{MarshalledVolume, WireFields};
use k8s_openapi::api::core::v1 as api;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};

// =============================================================================
// Config Map
// =============================================================================

/// `config_map:<name>` plus `items`, `mode`, `required`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMapVolume {
    pub name: String,
    pub items: Vec<KeyPath>,
    pub mode: Option<FileMode>,
    /// Inverse of the platform's `optional`
    pub required: Option<bool>,
}

impl VolumeVariant for ConfigMapVolume {
    const KIND: VolumeKind = VolumeKind::ConfigMap;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            name: wire.segment("name")?,
            items: wire.field_or_default("items")?,
            mode: wire.field("mode")?,
            required: wire.field("required")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("name", &self.name)?
            .list_field("items", &self.items)?
            .optional_field("mode", self.mode.as_ref())?
            .optional_field("required", self.required.as_ref())
    }
}

impl PlatformMapping for ConfigMapVolume {
    type V1 = api::ConfigMapVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            name: source.name.clone().unwrap_or_default(),
            items: items_from_v1(&source.items)?,
            mode: FileMode::from_v1(source.default_mode)?,
            required: source.optional.map(|optional| !optional),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::ConfigMapVolumeSource {
            name: some_text(&self.name),
            items: items_to_v1(&self.items),
            default_mode: FileMode::to_v1(self.mode),
            optional: self.required.map(|required| !required),
        })
    }
}

// =============================================================================
// Secret
// =============================================================================

/// `secret:<name>` plus `items`, `mode`, `required`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretVolume {
    pub name: String,
    pub items: Vec<KeyPath>,
    pub mode: Option<FileMode>,
    /// Inverse of the platform's `optional`
    pub required: Option<bool>,
}

impl VolumeVariant for SecretVolume {
    const KIND: VolumeKind = VolumeKind::Secret;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            name: wire.segment("name")?,
            items: wire.field_or_default("items")?,
            mode: wire.field("mode")?,
            required: wire.field("required")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .segment("name", &self.name)?
            .list_field("items", &self.items)?
            .optional_field("mode", self.mode.as_ref())?
            .optional_field("required", self.required.as_ref())
    }
}

impl PlatformMapping for SecretVolume {
    type V1 = api::SecretVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            name: source.secret_name.clone().unwrap_or_default(),
            items: items_from_v1(&source.items)?,
            mode: FileMode::from_v1(source.default_mode)?,
            required: source.optional.map(|optional| !optional),
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::SecretVolumeSource {
            secret_name: some_text(&self.name),
            items: items_to_v1(&self.items),
            default_mode: FileMode::to_v1(self.mode),
            optional: self.required.map(|required| !required),
        })
    }
}

// =============================================================================
// Downward API
// =============================================================================

/// Pod field exposed as a file (`metadata.labels`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectFieldRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Container resource exposed as a file (`limits.cpu`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceFieldRef {
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divisor: Option<String>,
}

/// One downward API file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownwardApiFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<ObjectFieldRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceFieldRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FileMode>,
}

impl DownwardApiFile {
    fn from_v1(file: &api::DownwardAPIVolumeFile) -> Result<Self> {
        Ok(Self {
            path: file.path.clone(),
            field: file.field_ref.as_ref().map(|f| ObjectFieldRef {
                path: f.field_path.clone(),
                api_version: non_empty(&f.api_version),
            }),
            resource: file.resource_field_ref.as_ref().map(|r| ResourceFieldRef {
                resource: r.resource.clone(),
                container: non_empty(&r.container_name),
                divisor: r.divisor.as_ref().map(|q| q.0.clone()),
            }),
            mode: FileMode::from_v1(file.mode)?,
        })
    }

    fn to_v1(&self) -> api::DownwardAPIVolumeFile {
        api::DownwardAPIVolumeFile {
            path: self.path.clone(),
            field_ref: self.field.as_ref().map(|f| api::ObjectFieldSelector {
                field_path: f.path.clone(),
                api_version: f.api_version.clone(),
            }),
            resource_field_ref: self.resource.as_ref().map(|r| api::ResourceFieldSelector {
                resource: r.resource.clone(),
                container_name: r.container.clone(),
                divisor: r.divisor.clone().map(Quantity),
            }),
            mode: FileMode::to_v1(self.mode),
        }
    }
}

fn files_from_v1(items: &Option<Vec<api::DownwardAPIVolumeFile>>) -> Result<Vec<DownwardApiFile>> {
    items
        .iter()
        .flatten()
        .map(|file| DownwardApiFile::from_v1(file).with_context(|| format!("item \"{}\"", file.path)))
        .collect()
}

fn files_to_v1(items: &[DownwardApiFile]) -> Option<Vec<api::DownwardAPIVolumeFile>> {
    if items.is_empty() {
        None
    } else {
        Some(items.iter().map(DownwardApiFile::to_v1).collect())
    }
}

/// Pod metadata and resources as files; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownwardApiVolume {
    pub items: Vec<DownwardApiFile>,
    pub mode: Option<FileMode>,
}

impl VolumeVariant for DownwardApiVolume {
    const KIND: VolumeKind = VolumeKind::DownwardApi;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            items: wire.field_or_default("items")?,
            mode: wire.field("mode")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .list_field("items", &self.items)?
            .optional_field("mode", self.mode.as_ref())
    }
}

impl PlatformMapping for DownwardApiVolume {
    type V1 = api::DownwardAPIVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        Ok(Self {
            items: files_from_v1(&source.items)?,
            mode: FileMode::from_v1(source.default_mode)?,
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        Ok(api::DownwardAPIVolumeSource {
            items: files_to_v1(&self.items),
            default_mode: FileMode::to_v1(self.mode),
        })
    }
}

// =============================================================================
// Projected
// =============================================================================

/// Config map or secret inside a projected volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyProjection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Downward API files inside a projected volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownwardApiProjection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<DownwardApiFile>,
}

/// Bound service account token written to `path`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceAccountTokenProjection {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_seconds: Option<i64>,
}

/// One source of a projected volume, written as a single-key object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    ConfigMap(KeyProjection),
    Secret(KeyProjection),
    DownwardApi(DownwardApiProjection),
    ServiceAccountToken(ServiceAccountTokenProjection),
}

impl Projection {
    fn from_v1(source: &api::VolumeProjection) -> Result<Self> {
        let populated: Vec<&str> = [
            ("config_map", source.config_map.is_some()),
            ("secret", source.secret.is_some()),
            ("downward_api", source.downward_api.is_some()),
            ("service_account_token", source.service_account_token.is_some()),
            ("cluster_trust_bundle", source.cluster_trust_bundle.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();

        if populated.len() != 1 {
            return Err(Error::schema(
                populated.join(", "),
                "a projection must set exactly one source",
            ));
        }

        if let Some(config_map) = &source.config_map {
            return Ok(Projection::ConfigMap(KeyProjection {
                name: config_map.name.clone().unwrap_or_default(),
                items: items_from_v1(&config_map.items)?,
                required: config_map.optional.map(|optional| !optional),
            }));
        }
        if let Some(secret) = &source.secret {
            return Ok(Projection::Secret(KeyProjection {
                name: secret.name.clone().unwrap_or_default(),
                items: items_from_v1(&secret.items)?,
                required: secret.optional.map(|optional| !optional),
            }));
        }
        if let Some(downward_api) = &source.downward_api {
            return Ok(Projection::DownwardApi(DownwardApiProjection {
                items: files_from_v1(&downward_api.items)?,
            }));
        }
        if let Some(token) = &source.service_account_token {
            return Ok(Projection::ServiceAccountToken(ServiceAccountTokenProjection {
                path: token.path.clone(),
                audience: non_empty(&token.audience),
                expiration_seconds: token.expiration_seconds,
            }));
        }

        Err(Error::unsupported_variant(
            populated.join(", "),
            "projection source has no shorthand",
        ))
    }

    fn to_v1(&self) -> api::VolumeProjection {
        match self {
            Projection::ConfigMap(config_map) => api::VolumeProjection {
                config_map: Some(api::ConfigMapProjection {
                    name: some_text(&config_map.name),
                    items: items_to_v1(&config_map.items),
                    optional: config_map.required.map(|required| !required),
                }),
                ..Default::default()
            },
            Projection::Secret(secret) => api::VolumeProjection {
                secret: Some(api::SecretProjection {
                    name: some_text(&secret.name),
                    items: items_to_v1(&secret.items),
                    optional: secret.required.map(|required| !required),
                }),
                ..Default::default()
            },
            Projection::DownwardApi(downward_api) => api::VolumeProjection {
                downward_api: Some(api::DownwardAPIProjection {
                    items: files_to_v1(&downward_api.items),
                }),
                ..Default::default()
            },
            Projection::ServiceAccountToken(token) => api::VolumeProjection {
                service_account_token: Some(api::ServiceAccountTokenProjection {
                    path: token.path.clone(),
                    audience: token.audience.clone(),
                    expiration_seconds: token.expiration_seconds,
                }),
                ..Default::default()
            },
        }
    }
}

/// Several projection sources merged into one directory; object form only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedVolume {
    pub sources: Vec<Projection>,
    pub mode: Option<FileMode>,
}

impl VolumeVariant for ProjectedVolume {
    const KIND: VolumeKind = VolumeKind::Projected;

    fn unmarshal(wire: &mut WireFields) -> Result<Self> {
        Ok(Self {
            sources: wire.field_or_default("sources")?,
            mode: wire.field("mode")?,
        })
    }

    fn marshal(&self) -> Result<MarshalledVolume> {
        MarshalledVolume::new(Self::KIND)
            .list_field("sources", &self.sources)?
            .optional_field("mode", self.mode.as_ref())
    }
}

impl PlatformMapping for ProjectedVolume {
    type V1 = api::ProjectedVolumeSource;

    fn from_v1(source: &Self::V1) -> Result<Self> {
        let sources = source
            .sources
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, projection)| {
                Projection::from_v1(projection).with_context(|| format!("source {}", index))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sources,
            mode: FileMode::from_v1(source.default_mode)?,
        })
    }

    fn to_v1(&self) -> Result<Self::V1> {
        let sources = if self.sources.is_empty() {
            None
        } else {
            Some(self.sources.iter().map(Projection::to_v1).collect())
        };

        Ok(api::ProjectedVolumeSource {
            sources,
            default_mode: FileMode::to_v1(self.mode),
        })
    }
}
