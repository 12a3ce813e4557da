//! Conversion configuration
//!
//! The settings a conversion run needs: which platform API version to target
//! and how to print the result. The binary fills this from command-line
//! arguments and environment variables; library users build it directly.

use crate::domain::ports::ApiVersion;
use crate::error::{Error, Result};
use crate::platform::{PlatformVolume, RESOURCE};
use crate::volume_set::VolumeSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

// =============================================================================
// Output Format
// =============================================================================

/// Document format for rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

// =============================================================================
// Conversion Configuration
// =============================================================================

/// Configuration for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Platform API version (`v1`, or empty for the default)
    pub api_version: String,
    /// Output document format
    pub output: OutputFormat,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::V1.as_str().to_string(),
            output: OutputFormat::Yaml,
        }
    }
}

impl ConversionConfig {
    /// Load a configuration file (YAML or JSON); missing keys keep defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.api_version()?;
        info!("Loaded conversion config from {}", path.display());
        Ok(config)
    }

    /// The configured API version, validated
    pub fn api_version(&self) -> Result<ApiVersion> {
        ApiVersion::parse(&self.api_version, RESOURCE)
    }

    /// Convert a `{name: shorthand}` document into a platform volume list
    pub fn to_platform(&self, document: &Value) -> Result<Value> {
        let set = VolumeSet::decode(document)?;
        let volumes = set
            .to_platform(&self.api_version)?
            .iter()
            .map(PlatformVolume::to_value)
            .collect::<Result<Vec<_>>>()?;
        debug!("Converted {} volumes to {}", volumes.len(), self.api_version()?);
        Ok(Value::Array(volumes))
    }

    /// Convert a platform volume list into a `{name: shorthand}` document
    pub fn from_platform(&self, document: &Value) -> Result<Value> {
        let Value::Array(items) = document else {
            return Err(Error::MalformedInput {
                input: document.to_string(),
                reason: "expected a list of platform volumes".to_string(),
            });
        };

        let volumes = items
            .iter()
            .map(|item| PlatformVolume::from_value(&self.api_version, item.clone()))
            .collect::<Result<Vec<_>>>()?;
        let set = VolumeSet::from_platform(&volumes)?;
        debug!("Converted {} platform volumes to shorthand", set.len());
        set.encode()
    }

    /// Render a value in the configured output format
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        match self.output {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

/// Parse an input document; YAML is a superset of JSON so both are accepted
pub fn parse_document(text: &str) -> Result<Value> {
    Ok(serde_yaml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.api_version().unwrap(), ApiVersion::V1);
        assert_eq!(config.output, OutputFormat::Yaml);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "output: json").unwrap();

        let config = ConversionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.api_version, "v1");
    }

    #[test]
    fn test_from_file_rejects_version() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_version: v2").unwrap();

        let err = ConversionConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
    }

    #[test]
    fn test_missing_file() {
        let err = ConversionConfig::from_file("/nonexistent/volumes.yaml").unwrap_err();
        assert_matches!(err, Error::Io(_));
    }

    #[test]
    fn test_document_conversion() {
        let config = ConversionConfig::default();
        let document = parse_document("data: pvc:data-claim\nshared: nfs:files.local:/exports:ro\n").unwrap();

        let platform = config.to_platform(&document).unwrap();
        assert_eq!(
            platform,
            json!([
                {"name": "data", "persistentVolumeClaim": {"claimName": "data-claim"}},
                {"name": "shared", "nfs": {"server": "files.local", "path": "/exports", "readOnly": true}}
            ])
        );
        assert_eq!(config.from_platform(&platform).unwrap(), document);
    }

    #[test]
    fn test_from_platform_requires_list() {
        let err = ConversionConfig::default()
            .from_platform(&json!({"name": "data"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_render() {
        let mut config = ConversionConfig::default();
        let value = json!({"data": "claim"});
        assert_eq!(config.render(&value).unwrap(), "data: claim\n");

        config.output = OutputFormat::Json;
        assert_eq!(config.render(&value).unwrap(), "{\n  \"data\": \"claim\"\n}");
    }
}
