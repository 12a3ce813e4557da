//! Intermediate record produced by variant payloads on the way out

use super::{DELIMITER, DISCRIMINATOR_KEY, SELECTOR_KEY};
use crate::error::{Error, Result};
use crate::registry::VolumeKind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A variant's wire data before a form is chosen.
///
/// `selector` always has one entry per declared segment, empty when the
/// value is zero. `extra_fields` holds every named key, passthrough data
/// included.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalledVolume {
    pub kind: VolumeKind,
    pub selector: Vec<String>,
    pub extra_fields: Map<String, Value>,
}

impl MarshalledVolume {
    pub fn new(kind: VolumeKind) -> Self {
        Self {
            kind,
            selector: vec![String::new(); kind.descriptor().selector.len()],
            extra_fields: Map::new(),
        }
    }

    /// Wire discriminator of the variant
    pub fn discriminator(&self) -> &'static str {
        self.kind.discriminator()
    }

    /// Set a positional segment
    pub fn segment(mut self, name: &str, value: impl Into<String>) -> Result<Self> {
        let descriptor = self.kind.descriptor();
        let index = descriptor.segment_index(name).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "\"{}\" is not a selector segment of \"{}\"",
                name, descriptor.discriminator
            ))
        })?;
        self.selector[index] = value.into();
        Ok(self)
    }

    /// Set a flag segment: its own name when set, empty otherwise
    pub fn flag(self, name: &str, set: bool) -> Result<Self> {
        let value = if set { name.to_string() } else { String::new() };
        self.segment(name, value)
    }

    /// Set a named field
    pub fn field<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Result<Self> {
        let descriptor = self.kind.descriptor();
        if !descriptor.declares_field(name) {
            return Err(Error::InvariantViolation(format!(
                "\"{}\" is not a field of \"{}\"",
                name, descriptor.discriminator
            )));
        }

        let value = serde_json::to_value(value).map_err(|e| {
            Error::InvariantViolation(format!("cannot serialize field \"{}\": {}", name, e))
        })?;
        self.extra_fields.insert(name.to_string(), value);
        Ok(self)
    }

    /// Set a named field when present
    pub fn optional_field<T: Serialize>(self, name: &str, value: Option<&T>) -> Result<Self> {
        match value {
            Some(value) => self.field(name, value),
            None => Ok(self),
        }
    }

    /// Set a string field when non-empty
    pub fn text_field(self, name: &str, value: &str) -> Result<Self> {
        if value.is_empty() {
            Ok(self)
        } else {
            self.field(name, value)
        }
    }

    /// Set a boolean field only when true
    pub fn flag_field(self, name: &str, set: bool) -> Result<Self> {
        if set {
            self.field(name, &true)
        } else {
            Ok(self)
        }
    }

    /// Set a list field when non-empty
    pub fn list_field<T: Serialize>(self, name: &str, values: &[T]) -> Result<Self> {
        if values.is_empty() {
            Ok(self)
        } else {
            self.field(name, values)
        }
    }

    /// Add passthrough keys; they may not shadow reserved or declared keys
    pub fn passthrough(mut self, extra: &BTreeMap<String, Value>) -> Result<Self> {
        let descriptor = self.kind.descriptor();
        for (key, value) in extra {
            let reserved = key == DISCRIMINATOR_KEY || key == SELECTOR_KEY;
            if reserved
                || descriptor.declares_field(key)
                || descriptor.segment_index(key).is_some()
            {
                return Err(Error::schema(
                    key.clone(),
                    format!(
                        "passthrough key collides with a key of volume type \"{}\"",
                        descriptor.discriminator
                    ),
                ));
            }
            self.extra_fields.insert(key.clone(), value.clone());
        }
        Ok(self)
    }

    /// Segments with the zero-valued tail dropped
    pub fn trimmed_selector(&self) -> Vec<String> {
        super::selector::trim_trailing(self.selector.clone())
    }

    /// Whether every segment can be written positionally
    pub fn is_positional(&self) -> bool {
        !self.selector.iter().any(|s| s.contains(DELIMITER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let marshalled = MarshalledVolume::new(VolumeKind::Nfs)
            .segment("server", "srv")
            .unwrap()
            .flag("ro", true)
            .unwrap();
        assert_eq!(marshalled.selector, vec!["srv", "", "ro"]);
        assert_eq!(marshalled.trimmed_selector(), vec!["srv", "", "ro"]);
        assert!(marshalled.is_positional());
        assert_eq!(marshalled.discriminator(), "nfs");
    }

    #[test]
    fn test_zero_fields_skipped() {
        let marshalled = MarshalledVolume::new(VolumeKind::GcePd)
            .text_field("fs", "")
            .unwrap()
            .flag_field("ro", false)
            .unwrap()
            .optional_field::<i32>("partition", None)
            .unwrap();
        assert!(marshalled.extra_fields.is_empty());
    }

    #[test]
    fn test_undeclared_names_are_defects() {
        let err = MarshalledVolume::new(VolumeKind::Nfs)
            .field("fs", "ext4")
            .unwrap_err();
        assert!(err.is_defect());

        let err = MarshalledVolume::new(VolumeKind::Nfs)
            .segment("volume", "x")
            .unwrap_err();
        assert!(err.is_defect());
    }

    #[test]
    fn test_passthrough_collision() {
        let mut extra = BTreeMap::new();
        extra.insert("tier".to_string(), json!("gold"));
        let marshalled = MarshalledVolume::new(VolumeKind::Flex)
            .passthrough(&extra)
            .unwrap();
        assert_eq!(marshalled.extra_fields.get("tier"), Some(&json!("gold")));

        extra.insert("vol_type".to_string(), json!("nfs"));
        let err = MarshalledVolume::new(VolumeKind::Flex)
            .passthrough(&extra)
            .unwrap_err();
        assert_eq!(err.token(), Some("vol_type"));
    }
}
