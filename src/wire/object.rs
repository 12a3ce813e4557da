//! Object Codec
//!
//! Dictionary form: `vol_type` discriminator, an optional `vol_id` holding
//! colon-delimited selector segments, then named fields. Keys a variant does
//! not declare are either kept verbatim (passthrough variants) or rejected.
//!
//! [`WireFields`] is the binding record both codecs produce; variant
//! payloads read their fields from it by name.

use super::selector;
use super::{MarshalledVolume, DELIMITER, DISCRIMINATOR_KEY, SELECTOR_KEY};
use crate::error::{Error, Result, ResultExt, WireForm};
use crate::registry::VariantDescriptor;
use crate::volume::Volume;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

// =============================================================================
// Wire Fields
// =============================================================================

/// Grammar-checked fields of one wire value, waiting to be bound to a payload
#[derive(Debug, Clone)]
pub struct WireFields {
    descriptor: VariantDescriptor,
    segments: Vec<Option<String>>,
    fields: Map<String, Value>,
    extra: BTreeMap<String, Value>,
}

impl WireFields {
    /// Fields of a compact string value
    pub fn from_selector(descriptor: &VariantDescriptor, segments: Vec<String>) -> Result<Self> {
        if !descriptor.has_selector_form() {
            return Err(Error::FormMismatch {
                discriminator: descriptor.discriminator.to_string(),
                form: WireForm::Selector,
            });
        }

        let segments = selector::bind(descriptor, segments).context("selector")?;
        Ok(Self {
            descriptor: *descriptor,
            segments,
            fields: Map::new(),
            extra: BTreeMap::new(),
        })
    }

    /// Fields of a dictionary value.
    ///
    /// `selector` holds the already split `vol_id` segments; `object` holds
    /// every other key. Selector names may also be given as plain keys, but
    /// not both ways at once.
    pub fn from_object(
        descriptor: &VariantDescriptor,
        selector: Vec<String>,
        object: Map<String, Value>,
    ) -> Result<Self> {
        let mut segments = selector::bind(descriptor, selector).context(SELECTOR_KEY)?;
        let mut fields = Map::new();
        let mut extra = BTreeMap::new();
        let mut unknown = Vec::new();

        for (key, value) in object {
            if let Some(index) = descriptor.segment_index(&key) {
                let text = match value {
                    Value::Null => continue,
                    Value::String(text) => text,
                    other => {
                        return Err(Error::schema(token_of(&other), "expected a string").context(key));
                    }
                };
                if segments[index].is_some() {
                    return Err(Error::schema(
                        text,
                        format!("given both in \"{}\" and as a key", SELECTOR_KEY),
                    )
                    .context(key));
                }
                segments[index] = Some(text);
            } else if descriptor.declares_field(&key) {
                if !value.is_null() {
                    fields.insert(key, value);
                }
            } else if descriptor.passthrough {
                extra.insert(key, value);
            } else {
                unknown.push(key);
            }
        }

        if !unknown.is_empty() {
            return Err(Error::UnknownField {
                discriminator: descriptor.discriminator.to_string(),
                fields: unknown,
            });
        }

        Ok(Self {
            descriptor: *descriptor,
            segments,
            fields,
            extra,
        })
    }

    /// Registry entry these fields were checked against
    pub fn descriptor(&self) -> &VariantDescriptor {
        &self.descriptor
    }

    /// Take a selector segment, empty when it was not supplied
    pub fn segment(&mut self, name: &str) -> Result<String> {
        let index = self.descriptor.segment_index(name).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "\"{}\" is not a selector segment of \"{}\"",
                name, self.descriptor.discriminator
            ))
        })?;
        Ok(self.segments[index].take().unwrap_or_default())
    }

    /// Take a flag segment, which is either its own name or empty
    pub fn flag_segment(&mut self, name: &str) -> Result<bool> {
        let value = self.segment(name)?;
        if value.is_empty() {
            Ok(false)
        } else if value == name {
            Ok(true)
        } else {
            Err(Error::schema(value, format!("expected \"{}\" or nothing", name)).context(name))
        }
    }

    /// Take a named field, `None` when absent or null
    pub fn field<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        if !self.descriptor.declares_field(name) {
            return Err(Error::InvariantViolation(format!(
                "\"{}\" is not a field of \"{}\"",
                name, self.descriptor.discriminator
            )));
        }

        match self.fields.remove(name) {
            None => Ok(None),
            Some(value) => {
                let token = token_of(&value);
                serde_json::from_value(value)
                    .map(Some)
                    .map_err(|e| Error::schema(token, e.to_string()).context(name))
            }
        }
    }

    /// Take a named field, falling back to its zero value
    pub fn field_or_default<T: DeserializeOwned + Default>(&mut self, name: &str) -> Result<T> {
        Ok(self.field(name)?.unwrap_or_default())
    }

    /// Take the passthrough keys
    pub fn take_extra(&mut self) -> BTreeMap<String, Value> {
        std::mem::take(&mut self.extra)
    }

    /// Check that the payload consumed everything it was given
    pub(crate) fn finish(&self) -> Result<()> {
        let leftover: Vec<&str> = self
            .descriptor
            .selector
            .iter()
            .zip(&self.segments)
            .filter(|(_, slot)| slot.is_some())
            .map(|(name, _)| *name)
            .chain(self.fields.keys().map(String::as_str))
            .chain(self.extra.keys().map(String::as_str))
            .collect();

        if leftover.is_empty() {
            Ok(())
        } else {
            Err(Error::InvariantViolation(format!(
                "\"{}\" left fields unread: {}",
                self.descriptor.discriminator,
                leftover.join(", ")
            )))
        }
    }
}

fn token_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Build a variant from named fields alone (no `vol_id`)
pub fn decode(descriptor: &VariantDescriptor, fields: Map<String, Value>) -> Result<Volume> {
    trace!(
        "Decoding {} from {} object fields",
        descriptor.discriminator,
        fields.len()
    );
    let mut wire = WireFields::from_object(descriptor, Vec::new(), fields)?;
    Volume::unmarshal(&mut wire)
}

/// Render a marshalled variant as a dictionary.
///
/// Segments go under `vol_id` unless one of them contains the delimiter, in
/// which case every non-empty segment is written under its own name.
pub fn encode(marshalled: MarshalledVolume) -> Map<String, Value> {
    let descriptor = marshalled.kind.descriptor();
    let positional = marshalled.is_positional();
    let mut object = marshalled.extra_fields;

    object.insert(
        DISCRIMINATOR_KEY.to_string(),
        Value::String(descriptor.discriminator.to_string()),
    );

    if positional {
        let segments = selector::trim_trailing(marshalled.selector);
        if !segments.is_empty() {
            object.insert(
                SELECTOR_KEY.to_string(),
                Value::String(selector::join_segments(&segments)),
            );
        }
    } else {
        trace!(
            "Segment of {} contains '{}', writing selector by name",
            descriptor.discriminator,
            DELIMITER
        );
        for (name, segment) in descriptor.selector.iter().zip(marshalled.selector) {
            if !segment.is_empty() {
                object.insert(name.to_string(), Value::String(segment));
            }
        }
    }

    object
}
