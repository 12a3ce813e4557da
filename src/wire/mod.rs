//! Wire Layer - Dispatch between the two shorthand forms
//!
//! A volume on the wire is either a compact string or a dictionary:
//!
//! ```text
//!   "nfs:files.local:/exports"             string form
//!   {"vol_type": "nfs",                    object form
//!    "vol_id": "files.local:/exports"}
//!   {"vol_type": "empty_dir",              object-only variant
//!    "medium": "memory"}
//! ```
//!
//! Decoding picks the form from the JSON value's shape; encoding writes the
//! string form whenever the variant has one and carries no named fields.

pub mod object;
pub mod selector;

mod marshalled;

pub use marshalled::MarshalledVolume;
pub use object::WireFields;

use crate::error::{Error, Result};
use crate::registry::registry;
use crate::volume::Volume;
use serde_json::{Map, Value};
use tracing::debug;

/// Separator between discriminator and selector segments
pub const DELIMITER: char = ':';

/// Reserved object key holding the discriminator
pub const DISCRIMINATOR_KEY: &str = "vol_type";

/// Reserved object key holding colon-delimited selector segments
pub const SELECTOR_KEY: &str = "vol_id";

// =============================================================================
// Decode
// =============================================================================

/// Decode a wire value of either form
pub fn decode(value: &Value) -> Result<Volume> {
    match value {
        Value::String(raw) => decode_selector(raw),
        Value::Object(map) => decode_object(map.clone()),
        other => Err(Error::MalformedInput {
            input: other.to_string(),
            reason: "expected either string or dictionary".to_string(),
        }),
    }
}

/// Decode JSON text holding a single wire value
pub fn decode_json(text: &str) -> Result<Volume> {
    let value: Value = serde_json::from_str(text)?;
    decode(&value)
}

/// Decode the compact string form
pub fn decode_selector(raw: &str) -> Result<Volume> {
    let (discriminator, segments) = selector::split(raw);
    let descriptor = registry().lookup(discriminator)?;
    debug!(
        "Dispatching {} to selector codec ({} segments)",
        discriminator,
        segments.len()
    );
    selector::decode(descriptor, segments)
}

/// Decode the dictionary form
pub fn decode_object(mut map: Map<String, Value>) -> Result<Volume> {
    let discriminator = match map.remove(DISCRIMINATOR_KEY) {
        Some(Value::String(discriminator)) => discriminator,
        Some(other) => {
            return Err(Error::schema(other.to_string(), "expected a string").context(DISCRIMINATOR_KEY));
        }
        None => {
            return Err(Error::MissingDiscriminator {
                key: DISCRIMINATOR_KEY.to_string(),
            });
        }
    };
    let descriptor = registry().lookup(&discriminator)?;

    let segments = match map.remove(SELECTOR_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(raw)) => selector::split_segments(&raw),
        Some(other) => {
            return Err(Error::schema(other.to_string(), "expected a string").context(SELECTOR_KEY));
        }
    };

    debug!(
        "Dispatching {} to object codec ({} segments, {} keys)",
        discriminator,
        segments.len(),
        map.len()
    );
    let mut wire = WireFields::from_object(descriptor, segments, map)?;
    Volume::unmarshal(&mut wire)
}

// =============================================================================
// Encode
// =============================================================================

/// Encode a volume, choosing the shortest faithful form
pub fn encode(volume: &Volume) -> Result<Value> {
    Ok(render(volume.marshal()?))
}

/// Pick a form for a marshalled variant.
///
/// The string form is used only when there are no named fields, the variant
/// has selector segments, and none of them contains the delimiter.
pub fn render(marshalled: MarshalledVolume) -> Value {
    let descriptor = marshalled.kind.descriptor();
    if marshalled.extra_fields.is_empty()
        && descriptor.has_selector_form()
        && marshalled.is_positional()
    {
        let segments = selector::trim_trailing(marshalled.selector);
        return Value::String(selector::join(descriptor.discriminator, &segments));
    }

    Value::Object(object::encode(marshalled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::volume::{EmptyDirVolume, NfsVolume, PvcVolume};
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_decode_string_form() {
        let volume = decode(&json!("nfs:files.local:/exports:ro")).unwrap();
        assert_eq!(
            volume,
            Volume::Nfs(NfsVolume {
                server: "files.local".into(),
                path: "/exports".into(),
                read_only: true,
            })
        );
    }

    #[test]
    fn test_decode_hybrid_object_form() {
        let volume = decode(&json!({"vol_type": "nfs", "vol_id": "files.local", "path": "/exports"})).unwrap();
        assert_eq!(
            volume,
            Volume::Nfs(NfsVolume {
                server: "files.local".into(),
                path: "/exports".into(),
                read_only: false,
            })
        );
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        for value in [json!(3), json!(["nfs"]), json!(null), json!(true)] {
            let err = decode(&value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedInput);
        }
    }

    #[test]
    fn test_missing_discriminator() {
        let err = decode(&json!({"foo": "bar"})).unwrap_err();
        assert_matches!(err, Error::MissingDiscriminator { ref key } if key == "vol_type");
    }

    #[test]
    fn test_unknown_discriminator() {
        for value in [json!("bogus:a:b"), json!({"vol_type": "bogus"})] {
            let err = decode(&value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
            assert_eq!(err.token(), Some("bogus"));
        }
    }

    #[test]
    fn test_object_only_variant_in_string_form() {
        let err = decode(&json!("empty_dir")).unwrap_err();
        assert_matches!(err, Error::FormMismatch { ref discriminator, .. } if discriminator == "empty_dir");
    }

    #[test]
    fn test_non_string_reserved_keys() {
        let err = decode(&json!({"vol_type": 7})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.path(), vec!["vol_type"]);

        let err = decode(&json!({"vol_type": "pvc", "vol_id": ["a"]})).unwrap_err();
        assert_eq!(err.path(), vec!["vol_id"]);
    }

    #[test]
    fn test_encode_picks_string_form() {
        let volume = Volume::Pvc(PvcVolume {
            claim: "data".into(),
            read_only: true,
        });
        assert_eq!(encode(&volume).unwrap(), json!("pvc:data:ro"));
    }

    #[test]
    fn test_encode_object_only_variant() {
        let encoded = encode(&Volume::EmptyDir(EmptyDirVolume::default())).unwrap();
        assert_eq!(encoded, json!({"vol_type": "empty_dir"}));
        assert_eq!(decode(&encoded).unwrap(), Volume::default());
    }

    #[test]
    fn test_decode_json_text() {
        assert_eq!(decode_json("\"pvc:data\"").unwrap().kind().discriminator(), "pvc");
        assert_eq!(decode_json("{").unwrap_err().kind(), ErrorKind::MalformedInput);
    }
}
