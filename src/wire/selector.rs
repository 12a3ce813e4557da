//! Selector Codec
//!
//! Compact `type:segment:segment` form. Segments bind positionally, left to
//! right, to the selector names the registry declares for the variant.
//! Missing trailing segments take the field's zero value; surplus segments
//! are a schema error.
//!
//! Encoding writes every declared segment up to the last non-zero one, with
//! interior zero values kept as empty segments, so `decode(encode(x)) == x`
//! holds whatever the position of the zero values.

use super::{WireFields, DELIMITER};
use crate::error::{Error, Result};
use crate::registry::VariantDescriptor;
use crate::volume::Volume;
use tracing::trace;

/// Split a compact string into its discriminator and segments.
///
/// Empty segments are kept: `nfs::/data` has an empty first segment.
pub fn split(raw: &str) -> (&str, Vec<String>) {
    let mut parts = raw.split(DELIMITER);
    let discriminator = parts.next().unwrap_or_default();
    (discriminator, parts.map(str::to_string).collect())
}

/// Split a bare segment list (the `vol_id` value of the object form)
pub fn split_segments(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(DELIMITER).map(str::to_string).collect()
}

/// Join a discriminator and its segments into the compact string
pub fn join(discriminator: &str, segments: &[String]) -> String {
    let mut out = String::from(discriminator);
    for segment in segments {
        out.push(DELIMITER);
        out.push_str(segment);
    }
    out
}

/// Join segments alone, as used under the `vol_id` key
pub fn join_segments(segments: &[String]) -> String {
    segments.join(&DELIMITER.to_string())
}

/// Bind segments to the descriptor's selector slots.
///
/// Returns one slot per declared segment; slots past the supplied segments
/// are `None` and later read as the zero value.
pub fn bind(descriptor: &VariantDescriptor, segments: Vec<String>) -> Result<Vec<Option<String>>> {
    let declared = descriptor.selector.len();
    if segments.len() > declared {
        return Err(Error::schema(
            join_segments(&segments),
            format!(
                "too many selector segments: volume type \"{}\" accepts {}, got {}",
                descriptor.discriminator,
                declared,
                segments.len()
            ),
        ));
    }

    let mut slots: Vec<Option<String>> = segments.into_iter().map(Some).collect();
    slots.resize(declared, None);
    Ok(slots)
}

/// Drop zero-valued segments from the tail
pub fn trim_trailing(mut segments: Vec<String>) -> Vec<String> {
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// Build a variant from positional segments
pub fn decode(descriptor: &VariantDescriptor, segments: Vec<String>) -> Result<Volume> {
    trace!(
        "Decoding {} from {} selector segments",
        descriptor.discriminator,
        segments.len()
    );
    let mut wire = WireFields::from_selector(descriptor, segments)?;
    Volume::unmarshal(&mut wire)
}

/// Positional segments of a variant, shortest form
pub fn encode(volume: &Volume) -> Result<Vec<String>> {
    Ok(trim_trailing(volume.marshal()?.selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::registry;
    use crate::volume::{GlusterfsVolume, NfsVolume};

    #[test]
    fn test_split_keeps_empty_segments() {
        let (discriminator, segments) = split("nfs::/data:");
        assert_eq!(discriminator, "nfs");
        assert_eq!(segments, vec!["", "/data", ""]);

        let (discriminator, segments) = split("pvc");
        assert_eq!(discriminator, "pvc");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_split_segments() {
        assert!(split_segments("").is_empty());
        assert_eq!(split_segments("a::b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_bind_pads_missing_segments() {
        let nfs = registry().lookup("nfs").unwrap();
        let slots = bind(nfs, vec!["srv".into()]).unwrap();
        assert_eq!(slots, vec![Some("srv".to_string()), None, None]);
    }

    #[test]
    fn test_bind_rejects_overflow() {
        let gluster = registry().lookup("glusterfs").unwrap();
        let err = bind(gluster, vec!["a".into(), "b".into(), "c".into()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.token(), Some("a:b:c"));
    }

    #[test]
    fn test_trim_trailing() {
        let segments = vec!["".to_string(), "x".into(), "".into(), "".into()];
        assert_eq!(trim_trailing(segments), vec!["", "x"]);
        assert!(trim_trailing(vec!["".into()]).is_empty());
    }

    #[test]
    fn test_decode_missing_trailing_fields_are_zero() {
        let nfs = registry().lookup("nfs").unwrap();
        let volume = decode(nfs, vec!["srv".into()]).unwrap();
        assert_eq!(
            volume,
            Volume::Nfs(NfsVolume {
                server: "srv".into(),
                path: String::new(),
                read_only: false,
            })
        );
    }

    #[test]
    fn test_encode_keeps_interior_zero() {
        let volume = Volume::Nfs(NfsVolume {
            server: String::new(),
            path: "/exports".into(),
            read_only: false,
        });
        assert_eq!(encode(&volume).unwrap(), vec!["", "/exports"]);

        let nfs = registry().lookup("nfs").unwrap();
        assert_eq!(decode(nfs, encode(&volume).unwrap()).unwrap(), volume);
    }

    #[test]
    fn test_encode_flag_segment() {
        let volume = Volume::Glusterfs(GlusterfsVolume {
            endpoints: "ep".into(),
            path: "vol".into(),
            read_only: true,
        });
        // read_only is a named field for glusterfs, not a segment
        assert_eq!(encode(&volume).unwrap(), vec!["ep", "vol"]);
    }
}
