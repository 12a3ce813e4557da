//! Shared building blocks for variant payloads

use crate::error::{Error, Result, ResultExt};
use k8s_openapi::api::core::v1 as api;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Enumerated Tokens
// =============================================================================

/// Declare a closed set of tokens with a wire spelling and a platform spelling.
///
/// Generates `as_wire`/`as_platform`, fallible `from_wire`/`from_platform`,
/// serde impls over the wire spelling, and `Display`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($wire:literal, $platform:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every token, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            const WIRE_TOKENS: &'static [&'static str] = &[$($wire),+];

            /// Shorthand spelling
            pub fn as_wire(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Platform spelling
            pub fn as_platform(&self) -> &'static str {
                match self {
                    $($name::$variant => $platform,)+
                }
            }

            /// Parse the shorthand spelling
            pub fn from_wire(token: &str) -> $crate::error::Result<Self> {
                match token {
                    $($wire => Ok($name::$variant),)+
                    _ => Err($crate::error::Error::schema(
                        token,
                        format!("expected one of: {}", Self::WIRE_TOKENS.join(", ")),
                    )),
                }
            }

            /// Parse the platform spelling
            pub fn from_platform(token: &str) -> $crate::error::Result<Self> {
                match token {
                    $($platform => Ok($name::$variant),)+
                    _ => Err($crate::error::Error::schema(
                        token,
                        format!("not a known {} value", stringify!($name)),
                    )),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let token = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                match token.as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(<D::Error as ::serde::de::Error>::custom(format!(
                        "expected one of: {}",
                        Self::WIRE_TOKENS.join(", ")
                    ))),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_wire())
            }
        }
    };
}

pub(crate) use wire_enum;

// =============================================================================
// File Mode
// =============================================================================

/// Permission bits of a projected file, written as an octal string (`"0644"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(i32);

impl FileMode {
    /// Highest mode the platform accepts
    pub const MAX: i32 = 0o777;

    pub fn new(bits: i32) -> Result<Self> {
        if (0..=Self::MAX).contains(&bits) {
            Ok(FileMode(bits))
        } else {
            Err(Error::schema(
                format!("{:o}", bits),
                "file mode must be between 0000 and 0777",
            ))
        }
    }

    pub fn bits(&self) -> i32 {
        self.0
    }

    /// Import an optional platform mode
    pub fn from_v1(bits: Option<i32>) -> Result<Option<Self>> {
        bits.map(FileMode::new).transpose().context("mode")
    }

    /// Export an optional mode
    pub fn to_v1(mode: Option<FileMode>) -> Option<i32> {
        mode.map(|m| m.0)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl Serialize for FileMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ModeVisitor;

        impl<'de> de::Visitor<'de> for ModeVisitor {
            type Value = FileMode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an octal file mode string or an integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<FileMode, E> {
                let bits = i32::from_str_radix(value, 8)
                    .map_err(|_| E::custom("file mode must be an octal number"))?;
                FileMode::new(bits).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<FileMode, E> {
                let bits = i32::try_from(value).map_err(|_| E::custom("file mode out of range"))?;
                FileMode::new(bits).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<FileMode, E> {
                let bits = i32::try_from(value).map_err(|_| E::custom("file mode out of range"))?;
                FileMode::new(bits).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ModeVisitor)
    }
}

// =============================================================================
// Key Projection
// =============================================================================

/// One key of a config map or secret projected to a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyPath {
    pub key: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FileMode>,
}

impl KeyPath {
    fn from_v1(item: &api::KeyToPath) -> Result<Self> {
        Ok(Self {
            key: item.key.clone(),
            path: item.path.clone(),
            mode: FileMode::from_v1(item.mode)?,
        })
    }

    fn to_v1(&self) -> api::KeyToPath {
        api::KeyToPath {
            key: self.key.clone(),
            path: self.path.clone(),
            mode: FileMode::to_v1(self.mode),
        }
    }
}

pub(crate) fn items_from_v1(items: &Option<Vec<api::KeyToPath>>) -> Result<Vec<KeyPath>> {
    items
        .iter()
        .flatten()
        .map(|item| KeyPath::from_v1(item).with_context(|| format!("item \"{}\"", item.key)))
        .collect()
}

pub(crate) fn items_to_v1(items: &[KeyPath]) -> Option<Vec<api::KeyToPath>> {
    if items.is_empty() {
        None
    } else {
        Some(items.iter().map(KeyPath::to_v1).collect())
    }
}

// =============================================================================
// Platform Helpers
// =============================================================================

/// Platform string with empty folded into absent
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

/// Absent for empty strings
pub(crate) fn some_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Platform `readOnly`, omitted unless set
pub(crate) fn read_only(flag: bool) -> Option<bool> {
    flag.then_some(true)
}

pub(crate) fn local_ref(name: &Option<String>) -> Option<api::LocalObjectReference> {
    name.as_ref().map(|name| api::LocalObjectReference {
        name: Some(name.clone()),
    })
}

pub(crate) fn ref_name(reference: &Option<api::LocalObjectReference>) -> Option<String> {
    reference.as_ref().and_then(|r| non_empty(&r.name))
}

pub(crate) fn list_from_v1(values: &Option<Vec<String>>) -> Vec<String> {
    values.clone().unwrap_or_default()
}

pub(crate) fn list_to_v1(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    wire_enum! {
        enum Shade {
            Light => ("light", "Light"),
            Dark => ("dark", "Dark"),
        }
    }

    #[test]
    fn test_wire_enum_tokens() {
        assert_eq!(Shade::from_wire("dark").unwrap(), Shade::Dark);
        assert_eq!(Shade::from_platform("Light").unwrap(), Shade::Light);
        assert_eq!(Shade::Dark.as_platform(), "Dark");
        assert_eq!(Shade::ALL.len(), 2);

        let err = Shade::from_wire("Dark").unwrap_err();
        assert_eq!(err.token(), Some("Dark"));
        assert_eq!(err.to_string(), "invalid value \"Dark\": expected one of: light, dark");
    }

    #[test]
    fn test_wire_enum_serde() {
        assert_eq!(serde_json::to_value(Shade::Light).unwrap(), json!("light"));
        assert_eq!(serde_json::from_value::<Shade>(json!("dark")).unwrap(), Shade::Dark);
        assert!(serde_json::from_value::<Shade>(json!("grey")).is_err());
    }

    #[test]
    fn test_file_mode_forms() {
        let mode: FileMode = serde_json::from_value(json!("0644")).unwrap();
        assert_eq!(mode.bits(), 0o644);
        assert_eq!(serde_json::to_value(mode).unwrap(), json!("0644"));

        let mode: FileMode = serde_json::from_value(json!(420)).unwrap();
        assert_eq!(mode.to_string(), "0644");

        assert!(serde_json::from_value::<FileMode>(json!("0999")).is_err());
        assert!(serde_json::from_value::<FileMode>(json!(4096)).is_err());
        assert!(FileMode::new(-1).is_err());
    }

    #[test]
    fn test_items_round_trip() {
        let items = vec![KeyPath {
            key: "app.conf".into(),
            path: "conf/app.conf".into(),
            mode: Some(FileMode::new(0o400).unwrap()),
        }];
        let platform = items_to_v1(&items);
        assert_eq!(items_from_v1(&platform).unwrap(), items);
        assert_eq!(items_to_v1(&[]), None);
    }

    #[test]
    fn test_platform_mode_out_of_range() {
        let platform = Some(vec![api::KeyToPath {
            key: "k".into(),
            path: "p".into(),
            mode: Some(0o1000),
        }]);
        let err = items_from_v1(&platform).unwrap_err();
        assert_eq!(err.path(), vec!["item \"k\"", "mode"]);
    }

    #[test]
    fn test_platform_helpers() {
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(some_text("ext4"), Some("ext4".to_string()));
        assert_eq!(read_only(false), None);
        assert_eq!(ref_name(&local_ref(&Some("creds".into()))), Some("creds".to_string()));
        assert_eq!(list_to_v1(&[]), None);
    }
}
