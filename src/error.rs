//! Error types for volume conversion
//!
//! Every failure carries a kind from a fixed taxonomy, the offending token or
//! field name, and the chain of contexts it was wrapped in on the way out
//! (e.g. `volume "data": selector: too many selector segments`).

use std::fmt;
use thiserror::Error;

/// Unified error type for wire decoding, encoding and platform conversion
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Wire Errors
    // =========================================================================
    #[error("malformed input {input}: {reason}")]
    MalformedInput { input: String, reason: String },

    #[error("missing discriminator key \"{key}\"")]
    MissingDiscriminator { key: String },

    #[error("unsupported volume type \"{discriminator}\": {reason}")]
    UnsupportedVariant {
        discriminator: String,
        reason: String,
    },

    #[error("volume type \"{discriminator}\" has no {form} form")]
    FormMismatch {
        discriminator: String,
        form: WireForm,
    },

    #[error("invalid value \"{token}\": {reason}")]
    Schema { token: String, reason: String },

    #[error("unknown fields for volume type \"{discriminator}\": {}", .fields.join(", "))]
    UnknownField {
        discriminator: String,
        fields: Vec<String>,
    },

    // =========================================================================
    // Platform Errors
    // =========================================================================
    #[error("unsupported api version \"{version}\" for {resource}")]
    UnsupportedVersion { resource: String, version: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },

    // =========================================================================
    // Edge Errors (CLI input/output)
    // =========================================================================
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which of the two wire forms a value uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireForm {
    /// Compact `type:segment:segment` string
    Selector,
    /// Dictionary with a `vol_type` key
    Object,
}

impl fmt::Display for WireForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireForm::Selector => write!(f, "string"),
            WireForm::Object => write!(f, "object"),
        }
    }
}

/// Failure taxonomy, independent of the context an error was wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    MissingDiscriminator,
    UnsupportedVariant,
    FormMismatch,
    Schema,
    UnknownField,
    UnsupportedVersion,
    InvariantViolation,
    Io,
}

impl Error {
    /// Build a schema error for an offending token
    pub fn schema(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Schema {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Build an unsupported-variant error for a discriminator
    pub fn unsupported_variant(discriminator: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedVariant {
            discriminator: discriminator.into(),
            reason: reason.into(),
        }
    }

    /// Wrap this error with one more level of context
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every context layer stripped
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Contexts from outermost to innermost
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Context { context, source } = current {
            path.push(context.as_str());
            current = source;
        }
        path
    }

    /// Taxonomy kind of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedInput { .. } | Error::Json(_) | Error::Yaml(_) => ErrorKind::MalformedInput,
            Error::MissingDiscriminator { .. } => ErrorKind::MissingDiscriminator,
            Error::UnsupportedVariant { .. } => ErrorKind::UnsupportedVariant,
            Error::FormMismatch { .. } => ErrorKind::FormMismatch,
            Error::Schema { .. } => ErrorKind::Schema,
            Error::UnknownField { .. } => ErrorKind::UnknownField,
            Error::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Error::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Error::Io(_) => ErrorKind::Io,
            Error::Context { source, .. } => source.kind(),
        }
    }

    /// The raw token or field name that caused the failure, if there is one
    pub fn token(&self) -> Option<&str> {
        match self.root() {
            Error::MalformedInput { input, .. } => Some(input),
            Error::MissingDiscriminator { key } => Some(key),
            Error::UnsupportedVariant { discriminator, .. }
            | Error::FormMismatch { discriminator, .. } => Some(discriminator),
            Error::Schema { token, .. } => Some(token),
            Error::UnknownField { fields, .. } => fields.first().map(String::as_str),
            Error::UnsupportedVersion { version, .. } => Some(version),
            _ => None,
        }
    }

    /// Check if this error points at a bug rather than at bad input
    pub fn is_defect(&self) -> bool {
        self.kind() == ErrorKind::InvariantViolation
    }
}

/// Result type alias for conversions
pub type Result<T> = std::result::Result<T, Error>;

/// Attach context to the error side of a [`Result`]
pub trait ResultExt<T> {
    /// Wrap any error with a fixed context label
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Wrap any error with a lazily built context label
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain() {
        let err = Error::schema("a:b:c", "too many selector segments")
            .context("selector")
            .context("volume \"data\"");

        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.token(), Some("a:b:c"));
        assert_eq!(err.path(), vec!["volume \"data\"", "selector"]);
        assert_eq!(
            err.to_string(),
            "volume \"data\": selector: invalid value \"a:b:c\": too many selector segments"
        );
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::MissingDiscriminator {
            key: "vol_type".into(),
        });
        let err = result.with_context(|| format!("volume {}", 3)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingDiscriminator);
        assert_eq!(err.path(), vec!["volume 3"]);
    }

    #[test]
    fn test_defect_classification() {
        assert!(Error::InvariantViolation("two sources".into()).is_defect());
        assert!(!Error::unsupported_variant("bogus", "not registered").is_defect());
    }

    #[test]
    fn test_unknown_field_display() {
        let err = Error::UnknownField {
            discriminator: "nfs".into(),
            fields: vec!["foo".into(), "bar".into()],
        };
        assert_eq!(err.to_string(), "unknown fields for volume type \"nfs\": foo, bar");
        assert_eq!(err.token(), Some("foo"));
    }
}
