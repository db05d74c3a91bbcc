// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for struct packing.

use std::io;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Packing, unpacking and schema errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A fixed-capacity slot is smaller than the length it must hold.
    #[error("array too small for field {field}: {capacity} < {length}")]
    SizeMismatch {
        field: String,
        capacity: usize,
        length: usize,
    },

    /// A runtime length whose byte count does not fit in `usize`.
    #[error("length {length} of field {field} overflows")]
    LengthOverflow { field: String, length: usize },

    #[error("type mismatch in field {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("invalid UTF-8 in field {field}: {source}")]
    Utf8 {
        field: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("invalid tag {tag:?}: {reason}")]
    Tag { tag: String, reason: String },

    #[error("invalid schema {schema}: {reason}")]
    Schema { schema: String, reason: String },

    #[error("invalid options: {0}")]
    Options(String),

    #[cfg(feature = "yaml-options")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error raised by a [`Custom`](crate::Custom) codec, passed through as-is.
    #[error("custom codec error: {0}")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error raised inside a custom codec.
    pub fn custom<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Custom(err.into())
    }

    pub(crate) fn type_mismatch(
        field: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn schema(schema: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn tag(tag: &str, reason: impl Into<String>) -> Self {
        Self::Tag {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fail with [`Error::BufferTooSmall`] unless `buf` holds at least `need` bytes.
pub(crate) fn ensure_len(buf: &[u8], need: usize) -> Result<()> {
    if buf.len() < need {
        return Err(Error::BufferTooSmall {
            need,
            have: buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::SizeMismatch {
            field: "samples".into(),
            capacity: 4,
            length: 8,
        };
        assert_eq!(err.to_string(), "array too small for field samples: 4 < 8");

        let err = Error::type_mismatch("count", "int", "float64");
        assert_eq!(
            err.to_string(),
            "type mismatch in field count: expected int, found float64"
        );
    }

    #[test]
    fn test_length_overflow_message() {
        let err = Error::LengthOverflow {
            field: "data".into(),
            length: 7,
        };
        assert_eq!(err.to_string(), "length 7 of field data overflows");
    }

    #[test]
    fn test_custom_passthrough() {
        let err = Error::custom("checksum failed");
        assert_eq!(err.to_string(), "custom codec error: checksum failed");
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len(&[0u8; 4], 4).is_ok());
        match ensure_len(&[0u8; 2], 4) {
            Err(Error::BufferTooSmall { need, have }) => {
                assert_eq!(need, 4);
                assert_eq!(have, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
