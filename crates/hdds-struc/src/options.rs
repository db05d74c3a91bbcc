// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide packing options.
//!
//! # Example YAML
//!
//! ```yaml
//! # struc.yaml
//! order: little
//! byte_align: 4
//! ptr_size: 64
//! ```

use crate::error::{Error, Result};
use crate::types::Endianness;

/// Pointer width assumed when `ptr_size` is left at 0.
pub const DEFAULT_PTR_SIZE: usize = 32;

/// Options applied to every field of a pack/unpack call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "yaml-options",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Options {
    /// Minimum encoded size of each field, 0 to disable.
    pub byte_align: usize,
    /// Bit width of `size_t`/`off_t`/`ptr` (8, 16, 32 or 64).
    pub ptr_size: usize,
    /// Forced byte order; wins over any field-level order.
    pub order: Option<Endianness>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            byte_align: 0,
            ptr_size: DEFAULT_PTR_SIZE,
            order: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: Endianness) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_byte_align(mut self, byte_align: usize) -> Self {
        self.byte_align = byte_align;
        self
    }

    pub fn with_ptr_size(mut self, ptr_size: usize) -> Self {
        self.ptr_size = ptr_size;
        self
    }

    /// Check that the options describe a usable configuration.
    pub fn validate(&self) -> Result<()> {
        match self.ptr_size {
            0 | 8 | 16 | 32 | 64 => Ok(()),
            other => Err(Error::Options(format!(
                "ptr_size {} must be one of 8, 16, 32, 64",
                other
            ))),
        }
    }

    /// Round `size` up to the configured minimum field size.
    pub(crate) fn aligned(&self, size: usize) -> usize {
        size.max(self.byte_align)
    }

    /// Parse options from a YAML document and validate them.
    #[cfg(feature = "yaml-options")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Options = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file.
    #[cfg(feature = "yaml-options")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let options = Self::from_yaml_str(&yaml)?;
        log::debug!("[struc] loaded options from {}: {:?}", path.display(), options);
        Ok(options)
    }
}
