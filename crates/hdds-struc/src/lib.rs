// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS Struct Packing
//!
//! Converts records to a dense, schema-fixed binary layout and back. Each
//! field is described by a short tag directive:
//! - explicit byte order per field or for the whole call
//! - fixed-width strings, arrays and padding
//! - variable-length fields sized by a sibling (`sizeof=` / `sizefrom=`)
//! - nested records and value-supplied codecs ([`Custom`])
//!
//! # Quick Start
//!
//! ```
//! use hdds_struc::{Layout, Options};
//!
//! #[derive(Default)]
//! struct Login {
//!     name_len: u8,
//!     name: String,
//!     uid: u32,
//! }
//!
//! let layout = Layout::<Login>::builder("Login")
//!     .field("name_len", "sizeof=name", |l: &Login| &l.name_len, |l| &mut l.name_len)
//!     .field("name", "", |l: &Login| &l.name, |l| &mut l.name)
//!     .field("uid", "little", |l: &Login| &l.uid, |l| &mut l.uid)
//!     .build()
//!     .unwrap();
//!
//! let login = Login { name_len: 0, name: "root".into(), uid: 1000 };
//! let mut wire = Vec::new();
//! hdds_struc::pack(&mut wire, &layout, &login).unwrap();
//! assert_eq!(wire, b"\x04root\xe8\x03\x00\x00");
//!
//! let mut back = Login::default();
//! hdds_struc::unpack(&mut wire.as_slice(), &layout, &mut back).unwrap();
//! assert_eq!(back.name, "root");
//! assert_eq!(back.name_len, 4);
//! ```
//!
//! # Wire Types
//!
//! | Tag | Width |
//! |-----|-------|
//! | `bool`, `int8`, `uint8`/`byte` | 1 |
//! | `int16`, `uint16` | 2 |
//! | `int32`, `uint32`, `float32` | 4 |
//! | `int64`, `uint64`, `float64` | 8 |
//! | `size_t`, `off_t`, `ptr` | `ptr_size / 8` |
//! | `string`, `pad` | 1 per unit |

pub mod custom;
pub mod error;
pub mod field;
pub mod fields;
pub mod layout;
pub mod native;
pub mod options;
pub mod tag;
pub mod types;
pub mod value;

pub use custom::{Custom, Float16};
pub use error::{Error, Result};
pub use field::{Codec, CustomFactory, Field, FieldClass};
pub use fields::{FieldSequence, FieldSequenceBuilder};
pub use layout::{Layout, LayoutBuilder};
pub use native::{Native, Shape};
pub use options::Options;
pub use tag::Tag;
pub use types::{Endianness, Kind, Type};
pub use value::Value;

use std::io::{Read, Write};

/// Pack `record` with default options.
pub fn pack<W: Write + ?Sized, T>(w: &mut W, layout: &Layout<T>, record: &T) -> Result<()> {
    pack_with_options(w, layout, record, &Options::default())
}

/// Pack `record` into a buffer of exactly its encoded size and write it out.
pub fn pack_with_options<W: Write + ?Sized, T>(
    w: &mut W,
    layout: &Layout<T>,
    record: &T,
    options: &Options,
) -> Result<()> {
    options.validate()?;
    let buf = layout.pack_to_vec(record, options)?;
    log::trace!("[struc] packed {} ({} bytes)", layout.name(), buf.len());
    w.write_all(&buf)?;
    Ok(())
}

/// Unpack into `record` with default options.
pub fn unpack<R: Read + ?Sized, T>(r: &mut R, layout: &Layout<T>, record: &mut T) -> Result<()> {
    unpack_with_options(r, layout, record, &Options::default())
}

/// Read one record from `r`, field by field, and store it into `record`.
pub fn unpack_with_options<R: Read + ?Sized, T>(
    r: &mut R,
    layout: &Layout<T>,
    record: &mut T,
    options: &Options,
) -> Result<()> {
    options.validate()?;
    layout.unpack(r, record, options)?;
    log::trace!("[struc] unpacked {}", layout.name());
    Ok(())
}

/// Encoded size of `record` with default options.
pub fn sizeof<T>(layout: &Layout<T>, record: &T) -> Result<usize> {
    sizeof_with_options(layout, record, &Options::default())
}

/// Number of bytes [`pack_with_options`] writes for `record`.
pub fn sizeof_with_options<T>(layout: &Layout<T>, record: &T, options: &Options) -> Result<usize> {
    options.validate()?;
    Ok(layout.size_of(record, options))
}
