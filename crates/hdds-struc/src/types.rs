// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire types and byte order.
//!
//! A [`Type`] names the binary representation of one field element. Most tags
//! have a fixed width; `size_t`, `off_t` and `ptr` only get one once they are
//! resolved against [`Options::ptr_size`].

use crate::options::Options;
use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use std::fmt;

/// Wire type of a field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Zero bytes on the wire, `len` of them.
    Pad,
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    /// Raw bytes, copied verbatim.
    String,
    /// Nested field sequence.
    Struct,
    /// Unsigned pointer-sized integer.
    Ptr,
    /// Unsigned pointer-sized integer.
    SizeT,
    /// Signed pointer-sized integer.
    OffT,
    /// Value-supplied codec.
    Custom,
    /// Not present on the wire.
    Ignore,
}

/// Native storage category of a value, independent of its wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Struct,
    Custom,
    /// Pad and Ignore carry no value.
    Void,
}

impl Type {
    /// Encoded width in bytes of one element.
    ///
    /// Struct, Custom and Ignore report 0; their size comes from elsewhere.
    /// Pointer-sized tags report the host pointer width until resolved.
    pub fn width(self) -> usize {
        match self {
            Self::Pad | Self::Bool | Self::Int8 | Self::Uint8 | Self::String => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
            Self::Ptr | Self::SizeT | Self::OffT => std::mem::size_of::<usize>(),
            Self::Struct | Self::Custom | Self::Ignore => 0,
        }
    }

    /// Apply configuration to get the type actually used on the wire.
    pub fn resolve(self, options: &Options) -> Type {
        match self {
            Self::Ptr | Self::SizeT => match options.ptr_size {
                8 => Self::Uint8,
                16 => Self::Uint16,
                64 => Self::Uint64,
                _ => Self::Uint32,
            },
            Self::OffT => match options.ptr_size {
                8 => Self::Int8,
                16 => Self::Int16,
                64 => Self::Int64,
                _ => Self::Int32,
            },
            other => other,
        }
    }

    /// Native category a value of this type is stored as.
    pub fn kind(self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::OffT => Kind::Int,
            Self::Uint8
            | Self::Uint16
            | Self::Uint32
            | Self::Uint64
            | Self::Ptr
            | Self::SizeT => Kind::Uint,
            Self::Float32 | Self::Float64 => Kind::Float,
            Self::String => Kind::String,
            Self::Struct => Kind::Struct,
            Self::Custom => Kind::Custom,
            Self::Pad | Self::Ignore => Kind::Void,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self.kind(), Kind::Bool | Kind::Int | Kind::Uint)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Look up a type by its tag name.
    pub fn from_name(name: &str) -> Option<Type> {
        let typ = match name {
            "pad" => Self::Pad,
            "bool" => Self::Bool,
            "byte" | "uint8" => Self::Uint8,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "size_t" => Self::SizeT,
            "off_t" => Self::OffT,
            "ptr" => Self::Ptr,
            _ => return None,
        };
        Some(typ)
    }

    /// Tag name of this type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Ptr => "ptr",
            Self::SizeT => "size_t",
            Self::OffT => "off_t",
            Self::Custom => "custom",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of multi-byte primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "yaml-options",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Endianness {
    #[default]
    Big,
    Little,
    /// Host byte order.
    Native,
}

macro_rules! order_rw {
    ($write:ident, $read:ident, $ty:ty) => {
        pub fn $write(self, buf: &mut [u8], n: $ty) {
            match self {
                Self::Big => BigEndian::$write(buf, n),
                Self::Little => LittleEndian::$write(buf, n),
                Self::Native => NativeEndian::$write(buf, n),
            }
        }

        pub fn $read(self, buf: &[u8]) -> $ty {
            match self {
                Self::Big => BigEndian::$read(buf),
                Self::Little => LittleEndian::$read(buf),
                Self::Native => NativeEndian::$read(buf),
            }
        }
    };
}

impl Endianness {
    order_rw!(write_u16, read_u16, u16);
    order_rw!(write_u32, read_u32, u32);
    order_rw!(write_u64, read_u64, u64);

    /// Parse a tag directive (`big`, `msb`, `little`, `lsb`, `native`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "big" | "msb" => Some(Self::Big),
            "little" | "lsb" => Some(Self::Little),
            "native" => Some(Self::Native),
            _ => None,
        }
    }
}
