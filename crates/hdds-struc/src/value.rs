// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic field values.
//!
//! A record instance is handled by the engine as a positional table of
//! [`Value`]s, one slot per field of its [`FieldSequence`](crate::FieldSequence).

use crate::custom::{self, Custom};
use crate::options::Options;

/// A dynamic value for one field slot.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value; packs as the field's zero value.
    Null,
    Bool(bool),
    /// Any signed integer.
    Int(i64),
    /// Any unsigned integer.
    Uint(u64),
    /// Any float, widened.
    Float(f64),
    Str(String),
    /// Raw byte storage (`Vec<u8>`, `[u8; N]`).
    Bytes(Vec<u8>),
    /// Array or slice elements.
    List(Vec<Value>),
    /// Nested record, positional.
    Struct(Vec<Value>),
    Custom(Box<dyn Custom>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime length: bytes for strings and byte storage, elements for lists.
    pub fn len(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::Str(s) => s.len(),
            Self::Bytes(b) => b.len(),
            Self::List(items) => items.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Struct(_) => "struct",
            Self::Custom(_) => "custom",
        }
    }

    /// Integer bit pattern of a scalar (bools are 0/1, floats truncate).
    pub fn to_bits(&self) -> Option<u64> {
        match self {
            Self::Null => Some(0),
            Self::Bool(b) => Some(u64::from(*b)),
            Self::Int(i) => Some(*i as u64),
            Self::Uint(u) => Some(*u),
            Self::Float(f) => Some(*f as i64 as u64),
            _ => None,
        }
    }

    /// Numeric value of a scalar as a float.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Null => Some(0.0),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Uint(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Value of an integer slot used as a length. Negative lengths read as 0.
    pub fn as_length(&self) -> Option<usize> {
        match self {
            Self::Int(i) => Some(usize::try_from(*i).unwrap_or(0)),
            Self::Uint(u) => Some(usize::try_from(*u).unwrap_or(usize::MAX)),
            Self::Bool(b) => Some(usize::from(*b)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of string or byte storage.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(s) => Some(s.as_bytes()),
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Value]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&dyn Custom> {
        match self {
            Self::Custom(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    /// Element `index` of a list or byte storage.
    pub fn element(&self, index: usize) -> Option<Value> {
        match self {
            Self::List(items) => items.get(index).cloned(),
            Self::Bytes(b) => b.get(index).map(|byte| Self::Uint(u64::from(*byte))),
            _ => None,
        }
    }

    /// Overwrite element `index` of a list or byte storage. Out of range is a no-op.
    pub(crate) fn set_element(&mut self, index: usize, value: Value) {
        match self {
            Self::List(items) => {
                if let Some(slot) = items.get_mut(index) {
                    *slot = value;
                }
            }
            Self::Bytes(b) => {
                if let (Some(slot), Some(bits)) = (b.get_mut(index), value.to_bits()) {
                    *slot = bits as u8;
                }
            }
            _ => {}
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Struct(a), Self::Struct(b)) => a == b,
            // Custom values are equal when they encode identically
            (Self::Custom(a), Self::Custom(b)) => {
                let opts = Options::default();
                match (
                    custom::encoded(a.as_ref(), &opts),
                    custom::encoded(b.as_ref(), &opts),
                ) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

// Conversion traits
macro_rules! value_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v as $cast)
            }
        }
    )*};
}

value_from!(
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}
