// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mapping between Rust field types and their default wire layout.

use crate::types::Type;
use crate::value::Value;

/// Container shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// One element.
    Scalar,
    /// Fixed capacity, e.g. `[T; N]`.
    Array(usize),
    /// Growable, e.g. `Vec<T>`.
    Slice,
}

/// A Rust type that can sit in a record field.
///
/// `ELEMENT` is the wire type used when the field's tag does not name one.
pub trait Native: Sized {
    const ELEMENT: Type;
    const SHAPE: Shape;
    /// Pointer-indirected: an absent value packs as zero.
    const INDIRECT: bool = false;

    fn to_value(&self) -> Value;

    /// Convert back from a decoded value, `None` on a kind mismatch.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! native_int {
    ($($ty:ty => $wire:ident, $variant:ident as $cast:ty);* $(;)?) => {$(
        impl Native for $ty {
            const ELEMENT: Type = Type::$wire;
            const SHAPE: Shape = Shape::Scalar;

            fn to_value(&self) -> Value {
                Value::$variant(*self as $cast)
            }

            fn from_value(value: Value) -> Option<Self> {
                value.to_bits().map(|bits| bits as $ty)
            }
        }
    )*};
}

native_int! {
    i8 => Int8, Int as i64;
    i16 => Int16, Int as i64;
    i32 => Int32, Int as i64;
    i64 => Int64, Int as i64;
    isize => OffT, Int as i64;
    u8 => Uint8, Uint as u64;
    u16 => Uint16, Uint as u64;
    u32 => Uint32, Uint as u64;
    u64 => Uint64, Uint as u64;
    usize => SizeT, Uint as u64;
}

impl Native for f32 {
    const ELEMENT: Type = Type::Float32;
    const SHAPE: Shape = Shape::Scalar;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.to_f64().map(|v| v as f32)
    }
}

impl Native for f64 {
    const ELEMENT: Type = Type::Float64;
    const SHAPE: Shape = Shape::Scalar;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.to_f64()
    }
}

impl Native for bool {
    const ELEMENT: Type = Type::Bool;
    const SHAPE: Shape = Shape::Scalar;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.to_bits().map(|bits| bits != 0)
    }
}

impl Native for String {
    const ELEMENT: Type = Type::String;
    const SHAPE: Shape = Shape::Scalar;

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            Value::Bytes(b) => String::from_utf8(b).ok(),
            Value::Null => Some(String::new()),
            _ => None,
        }
    }
}

impl Native for Vec<u8> {
    const ELEMENT: Type = Type::Uint8;
    const SHAPE: Shape = Shape::Slice;

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b),
            Value::Str(s) => Some(s.into_bytes()),
            Value::List(items) => items
                .iter()
                .map(|item| item.to_bits().map(|bits| bits as u8))
                .collect(),
            Value::Null => Some(Vec::new()),
            _ => None,
        }
    }
}

impl<const N: usize> Native for [u8; N] {
    const ELEMENT: Type = Type::Uint8;
    const SHAPE: Shape = Shape::Array(N);

    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }

    fn from_value(value: Value) -> Option<Self> {
        Vec::<u8>::from_value(value)?.try_into().ok()
    }
}

// Fixed arrays of strings; the slot width comes from the field's tag.
impl<const N: usize> Native for [String; N] {
    const ELEMENT: Type = Type::String;
    const SHAPE: Shape = Shape::Array(N);

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Native::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(String::from_value)
                .collect::<Option<Vec<_>>>()?
                .try_into()
                .ok(),
            _ => None,
        }
    }
}

macro_rules! native_list {
    ($($ty:ty),* $(,)?) => {$(
        impl Native for Vec<$ty> {
            const ELEMENT: Type = <$ty as Native>::ELEMENT;
            const SHAPE: Shape = Shape::Slice;

            fn to_value(&self) -> Value {
                Value::List(self.iter().map(Native::to_value).collect())
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::List(items) => items.into_iter().map(<$ty>::from_value).collect(),
                    Value::Null => Some(Vec::new()),
                    _ => None,
                }
            }
        }

        impl<const N: usize> Native for [$ty; N] {
            const ELEMENT: Type = <$ty as Native>::ELEMENT;
            const SHAPE: Shape = Shape::Array(N);

            fn to_value(&self) -> Value {
                Value::List(self.iter().map(Native::to_value).collect())
            }

            fn from_value(value: Value) -> Option<Self> {
                Vec::<$ty>::from_value(value)?.try_into().ok()
            }
        }
    )*};
}

native_list!(i8, i16, i32, i64, isize, u16, u32, u64, usize, f32, f64, bool);

impl<T: Native> Native for Option<T> {
    const ELEMENT: Type = T::ELEMENT;
    const SHAPE: Shape = T::SHAPE;
    const INDIRECT: bool = true;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Native::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_value(value).map(Some)
    }
}

impl<T: Native> Native for Box<T> {
    const ELEMENT: Type = T::ELEMENT;
    const SHAPE: Shape = T::SHAPE;
    const INDIRECT: bool = T::INDIRECT;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Box::new)
    }
}
