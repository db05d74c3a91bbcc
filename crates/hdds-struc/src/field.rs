// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field descriptors: size, pack and unpack for one schema slot.
//!
//! Every field falls in exactly one [`FieldClass`], decided by its wire type
//! first and its container shape second. The class picks the code path in
//! [`Field::size`], [`Field::pack`] and [`Field::unpack`].
//!
//! `length` arguments are the effective length resolved by the owning
//! [`FieldSequence`]: the `sizefrom` source value when linked, else the
//! declared length, else the runtime length of the value.

use crate::custom::Custom;
use crate::error::{ensure_len, Error, Result};
use crate::fields::FieldSequence;
use crate::native::{Native, Shape};
use crate::options::Options;
use crate::tag::Tag;
use crate::types::{Endianness, Kind, Type};
use crate::value::Value;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

/// Produces a fresh destination value for a custom-coded field.
pub type CustomFactory = Arc<dyn Fn() -> Box<dyn Custom> + Send + Sync>;

/// How a field's elements are encoded, resolved once when the schema is built.
#[derive(Clone)]
pub enum Codec {
    Primitive,
    Struct(Arc<FieldSequence>),
    Custom(CustomFactory),
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive => f.write_str("Primitive"),
            Self::Struct(seq) => f.debug_tuple("Struct").field(&seq.name()).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Mutually exclusive classification of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldClass {
    Pad,
    Ignore,
    Custom,
    Struct,
    Scalar,
    Array,
    Slice,
}

/// One schema entry.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    /// Declared wire type.
    pub(crate) wire: Type,
    /// Native element type; the wire type used when no tag overrides it.
    pub(crate) native: Type,
    pub(crate) shape: Shape,
    /// Declared length, 0 for the runtime length.
    pub(crate) len: usize,
    pub(crate) order: Option<Endianness>,
    pub(crate) indirect: bool,
    /// Index of the field whose length this one publishes.
    pub(crate) sizeof: Option<usize>,
    /// Index of the field this one takes its length from.
    pub(crate) sizefrom: Option<usize>,
    pub(crate) sizeof_name: Option<String>,
    pub(crate) sizefrom_name: Option<String>,
    pub(crate) codec: Codec,
}

impl Field {
    /// Scalar field stored as `native` and encoded as the same type.
    pub fn new(name: impl Into<String>, native: Type) -> Self {
        Self {
            name: name.into(),
            wire: native,
            native,
            shape: Shape::Scalar,
            len: 0,
            order: None,
            indirect: false,
            sizeof: None,
            sizefrom: None,
            sizeof_name: None,
            sizefrom_name: None,
            codec: Codec::Primitive,
        }
    }

    /// Fixed array of `len` elements.
    pub fn array(name: impl Into<String>, native: Type, len: usize) -> Self {
        let mut field = Self::new(name, native);
        field.shape = Shape::Array(len);
        field.len = len;
        field
    }

    /// Growable slice; its length comes from the value or a `sizefrom` link.
    pub fn slice(name: impl Into<String>, native: Type) -> Self {
        let mut field = Self::new(name, native);
        field.shape = Shape::Slice;
        field
    }

    /// `count` strings packed as a flat block of `slot_width`-byte slots.
    pub fn string_array(name: impl Into<String>, count: usize, slot_width: usize) -> Self {
        let mut field = Self::new(name, Type::String);
        field.wire = Type::Uint8;
        field.shape = Shape::Array(count);
        field.len = count * slot_width;
        field
    }

    /// `len` zero bytes.
    pub fn pad(len: usize) -> Self {
        let mut field = Self::new("_", Type::Pad);
        field.len = len;
        field
    }

    /// A slot that takes no space on the wire.
    pub fn ignore(name: impl Into<String>) -> Self {
        Self::new(name, Type::Ignore)
    }

    /// Nested record described by `sequence`.
    pub fn nested(name: impl Into<String>, sequence: Arc<FieldSequence>) -> Self {
        let mut field = Self::new(name, Type::Struct);
        field.codec = Codec::Struct(sequence);
        field
    }

    /// Field whose value encodes itself.
    pub fn custom(name: impl Into<String>, factory: CustomFactory) -> Self {
        let mut field = Self::new(name, Type::Custom);
        field.codec = Codec::Custom(factory);
        field
    }

    /// Field with the default layout of the Rust type `V`.
    pub fn for_native<V: Native>(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, V::ELEMENT);
        field.shape = V::SHAPE;
        field.indirect = V::INDIRECT;
        // String arrays get their total length from the slot width tag
        if let Shape::Array(n) = V::SHAPE {
            if V::ELEMENT != Type::String {
                field.len = n;
            }
        }
        field
    }

    pub fn with_wire(mut self, wire: Type) -> Self {
        self.wire = wire;
        self
    }

    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    pub fn with_order(mut self, order: Endianness) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        if let Shape::Array(n) = shape {
            if self.len == 0 && self.native != Type::String {
                self.len = n;
            }
        }
        self
    }

    /// Publish the runtime length of the field named `target`.
    pub fn sizeof(mut self, target: impl Into<String>) -> Self {
        self.sizeof_name = Some(target.into());
        self
    }

    /// Take the runtime length from the field named `source`.
    pub fn sizefrom(mut self, source: impl Into<String>) -> Self {
        self.sizefrom_name = Some(source.into());
        self
    }

    /// Mark the field as pointer-indirected.
    pub fn indirect(mut self) -> Self {
        self.indirect = true;
        self
    }

    /// Apply a tag directive string such as `"[8]byte,little"`.
    pub fn with_tag(mut self, tag: &str) -> Result<Self> {
        let tag: Tag = tag.parse()?;
        self.apply_tag(&tag);
        Ok(self)
    }

    pub(crate) fn apply_tag(&mut self, tag: &Tag) {
        if tag.skip {
            self.wire = Type::Ignore;
            return;
        }
        if let Some(wire) = tag.wire {
            self.wire = wire;
        }
        if let Some(n) = tag.len {
            self.len = match self.shape {
                Shape::Array(count) if self.native == Type::String => count * n,
                _ => n,
            };
        }
        if tag.slice {
            self.len = 0;
        }
        if tag.order.is_some() {
            self.order = tag.order;
        }
        if let Some(target) = &tag.sizeof {
            self.sizeof_name = Some(target.clone());
        }
        if let Some(source) = &tag.sizefrom {
            self.sizefrom_name = Some(source.clone());
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire(&self) -> Type {
        self.wire
    }

    pub fn native(&self) -> Type {
        self.native
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn order(&self) -> Option<Endianness> {
        self.order
    }

    pub fn is_indirect(&self) -> bool {
        self.indirect
    }

    pub fn sizeof_index(&self) -> Option<usize> {
        self.sizeof
    }

    pub fn sizefrom_index(&self) -> Option<usize> {
        self.sizefrom
    }

    pub fn nested_sequence(&self) -> Option<&Arc<FieldSequence>> {
        match &self.codec {
            Codec::Struct(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn class(&self) -> FieldClass {
        match self.wire {
            Type::Pad => FieldClass::Pad,
            Type::Ignore => FieldClass::Ignore,
            Type::Custom => FieldClass::Custom,
            Type::Struct => FieldClass::Struct,
            _ => match self.shape {
                Shape::Scalar => FieldClass::Scalar,
                Shape::Array(_) => FieldClass::Array,
                Shape::Slice => FieldClass::Slice,
            },
        }
    }

    /// Configuration order, else the field's own, else big-endian.
    pub fn byte_order(&self, options: &Options) -> Endianness {
        options.order.or(self.order).unwrap_or_default()
    }

    fn is_string_scalar(&self) -> bool {
        self.native == Type::String && self.shape == Shape::Scalar
    }

    fn is_string_array(&self) -> bool {
        self.native == Type::String && matches!(self.shape, Shape::Array(_))
    }

    /// Strings and byte storage with a one-byte wire element are copied directly.
    fn is_raw(&self, wire: Type) -> bool {
        let byte_wire = matches!(wire, Type::Uint8 | Type::Int8 | Type::String);
        let byte_storage = self.native == Type::Uint8 && self.shape != Shape::Scalar;
        byte_wire && (self.is_string_scalar() || byte_storage)
    }

    /// Check the field is encodable, called when its sequence is built.
    pub(crate) fn validate(&self, schema: &str) -> Result<()> {
        let fail = |reason: &str| {
            Err(Error::schema(
                schema,
                format!("field {}: {}", self.name, reason),
            ))
        };

        match (self.wire, &self.codec) {
            (Type::Pad | Type::Ignore, _) => return Ok(()),
            (Type::Struct, Codec::Struct(_)) | (Type::Custom, Codec::Custom(_)) => {}
            (Type::Struct | Type::Custom, _) => {
                return fail("struct and custom wire types need a matching value")
            }
            (wire, Codec::Struct(_)) | (wire, Codec::Custom(_)) => {
                return fail(&format!("cannot be encoded as {}", wire))
            }
            _ => {}
        }

        if self.wire == Type::Custom && self.shape != Shape::Scalar {
            return fail("arrays of custom values are not supported");
        }
        if self.native.is_float() && self.wire.is_integer() {
            return fail(&format!("float value cannot use wire type {}", self.wire));
        }

        let byte_wire = matches!(self.wire, Type::Uint8 | Type::Int8 | Type::String);
        if self.native == Type::String {
            match self.shape {
                Shape::Scalar if !byte_wire => {
                    return fail(&format!("string cannot use wire type {}", self.wire))
                }
                Shape::Array(_) if !byte_wire || self.len == 0 => {
                    return fail("array of strings needs a [W]byte slot width")
                }
                Shape::Slice => return fail("slices of strings are not supported"),
                _ => {}
            }
        } else if self.wire == Type::String
            && !(self.native == Type::Uint8 && self.shape != Shape::Scalar)
        {
            return fail("wire type string needs string or byte storage");
        }
        Ok(())
    }

    /// Zero value of one element.
    fn element_zero(&self) -> Value {
        match self.native.kind() {
            Kind::Bool => Value::Bool(false),
            Kind::Int => Value::Int(0),
            Kind::Uint => Value::Uint(0),
            Kind::Float => Value::Float(0.0),
            Kind::String => Value::Str(String::new()),
            Kind::Struct => match &self.codec {
                Codec::Struct(seq) => Value::Struct(seq.zero_values()),
                _ => Value::Null,
            },
            Kind::Custom => self.fresh_custom().map_or(Value::Null, Value::Custom),
            Kind::Void => Value::Null,
        }
    }

    /// Empty container matching the field's storage, `n` zero elements long.
    fn zero_container(&self, n: usize) -> Value {
        if self.native == Type::Uint8 {
            Value::Bytes(vec![0; n])
        } else {
            Value::List((0..n).map(|_| self.element_zero()).collect())
        }
    }

    /// Zero value of the whole field.
    pub fn zero_value(&self) -> Value {
        match self.class() {
            FieldClass::Pad | FieldClass::Ignore => Value::Null,
            _ => match self.shape {
                Shape::Scalar => self.element_zero(),
                Shape::Array(n) => self.zero_container(n),
                Shape::Slice => self.zero_container(0),
            },
        }
    }

    fn fresh_custom(&self) -> Option<Box<dyn Custom>> {
        match &self.codec {
            Codec::Custom(factory) => Some(factory()),
            _ => None,
        }
    }

    /// Custom slot of `value`, materialized from the factory when absent.
    fn custom_slot<'a>(&self, value: &'a mut Value) -> Result<&'a mut Box<dyn Custom>> {
        if !matches!(value, Value::Custom(_)) {
            match self.fresh_custom() {
                Some(fresh) => *value = Value::Custom(fresh),
                None => {
                    return Err(Error::type_mismatch(
                        &self.name,
                        "custom",
                        value.kind_name(),
                    ))
                }
            }
        }
        match value {
            Value::Custom(custom) => Ok(custom),
            _ => unreachable!("custom slot was just materialized"),
        }
    }

    /// Effective length without any sibling link.
    pub fn effective_len(&self, value: &Value) -> usize {
        if self.len > 0 {
            self.len
        } else {
            value.len()
        }
    }

    /// Encoded size of `value` in bytes.
    pub fn size(&self, value: &Value, options: &Options) -> usize {
        self.size_with_len(value, self.effective_len(value), options)
    }

    /// Encoded size of `value` given its effective length.
    pub fn size_with_len(&self, value: &Value, length: usize, options: &Options) -> usize {
        let size = self.unaligned_size(value, length, options);
        match self.class() {
            FieldClass::Ignore | FieldClass::Custom => size,
            _ => options.aligned(size),
        }
    }

    /// Encoded size before `byte_align` is applied.
    pub(crate) fn unaligned_size(&self, value: &Value, length: usize, options: &Options) -> usize {
        match self.class() {
            FieldClass::Ignore => 0,
            FieldClass::Custom => match value {
                Value::Custom(custom) => custom.size(options),
                _ => self.fresh_custom().map_or(0, |c| c.size(options)),
            },
            FieldClass::Struct => self.nested_size(value, length, options),
            _ => self.wire_len(length, options),
        }
    }

    /// Whether a sibling can supply this field's length.
    pub(crate) fn takes_length(&self) -> bool {
        match self.class() {
            FieldClass::Array | FieldClass::Slice => true,
            FieldClass::Struct => self.shape != Shape::Scalar,
            FieldClass::Scalar => self.is_string_scalar(),
            _ => false,
        }
    }

    /// Whether this field can carry a length for a sibling.
    pub(crate) fn holds_length(&self) -> bool {
        self.class() == FieldClass::Scalar
            && matches!(self.wire.kind(), Kind::Int | Kind::Uint)
            && self.native != Type::String
    }

    /// Unaligned byte count of a primitive-coded field, saturating on overflow.
    pub(crate) fn wire_len(&self, length: usize, options: &Options) -> usize {
        self.checked_wire_len(length, options).unwrap_or(usize::MAX)
    }

    /// Unaligned byte count of a primitive-coded field.
    pub(crate) fn checked_wire_len(&self, length: usize, options: &Options) -> Result<usize> {
        let width = self.wire.resolve(options).width();
        match self.class() {
            FieldClass::Pad => Ok(length),
            FieldClass::Scalar if !self.is_string_scalar() => Ok(width),
            _ => length.checked_mul(width).ok_or_else(|| Error::LengthOverflow {
                field: self.name.clone(),
                length,
            }),
        }
    }

    /// Largest length this field can publish for a sibling.
    pub(crate) fn max_length(&self, options: &Options) -> u64 {
        let wire = self.wire.resolve(options);
        let mut bits = 8 * wire.width() as u32;
        if wire.kind() == Kind::Int {
            bits -= 1;
        }
        if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    }

    fn nested_size(&self, value: &Value, length: usize, options: &Options) -> usize {
        let Codec::Struct(seq) = &self.codec else {
            return 0;
        };
        let one = |item: Option<&Value>| match item {
            Some(Value::Struct(values)) => seq.sizeof(values, options),
            _ => seq.sizeof(&[], options),
        };
        match self.shape {
            Shape::Scalar => one(Some(value)),
            _ => {
                let items = value.as_list().unwrap_or(&[]);
                (0..length).map(|i| one(items.get(i))).sum()
            }
        }
    }

    /// Encode `value` into `buf`, returning the number of bytes written.
    pub fn pack(
        &self,
        buf: &mut [u8],
        value: &Value,
        length: usize,
        options: &Options,
    ) -> Result<usize> {
        let wire = self.wire.resolve(options);
        match self.class() {
            FieldClass::Pad => {
                ensure_len(buf, length)?;
                buf[..length].fill(0);
                return Ok(length);
            }
            FieldClass::Ignore => return Ok(0),
            FieldClass::Custom => {
                return match value {
                    Value::Custom(custom) => custom.pack(buf, options),
                    Value::Null => match self.fresh_custom() {
                        Some(fresh) => fresh.pack(buf, options),
                        None => Ok(0),
                    },
                    other => Err(Error::type_mismatch(
                        &self.name,
                        "custom",
                        other.kind_name(),
                    )),
                };
            }
            FieldClass::Struct => return self.pack_nested(buf, value, length, options),
            FieldClass::Scalar | FieldClass::Array | FieldClass::Slice => {}
        }

        if self.is_string_array() {
            let Shape::Array(count) = self.shape else {
                unreachable!("string array without array shape");
            };
            if count == 0 {
                return Ok(0);
            }
            let slot = length / count;
            ensure_len(buf, length)?;
            buf[..length].fill(0);
            let items = value.as_list().unwrap_or(&[]);
            for (i, item) in items.iter().take(count).enumerate() {
                let src = item.as_bytes().unwrap_or(&[]);
                let n = src.len().min(slot);
                buf[i * slot..i * slot + n].copy_from_slice(&src[..n]);
            }
            return Ok(length);
        }

        if self.is_raw(wire) {
            ensure_len(buf, length)?;
            let src = value.as_bytes().unwrap_or(&[]);
            let n = src.len().min(length);
            buf[..n].copy_from_slice(&src[..n]);
            buf[n..length].fill(0);
            return Ok(length);
        }

        match self.class() {
            FieldClass::Scalar => self.pack_scalar(buf, value, wire, options),
            _ => {
                let width = wire.width();
                ensure_len(buf, length.saturating_mul(width))?;
                let mut pos = 0;
                for i in 0..length {
                    let item = value.element(i).unwrap_or(Value::Null);
                    pos += self.pack_scalar(&mut buf[pos..], &item, wire, options)?;
                }
                Ok(pos)
            }
        }
    }

    fn pack_nested(
        &self,
        buf: &mut [u8],
        value: &Value,
        length: usize,
        options: &Options,
    ) -> Result<usize> {
        let Codec::Struct(seq) = &self.codec else {
            unreachable!("struct field without a nested sequence");
        };
        let one = |buf: &mut [u8], item: Option<&Value>| match item {
            Some(Value::Struct(values)) => seq.pack(buf, values, options),
            _ => seq.pack(buf, &[], options),
        };
        match self.shape {
            Shape::Scalar => one(buf, Some(value)),
            _ => {
                let items = value.as_list().unwrap_or(&[]);
                let mut pos = 0;
                for i in 0..length {
                    pos += one(&mut buf[pos..], items.get(i))?;
                }
                Ok(pos)
            }
        }
    }

    fn pack_scalar(
        &self,
        buf: &mut [u8],
        value: &Value,
        wire: Type,
        options: &Options,
    ) -> Result<usize> {
        let order = self.byte_order(options);
        let width = wire.width();
        ensure_len(buf, width)?;

        match wire {
            Type::Bool
            | Type::Int8
            | Type::Uint8
            | Type::Int16
            | Type::Uint16
            | Type::Int32
            | Type::Uint32
            | Type::Int64
            | Type::Uint64 => {
                let n = value.to_bits().ok_or_else(|| {
                    Error::type_mismatch(&self.name, wire.name(), value.kind_name())
                })?;
                match wire {
                    Type::Bool => buf[0] = u8::from(n != 0),
                    Type::Int8 | Type::Uint8 => buf[0] = n as u8,
                    Type::Int16 | Type::Uint16 => order.write_u16(buf, n as u16),
                    Type::Int32 | Type::Uint32 => order.write_u32(buf, n as u32),
                    _ => order.write_u64(buf, n),
                }
            }
            Type::Float32 | Type::Float64 => {
                let n = value.to_f64().ok_or_else(|| {
                    Error::type_mismatch(&self.name, wire.name(), value.kind_name())
                })?;
                if wire == Type::Float32 {
                    order.write_u32(buf, (n as f32).to_bits());
                } else {
                    order.write_u64(buf, n.to_bits());
                }
            }
            other => unreachable!("no pack handler for type {}", other),
        }
        Ok(width)
    }

    /// Decode `value` from `buf`, which holds the field's unaligned bytes.
    pub fn unpack(
        &self,
        buf: &[u8],
        value: &mut Value,
        length: usize,
        options: &Options,
    ) -> Result<()> {
        let wire = self.wire.resolve(options);
        match self.class() {
            FieldClass::Pad | FieldClass::Ignore => return Ok(()),
            FieldClass::Custom => return self.custom_slot(value)?.unpack(buf, options),
            FieldClass::Struct => {
                let mut reader = buf;
                return self.unpack_nested(&mut reader, value, length, options);
            }
            FieldClass::Scalar | FieldClass::Array | FieldClass::Slice => {}
        }

        if self.is_string_array() {
            return self.unpack_string_array(buf, value, length);
        }
        if self.is_string_scalar() {
            *value = Value::Str(self.utf8(buf.to_vec())?);
            return Ok(());
        }

        match self.shape {
            Shape::Scalar => self.unpack_scalar(buf, value, wire, options),
            Shape::Array(capacity) => {
                if capacity < length {
                    return Err(Error::SizeMismatch {
                        field: self.name.clone(),
                        capacity,
                        length,
                    });
                }
                ensure_len(buf, self.checked_wire_len(length, options)?)?;
                if value.len() < capacity || !matches!(value, Value::List(_) | Value::Bytes(_)) {
                    *value = self.zero_container(capacity);
                }
                self.unpack_elements(buf, value, length, wire, options)
            }
            Shape::Slice => {
                // The input must hold every element before any is allocated
                ensure_len(buf, self.checked_wire_len(length, options)?)?;
                *value = self.zero_container(length);
                self.unpack_elements(buf, value, length, wire, options)
            }
        }
    }

    fn unpack_elements(
        &self,
        buf: &[u8],
        value: &mut Value,
        length: usize,
        wire: Type,
        options: &Options,
    ) -> Result<()> {
        let width = wire.width();

        if let (true, Value::Bytes(bytes)) = (self.is_raw(wire), &mut *value) {
            bytes[..length].copy_from_slice(&buf[..length]);
            return Ok(());
        }
        for i in 0..length {
            let mut item = Value::Null;
            self.unpack_scalar(&buf[i * width..], &mut item, wire, options)?;
            value.set_element(i, item);
        }
        Ok(())
    }

    fn unpack_string_array(&self, buf: &[u8], value: &mut Value, length: usize) -> Result<()> {
        let Shape::Array(count) = self.shape else {
            unreachable!("string array without array shape");
        };
        if value.len() < count || !matches!(value, Value::List(_)) {
            *value = self.zero_container(count);
        }
        if count == 0 || buf.is_empty() {
            return Ok(());
        }

        let slot = (length / count).min(buf.len() / count).max(1);
        for i in 0..count {
            let start = i * slot;
            if start >= buf.len() {
                break;
            }
            let end = (start + slot).min(buf.len());
            let raw = &buf[start..end];
            let text = match raw.iter().position(|&b| b == 0) {
                Some(nul) => &raw[..nul],
                None => raw,
            };
            value.set_element(i, Value::Str(self.utf8(text.to_vec())?));
        }
        Ok(())
    }

    fn unpack_scalar(
        &self,
        buf: &[u8],
        value: &mut Value,
        wire: Type,
        options: &Options,
    ) -> Result<()> {
        let order = self.byte_order(options);
        ensure_len(buf, wire.width())?;

        match wire {
            Type::Float32 | Type::Float64 => {
                if self.native.kind() != Kind::Float {
                    return Err(Error::type_mismatch(
                        &self.name,
                        self.native.name(),
                        wire.name(),
                    ));
                }
                let n = if wire == Type::Float32 {
                    f64::from(f32::from_bits(order.read_u32(buf)))
                } else {
                    f64::from_bits(order.read_u64(buf))
                };
                *value = Value::Float(n);
            }
            Type::Bool
            | Type::Int8
            | Type::Uint8
            | Type::Int16
            | Type::Uint16
            | Type::Int32
            | Type::Uint32
            | Type::Int64
            | Type::Uint64 => {
                let n = match wire {
                    Type::Int8 => buf[0] as i8 as i64 as u64,
                    Type::Int16 => order.read_u16(buf) as i16 as i64 as u64,
                    Type::Int32 => order.read_u32(buf) as i32 as i64 as u64,
                    Type::Bool | Type::Uint8 => u64::from(buf[0]),
                    Type::Uint16 => u64::from(order.read_u16(buf)),
                    Type::Uint32 => u64::from(order.read_u32(buf)),
                    _ => order.read_u64(buf),
                };
                *value = match self.native.kind() {
                    Kind::Bool => Value::Bool(n != 0),
                    Kind::Int => Value::Int(n as i64),
                    _ => Value::Uint(n),
                };
            }
            other => unreachable!("no unpack handler for type {}", other),
        }
        Ok(())
    }

    /// Decode a nested record (or `length` of them) straight from a reader.
    pub(crate) fn unpack_nested<R: Read + ?Sized>(
        &self,
        r: &mut R,
        value: &mut Value,
        length: usize,
        options: &Options,
    ) -> Result<()> {
        let Codec::Struct(seq) = &self.codec else {
            unreachable!("struct field without a nested sequence");
        };

        match self.shape {
            Shape::Scalar => seq.unpack(r, struct_fields(seq, value), options),
            Shape::Array(capacity) => {
                if capacity < length {
                    return Err(Error::SizeMismatch {
                        field: self.name.clone(),
                        capacity,
                        length,
                    });
                }
                let items = list_items(value);
                if items.len() < capacity {
                    items.resize_with(capacity, || Value::Struct(seq.zero_values()));
                }
                for item in items.iter_mut().take(length) {
                    seq.unpack(r, struct_fields(seq, item), options)?;
                }
                Ok(())
            }
            Shape::Slice => {
                // Grow only as records actually decode
                let items = list_items(value);
                items.truncate(length);
                for i in 0..length {
                    if i == items.len() {
                        items.push(Value::Struct(seq.zero_values()));
                    }
                    seq.unpack(r, struct_fields(seq, &mut items[i]), options)?;
                }
                Ok(())
            }
        }
    }

    fn utf8(&self, bytes: Vec<u8>) -> Result<String> {
        String::from_utf8(bytes).map_err(|source| Error::Utf8 {
            field: self.name.clone(),
            source,
        })
    }
}

/// Field list of a struct slot, replaced by zero values when not a struct.
fn struct_fields<'a>(seq: &FieldSequence, value: &'a mut Value) -> &'a mut Vec<Value> {
    if !matches!(value, Value::Struct(_)) {
        *value = Value::Struct(seq.zero_values());
    }
    match value {
        Value::Struct(fields) => fields,
        _ => unreachable!("struct slot was just materialized"),
    }
}

fn list_items(value: &mut Value) -> &mut Vec<Value> {
    if !matches!(value, Value::List(_)) {
        *value = Value::List(Vec::new());
    }
    match value {
        Value::List(items) => items,
        _ => unreachable!("list slot was just materialized"),
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wire {
            Type::Ignore => return write!(f, "{{type: Ignore, len: 0}}"),
            Type::Pad => return write!(f, "{{type: Pad, len: {}}}", self.len),
            _ => {}
        }
        write!(f, "{{type: {}", self.wire)?;
        if let Some(order) = self.order {
            write!(f, ", order: {:?}", order)?;
        }
        if let Some(src) = self.sizefrom {
            write!(f, ", sizefrom: {}", src)?;
        } else if self.len > 0 {
            write!(f, ", len: {}", self.len)?;
        }
        if let Some(target) = self.sizeof {
            write!(f, ", sizeof: {}", target)?;
        }
        f.write_str("}")
    }
}
