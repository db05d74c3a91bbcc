// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed record layouts.
//!
//! A [`Layout<T>`] pairs a compiled [`FieldSequence`] with one accessor per
//! field of `T`. Packing captures the record into a positional value table;
//! unpacking decodes into that table and writes it back.
//!
//! # Example
//!
//! ```
//! use hdds_struc::{Layout, Options};
//!
//! #[derive(Default)]
//! struct Header {
//!     len: u8,
//!     payload: Vec<u8>,
//!     port: u16,
//! }
//!
//! let layout = Layout::<Header>::builder("Header")
//!     .field("len", "sizeof=payload", |h: &Header| &h.len, |h| &mut h.len)
//!     .field("payload", "", |h: &Header| &h.payload, |h| &mut h.payload)
//!     .field("port", "little", |h: &Header| &h.port, |h| &mut h.port)
//!     .build()
//!     .unwrap();
//!
//! let header = Header { len: 0, payload: vec![1, 2, 3], port: 80 };
//! let bytes = layout.pack_to_vec(&header, &Options::default()).unwrap();
//! assert_eq!(bytes, [3, 1, 2, 3, 80, 0]);
//! ```

use crate::custom::Custom;
use crate::error::{Error, Result};
use crate::field::{CustomFactory, Field};
use crate::fields::FieldSequence;
use crate::native::{Native, Shape};
use crate::options::Options;
use crate::value::Value;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;

struct Accessor<T> {
    get: Getter<T>,
    set: Setter<T>,
}

/// Compiled layout of the record type `T`.
pub struct Layout<T> {
    sequence: Arc<FieldSequence>,
    /// One entry per field; padding has none.
    accessors: Vec<Option<Accessor<T>>>,
}

impl<T> fmt::Debug for Layout<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl<T: 'static> Layout<T> {
    pub fn builder(name: impl Into<String>) -> LayoutBuilder<T> {
        LayoutBuilder {
            name: name.into(),
            fields: Vec::new(),
            accessors: Vec::new(),
            error: None,
        }
    }
}

impl<T> Layout<T> {
    pub fn name(&self) -> &str {
        self.sequence.name()
    }

    pub fn sequence(&self) -> &Arc<FieldSequence> {
        &self.sequence
    }

    /// Snapshot `record` as a positional value table.
    pub fn capture(&self, record: &T) -> Vec<Value> {
        self.accessors
            .iter()
            .map(|acc| acc.as_ref().map_or(Value::Null, |acc| (acc.get)(record)))
            .collect()
    }

    /// Write a value table back into `record`, in field order, stopping at
    /// the first setter that fails.
    pub fn apply(&self, record: &mut T, values: Vec<Value>) -> Result<()> {
        for (acc, value) in self.accessors.iter().zip(values) {
            if let Some(acc) = acc {
                (acc.set)(record, value)?;
            }
        }
        Ok(())
    }

    pub fn size_of(&self, record: &T, options: &Options) -> usize {
        self.sequence.sizeof(&self.capture(record), options)
    }

    pub fn pack_to_vec(&self, record: &T, options: &Options) -> Result<Vec<u8>> {
        self.sequence.pack_to_vec(&self.capture(record), options)
    }

    /// Encode into the front of `buf`, returning the bytes written.
    pub fn pack_into(&self, buf: &mut [u8], record: &T, options: &Options) -> Result<usize> {
        self.sequence.pack(buf, &self.capture(record), options)
    }

    /// Decode from `r` into `record`.
    ///
    /// A decode error leaves the record untouched. Stores happen only after
    /// the whole record decoded; if a setter then fails, the fields before
    /// it have already been written.
    pub fn unpack<R: Read + ?Sized>(
        &self,
        r: &mut R,
        record: &mut T,
        options: &Options,
    ) -> Result<()> {
        let mut values = self.capture(record);
        self.sequence.unpack(r, &mut values, options)?;
        self.apply(record, values)
    }

    /// Decode from the front of `buf`, returning the bytes consumed.
    pub fn unpack_slice(&self, buf: &[u8], record: &mut T, options: &Options) -> Result<usize> {
        let mut reader = buf;
        self.unpack(&mut reader, record, options)?;
        Ok(buf.len() - reader.len())
    }
}

/// Builder returned by [`Layout::builder`].
///
/// Registration errors are kept and reported by [`LayoutBuilder::build`].
pub struct LayoutBuilder<T> {
    name: String,
    fields: Vec<Field>,
    accessors: Vec<Option<Accessor<T>>>,
    error: Option<Error>,
}

impl<T: 'static> LayoutBuilder<T> {
    fn push(mut self, field: Result<Field>, accessor: Option<Accessor<T>>) -> Self {
        match field {
            Ok(field) => {
                self.fields.push(field);
                self.accessors.push(accessor);
            }
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
        }
        self
    }

    /// Register a field stored as the Rust type `V`.
    pub fn field<V, G, M>(self, name: &str, tag: &str, get: G, get_mut: M) -> Self
    where
        V: Native + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let field = Field::for_native::<V>(name).with_tag(tag);
        let label = name.to_string();
        let accessor = Accessor {
            get: Box::new(move |record: &T| get(record).to_value()),
            set: Box::new(move |record: &mut T, value: Value| {
                let found = value.kind_name();
                *get_mut(record) = V::from_value(value).ok_or_else(|| {
                    Error::type_mismatch(&label, std::any::type_name::<V>(), found)
                })?;
                Ok(())
            }),
        };
        self.push(field, Some(accessor))
    }

    /// `len` zero bytes.
    pub fn pad(self, len: usize) -> Self {
        self.push(Ok(Field::pad(len)), None)
    }

    /// Register a nested record.
    pub fn nested<V, G, M>(
        self,
        name: &str,
        tag: &str,
        layout: Arc<Layout<V>>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        V: 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let field = Field::nested(name, layout.sequence.clone()).with_tag(tag);
        let label = name.to_string();
        let reader = layout.clone();
        let accessor = Accessor {
            get: Box::new(move |record: &T| Value::Struct(reader.capture(get(record)))),
            set: Box::new(move |record: &mut T, value: Value| match value {
                Value::Struct(values) => layout.apply(get_mut(record), values),
                other => Err(Error::type_mismatch(&label, "struct", other.kind_name())),
            }),
        };
        self.push(field, Some(accessor))
    }

    /// Register a growable list of nested records.
    pub fn nested_slice<V, G, M>(
        self,
        name: &str,
        tag: &str,
        layout: Arc<Layout<V>>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        V: Default + 'static,
        G: Fn(&T) -> &Vec<V> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Vec<V> + Send + Sync + 'static,
    {
        let field = Field::nested(name, layout.sequence.clone())
            .with_shape(Shape::Slice)
            .with_tag(tag);
        let label = name.to_string();
        let reader = layout.clone();
        let accessor = Accessor {
            get: Box::new(move |record: &T| {
                Value::List(
                    get(record)
                        .iter()
                        .map(|item| Value::Struct(reader.capture(item)))
                        .collect(),
                )
            }),
            set: Box::new(move |record: &mut T, value: Value| {
                let items = match value {
                    Value::List(items) => items,
                    other => return Err(Error::type_mismatch(&label, "list", other.kind_name())),
                };
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let mut element = V::default();
                    match item {
                        Value::Struct(values) => layout.apply(&mut element, values)?,
                        other => {
                            return Err(Error::type_mismatch(&label, "struct", other.kind_name()))
                        }
                    }
                    out.push(element);
                }
                *get_mut(record) = out;
                Ok(())
            }),
        };
        self.push(field, Some(accessor))
    }

    /// Register a fixed array of nested records.
    pub fn nested_array<V, G, M, const N: usize>(
        self,
        name: &str,
        tag: &str,
        layout: Arc<Layout<V>>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        V: 'static,
        G: Fn(&T) -> &[V; N] + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut [V; N] + Send + Sync + 'static,
    {
        let field = Field::nested(name, layout.sequence.clone())
            .with_shape(Shape::Array(N))
            .with_tag(tag);
        let label = name.to_string();
        let reader = layout.clone();
        let accessor = Accessor {
            get: Box::new(move |record: &T| {
                Value::List(
                    get(record)
                        .iter()
                        .map(|item| Value::Struct(reader.capture(item)))
                        .collect(),
                )
            }),
            set: Box::new(move |record: &mut T, value: Value| {
                let items = match value {
                    Value::List(items) => items,
                    other => return Err(Error::type_mismatch(&label, "list", other.kind_name())),
                };
                for (slot, item) in get_mut(record).iter_mut().zip(items) {
                    match item {
                        Value::Struct(values) => layout.apply(slot, values)?,
                        other => {
                            return Err(Error::type_mismatch(&label, "struct", other.kind_name()))
                        }
                    }
                }
                Ok(())
            }),
        };
        self.push(field, Some(accessor))
    }

    /// Register a field whose type implements [`Custom`].
    pub fn custom<V, G, M>(self, name: &str, tag: &str, get: G, get_mut: M) -> Self
    where
        V: Custom + Clone + Default + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let factory: CustomFactory = Arc::new(|| Box::new(V::default()) as Box<dyn Custom>);
        let field = Field::custom(name, factory).with_tag(tag);
        let label = name.to_string();
        let accessor = Accessor {
            get: Box::new(move |record: &T| Value::Custom(Box::new(get(record).clone()))),
            set: Box::new(move |record: &mut T, value: Value| match value {
                Value::Custom(custom) => match custom.into_any().downcast::<V>() {
                    Ok(v) => {
                        *get_mut(record) = *v;
                        Ok(())
                    }
                    Err(_) => Err(Error::type_mismatch(
                        &label,
                        std::any::type_name::<V>(),
                        "custom",
                    )),
                },
                other => Err(Error::type_mismatch(
                    &label,
                    std::any::type_name::<V>(),
                    other.kind_name(),
                )),
            }),
        };
        self.push(field, Some(accessor))
    }

    pub fn build(self) -> Result<Layout<T>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let sequence = FieldSequence::new(self.name, self.fields)?;
        Ok(Layout {
            sequence: Arc::new(sequence),
            accessors: self.accessors,
        })
    }
}
