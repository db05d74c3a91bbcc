// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field sequences: the schema of one record.
//!
//! A [`FieldSequence`] is compiled once from its [`Field`]s, which resolves
//! every `sizeof`/`sizefrom` name to a position, and is read-only afterwards.
//! Record instances are positional [`Value`] tables with one slot per field.

use crate::error::{Error, Result};
use crate::field::{Field, FieldClass};
use crate::options::Options;
use crate::types::Type;
use crate::value::Value;
use std::io::{self, Read};

static NULL: Value = Value::Null;

fn value_at(values: &[Value], index: usize) -> &Value {
    values.get(index).unwrap_or(&NULL)
}

fn position(fields: &[Field], name: &str) -> Option<usize> {
    fields
        .iter()
        .position(|f| f.wire != Type::Pad && f.name == name)
}

/// Ordered, validated list of fields.
#[derive(Debug, Clone)]
pub struct FieldSequence {
    name: String,
    fields: Vec<Field>,
    /// Any field publishes a sibling's length.
    linked: bool,
}

impl FieldSequence {
    /// Start a schema from [`Field`] descriptors.
    pub fn builder(name: impl Into<String>) -> FieldSequenceBuilder {
        FieldSequenceBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Validate `fields` and resolve their sibling links.
    pub fn new(name: impl Into<String>, mut fields: Vec<Field>) -> Result<Self> {
        let name = name.into();

        for (i, field) in fields.iter().enumerate() {
            let named = |f: &Field| f.wire != Type::Pad && f.name == field.name;
            if field.wire != Type::Pad && fields[..i].iter().any(named) {
                return Err(Error::schema(
                    &name,
                    format!("duplicate field {}", field.name),
                ));
            }
            field.validate(&name)?;
        }

        for i in 0..fields.len() {
            if let Some(source) = fields[i].sizefrom_name.clone() {
                let src = position(&fields, &source).ok_or_else(|| {
                    Error::schema(
                        &name,
                        format!(
                            "field {}: sizefrom names unknown field {}",
                            fields[i].name, source
                        ),
                    )
                })?;
                if src >= i {
                    return Err(Error::schema(
                        &name,
                        format!(
                            "field {}: sizefrom must reference an earlier field, {} comes after it",
                            fields[i].name, source
                        ),
                    ));
                }
                if !fields[src].holds_length() {
                    return Err(Error::schema(
                        &name,
                        format!(
                            "field {}: sizefrom source {} is not an integer",
                            fields[i].name, source
                        ),
                    ));
                }
                fields[i].sizefrom = Some(src);
            }

            if let Some(target) = fields[i].sizeof_name.clone() {
                let dst = position(&fields, &target).ok_or_else(|| {
                    Error::schema(
                        &name,
                        format!(
                            "field {}: sizeof names unknown field {}",
                            fields[i].name, target
                        ),
                    )
                })?;
                if dst == i || !fields[i].holds_length() {
                    return Err(Error::schema(
                        &name,
                        format!(
                            "field {}: sizeof needs an integer field naming a sibling",
                            fields[i].name
                        ),
                    ));
                }
                fields[i].sizeof = Some(dst);
            }
        }

        // A later target of sizeof takes its length from the publisher
        for i in 0..fields.len() {
            if let Some(dst) = fields[i].sizeof {
                if dst > i && fields[dst].sizefrom.is_none() {
                    fields[dst].sizefrom = Some(i);
                }
            }
        }

        for field in &fields {
            if field.sizefrom.is_some() && !field.takes_length() {
                return Err(Error::schema(
                    &name,
                    format!("field {} has no runtime length to take", field.name),
                ));
            }
        }

        let linked = fields.iter().any(|f| f.sizeof.is_some());
        log::debug!(
            "[struc] compiled schema {} ({} fields, linked={})",
            name,
            fields.len(),
            linked
        );
        Ok(Self {
            name,
            fields,
            linked,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Position of the field called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        position(&self.fields, name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value table of a zeroed record. Indirect fields start absent.
    pub fn zero_values(&self) -> Vec<Value> {
        self.fields
            .iter()
            .map(|f| if f.indirect { Value::Null } else { f.zero_value() })
            .collect()
    }

    /// Lengths published by `sizeof` fields, by position.
    fn published(&self, values: &[Value]) -> Vec<Option<Value>> {
        if !self.linked {
            return Vec::new();
        }
        self.fields
            .iter()
            .map(|f| {
                f.sizeof
                    .map(|dst| Value::Uint(value_at(values, dst).len() as u64))
            })
            .collect()
    }

    fn slot<'a>(
        &self,
        index: usize,
        values: &'a [Value],
        published: &'a [Option<Value>],
    ) -> &'a Value {
        published
            .get(index)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| value_at(values, index))
    }

    /// Effective length of field `index`.
    fn length_of(&self, index: usize, values: &[Value], published: &[Option<Value>]) -> usize {
        let field = &self.fields[index];
        if let Some(src) = field.sizefrom {
            return self
                .slot(src, values, published)
                .as_length()
                .unwrap_or(0);
        }
        field.effective_len(value_at(values, index))
    }

    /// Encoded size of a record.
    pub fn sizeof(&self, values: &[Value], options: &Options) -> usize {
        let published = self.published(values);
        self.fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let length = self.length_of(i, values, &published);
                field.size_with_len(self.slot(i, values, &published), length, options)
            })
            .fold(0, usize::saturating_add)
    }

    /// Encode a record into `buf`, returning the number of bytes written.
    ///
    /// A published length too large for its field's wire type is a
    /// [`Error::SizeMismatch`] rather than a truncated count.
    pub fn pack(&self, buf: &mut [u8], values: &[Value], options: &Options) -> Result<usize> {
        let published = self.published(values);
        let mut pos: usize = 0;

        for (i, field) in self.fields.iter().enumerate() {
            if let Some(Some(Value::Uint(n))) = published.get(i) {
                let max = field.max_length(options);
                if *n > max {
                    return Err(Error::SizeMismatch {
                        field: field.name.clone(),
                        capacity: usize::try_from(max).unwrap_or(usize::MAX),
                        length: usize::try_from(*n).unwrap_or(usize::MAX),
                    });
                }
            }

            let value = self.slot(i, values, &published);
            let length = self.length_of(i, values, &published);
            let end = pos.saturating_add(field.size_with_len(value, length, options));
            if buf.len() < end {
                return Err(Error::BufferTooSmall {
                    need: end,
                    have: buf.len(),
                });
            }

            let written = field.pack(&mut buf[pos..end], value, length, options)?;
            // Alignment gap
            buf[(pos + written).min(end)..end].fill(0);
            pos = end;
        }
        Ok(pos)
    }

    /// Encode a record into a buffer of exactly [`FieldSequence::sizeof`] bytes.
    pub fn pack_to_vec(&self, values: &[Value], options: &Options) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.sizeof(values, options)];
        let written = self.pack(&mut buf, values, options)?;
        debug_assert_eq!(written, buf.len(), "size and pack disagree for {}", self.name);
        Ok(buf)
    }

    /// Decode a record from `r`, reading exactly the bytes each field needs.
    ///
    /// `values` holds the destination record; its slots seed capacities and
    /// runtime lengths, and are overwritten as fields decode.
    pub fn unpack<R: Read + ?Sized>(
        &self,
        r: &mut R,
        values: &mut Vec<Value>,
        options: &Options,
    ) -> Result<()> {
        if values.len() < self.fields.len() {
            values.resize(self.fields.len(), Value::Null);
        }
        let mut scratch = Vec::new();

        for (i, field) in self.fields.iter().enumerate() {
            let length = self.length_of(i, values, &[]);
            match field.class() {
                FieldClass::Ignore => {}
                FieldClass::Struct => {
                    field.unpack_nested(r, &mut values[i], length, options)?;
                    let raw = field.unaligned_size(&values[i], length, options);
                    read_into(r, &mut scratch, options.aligned(raw) - raw)?;
                }
                FieldClass::Custom => {
                    let size = field.size_with_len(&values[i], length, options);
                    read_into(r, &mut scratch, size)?;
                    field.unpack(&scratch, &mut values[i], length, options)?;
                }
                _ => {
                    let raw = field.checked_wire_len(length, options)?;
                    read_into(r, &mut scratch, options.aligned(raw))?;
                    field.unpack(&scratch[..raw], &mut values[i], length, options)?;
                }
            }
        }
        Ok(())
    }

    /// Decode a record from the front of `buf`, returning the bytes consumed.
    pub fn unpack_slice(
        &self,
        buf: &[u8],
        values: &mut Vec<Value>,
        options: &Options,
    ) -> Result<usize> {
        let mut reader = buf;
        self.unpack(&mut reader, values, options)?;
        Ok(buf.len() - reader.len())
    }
}

/// Read exactly `n` bytes. The buffer grows with the bytes received, not with `n`.
fn read_into<R: Read + ?Sized>(r: &mut R, scratch: &mut Vec<u8>, n: usize) -> Result<()> {
    scratch.clear();
    let got = Read::take(&mut *r, n as u64).read_to_end(scratch)?;
    if got < n {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

/// Builder returned by [`FieldSequence::builder`].
#[derive(Debug)]
pub struct FieldSequenceBuilder {
    name: String,
    fields: Vec<Field>,
}

impl FieldSequenceBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn pad(self, len: usize) -> Self {
        self.field(Field::pad(len))
    }

    pub fn build(self) -> Result<FieldSequence> {
        FieldSequence::new(self.name, self.fields)
    }
}
