// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field tag directives.
//!
//! A tag is a comma-separated list, for example `"[16]byte,little"` or
//! `"uint16,sizeof=Payload"`:
//!
//! | Directive              | Effect                                        |
//! |------------------------|-----------------------------------------------|
//! | `big`, `msb`           | big-endian field                              |
//! | `little`, `lsb`        | little-endian field                           |
//! | `native`               | host byte order                               |
//! | `sizeof=Name`          | publish the runtime length of field `Name`    |
//! | `sizefrom=Name`        | take the runtime length from field `Name`     |
//! | `skip`, `-`            | not present on the wire                       |
//! | `[N]type`, `[]type`    | wire type with a fixed or runtime length      |

use crate::error::{Error, Result};
use crate::types::{Endianness, Type};
use std::str::FromStr;

/// Parsed tag directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub wire: Option<Type>,
    /// Fixed length from a `[N]` prefix.
    pub len: Option<usize>,
    /// `[]` prefix: runtime length.
    pub slice: bool,
    pub order: Option<Endianness>,
    pub sizeof: Option<String>,
    pub sizefrom: Option<String>,
    pub skip: bool,
}

impl Tag {
    pub fn parse(tag: &str) -> Result<Self> {
        let mut out = Tag::default();

        for part in tag.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part == "-" || part == "skip" {
                out.skip = true;
            } else if let Some(order) = Endianness::from_name(part) {
                out.order = Some(order);
            } else if let Some(target) = part.strip_prefix("sizeof=") {
                out.sizeof = Some(link_name(tag, "sizeof", target)?);
            } else if let Some(source) = part.strip_prefix("sizefrom=") {
                out.sizefrom = Some(link_name(tag, "sizefrom", source)?);
            } else {
                if out.wire.is_some() {
                    return Err(Error::tag(tag, format!("second type {:?}", part)));
                }
                out.parse_type(tag, part)?;
            }
        }
        Ok(out)
    }

    fn parse_type(&mut self, tag: &str, part: &str) -> Result<()> {
        let name = match part.strip_prefix('[') {
            Some(rest) => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| Error::tag(tag, "unterminated length"))?;
                let digits = rest[..close].trim();
                if digits.is_empty() {
                    self.slice = true;
                } else {
                    let len = digits
                        .parse()
                        .map_err(|_| Error::tag(tag, format!("bad length {:?}", digits)))?;
                    self.len = Some(len);
                }
                &rest[close + 1..]
            }
            None => part,
        };

        let wire = Type::from_name(name)
            .ok_or_else(|| Error::tag(tag, format!("unknown type {:?}", name)))?;
        self.wire = Some(wire);
        Ok(())
    }
}

fn link_name(tag: &str, directive: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::tag(tag, format!("{} needs a field name", directive)));
    }
    Ok(name.to_string())
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tag() {
        assert_eq!(Tag::parse("").expect("parse"), Tag::default());
        assert_eq!(Tag::parse(" , ").expect("parse"), Tag::default());
    }

    #[test]
    fn test_full_tag() {
        let tag: Tag = "[16]byte, little, sizefrom=Len".parse().expect("parse");
        assert_eq!(tag.wire, Some(Type::Uint8));
        assert_eq!(tag.len, Some(16));
        assert_eq!(tag.order, Some(Endianness::Little));
        assert_eq!(tag.sizefrom.as_deref(), Some("Len"));
        assert!(!tag.slice);
    }

    #[test]
    fn test_slice_and_links() {
        let tag = Tag::parse("[]int32,sizeof=Items,msb").expect("parse");
        assert!(tag.slice);
        assert_eq!(tag.len, None);
        assert_eq!(tag.wire, Some(Type::Int32));
        assert_eq!(tag.sizeof.as_deref(), Some("Items"));
        assert_eq!(tag.order, Some(Endianness::Big));
    }

    #[test]
    fn test_skip() {
        assert!(Tag::parse("-").expect("parse").skip);
        assert!(Tag::parse("skip").expect("parse").skip);
    }

    #[test]
    fn test_errors() {
        for bad in ["int", "[x]byte", "[4byte", "sizeof=", "uint8,uint16"] {
            assert!(
                matches!(Tag::parse(bad), Err(Error::Tag { .. })),
                "tag {:?} should fail",
                bad
            );
        }
    }
}
