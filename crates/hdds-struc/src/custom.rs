// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value-supplied codecs.
//!
//! A field whose wire type is [`Type::Custom`](crate::Type::Custom) hands its
//! whole size/pack/unpack to the value stored in it. This is the extension
//! point for wire formats the built-in primitives do not cover.

use crate::error::{ensure_len, Result};
use crate::options::Options;
use crate::types::Endianness;
use std::any::Any;
use std::fmt;

/// Codec implemented by a value that encodes itself.
///
/// `size` must equal the number of bytes `pack` writes and `unpack` reads.
pub trait Custom: CustomClone + fmt::Debug + Send + Sync {
    /// Encoded size in bytes.
    fn size(&self, options: &Options) -> usize;

    /// Encode into `buf`, returning the number of bytes written.
    fn pack(&self, buf: &mut [u8], options: &Options) -> Result<usize>;

    /// Decode from `buf`, which holds exactly [`Custom::size`] bytes.
    fn unpack(&mut self, buf: &[u8], options: &Options) -> Result<()>;
}

/// Object-safe cloning and downcasting for boxed [`Custom`] values.
///
/// Implemented automatically for every `Custom + Clone` type.
pub trait CustomClone: Any {
    fn clone_box(&self) -> Box<dyn Custom>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Custom + Clone + 'static> CustomClone for T {
    fn clone_box(&self) -> Box<dyn Custom> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn Custom> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Encode a custom value into a fresh buffer of its reported size.
pub(crate) fn encoded(value: &dyn Custom, options: &Options) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; value.size(options)];
    let written = value.pack(&mut buf, options)?;
    buf.truncate(written);
    Ok(buf)
}

/// IEEE 754 half-precision float, stored widened to `f64`.
///
/// Uses the configured byte order, big-endian when none is set. Subnormal
/// halves are not produced; magnitudes beyond the half range keep only their
/// low exponent bits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float16(pub f64);

impl Float16 {
    const EXP_MASK: u16 = 0x1f;
    const FRAC_MASK: u16 = 0x3ff;

    fn to_bits(self) -> u16 {
        let value = self.0;
        let sign = u16::from(value.is_sign_negative() && !value.is_nan());
        let (exp, frac) = if value.is_infinite() {
            (Self::EXP_MASK, 0)
        } else if value.is_nan() {
            (Self::EXP_MASK, 1)
        } else {
            let bits = value.to_bits();
            let exp64 = (bits >> 52) & 0x7ff;
            let exp = if exp64 != 0 {
                ((exp64 as i64 - 1023 + 15) as u16) & Self::EXP_MASK
            } else {
                0
            };
            (exp, ((bits >> 42) as u16) & Self::FRAC_MASK)
        };
        (sign << 15) | (exp << 10) | frac
    }

    fn from_bits(half: u16) -> f64 {
        let sign = (half >> 15) & 1;
        let exp = (half >> 10) & Self::EXP_MASK;
        let frac = half & Self::FRAC_MASK;

        if exp == Self::EXP_MASK {
            return match (frac, sign) {
                (0, 0) => f64::INFINITY,
                (0, _) => f64::NEG_INFINITY,
                _ => f64::NAN,
            };
        }

        let mut bits = (u64::from(sign) << 63) | (u64::from(frac) << 42);
        if exp > 0 {
            bits |= (u64::from(exp) + 1023 - 15) << 52;
        }
        f64::from_bits(bits)
    }
}

impl Custom for Float16 {
    fn size(&self, _options: &Options) -> usize {
        2
    }

    fn pack(&self, buf: &mut [u8], options: &Options) -> Result<usize> {
        ensure_len(buf, 2)?;
        let order = options.order.unwrap_or(Endianness::Big);
        order.write_u16(buf, self.to_bits());
        Ok(2)
    }

    fn unpack(&mut self, buf: &[u8], options: &Options) -> Result<()> {
        ensure_len(buf, 2)?;
        let order = options.order.unwrap_or(Endianness::Big);
        self.0 = Self::from_bits(order.read_u16(buf));
        Ok(())
    }
}

impl From<f64> for Float16 {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: f64, options: &Options) -> f64 {
        let half = Float16(v);
        let mut buf = [0u8; 2];
        assert_eq!(half.pack(&mut buf, options).expect("pack"), 2);
        let mut out = Float16::default();
        out.unpack(&buf, options).expect("unpack");
        out.0
    }

    #[test]
    fn test_float16_exact_values() {
        let opts = Options::default();
        for v in [0.0, 1.0, -1.0, 0.5, 2.5, -2.5, 1024.0, 65504.0] {
            assert_eq!(roundtrip(v, &opts), v, "value {}", v);
        }
    }

    #[test]
    fn test_float16_wire_bits() {
        let mut buf = [0u8; 2];
        Float16(1.0)
            .pack(&mut buf, &Options::default())
            .expect("pack");
        assert_eq!(buf, [0x3c, 0x00]);

        Float16(-2.0)
            .pack(&mut buf, &Options::new().with_order(Endianness::Little))
            .expect("pack");
        assert_eq!(buf, [0x00, 0xc0]);
    }

    #[test]
    fn test_float16_special_values() {
        let opts = Options::default();
        assert_eq!(roundtrip(f64::INFINITY, &opts), f64::INFINITY);
        assert_eq!(roundtrip(f64::NEG_INFINITY, &opts), f64::NEG_INFINITY);
        assert!(roundtrip(f64::NAN, &opts).is_nan());
    }

    #[test]
    fn test_float16_short_buffer() {
        let mut buf = [0u8; 1];
        assert!(Float16(1.0).pack(&mut buf, &Options::default()).is_err());
    }

    #[test]
    fn test_boxed_clone_and_downcast() {
        let boxed: Box<dyn Custom> = Box::new(Float16(3.0));
        let copy = boxed.clone();
        assert_eq!(copy.as_any().downcast_ref::<Float16>(), Some(&Float16(3.0)));
        let back = copy.into_any().downcast::<Float16>().expect("downcast");
        assert_eq!(*back, Float16(3.0));
    }
}
