// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lengths read from the input never panic and never allocate ahead of the data.

use hdds_struc::{Error, Layout, Options};
use std::sync::Arc;

#[derive(Debug, Default, PartialEq)]
struct Wide {
    n: u64,
    data: Vec<u16>,
}

#[derive(Debug, Default, PartialEq)]
struct Blob {
    n: u32,
    data: Vec<u8>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i16,
    y: i16,
}

#[derive(Debug, Default, PartialEq)]
struct Path {
    n: u32,
    points: Vec<Point>,
}

#[test]
fn test_u64_length_overflow_is_error() {
    let layout = Layout::<Wide>::builder("Wide")
        .field("n", "sizeof=data", |w: &Wide| &w.n, |w| &mut w.n)
        .field("data", "", |w: &Wide| &w.data, |w| &mut w.data)
        .build()
        .expect("Wide layout should compile");

    let mut back = Wide::default();
    let err = layout
        .unpack_slice(&[0xff; 8], &mut back, &Options::default())
        .expect_err("u64::MAX elements cannot decode");
    assert!(matches!(err, Error::LengthOverflow { .. }));
    assert_eq!(back, Wide::default());
}

#[test]
fn test_u32_length_beyond_input_is_io() {
    let layout = Layout::<Blob>::builder("Blob")
        .field("n", "sizeof=data", |b: &Blob| &b.n, |b| &mut b.n)
        .field("data", "", |b: &Blob| &b.data, |b| &mut b.data)
        .build()
        .expect("Blob layout should compile");

    let mut back = Blob::default();
    let err = layout
        .unpack_slice(&[0xff, 0xff, 0xff, 0xff, 1, 2, 3], &mut back, &Options::default())
        .expect_err("four billion bytes are not there");
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(back, Blob::default());
}

#[test]
fn test_nested_slice_length_beyond_input_is_io() {
    let point = Arc::new(
        Layout::<Point>::builder("Point")
            .field("x", "", |p: &Point| &p.x, |p| &mut p.x)
            .field("y", "", |p: &Point| &p.y, |p| &mut p.y)
            .build()
            .expect("Point layout should compile"),
    );
    let layout = Layout::<Path>::builder("Path")
        .field("n", "sizeof=points", |p: &Path| &p.n, |p| &mut p.n)
        .nested_slice("points", "", point, |p: &Path| &p.points, |p| &mut p.points)
        .build()
        .expect("Path layout should compile");

    let mut back = Path::default();
    let err = layout
        .unpack_slice(&[0xff, 0xff, 0xff, 0xff, 0, 1, 0, 2], &mut back, &Options::default())
        .expect_err("only one point is present");
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(back, Path::default());
}

#[test]
fn test_publisher_too_narrow_for_payload() {
    #[derive(Default)]
    struct Short {
        n: u8,
        data: Vec<u8>,
    }

    let layout = Layout::<Short>::builder("Short")
        .field("n", "sizeof=data", |s: &Short| &s.n, |s| &mut s.n)
        .field("data", "", |s: &Short| &s.data, |s| &mut s.data)
        .build()
        .expect("Short layout should compile");

    let short = Short {
        n: 0,
        data: vec![0xab; 300],
    };
    let mut wire = Vec::new();
    let err = hdds_struc::pack(&mut wire, &layout, &short).expect_err("300 does not fit a u8");
    assert!(matches!(
        err,
        Error::SizeMismatch {
            capacity: 255,
            length: 300,
            ..
        }
    ));
    assert!(wire.is_empty());
}
