// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Whole-record pack/unpack through typed layouts.

use hdds_struc::{Error, Float16, Layout, Options};
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i16,
    y: i16,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Frame {
    version: u8,
    flags: [u8; 3],
    name_len: u16,
    name: String,
    sample_count: u32,
    samples: Vec<i32>,
    origin: Point,
    path_len: u8,
    path: Vec<Point>,
    corners: [Point; 2],
    scale: f64,
    gain: Float16,
    seq: Option<u64>,
    window: usize,
    note: String,
}

fn point_layout() -> Arc<Layout<Point>> {
    Arc::new(
        Layout::<Point>::builder("Point")
            .field("x", "", |p: &Point| &p.x, |p| &mut p.x)
            .field("y", "", |p: &Point| &p.y, |p| &mut p.y)
            .build()
            .expect("Point layout should compile"),
    )
}

fn frame_layout() -> Layout<Frame> {
    let point = point_layout();
    Layout::<Frame>::builder("Frame")
        .field("version", "", |f: &Frame| &f.version, |f| &mut f.version)
        .field("flags", "", |f: &Frame| &f.flags, |f| &mut f.flags)
        .field("name_len", "sizeof=name", |f: &Frame| &f.name_len, |f| &mut f.name_len)
        .field("name", "", |f: &Frame| &f.name, |f| &mut f.name)
        .field(
            "sample_count",
            "little,sizeof=samples",
            |f: &Frame| &f.sample_count,
            |f| &mut f.sample_count,
        )
        .field("samples", "little", |f: &Frame| &f.samples, |f| &mut f.samples)
        .pad(2)
        .nested("origin", "", point.clone(), |f: &Frame| &f.origin, |f| &mut f.origin)
        .field("path_len", "sizeof=path", |f: &Frame| &f.path_len, |f| &mut f.path_len)
        .nested_slice("path", "", point.clone(), |f: &Frame| &f.path, |f| &mut f.path)
        .nested_array("corners", "", point, |f: &Frame| &f.corners, |f| &mut f.corners)
        .field("scale", "", |f: &Frame| &f.scale, |f| &mut f.scale)
        .custom("gain", "", |f: &Frame| &f.gain, |f| &mut f.gain)
        .field("seq", "", |f: &Frame| &f.seq, |f| &mut f.seq)
        .field("window", "", |f: &Frame| &f.window, |f| &mut f.window)
        .field("note", "skip", |f: &Frame| &f.note, |f| &mut f.note)
        .build()
        .expect("Frame layout should compile")
}

fn sample_frame() -> Frame {
    Frame {
        version: 2,
        flags: [1, 2, 3],
        name_len: 0,
        name: "sensor".into(),
        sample_count: 0,
        samples: vec![-1, 0, 70_000],
        origin: Point { x: 10, y: -10 },
        path_len: 0,
        path: vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }],
        corners: [Point { x: -5, y: 5 }, Point { x: 6, y: -6 }],
        scale: 0.5,
        gain: Float16(1.5),
        seq: Some(42),
        window: 512,
        note: "not on the wire".into(),
    }
}

/// The frame as it reads back: links filled in, skipped fields untouched.
fn decoded(frame: &Frame) -> Frame {
    Frame {
        name_len: frame.name.len() as u16,
        sample_count: frame.samples.len() as u32,
        path_len: frame.path.len() as u8,
        note: String::new(),
        ..frame.clone()
    }
}

#[test]
fn test_frame_roundtrip() {
    let layout = frame_layout();
    let frame = sample_frame();

    let mut wire = Vec::new();
    hdds_struc::pack(&mut wire, &layout, &frame).expect("pack should succeed");

    let expected_size = 1 + 3 + 2 + 6 + 4 + 12 + 2 + 4 + 1 + 8 + 8 + 8 + 2 + 8 + 4;
    assert_eq!(wire.len(), expected_size);
    assert_eq!(hdds_struc::sizeof(&layout, &frame).expect("sizeof"), expected_size);

    // name_len is published from the string, big-endian by default
    assert_eq!(&wire[4..12], b"\x00\x06sensor");
    // sample_count and samples are little-endian
    assert_eq!(&wire[12..16], &[3, 0, 0, 0]);
    assert_eq!(&wire[16..20], &(-1i32).to_le_bytes());

    let mut back = Frame::default();
    hdds_struc::unpack(&mut wire.as_slice(), &layout, &mut back).expect("unpack should succeed");
    assert_eq!(back, decoded(&frame));
}

#[test]
fn test_frame_randomized_roundtrip() {
    let layout = frame_layout();
    let opts = Options::default();
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..200 {
        let name_len = rng.usize(0..24);
        let frame = Frame {
            version: rng.u8(..),
            flags: [rng.u8(..), rng.u8(..), rng.u8(..)],
            name: (0..name_len).map(|_| rng.alphanumeric()).collect(),
            samples: (0..rng.usize(0..16)).map(|_| rng.i32(..)).collect(),
            origin: Point {
                x: rng.i16(..),
                y: rng.i16(..),
            },
            path: (0..rng.usize(0..8))
                .map(|_| Point {
                    x: rng.i16(..),
                    y: rng.i16(..),
                })
                .collect(),
            scale: rng.f64(),
            gain: Float16(f64::from(rng.i8(..))),
            seq: if rng.bool() { Some(rng.u64(..)) } else { None },
            window: rng.usize(0..u32::MAX as usize),
            ..Frame::default()
        };

        let wire = layout.pack_to_vec(&frame, &opts).expect("pack should succeed");
        assert_eq!(wire.len(), layout.size_of(&frame, &opts));

        let mut back = Frame::default();
        let used = layout
            .unpack_slice(&wire, &mut back, &opts)
            .expect("unpack should succeed");
        assert_eq!(used, wire.len());

        let mut expected = decoded(&frame);
        // Absent pointees come back as zero
        expected.seq = Some(frame.seq.unwrap_or(0));
        assert_eq!(back, expected);
    }
}

#[test]
fn test_ptr_size_changes_window_width() {
    let layout = frame_layout();
    let frame = sample_frame();
    let narrow = layout.size_of(&frame, &Options::default());
    let wide = layout.size_of(&frame, &Options::new().with_ptr_size(64));
    assert_eq!(wide, narrow + 4);

    let opts = Options::new().with_ptr_size(64);
    let wire = layout.pack_to_vec(&frame, &opts).expect("pack should succeed");
    let mut back = Frame::default();
    layout
        .unpack_slice(&wire, &mut back, &opts)
        .expect("unpack should succeed");
    assert_eq!(back.window, 512);
}

#[test]
fn test_truncated_input_fails() {
    let layout = frame_layout();
    let wire = layout
        .pack_to_vec(&sample_frame(), &Options::default())
        .expect("pack should succeed");

    let mut back = Frame::default();
    let err = layout
        .unpack_slice(&wire[..wire.len() - 1], &mut back, &Options::default())
        .expect_err("short input must fail");
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(back, Frame::default());
}

#[test]
fn test_invalid_options_rejected() {
    let layout = frame_layout();
    let mut wire = Vec::new();
    let err = hdds_struc::pack_with_options(
        &mut wire,
        &layout,
        &sample_frame(),
        &Options::new().with_ptr_size(12),
    )
    .expect_err("ptr_size 12 is not a width");
    assert!(matches!(err, Error::Options(_)));
    assert!(wire.is_empty());
}

#[derive(Debug, Default)]
struct Reading {
    value: i32,
}

#[test]
fn test_float_wire_into_int_field() {
    let layout = Layout::<Reading>::builder("Reading")
        .field("value", "float32", |r: &Reading| &r.value, |r| &mut r.value)
        .build()
        .expect("Reading layout should compile");

    let wire = layout
        .pack_to_vec(&Reading { value: 3 }, &Options::default())
        .expect("pack should succeed");
    assert_eq!(wire, 3.0f32.to_be_bytes());

    let mut back = Reading::default();
    let err = layout
        .unpack_slice(&wire, &mut back, &Options::default())
        .expect_err("float into int must fail");
    match err {
        Error::TypeMismatch { field, found, .. } => {
            assert_eq!(field, "value");
            assert_eq!(found, "float32");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Samples {
    count: u8,
    data: [u16; 2],
}

#[test]
fn test_fixed_array_capacity_mismatch() {
    let layout = Layout::<Samples>::builder("Samples")
        .field("count", "", |s: &Samples| &s.count, |s| &mut s.count)
        .field("data", "sizefrom=count", |s: &Samples| &s.data, |s| &mut s.data)
        .build()
        .expect("Samples layout should compile");

    // Fewer elements than capacity decode fine
    let mut back = Samples::default();
    layout
        .unpack_slice(&[1, 0, 9], &mut back, &Options::default())
        .expect("unpack should succeed");
    assert_eq!(back, Samples { count: 1, data: [9, 0] });

    let err = layout
        .unpack_slice(&[3, 0, 1, 0, 2, 0, 3], &mut back, &Options::default())
        .expect_err("three elements cannot fit two slots");
    assert!(matches!(
        err,
        Error::SizeMismatch {
            capacity: 2,
            length: 3,
            ..
        }
    ));
}

#[derive(Debug, Default, PartialEq)]
struct Padded {
    id: [u8; 4],
    body: Vec<u8>,
}

#[test]
fn test_tag_longer_than_array_capacity() {
    let layout = Layout::<Padded>::builder("Padded")
        .field("id", "[6]byte", |p: &Padded| &p.id, |p| &mut p.id)
        .field("body", "[4]uint8", |p: &Padded| &p.body, |p| &mut p.body)
        .build()
        .expect("Padded layout should compile");

    let padded = Padded {
        id: *b"ABCD",
        body: vec![7],
    };
    let wire = layout
        .pack_to_vec(&padded, &Options::default())
        .expect("pack should succeed");
    assert_eq!(wire, b"ABCD\0\0\x07\0\0\0");

    let mut back = Padded::default();
    let err = layout
        .unpack_slice(&wire, &mut back, &Options::default())
        .expect_err("six bytes cannot fit four");
    assert!(matches!(err, Error::SizeMismatch { .. }));
}

#[test]
fn test_short_slice_decodes_zero_tail() {
    let layout = Layout::<Padded>::builder("Padded")
        .field("id", "", |p: &Padded| &p.id, |p| &mut p.id)
        .field("body", "[4]uint8", |p: &Padded| &p.body, |p| &mut p.body)
        .build()
        .expect("Padded layout should compile");

    let padded = Padded {
        id: *b"WXYZ",
        body: vec![1, 2],
    };
    let wire = layout
        .pack_to_vec(&padded, &Options::default())
        .expect("pack should succeed");
    assert_eq!(wire, b"WXYZ\x01\x02\0\0");

    let mut back = Padded::default();
    layout
        .unpack_slice(&wire, &mut back, &Options::default())
        .expect("unpack should succeed");
    assert_eq!(back.id, *b"WXYZ");
    assert_eq!(back.body, vec![1, 2, 0, 0]);
}
