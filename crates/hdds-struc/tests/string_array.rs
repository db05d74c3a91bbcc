// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed arrays of strings packed as flat blocks of fixed-width slots.

use hdds_struc::{Error, Layout, Options};

#[derive(Debug, Default, PartialEq)]
struct StringArray {
    names: [String; 32],
}

fn layout() -> Layout<StringArray> {
    Layout::<StringArray>::builder("StringArray")
        .field("names", "[256]byte", |s: &StringArray| &s.names, |s| &mut s.names)
        .build()
        .expect("StringArray layout should compile")
}

#[test]
fn test_pack_string_array() {
    let layout = layout();
    let mut s = StringArray::default();
    for (i, name) in s.names.iter_mut().enumerate() {
        *name = format!("name{}", char::from(b'A' + i as u8));
    }

    let mut wire = Vec::new();
    hdds_struc::pack(&mut wire, &layout, &s).expect("pack should succeed");
    assert_eq!(wire.len(), 32 * 256);
    assert_eq!(&wire[..6], b"nameA\0");
    assert_eq!(&wire[256..261], b"nameB");
    assert!(wire[5..256].iter().all(|&b| b == 0));

    let mut back = StringArray::default();
    hdds_struc::unpack(&mut wire.as_slice(), &layout, &mut back).expect("unpack should succeed");
    assert_eq!(back, s);
}

#[test]
fn test_long_names_truncated_to_slot() {
    let layout = Layout::<[String; 2]>::builder("Pair")
        .field("pair", "[4]byte", |p: &[String; 2]| p, |p| p)
        .build()
        .expect("Pair layout should compile");

    let pair = [String::from("abcdefgh"), String::from("xy")];
    let wire = layout
        .pack_to_vec(&pair, &Options::default())
        .expect("pack should succeed");
    assert_eq!(wire, b"abcdxy\0\0");

    let mut back: [String; 2] = Default::default();
    layout
        .unpack_slice(&wire, &mut back, &Options::default())
        .expect("unpack should succeed");
    assert_eq!(back, [String::from("abcd"), String::from("xy")]);
}

#[test]
fn test_size_matches_pack() {
    let layout = layout();
    let s = StringArray::default();
    let opts = Options::default();
    let size = hdds_struc::sizeof(&layout, &s).expect("sizeof should succeed");
    let wire = layout.pack_to_vec(&s, &opts).expect("pack should succeed");
    assert_eq!(size, wire.len());
}

#[test]
fn test_untagged_string_array_rejected() {
    let err = Layout::<StringArray>::builder("StringArray")
        .field("names", "", |s: &StringArray| &s.names, |s| &mut s.names)
        .build()
        .expect_err("string arrays need a slot width");
    assert!(matches!(err, Error::Schema { .. }));
}
