// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use hdds_struc::{Layout, Options};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

#[derive(Default)]
struct Record {
    name_len: u8,
    name: String,
    count: u16,
    items: Vec<i32>,
    slots: [String; 4],
    fixed: [u8; 8],
    ratio: f64,
    blob_len: u32,
    blob: Vec<u8>,
    word_count: u64,
    words: Vec<u16>,
    path_len: u32,
    path: Vec<Point>,
}

#[derive(Default)]
struct Point {
    x: i16,
    y: i16,
}

fuzz_target!(|data: &[u8]| {
    let Ok(point) = Layout::<Point>::builder("Point")
        .field("x", "", |p: &Point| &p.x, |p| &mut p.x)
        .field("y", "", |p: &Point| &p.y, |p| &mut p.y)
        .build()
    else {
        return;
    };
    let point = Arc::new(point);

    let Ok(layout) = Layout::<Record>::builder("Record")
        .field("name_len", "", |r: &Record| &r.name_len, |r| &mut r.name_len)
        .field("name", "sizefrom=name_len", |r: &Record| &r.name, |r| &mut r.name)
        .field("count", "little", |r: &Record| &r.count, |r| &mut r.count)
        .field("items", "sizefrom=count", |r: &Record| &r.items, |r| &mut r.items)
        .field("slots", "[16]byte", |r: &Record| &r.slots, |r| &mut r.slots)
        .field("fixed", "", |r: &Record| &r.fixed, |r| &mut r.fixed)
        .field("ratio", "", |r: &Record| &r.ratio, |r| &mut r.ratio)
        .field("blob_len", "sizeof=blob", |r: &Record| &r.blob_len, |r| &mut r.blob_len)
        .field("blob", "", |r: &Record| &r.blob, |r| &mut r.blob)
        .field("word_count", "sizeof=words", |r: &Record| &r.word_count, |r| &mut r.word_count)
        .field("words", "", |r: &Record| &r.words, |r| &mut r.words)
        .field("path_len", "sizeof=path", |r: &Record| &r.path_len, |r| &mut r.path_len)
        .nested_slice("path", "", point, |r: &Record| &r.path, |r| &mut r.path)
        .build()
    else {
        return;
    };

    let opts = Options::default();
    let mut record = Record::default();
    if layout.unpack_slice(data, &mut record, &opts).is_ok() {
        // Anything that decodes must encode again
        let _ = layout.pack_to_vec(&record, &opts);
    }
});
