// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

mod common;

use std::fs;

use common::entry_for;
use common::ngrams;
use common::scratch_table;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;
use ngram_probe_map::NgramEntry;
use ngram_probe_map::ProbeMap;
use ngram_probe_map::ProbeMapHandle;
use ngram_probe_map::ProbeMapWriter;
use ngram_probe_map::error::ErrorKind;
use ngram_probe_map::probe::WORDS_PER_SLOT;

fn build_table(path: &std::path::Path, keys: &[Vec<u64>]) -> usize {
    let mut writer = ProbeMapWriter::create(path, keys.len() as u64).unwrap();
    for (i, key) in keys.iter().enumerate() {
        let (prob, backoff) = entry_for(i);
        writer.insert(key, prob, backoff).unwrap();
    }
    let capacity = writer.capacity();
    writer.finish().unwrap();
    capacity
}

#[test]
fn test_reopened_table_resolves_every_key() {
    let (_dir, path) = scratch_table("lm.bin");
    let keys = ngrams(3_000, 3);
    let capacity = build_table(&path, &keys);

    let map = ProbeMap::open(&path).unwrap();
    assert_that!(map.capacity(), eq(capacity));
    for (i, key) in keys.iter().enumerate() {
        let (prob, backoff) = entry_for(i);
        assert_eq!(map.find(key).unwrap(), Some(NgramEntry::new(prob, backoff)));
    }
    assert_eq!(map.find([u64::MAX, 1, 2]).unwrap(), None);
}

#[test]
fn test_file_is_exactly_the_slot_array() {
    let (_dir, path) = scratch_table("lm.bin");
    let keys = ngrams(100, 2);
    let capacity = build_table(&path, &keys);

    let bytes = fs::read(&path).unwrap();
    assert_that!(bytes.len(), eq(capacity * WORDS_PER_SLOT * 8));

    let occupied = bytes
        .chunks_exact(WORDS_PER_SLOT * 8)
        .filter(|slot| slot[..8].iter().any(|&b| b != 0))
        .count();
    assert_that!(occupied, eq(keys.len()));
}

#[test]
fn test_construct_with_zero_elements_loads() {
    let (_dir, path) = scratch_table("lm.bin");
    let keys = ngrams(50, 2);

    let handle = ProbeMap::builder().construct(&path, keys.len() as u64).unwrap();
    let ProbeMapHandle::Writer(mut writer) = handle else {
        panic!("expected a writer in build mode");
    };
    for (i, key) in keys.iter().enumerate() {
        let (prob, backoff) = entry_for(i);
        writer.insert(key, prob, backoff).unwrap();
    }
    let capacity = writer.capacity();
    drop(writer.finish().unwrap());

    let handle = ProbeMap::builder().construct(&path, 0).unwrap();
    assert!(matches!(handle, ProbeMapHandle::Reader(_)));
    assert_that!(handle.capacity(), eq(capacity));
    for (i, key) in keys.iter().enumerate() {
        let (prob, backoff) = entry_for(i);
        assert_eq!(
            handle.find(key).unwrap(),
            Some(NgramEntry::new(prob, backoff))
        );
    }
}

#[test]
fn test_unfinished_writer_leaves_existing_table() {
    let (dir, path) = scratch_table("lm.bin");
    let keys = ngrams(200, 2);
    build_table(&path, &keys);

    let mut writer = ProbeMapWriter::create(&path, 1).unwrap();
    writer.insert([8u64, 9], -0.125, -0.5).unwrap();
    assert_eq!(writer.path(), path.as_path());
    drop(writer);

    let map = ProbeMap::open(&path).unwrap();
    assert_eq!(map.find([8u64, 9]).unwrap(), None);
    for (i, key) in keys.iter().enumerate() {
        let (prob, backoff) = entry_for(i);
        assert_eq!(map.find(key).unwrap(), Some(NgramEntry::new(prob, backoff)));
    }
    assert_that!(fs::read_dir(dir.path()).unwrap().count(), eq(1));
}

#[test]
fn test_recreating_a_table_keeps_open_readers_valid() {
    let (dir, path) = scratch_table("lm.bin");
    let keys = ngrams(5_000, 2);
    build_table(&path, &keys);
    let reader = ProbeMap::open(&path).unwrap();

    let mut writer = ProbeMapWriter::create(&path, 1).unwrap();
    writer.insert([8u64, 9], -0.125, -0.5).unwrap();
    let replacement = writer.finish().unwrap();
    assert_that!(replacement.capacity(), eq(2));

    for (i, key) in keys.iter().enumerate() {
        let (prob, backoff) = entry_for(i);
        assert_eq!(
            reader.find(key).unwrap(),
            Some(NgramEntry::new(prob, backoff))
        );
    }
    assert_eq!(reader.find([8u64, 9]).unwrap(), None);

    let reopened = ProbeMap::open(&path).unwrap();
    assert_eq!(
        reopened.find([8u64, 9]).unwrap(),
        Some(NgramEntry::new(-0.125, -0.5))
    );
    assert_eq!(reopened.find(&keys[0]).unwrap(), None);
    assert_that!(fs::read_dir(dir.path()).unwrap().count(), eq(1));
}

#[test]
fn test_on_disk_layout_is_stable() {
    let (_dir, path) = scratch_table("lm.bin");
    let mut writer = ProbeMapWriter::create(&path, 1).unwrap();
    writer.insert([1u64, 2], -0.5, -0.1).unwrap();
    writer.finish().unwrap();

    // Two slots; the key's hash 0x7981b472d0b896c3 is odd, so it sits in slot 1.
    let bytes = fs::read(&path).unwrap();
    assert_that!(bytes.len(), eq(32));
    assert_eq!(&bytes[..16], &[0u8; 16]);
    assert_eq!(&bytes[16..24], &0x7981_b472_d0b8_96c3u64.to_le_bytes());
    assert_eq!(&bytes[24..28], &(-0.1f32).to_bits().to_le_bytes());
    assert_eq!(&bytes[28..32], &(-0.5f32).to_bits().to_le_bytes());
}

#[test]
fn test_seed_must_match_to_find_keys() {
    let (_dir, path) = scratch_table("lm.bin");
    let mut writer = ProbeMap::builder().seed(1234).create(&path, 1).unwrap();
    writer.insert([1u64, 2, 3], -0.5, 0.0).unwrap();
    writer.finish().unwrap();

    let same = ProbeMap::builder().seed(1234).open(&path).unwrap();
    assert_that!(same.seed(), eq(1234));
    assert_eq!(
        same.find([1u64, 2, 3]).unwrap(),
        Some(NgramEntry::new(-0.5, 0.0))
    );

    let other = ProbeMap::builder().seed(4321).open(&path).unwrap();
    assert_eq!(other.find([1u64, 2, 3]).unwrap(), None);
}

#[test]
fn test_finish_replaces_existing_table() {
    let (_dir, path) = scratch_table("lm.bin");
    build_table(&path, &ngrams(500, 2));

    let mut writer = ProbeMapWriter::create(&path, 1).unwrap();
    writer.insert([77u64], -1.0, 0.0).unwrap();
    let map = writer.finish().unwrap();

    assert_that!(map.capacity(), eq(2));
    assert_eq!(map.find(&ngrams(500, 2)[0]).unwrap(), None);
}

#[test]
fn test_open_missing_file_is_io_error() {
    let (_dir, path) = scratch_table("missing.bin");
    let err = ProbeMap::open(&path).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::Io));
    assert_that!(err.message(), contains_substring("failed to open"));
}

#[test]
fn test_open_rejects_malformed_lengths() {
    for len in [0usize, 7, 8, 24] {
        let (_dir, path) = scratch_table("bad.bin");
        fs::write(&path, vec![0u8; len]).unwrap();
        let err = ProbeMap::open(&path).unwrap_err();
        assert_that!(err.kind(), eq(ErrorKind::CorruptedTable));
    }
}

#[test]
fn test_full_table_on_disk_trips_corruption_guard() {
    let (_dir, path) = scratch_table("full.bin");
    // Two slots, both claimed by hashes no real key is likely to produce.
    let mut bytes = Vec::new();
    for word in [5u64, 0, 7, 0] {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let map = ProbeMap::open(&path).unwrap();
    assert_that!(map.capacity(), eq(2));
    let err = map.find([1u64, 2]).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CorruptedTable));
}
