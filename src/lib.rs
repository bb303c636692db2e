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

//! A disk-resident lookup table from n-gram token sequences to language-model
//! probabilities and backoff weights.
//!
//! Keys are never stored. Each key is reduced to a seeded 64-bit Murmur3 hash,
//! and the table keeps that hash next to the packed (probability, backoff)
//! pair in a memory-mapped file that can be reopened without rebuilding.
//!
//! # Examples
//!
//! ```
//! use ngram_probe_map::ProbeMap;
//! use ngram_probe_map::ProbeMapWriter;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("trigrams.bin");
//!
//! let mut writer = ProbeMapWriter::create(&path, 2).unwrap();
//! writer.insert(&[4u64, 8, 15], -1.75, -0.25).unwrap();
//! writer.insert(&[16u64, 23, 42], -0.5, 0.0).unwrap();
//! writer.finish().unwrap();
//!
//! let map = ProbeMap::open(&path).unwrap();
//! let entry = map.find(&[4u64, 8, 15]).unwrap().unwrap();
//! assert_eq!((entry.prob, entry.backoff), (-1.75, -0.25));
//! assert!(map.find(&[15u64, 8, 4]).unwrap().is_none());
//! ```

pub mod codec;
pub mod error;
pub mod hash;
pub mod probe;

mod disk_vector;

pub use self::codec::NgramEntry;
pub use self::hash::TokenId;
pub use self::probe::ProbeMap;
pub use self::probe::ProbeMapBuilder;
pub use self::probe::ProbeMapHandle;
pub use self::probe::ProbeMapWriter;
