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

//! The probe map: an open-addressing table from n-gram keys to
//! (probability, backoff) entries.
//!
//! # Lifecycle
//!
//! A table is built once and read many times:
//!
//! 1. [`ProbeMapBuilder::create`] sizes a new file for the expected number of
//!    keys and returns a [`ProbeMapWriter`].
//! 2. Every key is inserted exactly once with [`ProbeMapWriter::insert`].
//! 3. [`ProbeMapWriter::finish`] flushes the file, renames it over the target
//!    path and returns a read-only [`ProbeMap`]. Maps still open on an older
//!    file at that path are unaffected. Later processes load the same file with
//!    [`ProbeMapBuilder::open`] and the same seed.
//!
//! # Layout
//!
//! The file is `capacity` slots of two little-endian `u64` words each: the
//! key's hash (0 for an empty slot) and the packed entry. There is no header;
//! capacity is recovered from the file size.

mod builder;
mod map;
mod table;

pub use self::builder::DEFAULT_LOAD_FACTOR;
pub use self::builder::ProbeMapBuilder;
pub use self::map::ProbeMap;
pub use self::map::ProbeMapHandle;
pub use self::map::ProbeMapWriter;
pub use self::table::EMPTY_HASH;
pub use self::table::WORDS_PER_SLOT;
