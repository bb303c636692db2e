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

use std::borrow::Borrow;
use std::path::Path;
use std::path::PathBuf;

use memmap2::Mmap;
use memmap2::MmapMut;

use crate::codec::NgramEntry;
use crate::disk_vector::Staging;
use crate::error::Error;
use crate::hash::SequenceHasher;
use crate::hash::TokenId;
use crate::probe::builder::ProbeMapBuilder;
use crate::probe::table::ProbeTable;

/// A read-only n-gram table loaded from disk.
///
/// Only the hash of each key is stored, so the keys themselves cannot be
/// enumerated. Lookups never mutate the table; a `ProbeMap` can be shared
/// freely between threads.
#[derive(Debug)]
pub struct ProbeMap {
    table: ProbeTable<Mmap>,
    hasher: SequenceHasher,
    path: PathBuf,
}

impl ProbeMap {
    pub(super) fn new(table: ProbeTable<Mmap>, hasher: SequenceHasher, path: PathBuf) -> Self {
        Self {
            table,
            hasher,
            path,
        }
    }

    /// Returns a builder for creating or opening probe maps.
    pub fn builder() -> ProbeMapBuilder {
        ProbeMapBuilder::default()
    }

    /// Opens the table at `path` with the default seed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::builder().open(path)
    }

    /// Looks up the entry stored for `key`.
    ///
    /// A key that was never inserted yields `Ok(None)`. An error means the
    /// table file is corrupted.
    pub fn find<I>(&self, key: I) -> Result<Option<NgramEntry>, Error>
    where
        I: IntoIterator,
        I::Item: Borrow<TokenId>,
    {
        let hash = self.hasher.hash(key);
        Ok(self.table.find_hash(hash)?.map(NgramEntry::unpack))
    }

    /// Number of slots in the table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Seed the keys are hashed with.
    pub fn seed(&self) -> u32 {
        self.hasher.seed()
    }

    /// Path the table was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A table being built.
///
/// Keys are inserted in a single pass by one writer into a temporary file
/// beside the target path. [`ProbeMapWriter::finish`] moves that file into
/// place and hands back the read-only [`ProbeMap`]; dropping the writer
/// without finishing discards everything it inserted.
#[derive(Debug)]
pub struct ProbeMapWriter {
    table: ProbeTable<MmapMut>,
    staging: Staging,
    hasher: SequenceHasher,
    len: usize,
}

impl ProbeMapWriter {
    pub(super) fn new(
        table: ProbeTable<MmapMut>,
        staging: Staging,
        hasher: SequenceHasher,
    ) -> Self {
        Self {
            table,
            staging,
            hasher,
            len: 0,
        }
    }

    /// Creates a table at `path` for `expected_elements` keys with the
    /// default seed and load factor.
    pub fn create(path: impl AsRef<Path>, expected_elements: u64) -> Result<Self, Error> {
        ProbeMapBuilder::default().create(path, expected_elements)
    }

    /// Inserts the entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateKey`](crate::error::ErrorKind::DuplicateKey)
    /// if a key with the same hash was already inserted, and
    /// [`ErrorKind::CapacityExhausted`](crate::error::ErrorKind::CapacityExhausted)
    /// if the table is full. The table is unchanged in both cases.
    pub fn insert<I>(&mut self, key: I, prob: f32, backoff: f32) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: Borrow<TokenId>,
    {
        let hash = self.hasher.hash(key);
        let value = NgramEntry::new(prob, backoff).pack();
        self.table
            .insert_hash(hash, value)
            .map_err(|e| e.with_context("path", self.staging.target().display()))?;
        self.len += 1;
        Ok(())
    }

    /// Looks up the entry stored for `key` so far.
    pub fn find<I>(&self, key: I) -> Result<Option<NgramEntry>, Error>
    where
        I: IntoIterator,
        I::Item: Borrow<TokenId>,
    {
        let hash = self.hasher.hash(key);
        Ok(self.table.find_hash(hash)?.map(NgramEntry::unpack))
    }

    /// Number of keys inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Seed the keys are hashed with.
    pub fn seed(&self) -> u32 {
        self.hasher.seed()
    }

    /// Path the table is moved to by [`ProbeMapWriter::finish`].
    pub fn path(&self) -> &Path {
        self.staging.target()
    }

    /// Flushes the table, moves it to its path and reopens it read-only.
    pub fn finish(self) -> Result<ProbeMap, Error> {
        let capacity = self.table.capacity();
        let path = self.staging.target().to_path_buf();
        let words = self.table.into_words().persist(self.staging)?;
        let table = ProbeTable::new(words)?;
        log::debug!(
            "finished probe map {} with {} entries in {capacity} slots",
            path.display(),
            self.len
        );
        Ok(ProbeMap::new(table, self.hasher, path))
    }
}

/// Result of [`ProbeMapBuilder::construct`]: a writer in build mode, or a
/// reader when an existing table was loaded.
#[derive(Debug)]
pub enum ProbeMapHandle {
    /// A new table in build mode.
    Writer(ProbeMapWriter),
    /// An existing table loaded read-only.
    Reader(ProbeMap),
}

impl ProbeMapHandle {
    /// Looks up `key` in either mode.
    pub fn find<I>(&self, key: I) -> Result<Option<NgramEntry>, Error>
    where
        I: IntoIterator,
        I::Item: Borrow<TokenId>,
    {
        match self {
            ProbeMapHandle::Writer(writer) => writer.find(key),
            ProbeMapHandle::Reader(reader) => reader.find(key),
        }
    }

    /// Number of slots in the table, in either mode.
    pub fn capacity(&self) -> usize {
        match self {
            ProbeMapHandle::Writer(writer) => writer.capacity(),
            ProbeMapHandle::Reader(reader) => reader.capacity(),
        }
    }
}
