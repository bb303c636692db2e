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

use std::path::Path;

use crate::disk_vector::DiskVector;
use crate::error::Error;
use crate::hash::DEFAULT_SEED;
use crate::hash::SequenceHasher;
use crate::probe::map::ProbeMap;
use crate::probe::map::ProbeMapHandle;
use crate::probe::map::ProbeMapWriter;
use crate::probe::table::ProbeTable;
use crate::probe::table::WORDS_PER_SLOT;

/// Target ratio of occupied slots to capacity for a freshly built table.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.8;

/// Builder for creating and opening probe maps.
///
/// The seed is not persisted: a table must be opened with the seed it was
/// built with, otherwise every lookup misses.
///
/// # Examples
///
/// ```
/// use ngram_probe_map::ProbeMap;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("bigrams.bin");
///
/// let mut writer = ProbeMap::builder()
///     .seed(7)
///     .load_factor(0.5)
///     .create(&path, 2)
///     .unwrap();
/// writer.insert(&[1u64, 2], -0.5, -0.1).unwrap();
/// writer.insert(&[2u64, 1], -1.5, 0.0).unwrap();
/// writer.finish().unwrap();
///
/// let map = ProbeMap::builder().seed(7).open(&path).unwrap();
/// assert_eq!(map.find(&[1u64, 2]).unwrap().unwrap().prob, -0.5);
/// assert!(map.find(&[1u64, 3]).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ProbeMapBuilder {
    seed: u32,
    load_factor: f64,
}

impl Default for ProbeMapBuilder {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl ProbeMapBuilder {
    /// Sets the seed for hashing keys.
    ///
    /// Tables built with different seeds are incompatible.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the target load factor used to size new tables.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not strictly between 0 and 1.
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        assert!(
            load_factor > 0.0 && load_factor < 1.0,
            "load_factor must be in (0, 1), got {load_factor}"
        );
        self.load_factor = load_factor;
        self
    }

    /// Number of slots a table for `expected_elements` keys gets.
    ///
    /// This is `ceil(expected_elements / load_factor)`, and always leaves at
    /// least one slot empty once every expected key is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if `expected_elements` is 0 or the capacity does not fit in memory.
    pub fn capacity_for(&self, expected_elements: u64) -> Result<usize, Error> {
        if expected_elements == 0 {
            return Err(Error::config_invalid(
                "a table must be built for at least one element",
            ));
        }
        let too_large = || {
            Error::config_invalid("table capacity does not fit in memory")
                .with_context("expected_elements", expected_elements)
                .with_context("load_factor", self.load_factor)
        };

        let min_capacity = usize::try_from(expected_elements)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(too_large)?;
        let by_load = (expected_elements as f64 / self.load_factor).ceil();
        if by_load >= (usize::MAX / WORDS_PER_SLOT) as f64 {
            return Err(too_large());
        }
        let capacity = (by_load as usize).max(min_capacity);
        if capacity > usize::MAX / WORDS_PER_SLOT {
            return Err(too_large());
        }
        Ok(capacity)
    }

    /// Creates a new, empty table for `path` sized for `expected_elements`
    /// keys.
    ///
    /// The table is written to a temporary file beside `path` and only
    /// replaces `path` when [`ProbeMapWriter::finish`] succeeds. Maps already
    /// open on an older file at `path` keep reading that file.
    pub fn create(
        self,
        path: impl AsRef<Path>,
        expected_elements: u64,
    ) -> Result<ProbeMapWriter, Error> {
        let path = path.as_ref();
        let capacity = self.capacity_for(expected_elements)?;
        let (words, staging) = DiskVector::create(path, capacity * WORDS_PER_SLOT)?;
        let table = ProbeTable::new(words)?;
        log::debug!(
            "created probe map {} with {capacity} slots for {expected_elements} elements",
            path.display()
        );
        Ok(ProbeMapWriter::new(
            table,
            staging,
            SequenceHasher::with_seed(self.seed),
        ))
    }

    /// Opens a table previously built at `path`, read-only.
    pub fn open(self, path: impl AsRef<Path>) -> Result<ProbeMap, Error> {
        let path = path.as_ref();
        let words = DiskVector::open(path)?;
        let table = ProbeTable::new(words).map_err(|e| e.with_context("path", path.display()))?;
        log::debug!(
            "opened probe map {} with {} slots",
            path.display(),
            table.capacity()
        );
        Ok(ProbeMap::new(
            table,
            SequenceHasher::with_seed(self.seed),
            path.to_path_buf(),
        ))
    }

    /// Opens the table at `path` if `expected_elements` is 0, otherwise
    /// creates a new one sized for `expected_elements` keys.
    pub fn construct(
        self,
        path: impl AsRef<Path>,
        expected_elements: u64,
    ) -> Result<ProbeMapHandle, Error> {
        if expected_elements == 0 {
            self.open(path).map(ProbeMapHandle::Reader)
        } else {
            self.create(path, expected_elements)
                .map(ProbeMapHandle::Writer)
        }
    }
}
