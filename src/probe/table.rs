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

use std::ops::Deref;
use std::ops::DerefMut;

use crate::disk_vector::DiskVector;
use crate::error::Error;

/// Hash word of a slot that was never written.
pub const EMPTY_HASH: u64 = 0;

/// Tag stored for keys whose hash is exactly [`EMPTY_HASH`].
///
/// A key hashing to 0 and a key hashing to 1 share this tag. If their probe
/// paths meet, the second insert fails as a duplicate and a lookup of either
/// can return the other's value. Like any full 64-bit hash collision this
/// happens with probability around 2^-64 per pair of keys.
const ZERO_HASH_TAG: u64 = 1;

/// Words per slot: the key hash followed by the packed value.
pub const WORDS_PER_SLOT: usize = 2;

/// Open-addressing table over a fixed number of slots.
///
/// Slot `i` occupies words `2 * i` (the key hash) and `2 * i + 1` (the packed
/// value). Placement starts at `hash % capacity` and probes linearly. A lookup
/// stops at the first slot holding the same hash, or at the first empty slot;
/// since an insert always stops at the first empty slot on its path, reaching
/// one proves the key was never inserted.
#[derive(Debug)]
pub(crate) struct ProbeTable<M> {
    words: DiskVector<M>,
    capacity: usize,
}

impl<M: Deref<Target = [u8]>> ProbeTable<M> {
    /// Wraps a word array whose length is a positive multiple of
    /// [`WORDS_PER_SLOT`].
    pub fn new(words: DiskVector<M>) -> Result<Self, Error> {
        if words.is_empty() || words.len() % WORDS_PER_SLOT != 0 {
            return Err(
                Error::corrupted("table length is not a positive multiple of the slot size")
                    .with_context("words", words.len()),
            );
        }
        let capacity = words.len() / WORDS_PER_SLOT;
        Ok(Self { words, capacity })
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn into_words(self) -> DiskVector<M> {
        self.words
    }

    /// Finds the packed value stored for `hash`.
    ///
    /// Returns `Ok(None)` if the probe path reaches an empty slot. Fails if
    /// `capacity` slots were probed without reaching either a match or an empty
    /// slot, which cannot happen in a table built by [`ProbeTable::insert_hash`].
    pub fn find_hash(&self, hash: u64) -> Result<Option<u64>, Error> {
        let tag = slot_tag(hash);
        let mut index = self.initial_index(hash);
        for _ in 0..self.capacity {
            match self.stored_hash(index) {
                EMPTY_HASH => return Ok(None),
                stored if stored == tag => return Ok(Some(self.stored_value(index))),
                _ => index = self.next_index(index),
            }
        }

        log::warn!(
            "lookup probed all {} slots without terminating; table is corrupted",
            self.capacity
        );
        Err(
            Error::corrupted("lookup probed every slot without finding the key or an empty slot")
                .with_context("hash", format!("{hash:#018x}"))
                .with_context("capacity", self.capacity),
        )
    }

    #[inline]
    fn initial_index(&self, hash: u64) -> usize {
        (hash % self.capacity as u64) as usize
    }

    #[inline]
    fn next_index(&self, index: usize) -> usize {
        if index + 1 == self.capacity { 0 } else { index + 1 }
    }

    #[inline]
    fn stored_hash(&self, index: usize) -> u64 {
        self.words.get(index * WORDS_PER_SLOT)
    }

    #[inline]
    fn stored_value(&self, index: usize) -> u64 {
        self.words.get(index * WORDS_PER_SLOT + 1)
    }
}

impl<M: DerefMut<Target = [u8]>> ProbeTable<M> {
    /// Stores `value` under `hash` in the first empty slot on its probe path.
    ///
    /// Returns the slot index on success. Fails with a duplicate-key error if
    /// the path already holds `hash`, and with a capacity-exhaustion error if
    /// every slot is occupied. Nothing is written on failure.
    pub fn insert_hash(&mut self, hash: u64, value: u64) -> Result<usize, Error> {
        let tag = slot_tag(hash);
        let mut index = self.initial_index(hash);
        for _ in 0..self.capacity {
            match self.stored_hash(index) {
                EMPTY_HASH => {
                    self.words.set(index * WORDS_PER_SLOT, tag);
                    self.words.set(index * WORDS_PER_SLOT + 1, value);
                    return Ok(index);
                }
                stored if stored == tag => return Err(Error::duplicate_key(hash)),
                _ => {
                    log::trace!("slot {index} taken, probing on for {hash:#018x}");
                    index = self.next_index(index);
                }
            }
        }
        Err(Error::capacity_exhausted(hash, self.capacity))
    }
}

#[inline]
fn slot_tag(hash: u64) -> u64 {
    if hash == EMPTY_HASH { ZERO_HASH_TAG } else { hash }
}
