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

//! Packing of a (probability, backoff) pair into one 64-bit storage word.
//!
//! Layout: `probability` bits in the high half, `backoff` bits in the low half,
//! copied bit-for-bit. No pattern is reserved: slot occupancy is tracked by the
//! hash word stored next to the value, so every pair of `f32`s round-trips.

// Two floats must fill exactly one storage word.
const _: () = assert!(size_of::<f32>() == 4, "two f32 values need to occupy 8 bytes");

/// The value stored for one n-gram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NgramEntry {
    /// Log probability of the n-gram.
    pub prob: f32,
    /// Backoff weight applied when extending this n-gram.
    pub backoff: f32,
}

impl NgramEntry {
    /// Creates an entry from a log probability and a backoff weight.
    pub fn new(prob: f32, backoff: f32) -> Self {
        Self { prob, backoff }
    }

    /// Packs this entry into a storage word.
    #[inline]
    pub fn pack(&self) -> u64 {
        pack_entry(self.prob, self.backoff)
    }

    /// Unpacks a storage word produced by [`NgramEntry::pack`].
    #[inline]
    pub fn unpack(word: u64) -> Self {
        let (prob, backoff) = unpack_entry(word);
        Self { prob, backoff }
    }
}

#[inline]
pub(crate) fn pack_entry(prob: f32, backoff: f32) -> u64 {
    ((prob.to_bits() as u64) << 32) | backoff.to_bits() as u64
}

#[inline]
pub(crate) fn unpack_entry(word: u64) -> (f32, f32) {
    (
        f32::from_bits((word >> 32) as u32),
        f32::from_bits(word as u32),
    )
}
