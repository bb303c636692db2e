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

//! Hashing of ordered token sequences.
//!
//! A key is never stored; the 64-bit value produced here is the only thing the
//! table keeps of it. Every token is folded in order, followed by the number of
//! tokens, so `[1, 2]`, `[2, 1]` and `[1, 2, 0]` hash differently.

use std::borrow::Borrow;
use std::hash::Hasher;

/// Identifier of a single token (word) in the vocabulary.
pub type TokenId = u64;

/// The seed used when none is configured.
pub const DEFAULT_SEED: u32 = 0x3aa2_22d9;

/// Deterministic Murmur3 (x64, 128-bit) hasher for token sequences.
///
/// Tokens and the trailing length are written as little-endian `u64`s, so the
/// same sequence hashes to the same value on every platform and in every
/// process that uses the same seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceHasher {
    seed: u32,
}

impl Default for SequenceHasher {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl SequenceHasher {
    /// Creates a hasher for the given seed.
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Seed the hasher was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Hashes an ordered token sequence. The empty sequence is a valid key.
    pub fn hash<I>(&self, tokens: I) -> u64
    where
        I: IntoIterator,
        I::Item: Borrow<TokenId>,
    {
        let mut hasher = mur3::Hasher128::with_seed(self.seed);
        let mut len = 0u64;
        for token in tokens {
            hasher.write(&token.borrow().to_le_bytes());
            len += 1;
        }
        hasher.write(&len.to_le_bytes());
        let (h1, _) = hasher.finish128();
        h1
    }
}
