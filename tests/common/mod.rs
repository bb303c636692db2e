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

use std::path::PathBuf;

use ngram_probe_map::TokenId;
use tempfile::TempDir;

/// A scratch directory and a table path inside it. Keep the directory alive
/// for as long as the table is used.
pub fn scratch_table(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

/// Deterministic, pairwise distinct n-grams of the given order.
pub fn ngrams(count: usize, order: usize) -> Vec<Vec<TokenId>> {
    (0..count as u64)
        .map(|i| {
            (0..order as u64)
                .map(|j| i.wrapping_mul(0x9e37_79b9).wrapping_add(j * 31))
                .collect()
        })
        .collect()
}

/// A (prob, backoff) pair derived from the n-gram's position.
pub fn entry_for(i: usize) -> (f32, f32) {
    (-(i as f32) / 7.0 - 0.01, -(i as f32 % 13.0) / 3.0)
}
