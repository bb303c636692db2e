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

//! A fixed-length array of `u64` words persisted in a memory-mapped file.
//!
//! The file holds nothing but the words, little-endian, back to back; the
//! length of the array is the file size divided by eight. New arrays are
//! written to a temporary file and renamed into place, so a file that is
//! already mapped is never modified.

use std::ffi::OsString;
use std::fs::File;
use std::ops::Deref;
use std::ops::DerefMut;
use std::path::Path;
use std::path::PathBuf;

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use memmap2::Mmap;
use memmap2::MmapMut;
use tempfile::NamedTempFile;

use crate::error::Error;

/// Size of one word in bytes.
pub const WORD_SIZE: usize = size_of::<u64>();

#[derive(Debug)]
pub struct DiskVector<M> {
    map: M,
    len: usize,
}

impl<M: Deref<Target = [u8]>> DiskVector<M> {
    /// Number of words.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads the word at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        let offset = index * WORD_SIZE;
        LittleEndian::read_u64(&self.map[offset..offset + WORD_SIZE])
    }
}

impl<M: DerefMut<Target = [u8]>> DiskVector<M> {
    /// Writes the word at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize, word: u64) {
        let offset = index * WORD_SIZE;
        LittleEndian::write_u64(&mut self.map[offset..offset + WORD_SIZE], word);
    }
}

/// A file being written next to its final path.
///
/// The words live in a private temporary file until [`DiskVector::persist`]
/// renames it over the target. Readers that mapped an earlier file at the
/// target keep their own inode; dropping a `Staging` without persisting
/// deletes the temporary file and leaves the target untouched.
#[derive(Debug)]
pub struct Staging {
    file: NamedTempFile,
    target: PathBuf,
}

impl Staging {
    /// The path the words are moved to on persist.
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl DiskVector<MmapMut> {
    /// Creates `len` zeroed words in a fresh temporary file beside `path`.
    ///
    /// Nothing at `path` is opened, truncated or replaced until the vector is
    /// persisted.
    pub fn create(path: &Path, len: usize) -> Result<(Self, Staging), Error> {
        let num_bytes = len.checked_mul(WORD_SIZE).ok_or_else(|| {
            Error::config_invalid("disk vector length overflows").with_context("len", len)
        })?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut prefix = OsString::from(".");
        if let Some(name) = path.file_name() {
            prefix.push(name);
        }
        prefix.push(".");
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| {
                Error::io("failed to create table file", e).with_context("path", path.display())
            })?;
        file.as_file().set_len(num_bytes as u64).map_err(|e| {
            Error::io("failed to size table file", e)
                .with_context("path", file.path().display())
                .with_context("bytes", num_bytes)
        })?;

        // SAFETY: the temporary file has a random name, is only reachable
        // through `Staging`, and is never truncated while mapped.
        #[allow(unsafe_code)]
        let map = unsafe { MmapMut::map_mut(file.as_file()) }.map_err(|e| {
            Error::io("failed to map table file", e).with_context("path", file.path().display())
        })?;

        let staging = Staging {
            file,
            target: path.to_path_buf(),
        };
        Ok((Self { map, len }, staging))
    }

    /// Flushes outstanding writes to the file.
    pub fn flush(&self) -> Result<(), Error> {
        self.map
            .flush()
            .map_err(|e| Error::io("failed to flush table file", e))
    }

    /// Flushes and turns this vector into a read-only one over the same file.
    pub fn into_read_only(self) -> Result<DiskVector<Mmap>, Error> {
        self.flush()?;
        let map = self
            .map
            .make_read_only()
            .map_err(|e| Error::io("failed to remap table file read-only", e))?;
        Ok(DiskVector { map, len: self.len })
    }

    /// Flushes the words and atomically moves the staged file to its target.
    ///
    /// The returned vector keeps reading the same mapping, now reachable at
    /// the target path.
    pub fn persist(self, staging: Staging) -> Result<DiskVector<Mmap>, Error> {
        let words = self.into_read_only()?;
        let Staging { file, target } = staging;
        file.persist(&target).map_err(|e| {
            Error::io("failed to move table file into place", e.error)
                .with_context("path", target.display())
        })?;
        Ok(words)
    }
}

impl DiskVector<Mmap> {
    /// Opens an existing file written by [`DiskVector::create`].
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            Error::io("failed to open table file", e).with_context("path", path.display())
        })?;
        let num_bytes = file
            .metadata()
            .map_err(|e| {
                Error::io("failed to stat table file", e).with_context("path", path.display())
            })?
            .len();

        if num_bytes == 0 || num_bytes % WORD_SIZE as u64 != 0 {
            return Err(
                Error::corrupted("table file size is not a positive multiple of the word size")
                    .with_context("path", path.display())
                    .with_context("bytes", num_bytes),
            );
        }
        let len = usize::try_from(num_bytes / WORD_SIZE as u64).map_err(|_| {
            Error::corrupted("table file is too large for this platform")
                .with_context("path", path.display())
                .with_context("bytes", num_bytes)
        })?;

        // SAFETY: the map is read-only, and files are only ever replaced by
        // renaming a new inode over the path, never truncated in place.
        #[allow(unsafe_code)]
        let map = unsafe { Mmap::map(&file) }.map_err(|e| {
            Error::io("failed to map table file", e).with_context("path", path.display())
        })?;

        Ok(Self { map, len })
    }
}
