/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Reusable wire-format buffers.
//!
//! [`acquire`] hands out a cleared buffer from a process-wide shelf;
//! dropping the returned [`PooledBuf`] puts it back. Hot paths that pack
//! cache records reuse allocations instead of growing fresh vectors per
//! store.

use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};

// Buffers beyond this capacity are dropped instead of reshelved.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;
const MAX_SHELVED: usize = 64;

#[derive(Debug, Default)]
pub struct BufPool {
    shelf: Mutex<Vec<Vec<u8>>>,
}

lazy_static! {
    static ref WIRE_POOL: BufPool = BufPool::new();
}

/// Borrow a cleared buffer with at least `capacity` bytes from the global
/// pool. The buffer returns to the pool when the guard drops.
pub fn acquire(capacity: usize) -> PooledBuf {
    let pool: &'static BufPool = &WIRE_POOL;
    pool.acquire(capacity)
}

impl BufPool {
    pub fn new() -> Self {
        Self {
            shelf: Mutex::new(Vec::new()),
        }
    }

    pub fn acquire(&'static self, capacity: usize) -> PooledBuf {
        let recycled = self.shelf.lock().pop();
        let mut buf = recycled.unwrap_or_default();
        buf.clear();
        buf.reserve(capacity);
        PooledBuf { buf, pool: self }
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        let mut shelf = self.shelf.lock();
        if shelf.len() < MAX_SHELVED {
            buf.clear();
            shelf.push(buf);
        }
    }

    #[cfg(test)]
    fn shelved(&self) -> usize {
        self.shelf.lock().len()
    }
}

/// A pooled byte buffer. Derefs to `[u8]`; released on drop on every exit
/// path, whether or not the surrounding operation succeeded.
pub struct PooledBuf {
    buf: Vec<u8>,
    pool: &'static BufPool,
}

impl PooledBuf {
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Deref for PooledBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl AsRef<[u8]> for PooledBuf {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

impl fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuf")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}
