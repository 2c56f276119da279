//! Fixed-capacity byte regions shared by views.

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// A contiguous byte region of fixed capacity.
///
/// Cloning an `Arena` produces another handle to the same storage; the bytes
/// live until the last handle (usually held by a [`View`](crate::View)) is
/// dropped. The capacity never changes after creation.
#[derive(Clone)]
pub struct Arena {
    inner: Arc<ArenaInner>,
}

struct ArenaInner {
    id: u64,
    capacity: usize,
    bytes: RwLock<Box<[u8]>>,
}

impl Arena {
    /// Allocates a zero-initialized arena of exactly `capacity` bytes.
    ///
    /// Fails with [`Error::OutOfMemory`] when the allocator refuses the request.
    pub fn new(capacity: usize) -> Result<Self> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| Error::out_of_memory(capacity))?;
        storage.resize(capacity, 0);
        Ok(Self::from_boxed(storage.into_boxed_slice()))
    }

    /// Wraps caller-supplied memory without copying it.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::from_boxed(bytes.into_boxed_slice())
    }

    fn from_boxed(bytes: Box<[u8]>) -> Self {
        Self {
            inner: Arc::new(ArenaInner {
                id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
                capacity: bytes.len(),
                bytes: RwLock::new(bytes),
            }),
        }
    }

    /// Returns the fixed capacity in bytes
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Returns a process-unique identifier for this arena
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Returns true if both handles refer to the same storage
    pub fn ptr_eq(a: &Arena, b: &Arena) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Returns the number of live handles (views and arena clones) to this storage
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        // Recursive so two views over one arena can be read together.
        f(&self.inner.bytes.read_recursive())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.inner.bytes.write())
    }
}

impl From<Vec<u8>> for Arena {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<bytes::Bytes> for Arena {
    fn from(bytes: bytes::Bytes) -> Self {
        Self::from_vec(Vec::from(bytes))
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id())
            .field("capacity", &self.capacity())
            .finish()
    }
}
