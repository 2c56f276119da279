//! Pooled allocation of byte views.
//!
//! The [`Pool`] is a bump allocator over one current [`Arena`]. Small requests
//! (strictly below half the pool size) are carved out of the current arena and
//! the cursor is rounded up to the next multiple of 8. When a request does not
//! fit in what is left, the arena is abandoned and a fresh one takes its place;
//! the old arena lives on only as long as views still reference it. Large
//! requests bypass the pool and get a standalone arena of exactly the
//! requested size.
//!
//! ## Concurrency
//!
//! The cursor and current arena sit behind one mutex, so a `Pool` can be
//! shared between threads by reference or through an `Arc`. Views handed out
//! by the pool alias freely; the pool provides no isolation between them.
//!
//! ## Example
//!
//! ```
//! use bytepool_core::{Encoding, Pool};
//!
//! let pool = Pool::new();
//! let a = pool.alloc(16)?;
//! let b = pool.alloc(16)?;
//! assert!(a.shares_backing(&b));
//! assert_eq!(b.byte_offset() - a.byte_offset(), 16);
//!
//! let text = pool.from_text("hello", Encoding::Utf8)?;
//! assert_eq!(text.to_vec(), b"hello");
//! # Ok::<(), bytepool_core::Error>(())
//! ```

mod arena;

use crate::encoding::{self, Encoding};
use crate::error::{Error, Result};
use crate::ops::Pattern;
use crate::view::View;
use crate::{DEFAULT_POOL_SIZE, MAX_LENGTH};
use parking_lot::Mutex;
use tracing::{debug, trace};

pub use arena::Arena;

/// Alignment applied to the pool cursor after each pooled allocation
pub const ALIGNMENT: usize = 8;

/// Configuration for a [`Pool`]
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Capacity of each pooled arena in bytes
    pub pool_size: usize,
    /// Largest buffer the pool will hand out
    pub max_length: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_length: MAX_LENGTH,
        }
    }
}

impl PoolConfig {
    /// Creates a new pool config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity of each pooled arena
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Sets the largest buffer the pool will hand out
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    /// Requests strictly below this size are served from the pooled arena
    fn pooled_threshold(&self) -> usize {
        self.pool_size >> 1
    }
}

/// Bump allocator handing out [`View`]s
#[derive(Debug)]
pub struct Pool {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

#[derive(Debug, Default)]
struct PoolState {
    arena: Option<Arena>,
    offset: usize,
}

impl PoolState {
    /// Ensures at least `size` bytes remain in the current arena, replacing it if not
    fn reserve(&mut self, size: usize, pool_size: usize) -> Result<&Arena> {
        let fits = self
            .arena
            .as_ref()
            .is_some_and(|arena| arena.capacity() - self.offset >= size);
        if !fits {
            let arena = Arena::new(pool_size)?;
            debug!(
                "Replacing pool arena: {} bytes requested, {} left, new arena {}",
                size,
                self.arena.as_ref().map_or(0, |a| a.capacity() - self.offset),
                arena.id()
            );
            self.arena = Some(arena);
            self.offset = 0;
        }
        self.arena
            .as_ref()
            .ok_or_else(|| Error::out_of_memory(pool_size))
    }

    /// Advances the cursor past `size` bytes and realigns it
    fn advance(&mut self, size: usize) {
        self.offset = align_up(self.offset + size);
        if let Some(arena) = &self.arena {
            self.offset = self.offset.min(arena.capacity());
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Creates a new pool with default configuration
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a new pool with custom configuration
    ///
    /// The first arena is allocated lazily on the first pooled request.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Returns the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the current cursor within the pooled arena
    pub fn offset(&self) -> usize {
        self.state.lock().offset
    }

    /// Returns a handle to the current pooled arena, if one was created yet
    pub fn current_arena(&self) -> Option<Arena> {
        self.state.lock().arena.clone()
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.config.max_length {
            return Err(Error::allocation_too_large(size, self.config.max_length));
        }
        Ok(())
    }

    /// Allocates a view of `size` bytes without clearing it.
    ///
    /// - `size == 0` returns an empty view with no backing.
    /// - `size < pool_size / 2` carves the view out of the pooled arena.
    /// - Anything larger gets a standalone arena of exactly `size` bytes.
    pub fn alloc(&self, size: usize) -> Result<View> {
        self.check_size(size)?;
        if size == 0 {
            return Ok(View::empty());
        }
        if size < self.config.pooled_threshold() {
            let mut state = self.state.lock();
            let arena = state.reserve(size, self.config.pool_size)?.clone();
            let offset = state.offset;
            state.advance(size);
            trace!("Pooled {} bytes at {} of arena {}", size, offset, arena.id());
            return Ok(View::from_parts(arena, offset, size));
        }
        self.standalone(size)
    }

    fn standalone(&self, size: usize) -> Result<View> {
        let arena = Arena::new(size)?;
        debug!("Standalone arena {} of {} bytes", arena.id(), size);
        Ok(View::whole(arena))
    }

    /// Allocates a zero-filled view of `size` bytes, never pool-backed
    pub fn alloc_zeroed(&self, size: usize) -> Result<View> {
        self.check_size(size)?;
        if size == 0 {
            return Ok(View::empty());
        }
        let view = self.standalone(size)?;
        view.write(|bytes| bytes.fill(0));
        Ok(view)
    }

    /// Allocates `size` bytes filled with `pattern`
    pub fn alloc_filled<'a>(
        &self,
        size: usize,
        pattern: impl Into<Pattern<'a>>,
        encoding: Encoding,
    ) -> Result<View> {
        let view = self.alloc_zeroed(size)?;
        if !view.is_empty() {
            view.fill(pattern, None, None, encoding)?;
        }
        Ok(view)
    }

    /// Encodes `text` into a new view.
    ///
    /// The length is first estimated with [`encoding::byte_length`], which may
    /// overshoot for lenient encodings; the view is shrunk to the bytes
    /// actually written and only those advance the pool cursor.
    pub fn from_text(&self, text: &str, encoding: Encoding) -> Result<View> {
        if text.is_empty() {
            return Ok(View::empty());
        }
        let estimate = encoding::byte_length(text, encoding);
        self.check_size(estimate)?;

        if estimate >= self.config.pooled_threshold() {
            let mut view = self.standalone(estimate)?;
            let written = view.write(|bytes| encoding::write_text(text, encoding, bytes));
            shrink(&mut view, estimate, written);
            return Ok(view);
        }

        let mut state = self.state.lock();
        let arena = state.reserve(estimate, self.config.pool_size)?.clone();
        let offset = state.offset;
        let mut view = View::from_parts(arena, offset, estimate);
        let written = view.write(|bytes| encoding::write_text(text, encoding, bytes));
        shrink(&mut view, estimate, written);
        state.advance(written);
        Ok(view)
    }

    /// Copies `bytes` into a new view
    pub fn from_slice(&self, bytes: &[u8]) -> Result<View> {
        let view = self.alloc(bytes.len())?;
        view.write(|dst| dst.copy_from_slice(bytes));
        Ok(view)
    }

    /// Builds a view from integer elements, keeping the low byte of each
    pub fn from_array_like<T: Copy + Into<i64>>(&self, elements: &[T]) -> Result<View> {
        let view = self.alloc(elements.len())?;
        view.write(|dst| {
            for (slot, &element) in dst.iter_mut().zip(elements) {
                *slot = (element.into() & 0xFF) as u8;
            }
        });
        Ok(view)
    }

    /// Copies the bytes of an existing view into a new, unaliased view
    pub fn from_view(&self, source: &View) -> Result<View> {
        let view = self.alloc(source.len())?;
        source.copy_to(&view, 0, 0, None)?;
        Ok(view)
    }

    /// Wraps `[offset, offset + length)` of an existing arena without copying.
    ///
    /// A missing `length` covers the rest of the arena.
    pub fn from_existing(&self, arena: Arena, offset: usize, length: Option<usize>) -> Result<View> {
        if offset > arena.capacity() {
            return Err(Error::buffer_out_of_bounds(Some("offset")));
        }
        let length = length.unwrap_or(arena.capacity() - offset);
        View::new(arena, offset, length)
    }

    /// Concatenates `views` into one new view.
    ///
    /// Without `length` the result is exactly as long as all inputs together.
    /// A larger `length` zero-fills the tail; a smaller one truncates.
    pub fn concat(&self, views: &[View], length: Option<usize>) -> Result<View> {
        if views.is_empty() {
            return Ok(View::empty());
        }
        let total = length.unwrap_or_else(|| views.iter().map(View::len).sum());
        let out = self.alloc(total)?;

        let mut position = 0;
        for view in views {
            if position >= total {
                break;
            }
            position += view.copy_to(&out, position, 0, None)?;
        }
        if position < total {
            out.write(|bytes| bytes[position..].fill(0));
        }
        Ok(out)
    }

    /// Re-encodes the bytes of `source`: they are read as `from` text and the
    /// result is decoded with `to` into a fresh view.
    pub fn transcode(&self, source: &View, from: Encoding, to: Encoding) -> Result<View> {
        let text = source.read(|bytes| encoding::encode(bytes, from));
        self.from_text(&text, to)
    }
}

fn shrink(view: &mut View, estimate: usize, written: usize) {
    if written != estimate {
        trace!("Byte length overestimated: {} estimated, {} written", estimate, written);
        view.truncate(written);
    }
}

/// Rounds `offset` up to the next multiple of [`ALIGNMENT`]
fn align_up(offset: usize) -> usize {
    (offset + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}
