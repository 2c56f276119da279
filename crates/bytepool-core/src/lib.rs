//! # bytepool-core
//!
//! A byte-buffer engine: pooled zero-copy views over shared memory, with the
//! codecs and algorithms every consumer of binary data ends up needing.
//!
//! This crate provides:
//! - A bump [`Pool`] allocator carving small [`View`]s out of shared arenas
//! - Text ⇄ byte transcoding for utf8, ascii, latin1, ucs2, base64 and hex
//! - Bounds-checked fixed-width integer and float access in both byte orders
//! - Forward and backward search for bytes, byte sequences and encoded text
//! - In-place byte-order swapping and pattern fill
//!
//! ## Architecture
//!
//! - [`pool`]: arenas and the pooled allocator
//! - [`view`]: windows into arenas, slicing, copying and comparison
//! - [`encoding`]: the closed set of text encodings
//! - [`codec`]: numeric reads and writes
//! - [`search`]: `index_of` / `last_index_of` / `includes`
//! - [`ops`]: swap and fill
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```
//! use bytepool_core::{Encoding, Offset, Pool};
//!
//! let pool = Pool::new();
//! let buf = pool.alloc_zeroed(8)?;
//! buf.write_f32_be(1.0, 0)?;
//! assert_eq!(buf.to_text(Encoding::Hex, None, Some(4)), "3f800000");
//!
//! let text = pool.from_text("abc", Encoding::Utf8)?;
//! assert_eq!(text.index_of(b'b', Offset::Missing, Encoding::Utf8), Some(1));
//! # Ok::<(), bytepool_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod codec;
pub mod encoding;
pub mod error;
pub mod offset;
pub mod ops;
pub mod pool;
pub mod search;
pub mod view;

// Re-export primary types for convenience
pub use codec::Endian;
pub use encoding::Encoding;
pub use error::{Error, ErrorKind, Result};
pub use offset::Offset;
pub use ops::Pattern;
pub use pool::{Arena, Pool, PoolConfig};
pub use search::Needle;
pub use view::{compare, BufferJson, View};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum supported buffer length (2^31 - 1)
pub const MAX_LENGTH: usize = 0x7fff_ffff;

/// Default capacity of each pooled arena
pub const DEFAULT_POOL_SIZE: usize = 8 * 1024;

/// Bytes shown by [`View::inspect`] before eliding the rest
pub const INSPECT_MAX_BYTES: usize = 50;
