//! Error types for the bytepool-core library.
//!
//! Every failure is reported synchronously, before any byte of the target
//! buffer is touched. Variants carry enough context to render the valid
//! bounds in their message, and [`Error::kind`] exposes a plain tag for
//! callers that branch on the failure class instead of on message text.

use thiserror::Error;

/// Result type alias for bytepool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all bytepool operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An argument of the wrong kind was supplied (e.g. a missing offset)
    #[error("The \"{name}\" argument must be of type {expected}. Received {received}")]
    InvalidArgumentType {
        /// Name of the offending argument
        name: &'static str,
        /// Description of the accepted kind
        expected: &'static str,
        /// Rendering of what was received
        received: String,
    },

    /// An argument of the right kind carried a disallowed value
    #[error("The argument '{name}' is invalid. Received {received}")]
    InvalidArgumentValue {
        /// Name of the offending argument
        name: &'static str,
        /// Rendering of what was received
        received: String,
    },

    /// An offset, length or value lies outside its valid range
    #[error("The value of \"{name}\" is out of range. It must be {range}. Received {received}")]
    OutOfRange {
        /// Name of the offending argument
        name: &'static str,
        /// Human-readable description of the accepted range
        range: String,
        /// Rendering of what was received
        received: String,
    },

    /// The access needs more bytes than the buffer holds
    #[error("{}", bounds_message(.name))]
    BufferOutOfBounds {
        /// Name of the argument that overflowed, if a specific one did
        name: Option<&'static str>,
    },

    /// The encoding name is not one of the supported encodings or aliases
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// A byte swap was requested on a buffer whose length is not a multiple of the group width
    #[error("Buffer size must be a multiple of {bits}-bits")]
    InvalidBufferSize {
        /// Group width in bits (16, 32 or 64)
        bits: usize,
    },

    /// The requested size exceeds the maximum supported buffer length
    #[error("Cannot create a buffer of {requested} bytes: maximum supported length is {max}")]
    AllocationTooLarge {
        /// Requested size in bytes
        requested: usize,
        /// Maximum supported size in bytes
        max: usize,
    },

    /// The system refused to provide memory for a new arena
    #[error("failed to allocate an arena of {size} bytes")]
    OutOfMemory {
        /// Size of the arena that could not be allocated
        size: usize,
    },
}

fn bounds_message(name: &Option<&'static str>) -> String {
    match name {
        Some(name) => format!("\"{name}\" is outside of buffer bounds"),
        None => "Attempt to access memory outside buffer bounds".to_string(),
    }
}

/// Classification of an [`Error`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::InvalidArgumentType`]
    InvalidArgumentType,
    /// See [`Error::InvalidArgumentValue`]
    InvalidArgumentValue,
    /// See [`Error::OutOfRange`]
    OutOfRange,
    /// See [`Error::BufferOutOfBounds`]
    BufferOutOfBounds,
    /// See [`Error::UnknownEncoding`]
    UnknownEncoding,
    /// See [`Error::InvalidBufferSize`]
    InvalidBufferSize,
    /// See [`Error::AllocationTooLarge`]
    AllocationTooLarge,
    /// See [`Error::OutOfMemory`]
    OutOfMemory,
}

impl Error {
    /// Creates a new argument type error
    pub fn invalid_argument_type(
        name: &'static str,
        expected: &'static str,
        received: impl Into<String>,
    ) -> Self {
        Self::InvalidArgumentType {
            name,
            expected,
            received: received.into(),
        }
    }

    /// Creates a new argument value error
    pub fn invalid_argument_value(name: &'static str, received: impl Into<String>) -> Self {
        Self::InvalidArgumentValue {
            name,
            received: received.into(),
        }
    }

    /// Creates a range error stating the inclusive bounds `[min, max]`
    pub fn out_of_range(
        name: &'static str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        received: impl std::fmt::Display,
    ) -> Self {
        Self::OutOfRange {
            name,
            range: format!(">= {min} and <= {max}"),
            received: received.to_string(),
        }
    }

    /// Creates a range error for a value that had to be an integer
    pub fn not_an_integer(name: &'static str, received: impl std::fmt::Display) -> Self {
        Self::OutOfRange {
            name,
            range: "an integer".to_string(),
            received: received.to_string(),
        }
    }

    /// Creates a bounds error, optionally naming the overflowing argument
    pub fn buffer_out_of_bounds(name: Option<&'static str>) -> Self {
        Self::BufferOutOfBounds { name }
    }

    /// Creates a new unknown encoding error
    pub fn unknown_encoding(name: impl Into<String>) -> Self {
        Self::UnknownEncoding(name.into())
    }

    /// Creates a swap size error for a group of `bytes` bytes
    pub fn invalid_buffer_size(bytes: usize) -> Self {
        Self::InvalidBufferSize { bits: bytes * 8 }
    }

    /// Creates a new allocation size error
    pub fn allocation_too_large(requested: usize, max: usize) -> Self {
        Self::AllocationTooLarge { requested, max }
    }

    /// Creates a new out-of-memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgumentType { .. } => ErrorKind::InvalidArgumentType,
            Self::InvalidArgumentValue { .. } => ErrorKind::InvalidArgumentValue,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::BufferOutOfBounds { .. } => ErrorKind::BufferOutOfBounds,
            Self::UnknownEncoding(_) => ErrorKind::UnknownEncoding,
            Self::InvalidBufferSize { .. } => ErrorKind::InvalidBufferSize,
            Self::AllocationTooLarge { .. } => ErrorKind::AllocationTooLarge,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }

    /// Returns true if this error reports an allocation failure
    ///
    /// Embedders use this to tell resource exhaustion apart from caller mistakes.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            Self::AllocationTooLarge { .. } | Self::OutOfMemory { .. }
        )
    }
}
