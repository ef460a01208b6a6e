//! Error types for fastvector
//!
//! This module provides error types for the two fallible surfaces of the
//! crate:
//! - Decode errors (traversing an opcode stream)
//! - Envelope errors (reading a `.fv` file)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations. Builder misuse (events issued outside the
//! writer state machine) is a programming error and panics instead of
//! returning one of these.

use thiserror::Error;

/// Result type alias for fastvector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for fastvector
///
/// Covers every failure the crate can surface. Each variant wraps the more
/// specific error type for that subsystem.
#[derive(Error, Debug)]
pub enum Error {
  /// Opcode stream decoding error
  #[error("Decode error: {0}")]
  Decode(#[from] DecodeError),

  /// File envelope error
  #[error("Envelope error: {0}")]
  Envelope(#[from] EnvelopeError),

  /// I/O error (file reading, etc.)
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors raised while decoding an opcode stream
///
/// All of these are fatal to the current traversal: the visitor may have
/// already received a prefix of events, but no further events follow an
/// error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  /// A read ran past the end of the byte or float stream
  #[error("truncated stream")]
  Truncated,

  /// An opcode byte fell in no defined category
  #[error("bad opcode byte {0:#04x}")]
  BadOpcode(u8),

  /// An END_GROUP arrived at group depth 0
  #[error("END_GROUP at group depth 0")]
  UnexpectedEndGroup,

  /// Group depth was non-zero when the stream ended
  #[error("unbalanced groups: depth {0} at end of stream")]
  UnbalancedGroups(usize),

  /// A gradient stop claimed to contain another gradient
  #[error("gradient stop color may not itself be a gradient")]
  BadGradientStopColor,

  /// A back-reference index was not strictly less than the count of
  /// previously decoded entities of its kind
  #[error("back-reference {index} out of range (only {count} seen)")]
  BadBackReference { index: usize, count: usize },

  /// A byte that should select an enum value selected nothing
  #[error("invalid {what} value {value}")]
  BadEnumValue { what: &'static str, value: u8 },

  /// A MASKED_CHILD or END_MASKED arrived outside a mask bracket
  #[error("mask bracket code out of sequence")]
  MisplacedMaskCode,

  /// The stream declared a different entity count than it contained
  #[error("expected {expected} {kind}, stream produced {found}")]
  WrongEntityCount {
    kind: &'static str,
    expected: usize,
    found: usize,
  },

  /// The stream ended with unconsumed bytes, args or transforms
  #[error("trailing data after final opcode")]
  TrailingData,
}

/// Errors raised while reading a `.fv` file envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
  /// The magic number did not match
  #[error("bad magic number {0:#010x}")]
  MalformedHeader(u32),

  /// The file's version is newer than this reader supports
  #[error("unsupported version {found} (newest supported is {supported})")]
  UnsupportedVersion { found: u16, supported: u16 },

  /// The envelope ended before its declared contents
  #[error("truncated envelope")]
  Truncated,

  /// A string table entry was not valid UTF-8
  #[error("string table entry is not valid UTF-8")]
  BadString,

  /// Body decoding failed below the header
  #[error(transparent)]
  Decode(#[from] DecodeError),
}
