//! Error definitions.
//!
//! This module defines the error handling for the transfer source. It provides:
//! 1. **Bit-vector errors:** Malformed literals and values that do not fit a width.
//! 2. **Drive errors:** Width mismatches between a transfer and the bound bus signals.
//! 3. **Source errors:** Failures surfaced to producers awaiting the engine.
//! 4. **Configuration errors:** Problems loading scenarios and binding devices.

use std::io;

use thiserror::Error;

use crate::transfer::Field;

/// Errors raised while building a [`Bits`](crate::common::Bits) value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitsError {
    /// A bit vector must be at least one bit wide.
    #[error("bit vector width must be non-zero")]
    ZeroWidth,

    /// An integer value has set bits above the requested width.
    #[error("value {value:#x} does not fit in {width} bits")]
    Overflow {
        /// The offending value.
        value: u64,
        /// The requested width in bits.
        width: usize,
    },

    /// A literal contains a character that is not a valid digit for its radix.
    #[error("invalid digit {digit:?} in bit-vector literal")]
    InvalidDigit {
        /// The offending character.
        digit: char,
    },

    /// A literal needs more bits than the requested width.
    #[error("literal needs {digits} bits but the vector is {width} bits wide")]
    TooWide {
        /// Number of significant bits in the literal.
        digits: usize,
        /// The requested width in bits.
        width: usize,
    },
}

/// Fatal configuration mismatch raised when a transfer is driven onto a bus.
///
/// These indicate a wiring bug in the surrounding harness and are never
/// recovered from: the current run stops and the error propagates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// A transfer field is not as wide as the signal it is bound to.
    #[error(
        "transfer {transfer:?} field {field} is {actual} bits wide but signal {signal} is {expected} bits"
    )]
    WidthMismatch {
        /// Label of the transfer being driven.
        transfer: String,
        /// The mismatching field.
        field: Field,
        /// Name of the bound signal.
        signal: String,
        /// Declared width of the signal.
        expected: usize,
        /// Width of the value carried by the transfer.
        actual: usize,
    },
}

/// Errors surfaced through a [`SourceHandle`](crate::source::SourceHandle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The engine stopped on a fatal drive error.
    #[error(transparent)]
    Drive(#[from] DriveError),

    /// The engine was torn down; the awaited condition can no longer occur.
    #[error("transfer source was torn down")]
    TornDown,
}

/// Errors raised while loading configuration or scenario files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The JSON document is malformed or does not match the schema.
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A bit-vector literal in the configuration is malformed.
    #[error(transparent)]
    Bits(#[from] BitsError),

    /// A declared signal width is zero.
    #[error("signal {name} is declared with zero width")]
    ZeroWidthSignal {
        /// Name of the signal.
        name: String,
    },
}
