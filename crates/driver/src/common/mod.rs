//! Common types used throughout the transfer source.
//!
//! This module provides the building blocks shared by every other component:
//! 1. **Bit Vectors:** Fixed-width values carried by transfers and signals.
//! 2. **Error Handling:** Error enums for bit vectors, driving, sources, and configuration.

/// Fixed-width bit vectors.
pub mod bits;

/// Error types.
pub mod error;

pub use bits::Bits;
pub use error::{BitsError, ConfigError, DriveError, SourceError};
