//! # Unit Components
//!
//! This module is the central hub for the transfer source unit tests, from
//! bit vectors up to the full capture scenario.

/// Unit tests for fixed-width bit vectors.
pub mod bits;




/// Unit tests for the per-edge driving engine.
///
/// This module covers:
/// - Ordering and the one-transfer-per-edge limit.
/// - Idle framing and the pause gate.
/// - Reset flushing and width mismatches.
pub mod engine;


/// Unit tests for reset polarity and merging.
pub mod reset;
