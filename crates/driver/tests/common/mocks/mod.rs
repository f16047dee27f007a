//! # Mocks
//!
//! Stand-ins for the device side of a bus.

/// Frame-start detector modelled on a capture block.
pub mod frame_detector;
