//! # Common Test Infrastructure


/// Mock devices and signal lookups.
pub mod mocks;
