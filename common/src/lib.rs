//! Shared building blocks for PixelBridge.
//!
//! ## Architecture
//!
//! - **common** (this crate): types shared by every layer
//! - **bridge-core**: connection monitor, session I/O and configuration
//! - **pixelbridge**: console application wiring everything together

pub mod error;

pub use error::error_location::ErrorLocation;
