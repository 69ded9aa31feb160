//! # tmap core
//!
//! Core types, errors, and clocks for the tmap expiring map.
//!
//! This crate provides the building blocks used by the other tmap crates:
//!
//! - **Errors**: `TimeoutMapError` and the `Result` alias
//! - **Clock**: the time source trait, with a real and a manual implementation
//! - **Config**: `TimeoutMapConfig`, loadable from the environment
//! - **Constants**: defaults and environment variable names
//!
//! ## Example
//!
//! ```rust
//! use tmap_core::{Clock, ManualClock, TimeoutMapConfig};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_millis(250));
//! assert_eq!(clock.now() - start, Duration::from_millis(250));
//!
//! let config = TimeoutMapConfig::with_timeout_ms(500);
//! assert!(config.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TimeoutMapConfig;
pub use constants::*;
pub use error::{Result, TimeoutMapError};
