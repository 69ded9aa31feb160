//! Lazily expiring key/value map.
//!
//! Every entry gets the same lifetime, counted from its most recent
//! insertion. Expired entries are invisible to all reads immediately; they
//! are physically dropped by opportunistic sweeps on later writes.
//!
//! ```rust
//! use std::time::Duration;
//! use tmap_cache::TimeoutMap;
//! use tmap_core::ManualClock;
//!
//! let clock = ManualClock::new();
//! let mut map = TimeoutMap::with_clock(Duration::from_millis(500), clock.clone()).unwrap();
//! map.put("session", 7);
//! assert_eq!(map.get("session"), Some(&7));
//!
//! clock.advance_millis(500);
//! assert_eq!(map.get("session"), None);
//! assert!(map.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod map;
mod shared;

pub use map::{MapStats, TimeoutMap};
pub use shared::SharedTimeoutMap;
