//! Defaults and environment variable names.

/// Default entry timeout: two hours, the lifetime of the tagset caches.
pub const DEFAULT_TIMEOUT_MS: u64 = 120 * 60 * 1000;

/// Sweep expired entries on mutating calls unless configured otherwise.
pub const DEFAULT_SWEEP_ON_WRITE: bool = true;

/// No preallocation by default.
pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

/// Environment variable overriding the entry timeout (milliseconds).
pub const ENV_TIMEOUT_MS: &str = "TMAP_TIMEOUT_MS";

/// Environment variable toggling the write-time sweep.
pub const ENV_SWEEP_ON_WRITE: &str = "TMAP_SWEEP_ON_WRITE";

/// Environment variable setting the initial map capacity.
pub const ENV_INITIAL_CAPACITY: &str = "TMAP_INITIAL_CAPACITY";
