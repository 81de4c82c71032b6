//! Cached, time-bounded check for working internet connectivity.
//!
//! ```no_run
//! use std::time::Duration;
//! use online::ConnectivityChecker;
//!
//! # fn main() -> online::Result<()> {
//! let checker = ConnectivityChecker::new()?;
//! if checker.check()? {
//!     // network-dependent work
//! }
//! let api_up = checker.is_online("https://api.github.com", Duration::from_secs(600))?;
//! # let _ = api_up;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod checker;
pub mod config;
pub mod error;
pub mod net;

pub use cache::CacheEntry;
pub use checker::ConnectivityChecker;
pub use config::{ttl_from_secs, CheckerConfig, DEFAULT_TTL};
pub use error::{OnlineError, Result};
pub use net::{HttpProbe, Probe, DEFAULT_PROBE_URI, DEFAULT_TIMEOUT};
