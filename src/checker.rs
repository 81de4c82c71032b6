use std::time::Duration;

use crate::cache::{CacheEntry, StatusCache};
use crate::config::CheckerConfig;
use crate::error::Result;
use crate::net::{validate_uri, HttpProbe, Probe};

/// Answers "are we online?" with a per-uri cached verdict.
///
/// Each checker owns its cache; share one through an `Arc` to share verdicts.
/// The cache lock is held only around map access, never across a probe, so
/// checks of different uris run in parallel. Two callers racing on the same
/// stale uri may both probe and the later verdict wins.
pub struct ConnectivityChecker<P: Probe = HttpProbe> {
    probe: P,
    cache: StatusCache,
    default_uri: String,
    default_ttl: Duration,
}

impl ConnectivityChecker<HttpProbe> {
    /// Builds a blocking HTTP client; from async code, construct and call the
    /// checker inside a blocking context such as `tokio::task::spawn_blocking`.
    pub fn new() -> Result<Self> {
        Self::from_config(&CheckerConfig::default())
    }

    pub fn from_config(cfg: &CheckerConfig) -> Result<Self> {
        cfg.validate()?;
        let probe = HttpProbe::new(cfg.timeout()?)?;
        Self::with_probe(probe, cfg)
    }
}

impl<P: Probe> ConnectivityChecker<P> {
    /// Uses `cfg` for the default uri and ttl. The timeout is validated but
    /// not applied: an injected probe owns its own deadline.
    pub fn with_probe(probe: P, cfg: &CheckerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            probe,
            cache: StatusCache::new(),
            default_uri: cfg.uri.clone(),
            default_ttl: cfg.ttl()?,
        })
    }

    /// `true` when `uri` answered with a 2xx status, either now or within the
    /// last `ttl`.
    ///
    /// Unreachable targets and non-2xx answers are `Ok(false)`. Invalid input
    /// is an error and leaves the cache untouched.
    pub fn is_online(&self, uri: &str, ttl: Duration) -> Result<bool> {
        let url = validate_uri(uri)?;

        if let Some(status) = self.cache.get_fresh(uri, ttl) {
            tracing::debug!(uri, status, "online: cache hit");
            return Ok(status);
        }

        let status = self.probe.probe(&url)?;
        self.cache.insert(uri, status);
        tracing::debug!(uri, status, "online: probed");
        Ok(status)
    }

    /// `is_online` with this checker's configured uri and ttl.
    pub fn check(&self) -> Result<bool> {
        self.is_online(&self.default_uri, self.default_ttl)
    }

    pub fn cached(&self, uri: &str) -> Option<CacheEntry> {
        self.cache.get(uri)
    }

    pub fn invalidate(&self, uri: &str) -> bool {
        self.cache.remove(uri).is_some()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn default_uri(&self) -> &str {
        &self.default_uri
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

/// Return early from the enclosing function unless `checker.check()` says online.
///
/// ```no_run
/// # fn main() -> Result<(), online::OnlineError> {
/// let checker = online::ConnectivityChecker::new()?;
/// online::skip_unless_online!(checker, Ok(()));
/// // network-dependent work
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! skip_unless_online {
    ($checker:expr) => {
        $crate::skip_unless_online!($checker, ())
    };
    ($checker:expr, $ret:expr) => {
        match $checker.check() {
            Ok(true) => {}
            Ok(false) => {
                eprintln!("skipped: no internet connection");
                return $ret;
            }
            Err(e) => {
                eprintln!("skipped: connectivity check failed: {}", e);
                return $ret;
            }
        }
    };
}
