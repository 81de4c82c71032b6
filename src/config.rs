use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use xdg::BaseDirectories;

use crate::error::{OnlineError, Result};
use crate::net::{validate_uri, DEFAULT_PROBE_URI, DEFAULT_TIMEOUT};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

const XDG_PREFIX: &str = "online";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Probe target used by `ConnectivityChecker::check`.
    pub uri: String,
    /// How long a verdict is served from cache, in seconds.
    pub ttl_secs: f64,
    /// Overall deadline for one probe, in seconds.
    pub timeout_secs: f64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_PROBE_URI.to_string(),
            ttl_secs: DEFAULT_TTL.as_secs_f64(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
        }
    }
}

impl CheckerConfig {
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, String> {
        let cfg: CheckerConfig = toml::from_str(s).map_err(|e| e.to_string())?;
        cfg.validate().map_err(|e| e.to_string())?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| OnlineError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&s).map_err(|message| OnlineError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// `$XDG_CONFIG_HOME/online/config.toml` if it exists, defaults otherwise.
    pub fn discover() -> Result<Self> {
        match Self::discover_path()? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "config: loading");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn discover_path() -> Result<Option<PathBuf>> {
        let xdg = BaseDirectories::with_prefix(XDG_PREFIX).map_err(|e| OnlineError::Xdg {
            message: e.to_string(),
        })?;
        Ok(xdg.find_config_file(CONFIG_FILE))
    }

    pub fn validate(&self) -> Result<()> {
        validate_uri(&self.uri)?;
        self.ttl()?;
        let timeout = secs_to_duration("timeout", self.timeout_secs)?;
        if timeout.is_zero() {
            return Err(OnlineError::invalid("the timeout must be greater than zero"));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Result<Duration> {
        ttl_from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Result<Duration> {
        secs_to_duration("timeout", self.timeout_secs)
    }
}

/// Seconds as given by a user into a ttl. Negative or non-finite values are rejected.
pub fn ttl_from_secs(secs: f64) -> Result<Duration> {
    secs_to_duration("ttl", secs)
}

fn secs_to_duration(what: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        OnlineError::invalid(format!(
            "the {} must be a non-negative number of seconds, got {}",
            what, secs
        ))
    })
}
