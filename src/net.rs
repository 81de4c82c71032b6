use std::time::{Duration, Instant};

use reqwest::Url;

use crate::error::{OnlineError, Result};

pub const DEFAULT_PROBE_URI: &str = "https://www.google.com/generate_204";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Parse a probe target. Only absolute http(s) urls with a host are accepted.
pub fn validate_uri(uri: &str) -> Result<Url> {
    if uri.trim().is_empty() {
        return Err(OnlineError::invalid("the uri is empty"));
    }
    let url = Url::parse(uri)
        .map_err(|e| OnlineError::invalid(format!("the uri '{}' is not valid: {}", uri, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(OnlineError::invalid(format!(
            "the uri '{}' must use http or https, not '{}'",
            uri,
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(OnlineError::invalid(format!("the uri '{}' has no host", uri)));
    }
    Ok(url)
}

/// One reachability attempt against one url.
///
/// `Ok(true)` means a success status came back, `Ok(false)` means the
/// target answered with anything else or could not be reached at all.
/// `Err` is reserved for failures that say nothing about connectivity.
pub trait Probe: Send + Sync {
    fn probe(&self, url: &Url) -> Result<bool>;
}

/// Blocking HTTP GET probe with one overall deadline.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(OnlineError::invalid("the probe timeout must be greater than zero"));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(redirect_policy())
            .build()
            .map_err(OnlineError::Client)?;
        Ok(Self { client, timeout })
    }
}

/// Follow ordinary http(s) redirects, but hand back the 3xx itself on a loop,
/// past `MAX_REDIRECTS` hops, or towards another scheme.
fn redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        let stop = attempt.previous().len() > MAX_REDIRECTS
            || !matches!(attempt.url().scheme(), "http" | "https")
            || attempt.previous().contains(attempt.url());
        if stop {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

impl Probe for HttpProbe {
    fn probe(&self, url: &Url) -> Result<bool> {
        let started = Instant::now();
        tracing::debug!(uri = %url, timeout_ms = self.timeout.as_millis() as u64, "probe: GET");

        // The body is never read; dropping the response discards it.
        match self.client.get(url.clone()).send() {
            Ok(resp) => {
                let status = resp.status();
                tracing::debug!(
                    uri = %url,
                    status = status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "probe: response"
                );
                Ok(status.is_success())
            }
            Err(e) => {
                let verdict = classify(url, e);
                if let Ok(false) = verdict {
                    tracing::debug!(
                        uri = %url,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "probe: unreachable"
                    );
                }
                verdict
            }
        }
    }
}

/// Map a client error onto the probe outcome.
///
/// Offline: deadline exceeded, DNS or connect failure (unreachable host,
/// refused, bad address), failures while sending the request, and redirect
/// trouble caused by the server. The url was validated before sending, so a
/// builder error is never blamed on the caller; it propagates with the rest.
pub fn classify(url: &Url, e: reqwest::Error) -> Result<bool> {
    if let Some(kind) = transport_failure(&e) {
        tracing::debug!(uri = %url, kind, error = %e, "probe: transport failure");
        return Ok(false);
    }
    tracing::warn!(uri = %url, error = %e, "probe: unexpected client error");
    Err(OnlineError::Probe {
        uri: url.to_string(),
        source: e,
    })
}

fn transport_failure(e: &reqwest::Error) -> Option<&'static str> {
    if e.is_timeout() {
        Some("timeout")
    } else if e.is_connect() {
        Some("connect")
    } else if e.is_request() {
        Some("request")
    } else if e.is_body() {
        Some("body")
    } else if e.is_redirect() {
        Some("redirect")
    } else {
        None
    }
}
