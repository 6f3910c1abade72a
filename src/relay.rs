//! ==============================================================================
//! relay.rs - blynk cloud relay client
//! ==============================================================================
//!
//! purpose:
//!     pulls the sixteen virtual pins written by the flora firmware from the
//!     blynk http api and folds them into one SensorSnapshot.
//!
//! contract:
//!     - fetch_channel never fails. any transport error, timeout, non-2xx
//!       status or unparseable body is logged and read as 0.0.
//!     - fetch_all_channels fails only when the base url or auth token is
//!       missing, and in that case makes no request at all.
//!     - all pins are requested at once; total latency is that of the
//!       slowest pin, each pin carrying its own deadline.
//!
//! relationships:
//!     - used by: server.rs (api and dashboard handlers)
//!     - uses: scatter.rs (positional join), domain.rs (channel table)
//!
//! upstream url shape (fixed by blynk):
//!
//! ```text
//! {base_url}/{auth_token}/get/{pin}   ->  42.5  |  ["42.5"]
//! ```
//!
//! ==============================================================================

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{ChannelId, SensorSnapshot, CHANNEL_COUNT};
use crate::error::{ChannelFetchError, RelayError};
use crate::scatter;

/// per-pin deadline
pub const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_millis(3000);

pub const BASE_URL_VAR: &str = "BLYNK_BASE_URL";
pub const AUTH_TOKEN_VAR: &str = "BLYNK_AUTH_TOKEN";

/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl RelayClient {
    pub fn new() -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flora-host/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RelayError::Client)?;
        Ok(Self::with_http(http))
    }

    /// wrap an already configured client
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            timeout: DEFAULT_CHANNEL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn channel_url(base_url: &str, auth_token: &str, channel: ChannelId) -> String {
        format!(
            "{}/{}/get/{}",
            base_url.trim_end_matches('/'),
            auth_token,
            channel.pin()
        )
    }

    /// Read one pin, falling back to 0.0 on any failure.
    pub async fn fetch_channel(
        &self,
        base_url: &str,
        auth_token: &str,
        channel: ChannelId,
    ) -> f64 {
        match self.try_fetch_channel(base_url, auth_token, channel).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    channel = %channel,
                    sensor = channel.label(),
                    error = %e,
                    "error fetching sensor, reading as 0"
                );
                0.0
            }
        }
    }

    /// Read one pin, reporting why it failed.
    pub async fn try_fetch_channel(
        &self,
        base_url: &str,
        auth_token: &str,
        channel: ChannelId,
    ) -> Result<f64, ChannelFetchError> {
        let url = Self::channel_url(base_url, auth_token, channel);

        let request = async {
            let response = self
                .http
                .get(&url)
                .header(reqwest::header::CACHE_CONTROL, "no-store")
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(ChannelFetchError::Status(status));
            }

            Ok::<_, ChannelFetchError>(response.bytes().await?)
        };

        let body = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ChannelFetchError::Timeout(self.timeout))??;

        let json: Value = serde_json::from_slice(&body)
            .map_err(|e| ChannelFetchError::Parse(format!("invalid json: {}", e)))?;

        parse_reading(&json).ok_or_else(|| ChannelFetchError::Parse(json.to_string()))
    }

    /// Read all sixteen pins concurrently.
    pub async fn fetch_all_channels(
        &self,
        base_url: &str,
        auth_token: &str,
    ) -> Result<SensorSnapshot, RelayError> {
        check_credentials(base_url, auth_token)?;

        let base_url = base_url.trim();
        let auth_token = auth_token.trim();

        let units = ChannelId::ALL
            .iter()
            .map(|&channel| self.fetch_channel(base_url, auth_token, channel));
        let values = scatter::gather(units).await;

        let readings = <[f64; CHANNEL_COUNT]>::try_from(values).map_err(|values| {
            RelayError::Incomplete { expected: CHANNEL_COUNT, received: values.len() }
        })?;

        let snapshot = SensorSnapshot::from_readings(readings);
        debug!(
            zeros = readings.iter().filter(|v| **v == 0.0).count(),
            "collected {} channels",
            CHANNEL_COUNT
        );
        Ok(snapshot)
    }
}

fn check_credentials(base_url: &str, auth_token: &str) -> Result<(), RelayError> {
    let missing: Vec<&str> = [(BASE_URL_VAR, base_url), (AUTH_TOKEN_VAR, auth_token)]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(RelayError::Configuration(format!(
        "Blynk environment variables not configured: {} missing. \
         Please add {} and {} to your .env file or the [relay] section of flora.toml",
        missing.join(", "),
        BASE_URL_VAR,
        AUTH_TOKEN_VAR
    )))
}

/// Decode a relay body: a bare number, a numeric string, or an array whose
/// first element is one of those.
pub fn parse_reading(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        Value::Array(items) => items.first().and_then(parse_reading),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Longest leading decimal literal, ignoring leading whitespace and any
/// trailing unit suffix ("23.5C" -> 23.5).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
