//! Rate-limit headers carried by streaming responses.

use reqwest::header::HeaderMap;
use std::fmt;
use std::time::Duration;

/// `x-ratelimit-*` values reported alongside a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit_requests: Option<u64>,
    pub limit_tokens: Option<u64>,
    pub remaining_requests: Option<u64>,
    pub remaining_tokens: Option<u64>,
    pub reset_requests: Option<ResetTime>,
    pub reset_tokens: Option<ResetTime>,
}

impl RateLimitHeaders {
    /// Extract rate-limit values from response headers. Missing or malformed
    /// values are left as `None`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit_requests: parse_count(headers, "x-ratelimit-limit-requests"),
            limit_tokens: parse_count(headers, "x-ratelimit-limit-tokens"),
            remaining_requests: parse_count(headers, "x-ratelimit-remaining-requests"),
            remaining_tokens: parse_count(headers, "x-ratelimit-remaining-tokens"),
            reset_requests: header_str(headers, "x-ratelimit-reset-requests")
                .map(|s| ResetTime(s.to_string())),
            reset_tokens: header_str(headers, "x-ratelimit-reset-tokens")
                .map(|s| ResetTime(s.to_string())),
        }
    }
}

/// Time until a rate-limit window resets, as sent by the API (e.g. `6m0s`, `20ms`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTime(pub String);

impl ResetTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the value as a duration. Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duration(&self) -> Option<Duration> {
        let mut rest = self.0.trim();
        if rest.is_empty() {
            return None;
        }
        if rest == "0" {
            return Some(Duration::ZERO);
        }

        let is_number = |c: char| c.is_ascii_digit() || c == '.';
        let mut nanos = 0f64;
        while !rest.is_empty() {
            let num_end = rest.find(|c: char| !is_number(c))?;
            if num_end == 0 {
                return None;
            }
            let value: f64 = rest[..num_end].parse().ok()?;
            rest = &rest[num_end..];

            let unit_end = rest.find(is_number).unwrap_or(rest.len());
            let scale = match &rest[..unit_end] {
                "ns" => 1.0,
                "us" | "µs" => 1e3,
                "ms" => 1e6,
                "s" => 1e9,
                "m" => 60e9,
                "h" => 3600e9,
                _ => return None,
            };
            nanos += value * scale;
            rest = &rest[unit_end..];
        }
        Some(Duration::from_nanos(nanos.round() as u64))
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_count(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|s| s.trim().parse().ok())
}
