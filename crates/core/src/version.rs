//! Client version negotiation.
//!
//! Executors report their build version on dequeue; the version decides
//! which wire shape of [`crate::models::Job`] they receive.

use chrono::NaiveDate;
use semver::Version;

use crate::errors::QueueError;

/// Payload shape sent back for a dequeued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Baseline,
    V2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientVersion {
    /// No version reported.
    Unspecified,
    /// Local development build.
    Dev,
    /// Continuous build, identified by its build date.
    Insiders(NaiveDate),
    Release(Version),
}

const V2_MIN_RELEASE: (u64, u64, u64) = (4, 3, 0);

fn v2_min_insiders_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 11, 24).unwrap_or(NaiveDate::MIN)
}

impl ClientVersion {
    pub fn parse(raw: &str) -> Result<Self, QueueError> {
        if raw.is_empty() {
            return Ok(ClientVersion::Unspecified);
        }
        if raw == "dev" || raw == "0.0.0+dev" {
            return Ok(ClientVersion::Dev);
        }
        if raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(QueueError::InvalidVersion);
        }
        if let Some(date) = parse_insiders_date(raw) {
            return Ok(ClientVersion::Insiders(date));
        }

        parse_lenient(raw)
            .map(ClientVersion::Release)
            .ok_or(QueueError::InvalidVersion)
    }

    pub fn wire_format(&self) -> WireFormat {
        let v2 = match self {
            ClientVersion::Unspecified => false,
            ClientVersion::Dev => true,
            ClientVersion::Insiders(date) => *date >= v2_min_insiders_date(),
            // 4.3.0-0 是 4.3.0 最小的预发布版本，所以比较数字部分即可
            ClientVersion::Release(v) => (v.major, v.minor, v.patch) >= V2_MIN_RELEASE,
        };

        if v2 {
            WireFormat::V2
        } else {
            WireFormat::Baseline
        }
    }
}

/// Insiders builds look like `<build>_<YYYY-MM-DD>_<sha>`.
fn parse_insiders_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('_');
    let (build, date, sha) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || build.is_empty() || sha.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Accepts an optional `v` prefix and one to three numeric components,
/// e.g. `v4`, `4.3`, `4.3.0-rc.1+build.5`.
fn parse_lenient(raw: &str) -> Option<Version> {
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    let split_at = raw.find(|c| c == '-' || c == '+').unwrap_or(raw.len());
    let (core, rest) = raw.split_at(split_at);

    let mut numbers = [0u64; 3];
    let mut count = 0;
    for part in core.split('.') {
        if count == 3 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        numbers[count] = part.parse().ok()?;
        count += 1;
    }

    let normalized = format!("{}.{}.{}{}", numbers[0], numbers[1], numbers[2], rest);
    Version::parse(&normalized).ok()
}
