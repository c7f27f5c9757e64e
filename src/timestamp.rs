use crate::config::TimestampConfig;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Timezone used when none is configured
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Largest accepted clock correction, about 100 years either way
pub const MAX_CLOCK_OFFSET_MS: i64 = 100 * 366 * 24 * 60 * 60 * 1000;

/// Filesystem-safe ISO-8601 layout, milliseconds included
const STAMP_FORMAT: &str = "%Y-%m-%dT%H_%M_%S_%3f";

/// Resolve configured timezone, falling back to UTC on parse errors
pub(crate) fn resolve_timezone(tz_name: &str) -> Tz {
    match tz_name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(
                "Invalid timestamp timezone '{}', falling back to UTC",
                tz_name
            );
            chrono_tz::UTC
        }
    }
}

/// Convert the configured correction, ignoring values beyond the accepted bound
pub(crate) fn resolve_clock_offset(offset_ms: i64) -> ChronoDuration {
    if !(-MAX_CLOCK_OFFSET_MS..=MAX_CLOCK_OFFSET_MS).contains(&offset_ms) {
        warn!(
            "Clock offset {}ms is out of range, ignoring it",
            offset_ms
        );
        return ChronoDuration::zero();
    }
    ChronoDuration::milliseconds(offset_ms)
}

/// Produces the stamps embedded in recording and log filenames.
///
/// Stamps are rendered in a single named timezone with the offset in force at
/// that instant, e.g. `2025-07-10T14_03_22_123-0700`. A fixed clock offset can
/// be applied to correct a host clock known to drift from a reference source.
#[derive(Debug, Clone)]
pub struct TimestampPolicy {
    timezone: Tz,
    clock_offset: ChronoDuration,
    frozen_at: Option<DateTime<Utc>>,
}

impl TimestampPolicy {
    pub fn new(timezone: Tz, clock_offset: ChronoDuration) -> Self {
        Self {
            timezone,
            clock_offset,
            frozen_at: None,
        }
    }

    /// Policy whose clock always reads `instant`, for reproducible stamps
    pub fn frozen(timezone: Tz, instant: DateTime<Utc>) -> Self {
        Self {
            timezone,
            clock_offset: ChronoDuration::zero(),
            frozen_at: Some(instant),
        }
    }

    pub fn from_config(config: &TimestampConfig) -> Self {
        Self::new(
            resolve_timezone(&config.timezone),
            resolve_clock_offset(config.clock_offset_ms),
        )
    }

    /// Format a UTC instant under this policy
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        let corrected = instant
            .checked_add_signed(self.clock_offset)
            .unwrap_or_else(|| {
                warn!(
                    "Clock offset {}ms overflows {}, using uncorrected clock",
                    self.clock_offset.num_milliseconds(),
                    instant
                );
                instant
            });
        let local = corrected.with_timezone(&self.timezone);
        format!("{}{}", local.format(STAMP_FORMAT), local.format("%z"))
    }

    /// Stamp for the current wall-clock time
    pub fn stamp(&self) -> String {
        self.format(self.frozen_at.unwrap_or_else(Utc::now))
    }
}

impl Default for TimestampPolicy {
    fn default() -> Self {
        Self::new(resolve_timezone(DEFAULT_TIMEZONE), ChronoDuration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap() + ChronoDuration::milliseconds(ms)
    }

    #[test]
    fn test_summer_stamp_uses_daylight_offset() {
        let policy = TimestampPolicy::default();
        let stamp = policy.format(instant(2025, 7, 10, 21, 3, 22, 123));
        assert_eq!(stamp, "2025-07-10T14_03_22_123-0700");
    }

    #[test]
    fn test_winter_stamp_uses_standard_offset() {
        let policy = TimestampPolicy::default();
        let stamp = policy.format(instant(2025, 1, 15, 20, 0, 0, 5));
        assert_eq!(stamp, "2025-01-15T12_00_00_005-0800");
    }

    #[test]
    fn test_clock_offset_is_applied() {
        let policy = TimestampPolicy::new(chrono_tz::UTC, ChronoDuration::milliseconds(1500));
        let stamp = policy.format(instant(2025, 3, 1, 0, 0, 0, 0));
        assert_eq!(stamp, "2025-03-01T00_00_01_500+0000");
    }

    #[test]
    fn test_frozen_clock() {
        let policy = TimestampPolicy::frozen(chrono_tz::UTC, instant(2025, 3, 1, 12, 30, 0, 42));
        assert_eq!(policy.stamp(), "2025-03-01T12_30_00_042+0000");
        assert_eq!(policy.stamp(), policy.stamp());
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Mars/Olympus_Mons"), chrono_tz::UTC);
        assert_eq!(resolve_timezone("Europe/Berlin"), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_out_of_range_clock_offset_is_ignored() {
        let config = TimestampConfig {
            timezone: "UTC".to_string(),
            clock_offset_ms: i64::MIN,
        };
        let policy = TimestampPolicy::from_config(&config);
        assert_eq!(
            policy.format(instant(2025, 3, 1, 0, 0, 0, 0)),
            "2025-03-01T00_00_00_000+0000"
        );
        assert_eq!(resolve_clock_offset(MAX_CLOCK_OFFSET_MS + 1), ChronoDuration::zero());
        assert_eq!(
            resolve_clock_offset(-2500),
            ChronoDuration::milliseconds(-2500)
        );
    }

    #[test]
    fn test_overflowing_offset_falls_back_to_uncorrected_clock() {
        let policy = TimestampPolicy::new(
            chrono_tz::UTC,
            ChronoDuration::milliseconds(MAX_CLOCK_OFFSET_MS),
        );
        let near_max = DateTime::<Utc>::MAX_UTC - ChronoDuration::days(1);
        let uncorrected = TimestampPolicy::new(chrono_tz::UTC, ChronoDuration::zero());
        assert_eq!(policy.format(near_max), uncorrected.format(near_max));
    }

    #[test]
    fn test_stamp_is_filesystem_safe() {
        let stamp = TimestampPolicy::default().stamp();
        assert!(!stamp.contains(':'));
        assert!(!stamp.contains('/'));
        assert_eq!(stamp.len(), "2025-07-10T14_03_22_123-0700".len());
    }
}
