use std::fmt;
use std::time::Duration;

/// Frame rate used when the host reports a zero numerator or denominator
pub const FALLBACK_FPS: u64 = 30;

/// Active video frame rate as reported by the host (`numerator / denominator` fps)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    fn is_degenerate(&self) -> bool {
        self.numerator == 0 || self.denominator == 0
    }

    /// Milliseconds since the first frame for `frame_index`, rounded down.
    ///
    /// Frame-locked: derived from the index and the configured rate, not from
    /// measured wall-clock time.
    pub fn frame_elapsed_ms(&self, frame_index: u64) -> u64 {
        let scaled = frame_index as u128 * 1000;
        let elapsed = if self.is_degenerate() {
            scaled / FALLBACK_FPS as u128
        } else {
            scaled * self.denominator as u128 / self.numerator as u128
        };
        elapsed.min(u64::MAX as u128) as u64
    }

    /// Duration of a single frame
    pub fn frame_interval(&self) -> Duration {
        if self.is_degenerate() {
            Duration::from_nanos(1_000_000_000 / FALLBACK_FPS)
        } else {
            let nanos = 1_000_000_000u64 * self.denominator as u64 / self.numerator as u64;
            Duration::from_nanos(nanos.max(1))
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(FALLBACK_FPS as u32, 1)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} fps", self.numerator, self.denominator)
    }
}

/// Severity levels of the host's logging facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_frame_rate() {
        let rate = FrameRate::new(30, 1);
        assert_eq!(rate.frame_elapsed_ms(0), 0);
        assert_eq!(rate.frame_elapsed_ms(1), 33);
        assert_eq!(rate.frame_elapsed_ms(2), 66);
        assert_eq!(rate.frame_elapsed_ms(3), 100);
        assert_eq!(rate.frame_elapsed_ms(90), 3000);
    }

    #[test]
    fn test_fractional_frame_rate() {
        // 29.97 fps
        let rate = FrameRate::new(30000, 1001);
        assert_eq!(rate.frame_elapsed_ms(1), 33);
        assert_eq!(rate.frame_elapsed_ms(30), 1001);
        assert_eq!(rate.frame_elapsed_ms(30000), 1_001_000);
    }

    #[test]
    fn test_zero_denominator_falls_back_to_30_fps() {
        let rate = FrameRate::new(60, 0);
        assert_eq!(rate.frame_elapsed_ms(3), 100);
        assert_eq!(rate.frame_interval(), Duration::from_nanos(33_333_333));

        let rate = FrameRate::new(0, 1);
        assert_eq!(rate.frame_elapsed_ms(30), 1000);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(
            FrameRate::new(50, 1).frame_interval(),
            Duration::from_millis(20)
        );
        assert_eq!(FrameRate::default().to_string(), "30/1 fps");
    }
}
