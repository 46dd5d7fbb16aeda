//! Time windows measured in seconds since midnight.

use serde::{Deserialize, Serialize};

/// Seconds in one hour.
pub const SECS_PER_HOUR: i64 = 3_600;

/// Closed interval `[start, end]` of seconds since midnight.
///
/// Windows serialise as a two-element array, `[start, end]`.
///
/// # Examples
///
/// ```
/// use roundsman_core::TimeWindow;
///
/// let window = TimeWindow::from_hours(7, 9);
/// assert_eq!(window.start, 25_200);
/// assert!(window.contains(27_000));
/// assert_eq!(window.span(), 7_200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct TimeWindow {
    /// Earliest permitted service start.
    pub start: i64,
    /// Latest permitted service start.
    pub end: i64,
}

impl TimeWindow {
    /// Construct a window without validation; see [`TimeWindow::is_valid`].
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Construct a window from whole hours since midnight.
    #[must_use]
    pub const fn from_hours(start_hour: i64, end_hour: i64) -> Self {
        Self::new(start_hour * SECS_PER_HOUR, end_hour * SECS_PER_HOUR)
    }

    /// Whether the window is non-negative and `start <= end`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.start >= 0 && self.start <= self.end
    }

    /// Length of the window in seconds, zero for inverted windows.
    #[must_use]
    pub const fn span(&self) -> i64 {
        if self.end > self.start {
            self.end - self.start
        } else {
            0
        }
    }

    /// Whether `secs` lies inside the window, bounds included.
    #[must_use]
    pub const fn contains(&self, secs: i64) -> bool {
        self.start <= secs && secs <= self.end
    }

    /// Smallest window covering both `self` and `other`.
    #[must_use]
    pub fn hull(&self, other: &Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<(i64, i64)> for TimeWindow {
    fn from((start, end): (i64, i64)) -> Self {
        Self::new(start, end)
    }
}

impl From<TimeWindow> for (i64, i64) {
    fn from(window: TimeWindow) -> Self {
        (window.start, window.end)
    }
}

/// Render seconds since midnight as `HH:MM`.
///
/// Values past midnight keep counting hours rather than wrapping.
///
/// # Examples
///
/// ```
/// use roundsman_core::format_clock;
///
/// assert_eq!(format_clock(25_200), "07:00");
/// assert_eq!(format_clock(27_059), "07:30");
/// ```
#[must_use]
pub fn format_clock(secs: i64) -> String {
    let minutes = secs.max(0) / 60;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TimeWindow::new(0, 0), true)]
    #[case(TimeWindow::new(10, 20), true)]
    #[case(TimeWindow::new(20, 10), false)]
    #[case(TimeWindow::new(-5, 10), false)]
    fn validity(#[case] window: TimeWindow, #[case] expected: bool) {
        assert_eq!(window.is_valid(), expected);
    }

    #[rstest]
    fn inverted_window_has_zero_span() {
        assert_eq!(TimeWindow::new(30, 10).span(), 0);
    }

    #[rstest]
    fn hull_covers_both_windows() {
        let hull = TimeWindow::from_hours(7, 9).hull(&TimeWindow::from_hours(5, 8));
        assert_eq!(hull, TimeWindow::from_hours(5, 9));
    }

    #[rstest]
    fn serialises_as_pair() {
        let json = serde_json::to_string(&TimeWindow::new(0, 36_000)).expect("serialise window");
        assert_eq!(json, "[0,36000]");
        let back: TimeWindow = serde_json::from_str("[25200,32400]").expect("parse window");
        assert_eq!(back, TimeWindow::from_hours(7, 9));
    }

    #[rstest]
    #[case(0, "00:00")]
    #[case(68_400, "19:00")]
    #[case(90_000, "25:00")]
    #[case(-10, "00:00")]
    fn clock_formatting(#[case] secs: i64, #[case] expected: &str) {
        assert_eq!(format_clock(secs), expected);
    }
}
