//! Formatting utilities for CLI output.

use std::time::Duration;

/// Format a large number with commas for readability.
///
/// # Examples
///
/// ```
/// use fl_cli_common::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

/// Format a duration as seconds with millisecond precision.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fl_cli_common::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}
