//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Shared primitives and utilities for the core runtime."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::time::{Duration, Instant};

/// Convert a duration into whole milliseconds, saturating at `u64::MAX`.
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> u64 {
    duration_to_millis(start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_truncate_sub_millisecond_part() {
        assert_eq!(duration_to_millis(Duration::from_micros(2_999)), 2);
        assert_eq!(duration_to_millis(Duration::from_secs(3)), 3_000);
    }

    #[test]
    fn millis_saturate() {
        assert_eq!(duration_to_millis(Duration::MAX), u64::MAX);
    }
}
