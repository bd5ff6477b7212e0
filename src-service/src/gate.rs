//! Frame-rate gating.
//!
//! The frame source's delivery rate varies with device load; a fixed
//! minimum interval between accepted frames yields an approximately stable
//! capture rate without a scheduler of its own. The decision is stateless:
//! the session tracks the last accepted timestamp.

/// Decide whether to accept a frame at `current`.
///
/// Accepts when strictly more than `min_interval` seconds have passed since
/// the last accepted frame, or unconditionally for the first frame of a
/// session (`last_accepted` unset). Rejection is expected throttling, not
/// an error.
pub fn accept(current: f64, last_accepted: Option<f64>, min_interval: f64) -> bool {
    match last_accepted {
        None => true,
        Some(last) => current - last > min_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_always_accepted() {
        assert!(accept(0.0, None, 0.02));
        assert!(accept(123.4, None, 1.0));
    }

    #[test]
    fn test_strict_inequality() {
        // Exactly min_interval apart is rejected
        assert!(!accept(0.02, Some(0.0), 0.02));
        assert!(accept(0.021, Some(0.0), 0.02));
    }

    #[test]
    fn test_acceptance_sequence() {
        let timestamps = [0.0, 0.01, 0.025, 0.05];
        let min_interval = 0.02;
        let mut last_accepted = None;
        let mut accepted = Vec::new();
        for &ts in &timestamps {
            if accept(ts, last_accepted, min_interval) {
                last_accepted = Some(ts);
                accepted.push(ts);
            }
        }
        assert_eq!(accepted, vec![0.0, 0.025, 0.05]);
    }

    #[test]
    fn test_non_monotonic_timestamp_rejected() {
        assert!(!accept(0.5, Some(1.0), 0.02));
    }
}
