//! Process-wide concurrency policy.

use std::sync::OnceLock;
use std::thread;

/// How many transforms a bounded batch may run at once.
///
/// The shared default is derived from hardware thread count, clamped to
/// 1–255, and forced to 1 when a debugger is attached (interleaved batch
/// output is unreadable under a debugger). Individual conversion runs may
/// override it with [`ConcurrencyPolicy::fixed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConcurrencyPolicy {
    limit: usize,
}

const MAX_LIMIT: usize = 255;

impl ConcurrencyPolicy {
    /// Detects a policy from the current process environment.
    pub fn detect() -> Self {
        if debugger_attached() {
            return Self { limit: 1 };
        }
        let threads = thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            limit: threads.clamp(1, MAX_LIMIT),
        }
    }

    /// The shared process-wide policy, detected once.
    pub fn shared() -> Self {
        static SHARED: OnceLock<ConcurrencyPolicy> = OnceLock::new();
        *SHARED.get_or_init(Self::detect)
    }

    /// A fixed policy for one conversion run (tests, callers with their own
    /// scheduling). Clamped to the same 1–255 range as detection.
    pub fn fixed(limit: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// In-flight admission ceiling for a bounded batch: the concurrent
    /// transforms plus a small completed-but-unconsumed buffer, ~1.25×N.
    pub fn admission_capacity(&self) -> usize {
        self.limit + (self.limit / 4).max(1)
    }
}

/// Best-effort debugger detection. On Linux the tracer pid in
/// `/proc/self/status` is non-zero while ptraced; elsewhere we report none.
fn debugger_attached() -> bool {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if let Some(rest) = line.strip_prefix("TracerPid:") {
                    return rest.trim().parse::<u32>().map_or(false, |pid| pid != 0);
                }
            }
        }
        false
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detected_limit_is_clamped() {
        let policy = ConcurrencyPolicy::detect();
        assert!((1..=MAX_LIMIT).contains(&policy.limit()));
    }

    #[test]
    fn fixed_clamps_extremes() {
        assert_eq!(ConcurrencyPolicy::fixed(0).limit(), 1);
        assert_eq!(ConcurrencyPolicy::fixed(10_000).limit(), MAX_LIMIT);
    }

    #[test]
    fn admission_capacity_exceeds_limit() {
        let policy = ConcurrencyPolicy::fixed(8);
        assert_eq!(policy.admission_capacity(), 10);
        assert!(ConcurrencyPolicy::fixed(1).admission_capacity() > 1);
    }
}
