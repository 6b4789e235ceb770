#![allow(dead_code)]

pub use sectionwatch_test_utils::builders;
pub use sectionwatch_test_utils::fake_runner;
pub use sectionwatch_test_utils::{init_tracing, with_timeout};

use std::time::{Duration, Instant};

/// `t0 + ms`, for scripting event arrival times.
pub fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}
