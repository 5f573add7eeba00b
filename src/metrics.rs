//! Process-wide site metrics.

use std::sync::atomic::{AtomicI64, Ordering};

/// Counter for static-site visits, shared across workers for the lifetime
/// of the process. Explicit state with an explicit reset; handlers receive
/// it through `web::Data`.
#[derive(Debug, Default)]
pub struct SiteMetrics {
    hits: AtomicI64,
}

impl SiteMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> i64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}
