//! Global atomic counters for taskgate observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters: no allocations, no locking.
pub struct Metrics {
    runs_completed: AtomicU64,
    runs_failed: AtomicU64,
    budget_rejections: AtomicU64,
    tool_calls: AtomicU64,
    tool_denials: AtomicU64,
    escalations: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_completed: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            budget_rejections: AtomicU64::new(0),
            tool_calls: AtomicU64::new(0),
            tool_denials: AtomicU64::new(0),
            escalations: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_completed", "counter incremented");
    }

    pub fn inc_runs_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_failed", "counter incremented");
    }

    pub fn inc_budget_rejections(&self) {
        self.budget_rejections.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "budget_rejections", "counter incremented");
    }

    /// Count an authorized tool call that reached the transport.
    pub fn inc_tool_calls(&self) {
        self.tool_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tool_calls", "counter incremented");
    }

    pub fn inc_tool_denials(&self) {
        self.tool_denials.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tool_denials", "counter incremented");
    }

    /// Count a model decision above the cheapest tier.
    pub fn inc_escalations(&self) {
        self.escalations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "escalations", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_completed = self.runs_completed(),
            runs_failed = self.runs_failed(),
            budget_rejections = self.budget_rejections(),
            tool_calls = self.tool_calls(),
            tool_denials = self.tool_denials(),
            escalations = self.escalations(),
        );
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }

    pub fn budget_rejections(&self) -> u64 {
        self.budget_rejections.load(Ordering::Relaxed)
    }

    pub fn tool_calls(&self) -> u64 {
        self.tool_calls.load(Ordering::Relaxed)
    }

    pub fn tool_denials(&self) -> u64 {
        self.tool_denials.load(Ordering::Relaxed)
    }

    pub fn escalations(&self) -> u64 {
        self.escalations.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_completed.store(0, Ordering::Relaxed);
        self.runs_failed.store(0, Ordering::Relaxed);
        self.budget_rejections.store(0, Ordering::Relaxed);
        self.tool_calls.store(0, Ordering::Relaxed);
        self.tool_denials.store(0, Ordering::Relaxed);
        self.escalations.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_runs_completed();
        m.inc_runs_completed();
        assert_eq!(m.runs_completed(), 2);

        m.inc_tool_denials();
        assert_eq!(m.tool_denials(), 1);
        assert_eq!(m.tool_calls(), 0);

        m.inc_escalations();
        m.inc_budget_rejections();
        assert_eq!(m.escalations(), 1);
        assert_eq!(m.budget_rejections(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_runs_failed();
        m.inc_tool_calls();
        m.inc_escalations();
        m.reset();
        assert_eq!(m.runs_failed(), 0);
        assert_eq!(m.tool_calls(), 0);
        assert_eq!(m.escalations(), 0);
    }
}
