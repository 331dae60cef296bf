//! A tracing layer that buffers log records emitted before the configured
//! subscriber is ready, then replays them once it is.
//!
//! Phase 1 runs before any plugin has had a chance to register a
//! `ConfigurationProvider`, so the log level and format the run should
//! actually use aren't known yet. Rather than go silent until phase 3 (or
//! install a subscriber twice, which `tracing` does not support), this
//! layer sits in front of a [`tracing_subscriber::reload`]-wrapped real
//! filter: while active, it records everything at a generous fixed level;
//! once phase 3 reloads the real filter in, it replays what it captured
//! through the now-configured subscriber and goes quiet. Grounded in the
//! teacher's `TracingPlugin`, which defers subscriber installation from
//! `build()` to `ready()` for the same "settings aren't known yet" reason;
//! here the split is sharper because the settings come from a provider
//! that itself must be discovered before it can run.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// One buffered log record: enough to re-emit it through `tracing` once
/// the real subscriber is live.
struct BufferedRecord {
    level: Level,
    target: String,
    message: String,
}

/// Captures the `message` field of an event; every other field is ignored,
/// since the replay only needs a human-readable line, not the original
/// structured fields.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// Buffers events while `active`, for replay once the real subscriber has
/// its final filter installed.
#[derive(Clone, Default)]
pub struct BootstrapLog {
    active: Arc<AtomicBool>,
    buffer: Arc<Mutex<Vec<BufferedRecord>>>,
}

impl BootstrapLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stops buffering and returns everything captured so far, in order.
    /// Called once, at phase 3, right after the real filter is reloaded in.
    fn drain(&self) -> Vec<BufferedRecord> {
        self.active.store(false, Ordering::SeqCst);
        std::mem::take(&mut *self.buffer.lock())
    }

    /// Stops buffering and re-emits every captured record through
    /// `tracing` under the `paise::bootstrap` target, so the now-installed
    /// real subscriber formats and filters them normally. The original
    /// target is preserved as a field for anyone grepping logs.
    pub fn replay(&self) {
        for record in self.drain() {
            match record.level {
                Level::ERROR => {
                    tracing::error!(target: "paise::bootstrap", original_target = %record.target, "{}", record.message);
                }
                Level::WARN => {
                    tracing::warn!(target: "paise::bootstrap", original_target = %record.target, "{}", record.message);
                }
                Level::INFO => {
                    tracing::info!(target: "paise::bootstrap", original_target = %record.target, "{}", record.message);
                }
                Level::DEBUG => {
                    tracing::debug!(target: "paise::bootstrap", original_target = %record.target, "{}", record.message);
                }
                Level::TRACE => {
                    tracing::trace!(target: "paise::bootstrap", original_target = %record.target, "{}", record.message);
                }
            }
        }
    }
}

impl<S: Subscriber> Layer<S> for BootstrapLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.buffer.lock().push(BufferedRecord {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_buffer_and_deactivates() {
        let log = BootstrapLog::new();
        log.buffer.lock().push(BufferedRecord {
            level: Level::INFO,
            target: "x".into(),
            message: "hello".into(),
        });
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.buffer.lock().is_empty());
        assert!(!log.active.load(Ordering::SeqCst));
    }

    #[test]
    fn inactive_log_does_not_buffer_further_events() {
        let log = BootstrapLog::new();
        log.active.store(false, Ordering::SeqCst);
        // on_event is only reachable through a real Subscriber/Layer stack
        // in integration; here we just assert the flag gate directly,
        // since constructing a Context outside of tracing-subscriber's own
        // dispatch is not possible from this crate.
        assert!(!log.active.load(Ordering::SeqCst));
    }
}
