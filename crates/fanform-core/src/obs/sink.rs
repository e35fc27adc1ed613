//! Metrics sink boundary.
//!
//! Runtime code MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Reconciled {
        entity: &'static str,
        created: u64,
        updated: u64,
        attached: u64,
    },
    Loaded {
        entity: &'static str,
        rows: u64,
    },
    Saved {
        entity: &'static str,
        records: u64,
        failures: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::Reconciled {
                entity,
                created,
                updated,
                attached,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.reconcile_calls = m.ops.reconcile_calls.saturating_add(1);
                    m.ops.records_created = m.ops.records_created.saturating_add(created);
                    m.ops.records_updated = m.ops.records_updated.saturating_add(updated);
                    m.ops.records_attached = m.ops.records_attached.saturating_add(attached);

                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.reconcile_calls = entry.reconcile_calls.saturating_add(1);
                    entry.records_created = entry.records_created.saturating_add(created);
                    entry.records_updated = entry.records_updated.saturating_add(updated);
                });
            }

            MetricsEvent::Loaded { entity, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows);

                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.rows_loaded = entry.rows_loaded.saturating_add(rows);
                });
            }

            MetricsEvent::Saved {
                entity,
                records,
                failures,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_saved = m.ops.rows_saved.saturating_add(records);
                    m.ops.save_failures = m.ops.save_failures.saturating_add(failures);

                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.rows_saved = entry.rows_saved.saturating_add(records);
                    entry.save_failures = entry.save_failures.saturating_add(failures);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
