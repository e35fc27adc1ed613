//! Observability: runtime counters and the sink abstraction.
//!
//! Reconcile, load and save paths never touch the counters directly; they
//! emit `MetricsEvent`s through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
