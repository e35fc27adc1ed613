use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for reconcile and persistence work.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: i64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            entities: BTreeMap::new(),
            since_ms: Utc::now().timestamp_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Reconciler
    pub reconcile_calls: u64,
    pub records_created: u64,
    pub records_updated: u64,
    pub records_attached: u64,

    // Gateway traffic
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub save_failures: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub reconcile_calls: u64,
    pub records_created: u64,
    pub records_updated: u64,
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub save_failures: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: i64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        entities: m.entities.clone(),
        since_ms: m.since_ms,
    })
}
