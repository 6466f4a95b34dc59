//! Minimal run‑time metrics sink.
//!
//! The tree reports through the `metrics` facade. Hosts that already run a
//! recorder get the numbers for free; everyone else can register a plain
//! callback here and call [`install`] once.

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Recorder, SharedString, Unit};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Receives every metric update as a name/value pair.
pub type StatsCallback = fn(name: &str, value: u64);

static CALLBACK: OnceCell<StatsCallback> = OnceCell::new();

/// Register the callback. Only the first registration sticks.
pub fn register_stats_callback(cb: StatsCallback) -> bool {
    CALLBACK.set(cb).is_ok()
}

/// Forwarding recorder. Uses the callback **if** it was registered.
struct ForwardingRecorder;

#[derive(Clone)]
struct Forwarded {
    key: Key,
}

impl Forwarded {
    fn emit(&self, value: u64) {
        if let Some(cb) = CALLBACK.get() {
            cb(self.key.name(), value);
        }
    }
}

impl Recorder for ForwardingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(Forwarded { key: key.clone() }))
    }
    fn register_gauge(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(Forwarded { key: key.clone() }))
    }
    fn register_histogram(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(Forwarded { key: key.clone() }))
    }
}

impl metrics::CounterFn for Forwarded {
    fn increment(&self, value: u64) {
        self.emit(value);
    }
    fn absolute(&self, value: u64) {
        self.emit(value);
    }
}

impl metrics::GaugeFn for Forwarded {
    fn set(&self, value: f64) {
        self.emit(value as u64);
    }
    fn increment(&self, value: f64) {
        self.emit(value as u64);
    }
    fn decrement(&self, value: f64) {
        self.emit(value as u64);
    }
}

impl metrics::HistogramFn for Forwarded {
    fn record(&self, value: f64) {
        self.emit(value as u64);
    }
}

/// Install the forwarding recorder exactly **once** per process.
/// Returns `false` if some recorder was already in place.
pub fn install() -> bool {
    static INSTALLED: OnceCell<bool> = OnceCell::new();
    *INSTALLED.get_or_init(|| metrics::set_global_recorder(ForwardingRecorder).is_ok())
}
