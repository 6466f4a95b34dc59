use cidrtrie_core::constants::{METRIC_DELETES, METRIC_INSERTS, METRIC_LIVE_NODES, METRIC_LOOKUPS};
use cidrtrie_core::{telemetry, PrefixTree};
use std::sync::Mutex;

static SEEN: Mutex<Vec<(String, u64)>> = Mutex::new(Vec::new());

fn record(name: &str, value: u64) {
    SEEN.lock().unwrap().push((name.to_string(), value));
}

// Single test: the recorder is process-wide.
#[test]
fn tree_operations_reach_registered_callback() {
    assert!(telemetry::register_stats_callback(record));
    assert!(telemetry::install());
    // second install is a no-op that reports the first outcome
    assert!(telemetry::install());

    let mut tree = PrefixTree::new();
    tree.add_cidr("10.0.0.0/8", ()).unwrap();
    tree.find_cidr("10.0.0.1").unwrap();
    tree.delete_cidr("10.0.0.0/8").unwrap();

    let seen = SEEN.lock().unwrap();
    let names: Vec<&str> = seen.iter().map(|(n, _)| n.as_str()).collect();
    assert!(names.contains(&METRIC_INSERTS));
    assert!(names.contains(&METRIC_LOOKUPS));
    assert!(names.contains(&METRIC_DELETES));
    // the last gauge update reflects a tree pruned back to its root
    let last_live = seen.iter().rev().find(|(n, _)| n == METRIC_LIVE_NODES).map(|(_, v)| *v);
    assert_eq!(last_live, Some(1));
}
