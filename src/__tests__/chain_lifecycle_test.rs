/**
 * @file chain_lifecycle_test.rs
 * @brief Tests for filter chain driving and filter lifecycle
 *
 * This test file covers:
 * - on_create / on_close ordering and counts
 * - Stream handle visibility during passes
 * - FEED_ME and FATAL_ERROR propagation
 * - Consumed-byte verification
 * - Filter removal mid-stream
 */
use crate::{
    AccumulateFilter, BucketBrigade, ChainConfig, ChainError, FilterChain, FilterLifecycle,
    FilterState, FilterStatus, FlushMode, PassThroughFilter, StreamFilter, StreamHandle, StreamMode,
    ToUpperFilter,
};
use std::sync::{Arc, Mutex};

/// Records every hook and what the stream handle looked like during `filter`
#[derive(Default)]
struct Probe {
    state: FilterState,
    events: Arc<Mutex<Vec<String>>>,
    refuse_create: bool,
}

impl Probe {
    fn new(name: &str, events: &Arc<Mutex<Vec<String>>>) -> Self {
        let mut probe = Self {
            events: events.clone(),
            ..Self::default()
        };
        probe.set_name(name.to_string());
        probe
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl StreamFilter for Probe {
    fn state(&self) -> &FilterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn filter(
        &mut self,
        input: &mut BucketBrigade,
        output: &mut BucketBrigade,
        consumed: &mut usize,
        closing: bool,
    ) -> FilterStatus {
        let stream = self.stream().map(|s| s.id());
        self.record(format!("{}:filter closing={} stream={:?}", self.name(), closing, stream));
        crate::pass_through(input, output, consumed)
    }

    fn on_create(&mut self) -> bool {
        self.record(format!("{}:create", self.name()));
        !self.refuse_create
    }

    fn on_close(&mut self) {
        self.record(format!("{}:close", self.name()));
    }
}

/// Returns a fixed status, optionally over-reporting consumed bytes
#[derive(Default)]
struct Scripted {
    state: FilterState,
    status: Option<FilterStatus>,
    extra_consumed: usize,
}

impl StreamFilter for Scripted {
    fn state(&self) -> &FilterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn filter(
        &mut self,
        input: &mut BucketBrigade,
        output: &mut BucketBrigade,
        consumed: &mut usize,
        _closing: bool,
    ) -> FilterStatus {
        let status = crate::pass_through(input, output, consumed);
        *consumed += self.extra_consumed;
        self.status.unwrap_or(status)
    }
}

fn new_chain() -> FilterChain {
    FilterChain::new(
        ChainConfig::new("lifecycle"),
        StreamHandle::new(42, "memory://lifecycle", StreamMode::Write),
    )
    .unwrap()
}

fn events() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn test_hooks_run_in_lifecycle_order() {
    let log = events();
    let mut chain = new_chain();
    chain.append(Box::new(Probe::new("a", &log))).unwrap();
    assert_eq!(chain.lifecycle("a"), Some(FilterLifecycle::Attached));

    chain.run(BucketBrigade::from_bytes(b"data".to_vec()), FlushMode::Normal).unwrap();
    assert_eq!(chain.lifecycle("a"), Some(FilterLifecycle::Filtering));

    chain.close().unwrap();
    assert_eq!(chain.lifecycle("a"), Some(FilterLifecycle::Closed));

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "a:create".to_string(),
            "a:filter closing=false stream=Some(42)".to_string(),
            "a:filter closing=true stream=None".to_string(),
            "a:close".to_string(),
        ]
    );
}

#[test]
fn test_close_runs_on_close_once() {
    let log = events();
    let mut chain = new_chain();
    chain.append(Box::new(Probe::new("a", &log))).unwrap();

    chain.close().unwrap();
    assert!(chain.close().unwrap().is_empty());
    drop(chain);

    let closes = log.lock().unwrap().iter().filter(|e| e.as_str() == "a:close").count();
    assert_eq!(closes, 1);
}

#[test]
fn test_drop_without_close_still_calls_on_close() {
    let log = events();
    let mut chain = new_chain();
    chain.append(Box::new(Probe::new("a", &log))).unwrap();
    drop(chain);

    assert_eq!(*log.lock().unwrap(), vec!["a:create".to_string(), "a:close".to_string()]);
}

#[test]
fn test_incremental_flush_is_not_closing() {
    let log = events();
    let mut chain = new_chain();
    chain.append(Box::new(Probe::new("a", &log))).unwrap();

    chain.run(BucketBrigade::new(), FlushMode::FlushInc).unwrap();
    assert_eq!(log.lock().unwrap()[1], "a:filter closing=false stream=Some(42)");
}

#[test]
fn test_refused_create_aborts_attach() {
    let log = events();
    let mut chain = new_chain();
    let mut probe = Probe::new("picky", &log);
    probe.refuse_create = true;

    let result = chain.append(Box::new(probe));
    assert!(matches!(result, Err(ChainError::CreateFailed { filter }) if filter == "picky"));
    assert!(chain.is_empty());
    assert_eq!(chain.lifecycle("picky"), None);
    assert_eq!(*log.lock().unwrap(), vec!["picky:create".to_string()]);
}

#[test]
fn test_run_after_close_fails() {
    let mut chain = new_chain();
    chain.close().unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"late".to_vec()), FlushMode::Normal);
    assert!(matches!(result, Err(ChainError::Closed { .. })));
    assert!(matches!(
        chain.append(Box::new(PassThroughFilter::new())),
        Err(ChainError::Closed { .. })
    ));
}

#[test]
fn test_feed_me_stops_the_pass() {
    let log = events();
    let mut chain = new_chain();
    chain.append(Box::new(AccumulateFilter::new())).unwrap();
    chain.append(Box::new(Probe::new("downstream", &log))).unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"abc".to_vec()), FlushMode::Normal).unwrap();
    assert_eq!(result.status, FilterStatus::FeedMe);
    assert_eq!(result.consumed, 3);
    assert!(result.output.is_empty());
    assert!(!log.lock().unwrap().iter().any(|e| e.contains(":filter")));

    let flushed = chain.close().unwrap();
    assert_eq!(flushed, b"abc");
}

#[test]
fn test_fatal_error_names_the_filter() {
    let mut chain = new_chain();
    let mut broken = Scripted {
        status: Some(FilterStatus::FatalError),
        ..Scripted::default()
    };
    broken.set_name("broken".to_string());
    chain.append(Box::new(broken)).unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"x".to_vec()), FlushMode::Normal);
    assert!(matches!(result, Err(ChainError::Fatal { filter }) if filter == "broken"));
}

#[test]
fn test_consumed_overflow_detected() {
    let mut chain = new_chain();
    chain
        .append(Box::new(Scripted {
            extra_consumed: 1,
            ..Scripted::default()
        }))
        .unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"four".to_vec()), FlushMode::Normal);
    assert!(matches!(
        result,
        Err(ChainError::ConsumedOverflow {
            consumed: 5,
            available: 4,
            ..
        })
    ));
}

#[test]
fn test_consumed_overflow_detected_downstream() {
    let mut chain = new_chain();
    let mut head = PassThroughFilter::new();
    head.set_name("head".to_string());
    let mut tail = Scripted {
        extra_consumed: 1,
        ..Scripted::default()
    };
    tail.set_name("tail".to_string());
    chain.append(Box::new(head)).unwrap();
    chain.append(Box::new(tail)).unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"four".to_vec()), FlushMode::Normal);
    match result {
        Err(ChainError::ConsumedOverflow {
            filter,
            consumed,
            available,
        }) => {
            assert_eq!(filter, "tail");
            assert_eq!(consumed, 5);
            assert_eq!(available, 4);
        }
        other => panic!("expected consumed overflow, got {:?}", other.map(|r| r.consumed)),
    }
}

#[test]
fn test_consumed_checked_against_each_filter_input() {
    let mut chain = new_chain();
    chain.append(Box::new(AccumulateFilter::new())).unwrap();
    chain.append(Box::new(ToUpperFilter::new())).unwrap();

    let held = chain.run(BucketBrigade::from_bytes(b"ab".to_vec()), FlushMode::Normal).unwrap();
    assert_eq!(held.status, FilterStatus::FeedMe);
    assert_eq!(chain.close().unwrap(), b"AB");
}

#[test]
fn test_consumed_overflow_check_can_be_disabled() {
    let mut chain = FilterChain::new(
        ChainConfig::new("lenient").with_verify_consumed(false),
        StreamHandle::new(1, "memory", StreamMode::Read),
    )
    .unwrap();
    chain
        .append(Box::new(Scripted {
            extra_consumed: 1,
            ..Scripted::default()
        }))
        .unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"four".to_vec()), FlushMode::Normal).unwrap();
    assert_eq!(result.consumed, 5);
    assert_eq!(result.into_bytes(), b"four");
}

#[test]
fn test_prepend_runs_first() {
    let log = events();
    let mut chain = new_chain();
    chain.append(Box::new(Probe::new("second", &log))).unwrap();
    chain.prepend(Box::new(Probe::new("first", &log))).unwrap();

    assert_eq!(chain.names(), vec!["first", "second"]);
}

#[test]
fn test_remove_flushes_through_downstream_filters() {
    let log = events();
    let mut chain = new_chain();
    let mut accumulate = AccumulateFilter::new();
    accumulate.set_name("hold".to_string());
    chain.append(Box::new(accumulate)).unwrap();
    chain.append(Box::new(ToUpperFilter::new())).unwrap();
    chain.append(Box::new(Probe::new("tail", &log))).unwrap();

    let result = chain.run(BucketBrigade::from_bytes(b"quiet".to_vec()), FlushMode::Normal).unwrap();
    assert!(result.output.is_empty());

    let drained = chain.remove("hold").unwrap();
    assert_eq!(drained, b"QUIET");
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.lifecycle("hold"), None);

    let result = chain.run(BucketBrigade::from_bytes(b"loud".to_vec()), FlushMode::Normal).unwrap();
    assert_eq!(result.into_bytes(), b"LOUD");
}

#[test]
fn test_remove_unknown_filter() {
    let mut chain = new_chain();
    let result = chain.remove("ghost");
    assert!(matches!(result, Err(ChainError::NotAttached { filter }) if filter == "ghost"));
}
