//! # Driving Engine Tests
//!
//! Per-edge behavior of the source: ordering, idle framing, the pause gate,
//! reset handling, and fatal width mismatches.

use axis_transfer::common::{Bits, DriveError, SourceError};
use axis_transfer::config::SourceConfig;
use axis_transfer::reset::ResetState;
use axis_transfer::source::EdgeOutcome;
use axis_transfer::transfer::{Field, Transfer};
use proptest::prelude::*;

use crate::common::harness::TestBench;

fn beat(name: &str, data: u64) -> Transfer {
    Transfer::new(name)
        .with_data(Bits::from_u64(data, 64).unwrap())
        .with_valid(true)
        .with_last(false)
}

fn driven_name(outcome: &EdgeOutcome) -> Option<&str> {
    match outcome {
        EdgeOutcome::Driven(transfer) => Some(transfer.label()),
        _ => None,
    }
}

#[test]
fn test_new_source_is_idle() {
    let bench = TestBench::default();
    assert!(bench.source.is_idle());
    assert!(bench.source.is_empty());
    assert!(!bench.source.is_active());
    assert_eq!(bench.source.count(), 0);
    assert_eq!(bench.clock(), EdgeOutcome::Idle);
}

#[test]
fn test_one_transfer_per_edge_in_fifo_order() {
    let bench = TestBench::default();
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        bench.source.send_nowait(beat(name, i as u64)).unwrap();
    }
    assert_eq!(bench.source.count(), 3);

    let outcomes = bench.clock_n(4);
    let names: Vec<Option<&str>> = outcomes.iter().map(driven_name).collect();
    assert_eq!(names, vec![Some("a"), Some("b"), Some("c"), None]);
    assert_eq!(outcomes[3], EdgeOutcome::Idle);
    assert_eq!(bench.source.stats().driven, 3);
}

#[test]
fn test_committed_values_hold_until_next_edge() {
    let bench = TestBench::default();
    bench.source.send_nowait(beat("a", 0x1234)).unwrap();
    let _ = bench.clock();

    assert_eq!(bench.value(Field::Data), Some(0x1234));
    assert!(bench.level(Field::Valid));
    assert_eq!(bench.current_name().as_deref(), Some("a"));
    assert!(bench.source.is_active());
}

#[test]
fn test_idle_edge_deasserts_valid_and_last() {
    let bench = TestBench::default();
    bench
        .source
        .send_nowait(beat("end", 7).with_last(true))
        .unwrap();
    let _ = bench.clock();
    assert!(bench.level(Field::Valid));
    assert!(bench.level(Field::Last));

    assert_eq!(bench.clock(), EdgeOutcome::Idle);
    assert!(!bench.level(Field::Valid));
    assert!(!bench.level(Field::Last));
    // Data is not touched by idle framing.
    assert_eq!(bench.value(Field::Data), Some(7));
    assert!(bench.source.is_idle());
}

#[test]
fn test_absent_fields_are_never_written() {
    let bench = TestBench::with_widths(&[(Field::Data, 8), (Field::Last, 1)]);
    bench
        .source
        .send_nowait(
            Transfer::new("no-valid")
                .with_data(Bits::from_u64(9, 8).unwrap())
                .with_valid(true)
                .with_user(Bits::zero(4)),
        )
        .unwrap();
    assert!(matches!(bench.clock(), EdgeOutcome::Driven(_)));
    assert_eq!(bench.value(Field::Data), Some(9));
    assert_eq!(bench.clock(), EdgeOutcome::Idle);
}

#[test]
fn test_unconstrained_controls_are_driven_verbatim() {
    let bench = TestBench::default();
    bench
        .source
        .send_nowait(Transfer::new("odd").with_valid(false).with_last(true))
        .unwrap();
    let _ = bench.clock();
    assert!(!bench.level(Field::Valid));
    assert!(bench.level(Field::Last));
}

#[test]
fn test_pause_holds_transfer_without_asserting_valid() {
    let bench = TestBench::default();
    bench.source.set_paused(true);
    bench.source.send_nowait(beat("held", 1)).unwrap();

    assert_eq!(bench.clock_n(3), vec![EdgeOutcome::Paused; 3]);
    assert!(!bench.level(Field::Valid));
    assert!(bench.source.is_active());
    assert!(!bench.source.is_idle());
    assert_eq!(bench.source.count(), 0);

    bench.source.set_paused(false);
    assert_eq!(driven_name(&bench.clock()), Some("held"));
    assert!(bench.level(Field::Valid));
    assert_eq!(bench.source.stats().paused_edges, 3);
}

#[test]
fn test_paused_source_accepts_enqueues() {
    let bench = TestBench::default();
    bench.source.set_paused(true);
    assert!(bench.source.is_paused());
    bench.source.send_nowait(beat("a", 1)).unwrap();
    bench.source.send_nowait(beat("b", 2)).unwrap();
    let _ = bench.clock();
    assert_eq!(bench.source.count(), 1);
}

#[test]
fn test_pause_generator_gates_each_edge() {
    let bench = TestBench::default();
    for i in 0..3 {
        bench.source.send_nowait(beat(&format!("t{i}"), i)).unwrap();
    }
    bench.source.set_pause_generator([false, true, true, false]);

    let outcomes = bench.clock_n(4);
    assert_eq!(driven_name(&outcomes[0]), Some("t0"));
    assert_eq!(outcomes[1], EdgeOutcome::Paused);
    assert_eq!(outcomes[2], EdgeOutcome::Paused);
    assert_eq!(driven_name(&outcomes[3]), Some("t1"));

    // Exhausted: the gate keeps its last value (open).
    assert_eq!(driven_name(&bench.clock()), Some("t2"));
}

#[test]
fn test_clear_pause_generator_keeps_current_gate() {
    let bench = TestBench::default();
    bench.source.set_pause_generator(std::iter::repeat(true));
    bench.source.send_nowait(beat("a", 0)).unwrap();
    assert_eq!(bench.clock(), EdgeOutcome::Paused);

    bench.source.clear_pause_generator();
    assert!(bench.source.is_paused());
    bench.source.set_paused(false);
    assert_eq!(driven_name(&bench.clock()), Some("a"));
}

#[test]
fn test_clear_discards_pending_only() {
    let bench = TestBench::default();
    bench.source.set_paused(true);
    for i in 0..4 {
        bench.source.send_nowait(beat(&format!("t{i}"), i)).unwrap();
    }
    let _ = bench.clock();

    assert_eq!(bench.source.clear(), 3);
    assert!(bench.source.is_empty());
    bench.source.set_paused(false);
    assert_eq!(driven_name(&bench.clock()), Some("t0"));
    assert_eq!(bench.clock(), EdgeOutcome::Idle);
    assert_eq!(bench.source.stats().discarded, 3);
}

#[test]
fn test_reset_flushes_in_flight_transfer() {
    let bench = TestBench::default();
    bench.source.set_paused(true);
    bench.source.send_nowait(beat("flushed", 0xff)).unwrap();
    bench.source.send_nowait(beat("kept", 0x11)).unwrap();
    assert_eq!(bench.clock(), EdgeOutcome::Paused);

    bench.source.set_local_reset(true);
    assert_eq!(bench.source.reset_state(), ResetState::Resetting);
    assert!(bench.value(Field::Data).is_some_and(|v| v == 0));
    assert!(!bench.level(Field::Valid));

    bench.source.set_paused(false);
    assert_eq!(bench.clock_n(2), vec![EdgeOutcome::Reset; 2]);
    assert_eq!(bench.source.count(), 1);

    bench.source.set_local_reset(false);
    assert_eq!(driven_name(&bench.clock()), Some("kept"));
    assert_eq!(bench.clock(), EdgeOutcome::Idle);

    let stats = bench.source.stats();
    assert_eq!(stats.flushed, 1);
    assert_eq!(stats.reset_edges, 2);
    assert_eq!(stats.driven, 1);
}

#[test]
fn test_reset_zeroes_every_bound_signal() {
    let bench = TestBench::default();
    bench
        .source
        .send_nowait(
            beat("a", u64::MAX)
                .with_keep(Bits::from_u64(0xff, 8).unwrap())
                .with_ready(true),
        )
        .unwrap();
    let _ = bench.clock();
    bench.source.set_local_reset(true);

    let snapshot = bench.source.snapshot();
    assert!(snapshot.signals.values().all(Bits::is_zero));
}

#[test]
fn test_external_reset_wire_is_sampled_each_edge() {
    let bench = TestBench::with_reset("aresetn", &SourceConfig {
        reset_active_level: false,
        ..SourceConfig::default()
    });
    let wire = bench.reset_wire();
    wire.set_bool(true);
    bench.source.send_nowait(beat("a", 1)).unwrap();

    wire.set_bool(false);
    assert_eq!(bench.clock(), EdgeOutcome::Reset);
    assert_eq!(bench.source.count(), 1);

    wire.set_bool(true);
    assert_eq!(driven_name(&bench.clock()), Some("a"));
}

#[test]
fn test_width_mismatch_is_fatal() {
    let bench = TestBench::with_widths(&[(Field::Data, 8), (Field::Valid, 1)]);
    bench
        .source
        .send_nowait(Transfer::new("wide").with_data(Bits::zero(16)).with_valid(true))
        .unwrap();

    let err = bench.source.step().unwrap_err();
    assert!(matches!(
        err,
        DriveError::WidthMismatch {
            field: Field::Data,
            expected: 8,
            actual: 16,
            ..
        }
    ));
    assert!(!bench.level(Field::Valid));
}

#[test]
fn test_teardown_discards_and_rejects() {
    let bench = TestBench::default();
    bench.source.set_paused(true);
    bench.source.send_nowait(beat("a", 0)).unwrap();
    bench.source.send_nowait(beat("b", 0)).unwrap();
    let _ = bench.clock();

    bench.source.stop();
    assert!(bench.source.is_torn_down());
    assert_eq!(bench.source.stats().discarded, 2);
    assert_eq!(bench.clock(), EdgeOutcome::Stopped);
    assert_eq!(
        bench.source.send_nowait(beat("late", 0)),
        Err(SourceError::TornDown)
    );
}

proptest! {
    #[test]
    fn prop_fifo_order_under_random_pauses(
        count in 1usize..12,
        pauses in proptest::collection::vec(any::<bool>(), 0..40),
    ) {
        let bench = TestBench::default();
        for i in 0..count {
            bench.source.send_nowait(beat(&format!("t{i}"), i as u64)).unwrap();
        }
        let edges = pauses.len() + count + 2;
        bench.source.set_pause_generator(pauses.into_iter().chain([false]));

        let mut driven = Vec::new();
        for _ in 0..edges {
            let dequeues_before = bench.source.stats().dequeued;
            let outcome = bench.clock();
            // At most one dequeue per edge.
            prop_assert!(bench.source.stats().dequeued - dequeues_before <= 1);
            if let Some(name) = driven_name(&outcome) {
                driven.push(name.to_owned());
            }
        }

        let expected: Vec<String> = (0..count).map(|i| format!("t{i}")).collect();
        prop_assert_eq!(driven, expected);
        prop_assert!(bench.source.is_idle());
    }
}
