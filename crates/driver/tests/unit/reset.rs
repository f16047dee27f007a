//! # Reset Coordinator Tests
//!
//! Polarity normalization, local/external merging, and the `areset` flip.

use axis_transfer::reset::{ResetCoordinator, ResetPolarity, ResetState};
use rstest::rstest;

#[rstest]
#[case(ResetPolarity::ActiveHigh, true, true)]
#[case(ResetPolarity::ActiveHigh, false, false)]
#[case(ResetPolarity::ActiveLow, true, false)]
#[case(ResetPolarity::ActiveLow, false, true)]
fn test_polarity_normalizes_raw_level(
    #[case] polarity: ResetPolarity,
    #[case] raw: bool,
    #[case] asserted: bool,
) {
    assert_eq!(polarity.is_asserted(raw), asserted);
}

#[rstest]
#[case(true, ResetPolarity::ActiveHigh)]
#[case(false, ResetPolarity::ActiveLow)]
fn test_active_level_maps_to_polarity(#[case] level: bool, #[case] polarity: ResetPolarity) {
    assert_eq!(ResetPolarity::from_active_level(level), polarity);
}

#[test]
fn test_external_reset_reports_each_transition_once() {
    let mut reset = ResetCoordinator::new(ResetPolarity::ActiveHigh, false);
    assert_eq!(reset.observe_external(false), None);
    assert_eq!(reset.observe_external(true), Some(ResetState::Resetting));
    assert_eq!(reset.observe_external(true), None);
    assert!(reset.is_resetting());
    assert_eq!(reset.observe_external(false), Some(ResetState::Normal));
    assert!(!reset.is_resetting());
}

#[test]
fn test_local_and_external_are_merged() {
    let mut reset = ResetCoordinator::new(ResetPolarity::ActiveHigh, false);
    assert_eq!(reset.set_local(true), Some(ResetState::Resetting));
    // Still held by the local request.
    assert_eq!(reset.observe_external(true), None);
    assert_eq!(reset.set_local(false), None);
    assert!(reset.is_resetting());
    assert_eq!(reset.observe_external(false), Some(ResetState::Normal));
}

#[test]
fn test_areset_inverts_reported_state() {
    // aresetn-style wire: high while the design runs.
    let mut reset = ResetCoordinator::new(ResetPolarity::ActiveHigh, true);
    assert_eq!(reset.state(), ResetState::Normal);
    assert_eq!(reset.observe_external(true), None);
    assert_eq!(reset.observe_external(false), Some(ResetState::Resetting));
    assert_eq!(reset.observe_external(true), Some(ResetState::Normal));
}

#[rstest]
#[case(ResetPolarity::ActiveHigh, false)]
#[case(ResetPolarity::ActiveHigh, true)]
#[case(ResetPolarity::ActiveLow, false)]
#[case(ResetPolarity::ActiveLow, true)]
fn test_reported_state_is_effective_xor_areset(
    #[case] polarity: ResetPolarity,
    #[case] areset: bool,
) {
    let mut reset = ResetCoordinator::new(polarity, areset);
    for raw in [true, false, true, true, false] {
        let _ = reset.observe_external(raw);
        let expected = if reset.effective() ^ areset {
            ResetState::Resetting
        } else {
            ResetState::Normal
        };
        assert_eq!(reset.state(), expected);
    }
}
