//! Apply an adjudication to the game state
//!
//! Projection is pure: the input state is never touched and the same
//! outcome applied to the same state always gives the same result.

use std::collections::HashMap;

use crate::fleet::{GameState, ShipStatus, Side, Unit};
use crate::turn::referee::RefereeOutcome;

/// How far to trust the referee's status transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectionPolicy {
    /// Apply every transition as given, including raising a sunk ship
    #[default]
    Permissive,
    /// Ignore any transition out of `sunk`
    Strict,
}

/// Produce the next state from a decoded outcome
pub fn apply(state: &GameState, outcome: &RefereeOutcome, policy: ProjectionPolicy) -> GameState {
    let mut next = state.clone();

    for side in [Side::British, Side::German] {
        apply_ship_updates(next.units_mut(side), outcome, side, policy);
        apply_location_updates(next.units_mut(side), outcome, side);
    }

    next.date = outcome.new_date.clone();
    next.german_situation = outcome.new_situation(Side::German).to_string();
    next.british_situation = outcome.new_situation(Side::British).to_string();
    next.german_intel = outcome.new_intel(Side::German).to_string();
    next.british_intel = outcome.new_intel(Side::British).to_string();
    // The summary is never left empty
    if !outcome.new_summary.trim().is_empty() {
        next.summary = outcome.new_summary.clone();
    }

    next.turn += 1;
    next.last_event = outcome.narrative.clone();
    next
}

/// Advance a turn whose adjudication could not be decoded
///
/// Only the turn counter and the last event change.
pub fn apply_degraded(state: &GameState, raw: &str) -> GameState {
    let mut next = state.clone();
    next.turn += 1;
    next.last_event = raw.to_string();
    next
}

fn apply_ship_updates(units: &mut [Unit], outcome: &RefereeOutcome, side: Side, policy: ProjectionPolicy) {
    // Later entries overwrite earlier ones for the same ship
    let updates: HashMap<&str, ShipStatus> = outcome
        .ship_updates(side)
        .iter()
        .map(|u| (u.name.as_str(), u.new_status))
        .collect();
    if updates.is_empty() {
        return;
    }

    let mut matched = 0;
    for ship in units.iter_mut().flat_map(|u| u.ships.iter_mut()) {
        let Some(&new_status) = updates.get(ship.name.as_str()) else {
            continue;
        };
        matched += 1;

        if policy == ProjectionPolicy::Strict && ship.status.is_sunk() && !new_status.is_sunk() {
            tracing::warn!(
                ship = %ship.name,
                requested = %new_status,
                "Ignoring attempt to raise a sunk ship"
            );
            continue;
        }
        ship.status = new_status;
    }

    if matched < updates.len() {
        tracing::debug!(
            side = %side,
            unmatched = updates.len() - matched,
            "Some ship updates named no known ship"
        );
    }
}

fn apply_location_updates(units: &mut [Unit], outcome: &RefereeOutcome, side: Side) {
    let updates: HashMap<&str, &str> = outcome
        .location_updates(side)
        .iter()
        .map(|u| (u.unit_name.as_str(), u.new_location.as_str()))
        .collect();

    for unit in units.iter_mut() {
        if let Some(location) = updates.get(unit.name.as_str()) {
            unit.location = location.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Ship;
    use crate::turn::referee::{ShipStatusUpdate, UnitLocationUpdate};
    use proptest::prelude::*;

    fn state() -> GameState {
        GameState {
            turn: 1,
            date: "1914-08-05".into(),
            summary: "War declared.".into(),
            german_situation: "g-sit".into(),
            british_situation: "b-sit".into(),
            german_intel: "g-intel".into(),
            british_intel: "b-intel".into(),
            german_units: vec![Unit::new(
                "I Scouting Group",
                "Rear-Admiral Hipper",
                "Jade Roads",
                vec![
                    Ship::new("SMS Seydlitz", "Battlecruiser", ShipStatus::Operational),
                    Ship::new("SMS Blücher", "Armoured cruiser", ShipStatus::Damaged),
                ],
            )],
            british_units: vec![
                Unit::new(
                    "1st Battlecruiser Squadron",
                    "Vice-Admiral Beatty",
                    "Rosyth",
                    vec![Ship::new("HMS Lion", "Battlecruiser", ShipStatus::Operational)],
                ),
                Unit::new(
                    "Harwich Force",
                    "Commodore Tyrwhitt",
                    "Harwich",
                    vec![Ship::new("HMS Arethusa", "Light cruiser", ShipStatus::Sunk)],
                ),
            ],
            last_event: "Mobilisation.".into(),
        }
    }

    fn ship_update(name: &str, status: ShipStatus) -> ShipStatusUpdate {
        ShipStatusUpdate {
            name: name.into(),
            new_status: status,
        }
    }

    fn location_update(unit: &str, location: &str) -> UnitLocationUpdate {
        UnitLocationUpdate {
            unit_name: unit.into(),
            new_location: location.into(),
        }
    }

    fn outcome() -> RefereeOutcome {
        RefereeOutcome {
            narrative: "Blücher was lost at the Dogger Bank.".into(),
            german_ship_status_updates: vec![ship_update("SMS Blücher", ShipStatus::Sunk)],
            british_unit_location_updates: vec![location_update("1st Battlecruiser Squadron", "Dogger Bank")],
            new_summary: "The Germans retire.".into(),
            new_date: "1914-08-09".into(),
            new_german_situation: "g-sit-2".into(),
            new_british_situation: "b-sit-2".into(),
            new_german_intelligence_report: "g-intel-2".into(),
            new_british_intelligence_report: "b-intel-2".into(),
            ..RefereeOutcome::default()
        }
    }

    #[test]
    fn test_full_projection() {
        let before = state();
        let after = apply(&before, &outcome(), ProjectionPolicy::Permissive);

        assert_eq!(after.turn, 2);
        assert_eq!(after.date, "1914-08-09");
        assert_eq!(after.summary, "The Germans retire.");
        assert_eq!(after.german_situation, "g-sit-2");
        assert_eq!(after.british_situation, "b-sit-2");
        assert_eq!(after.german_intel, "g-intel-2");
        assert_eq!(after.british_intel, "b-intel-2");
        assert_eq!(after.last_event, "Blücher was lost at the Dogger Bank.");
        assert_eq!(after.german_units[0].ships[1].status, ShipStatus::Sunk);
        assert_eq!(after.german_units[0].ships[0].status, ShipStatus::Operational);
        assert_eq!(after.british_units[0].location, "Dogger Bank");
        assert_eq!(after.british_units[1].location, "Harwich");

        // input untouched
        assert_eq!(before, state());
    }

    #[test]
    fn test_unmatched_ship_name_changes_nothing() {
        let mut outcome = outcome();
        outcome.german_ship_status_updates = vec![ship_update("SMS Nonexistent", ShipStatus::Sunk)];
        outcome.british_ship_status_updates = vec![ship_update("SMS Seydlitz", ShipStatus::Sunk)];

        let after = apply(&state(), &outcome, ProjectionPolicy::Permissive);
        assert_eq!(after.german_units[0].ships, state().german_units[0].ships);
        assert_eq!(after.british_units[0].ships, state().british_units[0].ships);
    }

    #[test]
    fn test_matched_ship_changes_only_status() {
        let mut outcome = RefereeOutcome {
            narrative: "x".into(),
            ..RefereeOutcome::default()
        };
        outcome.british_ship_status_updates = vec![ship_update("HMS Lion", ShipStatus::HeavilyDamaged)];

        let after = apply(&state(), &outcome, ProjectionPolicy::Permissive);
        let lion = &after.british_units[0].ships[0];
        assert_eq!(lion.status, ShipStatus::HeavilyDamaged);
        assert_eq!(lion.class, "Battlecruiser");
        assert_eq!(after.british_units[0].ships.len(), 1);
        assert_eq!(after.british_units[1], state().british_units[1]);
    }

    #[test]
    fn test_unmatched_unit_name_changes_nothing() {
        let mut outcome = outcome();
        outcome.british_unit_location_updates = vec![location_update("Grand Fleet", "Scapa Flow")];
        outcome.german_unit_location_updates = vec![location_update("Harwich Force", "Jade")];

        let after = apply(&state(), &outcome, ProjectionPolicy::Permissive);
        assert_eq!(after.british_units[0].location, "Rosyth");
        assert_eq!(after.british_units[1].location, "Harwich");
        assert_eq!(after.german_units[0].location, "Jade Roads");
    }

    #[test]
    fn test_duplicate_updates_last_wins() {
        let mut outcome = outcome();
        outcome.german_ship_status_updates = vec![
            ship_update("SMS Seydlitz", ShipStatus::Sunk),
            ship_update("SMS Seydlitz", ShipStatus::HeavilyDamaged),
        ];
        outcome.british_unit_location_updates = vec![
            location_update("Harwich Force", "Texel"),
            location_update("Harwich Force", "Terschelling"),
        ];

        let after = apply(&state(), &outcome, ProjectionPolicy::Permissive);
        assert_eq!(after.german_units[0].ships[0].status, ShipStatus::HeavilyDamaged);
        assert_eq!(after.british_units[1].location, "Terschelling");
    }

    #[test]
    fn test_permissive_allows_raising_sunk_ship() {
        let mut outcome = outcome();
        outcome.british_ship_status_updates = vec![ship_update("HMS Arethusa", ShipStatus::Damaged)];

        let after = apply(&state(), &outcome, ProjectionPolicy::Permissive);
        assert_eq!(after.british_units[1].ships[0].status, ShipStatus::Damaged);
    }

    #[test]
    fn test_strict_refuses_raising_sunk_ship() {
        let mut outcome = outcome();
        outcome.british_ship_status_updates = vec![
            ship_update("HMS Arethusa", ShipStatus::Damaged),
            ship_update("HMS Lion", ShipStatus::Damaged),
        ];

        let after = apply(&state(), &outcome, ProjectionPolicy::Strict);
        assert_eq!(after.british_units[1].ships[0].status, ShipStatus::Sunk);
        assert_eq!(after.british_units[0].ships[0].status, ShipStatus::Damaged);
    }

    #[test]
    fn test_scalars_replaced_wholesale_except_blank_summary() {
        let outcome = RefereeOutcome {
            narrative: "Quiet day.".into(),
            new_date: "1914-08-07".into(),
            new_german_situation: "  ".into(),
            ..RefereeOutcome::default()
        };
        let after = apply(&state(), &outcome, ProjectionPolicy::Permissive);
        assert_eq!(after.date, "1914-08-07");
        assert_eq!(after.summary, "War declared.");
        assert_eq!(after.german_situation, "  ");
        assert_eq!(after.british_situation, "");
        assert_eq!(after.german_intel, "");
        assert_eq!(after.british_intel, "");
    }

    #[test]
    fn test_degraded_changes_only_turn_and_event() {
        let before = state();
        let after = apply_degraded(&before, "Garbled signal from the referee");

        assert_eq!(after.turn, before.turn + 1);
        assert_eq!(after.last_event, "Garbled signal from the referee");
        let mut expected = before.clone();
        expected.turn = after.turn;
        expected.last_event = after.last_event.clone();
        assert_eq!(after, expected);
    }

    proptest! {
        #[test]
        fn prop_projection_is_repeatable(
            sink_seydlitz in any::<bool>(),
            lion_moves in any::<bool>(),
            narrative in "[A-Za-z ]{1,30}",
        ) {
            let mut outcome = outcome();
            outcome.narrative = narrative;
            if sink_seydlitz {
                outcome.german_ship_status_updates.push(ship_update("SMS Seydlitz", ShipStatus::Sunk));
            }
            if !lion_moves {
                outcome.british_unit_location_updates.clear();
            }

            let before = state();
            let first = apply(&before, &outcome, ProjectionPolicy::Permissive);
            let second = apply(&before, &outcome, ProjectionPolicy::Permissive);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.turn, before.turn + 1);
            prop_assert_eq!(before, state());
        }
    }
}
