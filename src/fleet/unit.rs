//! Naval units (squadrons, flotillas) and force-level queries

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

use super::ship::{Ship, ShipStatus};
use super::state::Side;

/// A squadron or flotilla under one commander
///
/// Composition is fixed for the whole game; only ship status and the
/// unit's location ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub commander: String,
    pub location: String,
    #[serde(default)]
    pub ships: Vec<Ship>,
}

impl Unit {
    pub fn new(
        name: impl Into<String>,
        commander: impl Into<String>,
        location: impl Into<String>,
        ships: Vec<Ship>,
    ) -> Self {
        Self {
            name: name.into(),
            commander: commander.into(),
            location: location.into(),
            ships,
        }
    }

    pub fn active_ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter().filter(|s| s.is_afloat())
    }

    /// A unit is active while at least one of its ships is afloat
    pub fn is_active(&self) -> bool {
        self.ships.iter().any(Ship::is_afloat)
    }
}

/// Number of ships not sunk across all units
pub fn active_ships(units: &[Unit]) -> usize {
    units.iter().map(|u| u.active_ships().count()).sum()
}

/// Render a force listing for an oracle prompt
///
/// Units with no ship afloat are left out entirely and sunk ships are
/// never listed, so the model has nothing destroyed to refer back to.
pub fn format_for_oracle(units: &[Unit]) -> String {
    let mut out = String::new();

    for unit in units.iter().filter(|u| u.is_active()) {
        let _ = writeln!(
            out,
            "- {} (commander: {}, location: {})",
            unit.name, unit.commander, unit.location
        );
        for ship in unit.active_ships() {
            let _ = writeln!(out, "    * {} [{}] - {}", ship.name, ship.class, ship.status);
        }
    }

    if out.is_empty() {
        out.push_str("- no operational units remain\n");
    }
    out
}

/// A ship whose status differs between two snapshots of the same side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub side: Side,
    pub unit: String,
    pub ship: String,
    pub from: ShipStatus,
    pub to: ShipStatus,
}

impl StatusChange {
    pub fn is_loss(&self) -> bool {
        self.to.is_sunk() && !self.from.is_sunk()
    }
}

/// Diff two snapshots of one side's units, matching ships by name
pub fn status_changes(side: Side, before: &[Unit], after: &[Unit]) -> Vec<StatusChange> {
    let previous: HashMap<&str, ShipStatus> = before
        .iter()
        .flat_map(|u| u.ships.iter())
        .map(|s| (s.name.as_str(), s.status))
        .collect();

    after
        .iter()
        .flat_map(|u| u.ships.iter().map(move |s| (u, s)))
        .filter_map(|(unit, ship)| {
            let from = *previous.get(ship.name.as_str())?;
            (from != ship.status).then(|| StatusChange {
                side,
                unit: unit.name.clone(),
                ship: ship.name.clone(),
                from,
                to: ship.status,
            })
        })
        .collect()
}
