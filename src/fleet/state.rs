//! The authoritative world snapshot threaded from turn to turn

use serde::{Deserialize, Serialize};
use std::fmt;

use super::unit::{active_ships, Unit};

/// One of the two belligerents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    British,
    German,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::British => Side::German,
            Side::German => Side::British,
        }
    }

    /// Country name as used in prompts ("Britain orders: ...")
    pub fn country(self) -> &'static str {
        match self {
            Side::British => "Britain",
            Side::German => "Germany",
        }
    }

    pub fn navy(self) -> &'static str {
        match self {
            Side::British => "Royal Navy",
            Side::German => "Kaiserliche Marine",
        }
    }

    pub fn high_command(self) -> &'static str {
        match self {
            Side::British => "British Admiralty",
            Side::German => "German Admiralstab",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::British => "British",
            Side::German => "German",
        })
    }
}

/// Complete game state, persisted as JSON between turns
///
/// Intelligence reports are per-side views of the opponent. `german_intel`
/// is what Germany has been told about Britain and is authored by the
/// referee, never copied from `british_situation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub date: String,
    pub summary: String,
    #[serde(default)]
    pub german_situation: String,
    #[serde(default)]
    pub british_situation: String,
    #[serde(default)]
    pub german_intel: String,
    #[serde(default)]
    pub british_intel: String,
    #[serde(default)]
    pub german_units: Vec<Unit>,
    #[serde(default)]
    pub british_units: Vec<Unit>,
    #[serde(default)]
    pub last_event: String,
}

impl GameState {
    pub fn units(&self, side: Side) -> &[Unit] {
        match side {
            Side::British => &self.british_units,
            Side::German => &self.german_units,
        }
    }

    pub fn units_mut(&mut self, side: Side) -> &mut Vec<Unit> {
        match side {
            Side::British => &mut self.british_units,
            Side::German => &mut self.german_units,
        }
    }

    /// Private situation text for one side
    pub fn situation(&self, side: Side) -> &str {
        match side {
            Side::British => &self.british_situation,
            Side::German => &self.german_situation,
        }
    }

    /// What one side knows about its opponent
    pub fn intel(&self, side: Side) -> &str {
        match side {
            Side::British => &self.british_intel,
            Side::German => &self.german_intel,
        }
    }

    pub fn active_ships(&self, side: Side) -> usize {
        active_ships(self.units(side))
    }
}
