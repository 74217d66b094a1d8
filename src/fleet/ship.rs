//! Ships and their damage states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Damage state of a single ship
///
/// Serialized as the lowercase words the referee is asked to use
/// (`"heavily damaged"` keeps its space). Parsing also accepts any case
/// and `_` or `-` in place of the space, since model output drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ShipStatus {
    Operational,
    Damaged,
    HeavilyDamaged,
    Sunk,
}

impl ShipStatus {
    pub const ALL: [ShipStatus; 4] = [
        ShipStatus::Operational,
        ShipStatus::Damaged,
        ShipStatus::HeavilyDamaged,
        ShipStatus::Sunk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShipStatus::Operational => "operational",
            ShipStatus::Damaged => "damaged",
            ShipStatus::HeavilyDamaged => "heavily damaged",
            ShipStatus::Sunk => "sunk",
        }
    }

    pub fn is_sunk(self) -> bool {
        self == ShipStatus::Sunk
    }
}

impl Default for ShipStatus {
    fn default() -> Self {
        Self::Operational
    }
}

impl fmt::Display for ShipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | '-' => ' ',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "operational" => Ok(ShipStatus::Operational),
            "damaged" => Ok(ShipStatus::Damaged),
            "heavily damaged" => Ok(ShipStatus::HeavilyDamaged),
            "sunk" => Ok(ShipStatus::Sunk),
            _ => Err(format!("unknown ship status: {:?}", s)),
        }
    }
}

impl TryFrom<String> for ShipStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShipStatus> for &'static str {
    fn from(status: ShipStatus) -> Self {
        status.as_str()
    }
}

/// A single warship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Unique within its side
    pub name: String,
    /// Ship class, e.g. "Battlecruiser"
    #[serde(rename = "type")]
    pub class: String,
    #[serde(default)]
    pub status: ShipStatus,
}

impl Ship {
    pub fn new(name: impl Into<String>, class: impl Into<String>, status: ShipStatus) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            status,
        }
    }

    /// Anything short of sunk still counts
    pub fn is_afloat(&self) -> bool {
        !self.status.is_sunk()
    }
}
