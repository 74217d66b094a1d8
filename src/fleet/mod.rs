//! Force model: ships, units, sides and the game snapshot

pub mod ship;
pub mod state;
pub mod unit;

pub use ship::{Ship, ShipStatus};
pub use state::{GameState, Side};
pub use unit::{active_ships, format_for_oracle, status_changes, StatusChange, Unit};
