//! Turn resolution: order solicitation, adjudication, projection and the
//! engine that sequences them

pub mod engine;
pub mod projector;
pub mod referee;
pub mod solicitor;

pub use engine::{
    check_victory, is_exit_command, EngineSettings, GameOutcome, Resolution, TurnEngine, TurnOutcome,
    TurnPhase, TurnReport, EXIT_SENTINEL,
};
pub use projector::{apply, apply_degraded, ProjectionPolicy};
pub use referee::{
    decode, Adjudication, Referee, RefereeOutcome, ShipStatusUpdate, TurnOrders, UnitLocationUpdate,
};
pub use solicitor::OrderSolicitor;
