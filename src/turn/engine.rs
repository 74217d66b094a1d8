//! Turn orchestration
//!
//! One call to [`TurnEngine::play_turn`] walks the whole pipeline:
//! human order, AI order, adjudication, projection, victory check. The
//! engine owns the game state; nothing outside it writes to the state
//! while a turn is in flight.

use std::time::Duration;

use crate::core::config::GameConfig;
use crate::core::error::{JutlandError, Result};
use crate::fleet::{status_changes, GameState, Side, StatusChange};
use crate::llm::oracle::Oracle;
use crate::turn::projector::{self, ProjectionPolicy};
use crate::turn::referee::{Adjudication, Referee, TurnOrders};
use crate::turn::solicitor::OrderSolicitor;

/// The only control command a player can type instead of orders
pub const EXIT_SENTINEL: &str = "exit";

/// True if the player's input asks to leave the game
pub fn is_exit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_SENTINEL)
}

/// Where the engine is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingHumanOrder,
    AwaitingAiOrder,
    AwaitingAdjudication,
    Projecting,
    CheckingVictory,
    /// Turn complete, game goes on
    Continuing,
    /// No further turns will be played
    Terminated,
}

/// How a game ended by force of arms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    BritishVictory,
    GermanVictory,
    MutualDestruction,
}

impl GameOutcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            GameOutcome::BritishVictory => Some(Side::British),
            GameOutcome::GermanVictory => Some(Side::German),
            GameOutcome::MutualDestruction => None,
        }
    }
}

/// A side with no ship afloat has lost
pub fn check_victory(state: &GameState) -> Option<GameOutcome> {
    let british = state.active_ships(Side::British);
    let german = state.active_ships(Side::German);

    match (british, german) {
        (0, 0) => Some(GameOutcome::MutualDestruction),
        (0, _) => Some(GameOutcome::GermanVictory),
        (_, 0) => Some(GameOutcome::BritishVictory),
        _ => None,
    }
}

/// Result of a turn from the caller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Turn resolved; save the state and play on
    Continuing,
    /// The player typed the exit command; nothing happened
    Exited,
    /// One or both fleets are gone
    GameOver(GameOutcome),
}

/// What happened during a resolved turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub human_side: Side,
    pub orders: TurnOrders,
    /// Referee reply exactly as received
    pub raw_adjudication: String,
    /// The referee's reply could not be decoded; no forces changed
    pub degraded: bool,
    pub changes: Vec<StatusChange>,
}

impl Resolution {
    pub fn human_orders(&self) -> &str {
        self.orders.for_side(self.human_side)
    }

    pub fn ai_orders(&self) -> &str {
        self.orders.for_side(self.human_side.opponent())
    }

    pub fn losses(&self) -> impl Iterator<Item = &StatusChange> {
        self.changes.iter().filter(|c| c.is_loss())
    }
}

/// Everything the caller needs after one `play_turn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    /// Absent when the player exited
    pub resolution: Option<Resolution>,
    /// State after the turn
    pub state: GameState,
}

impl TurnReport {
    /// Whether the caller should write `state` to storage
    pub fn should_persist(&self) -> bool {
        !matches!(self.outcome, TurnOutcome::Exited)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.outcome, TurnOutcome::Continuing)
    }
}

/// Engine knobs drawn from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub human_side: Side,
    pub call_timeout: Duration,
    pub policy: ProjectionPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            human_side: config.human_side(),
            call_timeout: config.call_timeout(),
            policy: config.projection_policy(),
        }
    }
}

/// Drives turns against an oracle
pub struct TurnEngine<O> {
    oracle: O,
    state: GameState,
    settings: EngineSettings,
    phase: TurnPhase,
}

impl<O: Oracle> TurnEngine<O> {
    /// A state that is already decided (e.g. a saved final turn) starts
    /// the engine terminated, so no further turn can be played on it.
    pub fn new(oracle: O, state: GameState, settings: EngineSettings) -> Self {
        let phase = if check_victory(&state).is_some() {
            TurnPhase::Terminated
        } else {
            TurnPhase::AwaitingHumanOrder
        };
        Self {
            oracle,
            state,
            settings,
            phase,
        }
    }

    /// How the game ended, if the current state is a decided one
    pub fn game_over(&self) -> Option<GameOutcome> {
        check_victory(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == TurnPhase::Terminated
    }

    /// Play one full turn with the human's orders
    ///
    /// A failed oracle call aborts the turn with the engine's state exactly
    /// as it was before; the caller decides whether to retry or quit.
    pub async fn play_turn(&mut self, human_order: &str) -> Result<TurnReport> {
        if self.is_terminated() {
            return Err(JutlandError::GameOver);
        }
        self.phase = TurnPhase::AwaitingHumanOrder;

        if is_exit_command(human_order) {
            tracing::info!("Player left the game at turn {}", self.state.turn);
            self.phase = TurnPhase::Terminated;
            return Ok(TurnReport {
                outcome: TurnOutcome::Exited,
                resolution: None,
                state: self.state.clone(),
            });
        }

        match self.resolve(human_order).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!("Turn {} aborted: {}", self.state.turn, e);
                self.phase = TurnPhase::AwaitingHumanOrder;
                Err(e)
            }
        }
    }

    async fn resolve(&mut self, human_order: &str) -> Result<TurnReport> {
        let human_side = self.settings.human_side;
        let ai_side = human_side.opponent();

        self.phase = TurnPhase::AwaitingAiOrder;
        tracing::info!("Turn {}: {} high command is deciding", self.state.turn, ai_side);
        let ai_order = OrderSolicitor::new(ai_side, self.settings.call_timeout)
            .solicit(&self.oracle, &self.state)
            .await?;
        let orders = TurnOrders::new(human_side, human_order.to_string(), ai_order);

        self.phase = TurnPhase::AwaitingAdjudication;
        tracing::info!("Turn {}: referee is resolving", self.state.turn);
        let (adjudication, raw) = Referee::new(self.settings.call_timeout)
            .adjudicate(&self.oracle, &self.state, &orders)
            .await?;

        self.phase = TurnPhase::Projecting;
        let previous = &self.state;
        let (next, degraded) = match &adjudication {
            Adjudication::Resolved(outcome) => (projector::apply(previous, outcome, self.settings.policy), false),
            Adjudication::Degraded { .. } => (projector::apply_degraded(previous, &raw), true),
        };

        let changes: Vec<StatusChange> = [Side::British, Side::German]
            .into_iter()
            .flat_map(|side| status_changes(side, previous.units(side), next.units(side)))
            .collect();

        // A degraded turn changed no ships, so there is nothing new to check
        let outcome = if degraded {
            TurnOutcome::Continuing
        } else {
            self.phase = TurnPhase::CheckingVictory;
            match check_victory(&next) {
                Some(result) => TurnOutcome::GameOver(result),
                None => TurnOutcome::Continuing,
            }
        };

        self.state = next;
        self.phase = match outcome {
            TurnOutcome::Continuing => TurnPhase::Continuing,
            _ => TurnPhase::Terminated,
        };
        tracing::info!(
            turn = self.state.turn,
            degraded,
            outcome = ?outcome,
            "Turn resolved"
        );

        Ok(TurnReport {
            outcome,
            resolution: Some(Resolution {
                human_side,
                orders,
                raw_adjudication: raw,
                degraded,
                changes,
            }),
            state: self.state.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{Ship, ShipStatus, Unit};
    use crate::llm::{CallError, ScriptedOracle};

    fn unit(name: &str, ships: &[(&str, ShipStatus)]) -> Unit {
        Unit::new(
            name,
            "Commander",
            "Sea",
            ships
                .iter()
                .map(|(n, s)| Ship::new(*n, "Cruiser", *s))
                .collect(),
        )
    }

    fn state_with(british: &[(&str, ShipStatus)], german: &[(&str, ShipStatus)]) -> GameState {
        GameState {
            turn: 1,
            date: "1914-08-05".into(),
            summary: "War.".into(),
            german_situation: String::new(),
            british_situation: String::new(),
            german_intel: String::new(),
            british_intel: String::new(),
            german_units: vec![unit("High Seas Fleet", german)],
            british_units: vec![unit("Grand Fleet", british)],
            last_event: String::new(),
        }
    }

    #[test]
    fn test_exit_command_detection() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  EXIT \n"));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command("exit the Bight"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_victory_classification() {
        use ShipStatus::*;
        assert_eq!(
            check_victory(&state_with(&[("A", Sunk)], &[("B", Damaged)])),
            Some(GameOutcome::GermanVictory)
        );
        assert_eq!(
            check_victory(&state_with(&[("A", Operational)], &[("B", Sunk), ("C", Sunk)])),
            Some(GameOutcome::BritishVictory)
        );
        assert_eq!(
            check_victory(&state_with(&[("A", Sunk)], &[("B", Sunk)])),
            Some(GameOutcome::MutualDestruction)
        );
        assert_eq!(
            check_victory(&state_with(&[("A", HeavilyDamaged)], &[("B", Operational)])),
            None
        );
    }

    #[test]
    fn test_outcome_winner() {
        assert_eq!(GameOutcome::BritishVictory.winner(), Some(Side::British));
        assert_eq!(GameOutcome::GermanVictory.winner(), Some(Side::German));
        assert_eq!(GameOutcome::MutualDestruction.winner(), None);
    }

    #[tokio::test]
    async fn test_exit_makes_no_calls() {
        let start = state_with(&[("A", ShipStatus::Operational)], &[("B", ShipStatus::Operational)]);
        let mut engine = TurnEngine::new(ScriptedOracle::new(), start.clone(), EngineSettings::default());

        let report = engine.play_turn(" Exit ").await.unwrap();
        assert_eq!(report.outcome, TurnOutcome::Exited);
        assert!(!report.should_persist());
        assert!(report.resolution.is_none());
        assert_eq!(report.state, start);
        assert_eq!(engine.state(), &start);
        assert_eq!(engine.oracle().call_count(), 0);
        assert_eq!(engine.phase(), TurnPhase::Terminated);

        assert!(matches!(engine.play_turn("attack").await, Err(JutlandError::GameOver)));
    }

    #[tokio::test]
    async fn test_decided_state_starts_terminated() {
        let start = state_with(&[("A", ShipStatus::Damaged)], &[("B", ShipStatus::Sunk)]);
        let mut engine = TurnEngine::new(ScriptedOracle::new(), start.clone(), EngineSettings::default());

        assert_eq!(engine.phase(), TurnPhase::Terminated);
        assert_eq!(engine.game_over(), Some(GameOutcome::BritishVictory));

        assert!(matches!(engine.play_turn("Sortie").await, Err(JutlandError::GameOver)));
        assert_eq!(engine.oracle().call_count(), 0);
        assert_eq!(engine.state(), &start);
        assert_eq!(engine.state().turn, 1);
    }

    #[test]
    fn test_live_state_starts_awaiting_orders() {
        let start = state_with(&[("A", ShipStatus::Operational)], &[("B", ShipStatus::HeavilyDamaged)]);
        let engine = TurnEngine::new(ScriptedOracle::new(), start, EngineSettings::default());
        assert_eq!(engine.phase(), TurnPhase::AwaitingHumanOrder);
        assert_eq!(engine.game_over(), None);
    }

    #[tokio::test]
    async fn test_call_failure_leaves_state_untouched() {
        let start = state_with(&[("A", ShipStatus::Operational)], &[("B", ShipStatus::Operational)]);
        let oracle = ScriptedOracle::new()
            .reply("Hold position.")
            .fail(CallError::Transport("connection refused".into()));
        let mut engine = TurnEngine::new(oracle, start.clone(), EngineSettings::default());

        let result = engine.play_turn("Advance").await;
        assert!(matches!(result, Err(JutlandError::Oracle(CallError::Transport(_)))));
        assert_eq!(engine.state(), &start);
        assert_eq!(engine.phase(), TurnPhase::AwaitingHumanOrder);
        assert!(!engine.is_terminated());
    }

    #[tokio::test]
    async fn test_degraded_turn_continues() {
        let start = state_with(&[("A", ShipStatus::Operational)], &[("B", ShipStatus::Operational)]);
        let oracle = ScriptedOracle::new()
            .reply("Hold position.")
            .reply("Both fleets stayed in harbour.");
        let mut engine = TurnEngine::new(oracle, start.clone(), EngineSettings::default());

        let report = engine.play_turn("Wait").await.unwrap();
        assert_eq!(report.outcome, TurnOutcome::Continuing);
        assert!(report.should_persist());
        let resolution = report.resolution.unwrap();
        assert!(resolution.degraded);
        assert!(resolution.changes.is_empty());
        assert_eq!(engine.state().turn, 2);
        assert_eq!(engine.state().last_event, "Both fleets stayed in harbour.");
        assert_eq!(engine.phase(), TurnPhase::Continuing);
    }

    #[tokio::test]
    async fn test_orders_routed_to_sides() {
        let start = state_with(&[("A", ShipStatus::Operational)], &[("B", ShipStatus::Operational)]);
        let oracle = ScriptedOracle::new()
            .reply("Grand Fleet to sea.")
            .reply(r#"{"narrative": "The Grand Fleet sailed."}"#);
        let mut engine = TurnEngine::new(oracle, start, EngineSettings::default());

        let report = engine.play_turn("Stay in the Jade").await.unwrap();
        let resolution = report.resolution.unwrap();
        assert_eq!(resolution.human_side, Side::German);
        assert_eq!(resolution.human_orders(), "Stay in the Jade");
        assert_eq!(resolution.ai_orders(), "Grand Fleet to sea.");

        let referee_prompt = &engine.oracle().calls()[1].user_prompt;
        assert!(referee_prompt.contains("GERMANY ORDERS:\nStay in the Jade"));
        assert!(referee_prompt.contains("BRITAIN ORDERS:\nGrand Fleet to sea."));
    }
}
