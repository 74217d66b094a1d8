//! Adjudicate a turn
//!
//! The referee sees everything: both sides' forces, situations,
//! intelligence and orders. It answers with a JSON payload describing what
//! changed. A reply that will not decode is not an error; the turn still
//! happens, the player just gets the referee's prose without any state
//! changes (a degraded turn).

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::fleet::{format_for_oracle, GameState, ShipStatus, Side};
use crate::llm::codec::strip_fences;
use crate::llm::oracle::{call_with_timeout, CallError, Oracle};

/// Both sides' orders for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOrders {
    pub german: String,
    pub british: String,
}

impl TurnOrders {
    pub fn for_side(&self, side: Side) -> &str {
        match side {
            Side::British => &self.british,
            Side::German => &self.german,
        }
    }

    /// Assemble from the human's and the oracle's orders
    pub fn new(human_side: Side, human: String, ai: String) -> Self {
        match human_side {
            Side::German => Self {
                german: human,
                british: ai,
            },
            Side::British => Self {
                german: ai,
                british: human,
            },
        }
    }
}

/// New status for one ship, keyed by ship name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStatusUpdate {
    pub name: String,
    pub new_status: ShipStatus,
}

/// New location for one unit, keyed by unit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLocationUpdate {
    pub unit_name: String,
    pub new_location: String,
}

/// The decoded adjudication payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereeOutcome {
    pub narrative: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub british_ship_status_updates: Vec<ShipStatusUpdate>,
    #[serde(deserialize_with = "null_as_empty")]
    pub german_ship_status_updates: Vec<ShipStatusUpdate>,
    #[serde(deserialize_with = "null_as_empty")]
    pub british_unit_location_updates: Vec<UnitLocationUpdate>,
    #[serde(deserialize_with = "null_as_empty")]
    pub german_unit_location_updates: Vec<UnitLocationUpdate>,
    pub new_summary: String,
    pub new_date: String,
    pub new_german_situation: String,
    pub new_british_situation: String,
    pub new_german_intelligence_report: String,
    pub new_british_intelligence_report: String,
}

impl RefereeOutcome {
    pub fn ship_updates(&self, side: Side) -> &[ShipStatusUpdate] {
        match side {
            Side::British => &self.british_ship_status_updates,
            Side::German => &self.german_ship_status_updates,
        }
    }

    pub fn location_updates(&self, side: Side) -> &[UnitLocationUpdate] {
        match side {
            Side::British => &self.british_unit_location_updates,
            Side::German => &self.german_unit_location_updates,
        }
    }

    pub fn new_situation(&self, side: Side) -> &str {
        match side {
            Side::British => &self.new_british_situation,
            Side::German => &self.new_german_situation,
        }
    }

    pub fn new_intel(&self, side: Side) -> &str {
        match side {
            Side::British => &self.new_british_intelligence_report,
            Side::German => &self.new_german_intelligence_report,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// What the referee's reply amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjudication {
    /// Payload decoded; the outcome drives the state update
    Resolved(RefereeOutcome),
    /// Payload unusable; only the raw text survives
    Degraded { reason: String },
}

impl Adjudication {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Adjudication::Degraded { .. })
    }
}

/// Decode a referee reply
///
/// Fences are stripped first. A payload with a blank narrative counts as
/// degraded too: without a narrative there is nothing to show the player
/// and no evidence the model understood the schema.
pub fn decode(raw: &str) -> Adjudication {
    match serde_json::from_str::<RefereeOutcome>(strip_fences(raw)) {
        Ok(outcome) if outcome.narrative.trim().is_empty() => Adjudication::Degraded {
            reason: "adjudication has no narrative".into(),
        },
        Ok(outcome) => Adjudication::Resolved(outcome),
        Err(e) => Adjudication::Degraded {
            reason: e.to_string(),
        },
    }
}

/// Referee for one game
#[derive(Debug, Clone, Copy)]
pub struct Referee {
    pub timeout: Duration,
}

impl Referee {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn user_prompt(&self, state: &GameState, orders: &TurnOrders) -> String {
        format!(
            "CURRENT GAME STATE\n\
             Turn: {turn}\n\
             Date: {date}\n\
             Summary: {summary}\n\n\
             GERMAN SITUATION:\n{german_situation}\n\n\
             BRITISH SITUATION:\n{british_situation}\n\n\
             GERMAN INTELLIGENCE (what Germany currently believes about Britain):\n{german_intel}\n\n\
             BRITISH INTELLIGENCE (what Britain currently believes about Germany):\n{british_intel}\n\n\
             GERMAN FORCES:\n{german_forces}\n\
             BRITISH FORCES:\n{british_forces}\n\
             GERMANY ORDERS:\n{german_orders}\n\n\
             BRITAIN ORDERS:\n{british_orders}\n\n\
             {instructions}",
            turn = state.turn,
            date = state.date,
            summary = state.summary,
            german_situation = state.german_situation,
            british_situation = state.british_situation,
            german_intel = state.german_intel,
            british_intel = state.british_intel,
            german_forces = format_for_oracle(&state.german_units),
            british_forces = format_for_oracle(&state.british_units),
            german_orders = orders.german,
            british_orders = orders.british,
            instructions = response_instructions(&state.date),
        )
    }

    /// Ask the oracle to resolve the turn
    ///
    /// Returns the decoded adjudication and the raw reply. Only a failed
    /// call is an error.
    pub async fn adjudicate<O: Oracle>(
        &self,
        oracle: &O,
        state: &GameState,
        orders: &TurnOrders,
    ) -> Result<(Adjudication, String), CallError> {
        let user_prompt = self.user_prompt(state, orders);
        tracing::debug!(prompt_len = user_prompt.len(), "Requesting adjudication");

        let raw = call_with_timeout(oracle, self.timeout, REFEREE_SYSTEM_PROMPT, &user_prompt).await?;
        let adjudication = decode(&raw);
        if let Adjudication::Degraded { reason } = &adjudication {
            tracing::warn!("Could not decode adjudication ({}), using raw reply", reason);
        }
        Ok((adjudication, raw))
    }
}

const REFEREE_SYSTEM_PROMPT: &str = "You are a realistic WWI naval wargame referee. \
Evaluate both sides' orders and determine outcomes based on historical naval doctrine, \
ship capabilities, weather and chance. You are impartial and you know the true positions \
of all forces; the players do not.";

fn response_instructions(date: &str) -> String {
    format!(
        r#"Resolve this turn and respond ONLY with valid JSON in exactly this format:
{{
  "narrative": "Objective description of what happened this turn",
  "british_ship_status_updates": [{{"name": "exact ship name", "new_status": "operational|damaged|heavily damaged|sunk"}}],
  "german_ship_status_updates": [{{"name": "exact ship name", "new_status": "operational|damaged|heavily damaged|sunk"}}],
  "british_unit_location_updates": [{{"unit_name": "exact unit name", "new_location": "where the unit is now"}}],
  "german_unit_location_updates": [{{"unit_name": "exact unit name", "new_location": "where the unit is now"}}],
  "new_summary": "Updated general situation for next turn, known to both sides",
  "new_date": "YYYY-MM-DD, a few days after {date}",
  "new_german_situation": "Germany's own situation as Germany sees it",
  "new_british_situation": "Britain's own situation as Britain sees it",
  "new_german_intelligence_report": "What Germany has learned about British forces",
  "new_british_intelligence_report": "What Britain has learned about German forces"
}}

Rules:
- The narrative reports only objective facts, no speculation.
- Only reference units and ships listed above, using their exact names.
- new_status must be exactly one of: operational, damaged, heavily damaged, sunk.
- Add a location update for every unit that moved.
- Leave an update list empty ([]) when nothing in it changed.
- Intelligence reports must be imprecise and partial: each side learns only what it could
  plausibly observe or intercept about the enemy (sightings, wireless traffic, reports from
  neutral shipping), never the full truth. Each side has full clarity on its own forces.
- Be concise and realistic."#,
        date = date
    )
}
