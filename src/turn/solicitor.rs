//! Ask the oracle to command one side
//!
//! The prompt carries only what that side's admiral would know: the shared
//! summary, their own situation, their own surviving forces and their
//! intelligence on the enemy. The model is told plainly that the listed
//! ships are all it has, since nothing else stops it inventing a fleet.

use std::time::Duration;

use crate::fleet::{format_for_oracle, GameState, Side};
use crate::llm::oracle::{call_with_timeout, CallError, Oracle};

/// Plays one side's high command through an oracle
#[derive(Debug, Clone, Copy)]
pub struct OrderSolicitor {
    pub side: Side,
    pub timeout: Duration,
}

impl OrderSolicitor {
    pub fn new(side: Side, timeout: Duration) -> Self {
        Self { side, timeout }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {} commanding the {} in the North Sea, WWI, August 1914. \
             You issue orders to your squadrons and flotillas each turn.",
            self.side.high_command(),
            self.side.navy()
        )
    }

    pub fn user_prompt(&self, state: &GameState) -> String {
        let side = self.side;
        format!(
            "Turn {turn}, {date}.\n\n\
             GENERAL SITUATION:\n{summary}\n\n\
             YOUR SITUATION:\n{situation}\n\n\
             YOUR FORCES ({side} - these are the ONLY units and ships available to you):\n{forces}\n\
             INTELLIGENCE ON THE {enemy} FLEET:\n{intel}\n\n\
             You may only give orders to the units and ships listed above. \
             No reinforcements exist and none will arrive. Do not invent ships or units. \
             What are your orders? Be concise.",
            turn = state.turn,
            date = state.date,
            summary = state.summary,
            situation = state.situation(side),
            side = side,
            forces = format_for_oracle(state.units(side)),
            enemy = side.opponent().to_string().to_uppercase(),
            intel = state.intel(side),
        )
    }

    /// Get this side's orders for the turn; the reply is returned verbatim
    pub async fn solicit<O: Oracle>(&self, oracle: &O, state: &GameState) -> Result<String, CallError> {
        let user_prompt = self.user_prompt(state);
        tracing::debug!(side = %self.side, prompt_len = user_prompt.len(), "Soliciting orders");
        call_with_timeout(oracle, self.timeout, &self.system_prompt(), &user_prompt).await
    }
}
