//! Jutland - Turn-based WWI naval wargame refereed by language models

pub mod core;
pub mod fleet;
pub mod llm;
pub mod save;
pub mod turn;
