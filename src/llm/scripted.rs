//! Canned oracle for tests and offline dry runs
//!
//! Replies are handed out in order; every prompt pair is recorded so tests
//! can check what the model would have been told.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::oracle::{CallError, Oracle};

/// One recorded oracle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Oracle that plays back a fixed script of replies
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, CallError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failed call
    pub fn fail(self, error: CallError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, CallError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Every request made so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn next_reply(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CallError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            });
        }

        self.replies
            .lock()
            .map_err(|_| CallError::Unavailable("script lock poisoned".into()))?
            .pop_front()
            .unwrap_or_else(|| Err(CallError::Unavailable("script exhausted".into())))
    }
}

impl Oracle for ScriptedOracle {
    async fn call(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CallError> {
        self.next_reply(system_prompt, user_prompt)
    }
}
