//! The oracle seam
//!
//! Everything that asks a language model for text goes through [`Oracle`].
//! One blocking round-trip per call, no retries and no streaming. The HTTP
//! implementation lives in `client`, a canned one for tests in `scripted`.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why an oracle call produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("empty response")]
    EmptyResponse,

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// A text-in, text-out reasoning service
pub trait Oracle {
    /// Send one system/user prompt pair and wait for the reply text
    fn call(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, CallError>> + Send;
}

/// Run an oracle call with a bounded wait; expiry counts as a failed call
pub async fn call_with_timeout<O: Oracle>(
    oracle: &O,
    timeout: Duration,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, CallError> {
    match tokio::time::timeout(timeout, oracle.call(system_prompt, user_prompt)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Oracle call exceeded {:?}", timeout);
            Err(CallError::Timeout(timeout))
        }
    }
}
