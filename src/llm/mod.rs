//! Language model access: the oracle seam, its HTTP and scripted
//! implementations, and reply decoding helpers

pub mod client;
pub mod codec;
pub mod oracle;
pub mod scripted;

pub use client::LlmClient;
pub use codec::strip_fences;
pub use oracle::{call_with_timeout, CallError, Oracle};
pub use scripted::{RecordedCall, ScriptedOracle};
