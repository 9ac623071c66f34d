//! AI coaching — background monitoring of training-session transcripts and
//! periodic generation of coaching feedback.

pub mod analyzer;
pub mod handlers;
mod monitor;
pub mod prompts;
pub mod registry;
pub mod store;
