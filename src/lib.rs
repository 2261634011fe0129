//! Plan Builder: onboarding wizard, chat assistant session and the proxy
//! server they talk to.

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod inflight;
pub mod llm;
pub mod onboarding;
pub mod projects;
pub mod proxy;
pub mod store;
