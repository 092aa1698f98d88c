//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Runtime: Task spawners
//! - Adapters: Connections (Slack RTM, console, in-memory)

pub mod config;
pub mod runtime;
pub mod adapters;
