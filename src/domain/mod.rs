//! Domain layer - Core dispatch model
//! 
//! This layer contains:
//! - Entities: Messages, commands, listeners and their registries
//! - Traits: Abstractions for infrastructure (Connection, Spawner)

pub mod entities;
pub mod traits;
