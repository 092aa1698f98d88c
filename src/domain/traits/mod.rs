//! Domain traits - Abstractions for infrastructure implementations

pub mod connection;
pub mod spawner;

pub use connection::Connection;
pub use spawner::Spawner;
