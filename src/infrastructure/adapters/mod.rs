//! Connection adapters

pub mod slack;
pub mod console;
pub mod memory;

pub use slack::SlackConnection;
pub use console::ConsoleConnection;
pub use memory::MemoryConnection;
