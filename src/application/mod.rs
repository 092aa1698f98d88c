//! Application layer - Dispatch engine
//! 
//! This layer contains:
//! - Errors: Bot and configuration errors
//! - Messaging: Classification, pattern matching, conversations, dispatching

pub mod errors;
pub mod messaging;
