//! Request handlers, one module per resource.

pub mod chat;
pub mod deploy;
