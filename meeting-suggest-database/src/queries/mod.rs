//! Queries take a plain connection so they can run inside a caller's transaction.

pub mod meetings;
pub mod suggestions;
