//! Request-level business logic, independent of the HTTP layer.

pub mod chat;
