//! An HTTP/1.1 server built directly on raw TCP byte streams.
//!
//! Core library for request parsing, response framing, and the
//! one-task-per-connection server model.

pub mod config;
pub mod http;
pub mod server;
