//! Parley application layer: shared state, REST router and CLI commands.
//!
//! The `parley` binary in `main.rs` is a thin dispatcher over this library;
//! integration tests drive [`http::router::build_router`] directly.

pub mod cli;
pub mod http;
pub mod state;
