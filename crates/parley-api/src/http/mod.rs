//! REST API: router, handlers and error mapping.

pub mod error;
pub mod handlers;
pub mod router;
