//! Chat identity and history for Parley.
//!
//! This module defines the `ChatRepository` trait that the infrastructure
//! layer implements, and the `ChatService` that degrades gracefully when
//! the repository is unavailable.

pub mod repository;
pub mod service;
