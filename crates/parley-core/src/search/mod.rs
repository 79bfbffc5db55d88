//! Web search abstractions for Parley.
//!
//! - `SearchProvider`: RPITIT trait returning the raw JSON body of a search API
//! - `BoxSearchProvider`: Object-safe wrapper for dynamic dispatch
//! - `extract`: tolerant extraction of sources from inconsistently shaped JSON

pub mod box_provider;
pub mod extract;
pub mod provider;
