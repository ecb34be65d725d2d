//! Core types and the search/enrichment protocol for the identity lookup
//! console.
//!
//! This crate is deliberately free of HTTP, terminal and runtime
//! dependencies. The console binary supplies a [`gateway::SearchGateway`] and
//! an [`gateway::AuditSink`]; everything that decides *what* to ask the
//! backend and *how* to reconcile the answer lives here.

pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod mode;
pub mod outcome;
pub mod query;
pub mod record;
pub mod results;
pub mod view;

#[cfg(test)]
mod tests;

pub use error::{GatewayError, SearchRejected, ValidationError};
