//! Conversational AI layer for the case dashboard.
//!
//! Routes translate HTTP to services; services own per-case state and call
//! the provider adapter in [`llm`] through the [`llm::LlmChat`] seam.

pub mod error;
pub mod llm;
pub mod routes;
pub mod services;
pub mod state;
