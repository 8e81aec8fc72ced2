//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the orchestration logic so route handlers can stay
//! focused on protocol translation. Every service returns a `Result`; none
//! of them render or notify.

pub mod analysis;
pub mod case;
pub mod conversation;
pub mod prompt;
