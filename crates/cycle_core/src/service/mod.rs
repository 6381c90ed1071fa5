//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and calculator recomputation.
//! - Keep callers decoupled from storage details.

pub mod clock;
pub mod cycle_service;
