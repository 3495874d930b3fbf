//! State management module
//!
//! This module handles all dashboard state, each slot with a single writer:
//! - Shared data structures (data.rs)
//! - Preview handle lifecycle (preview.rs)
//! - File acquisition and the active image slot (selection.rs)
//! - The staged analysis pipeline (analysis.rs)
//! - Liveness polling of the inference service (health.rs)

pub mod analysis;
pub mod data;
pub mod health;
pub mod preview;
pub mod selection;
