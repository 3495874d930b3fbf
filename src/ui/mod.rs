//! Dashboard views
//!
//! - Diagnosis card and its static class descriptions
//! - Training metrics charts
//! - The notice banner

pub mod descriptions;
pub mod line_chart;
pub mod notice;
pub mod result_card;
