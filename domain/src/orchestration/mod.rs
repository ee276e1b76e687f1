//! Orchestration domain
//!
//! Request scoring, call stages, result types and the adaptive policy
//! controller that tunes defaults between calls.

pub mod adaptive;
pub mod complexity;
pub mod entities;
pub mod value_objects;
