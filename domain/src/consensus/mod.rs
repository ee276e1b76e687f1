//! Consensus domain
//!
//! Reconciles the differing conclusions of an agent team into one answer.
//!
//! ```text
//! participants ──► extract_position ──► method (selected per call) ──► quality gate
//!                                        ├─ simple majority
//!                                        ├─ weighted voting
//!                                        ├─ Bayesian aggregation
//!                                        └─ game-theoretic
//! ```
//!
//! Method selection happens once per call ([`ConsensusMethod::select`]):
//! more than ten participants force Bayesian aggregation, a requested
//! confidence above 0.9 forces the game-theoretic method, otherwise the
//! orchestrator's current default applies.

pub mod engine;
pub mod method;
pub mod methods;
pub mod participant;
pub mod position;
pub mod result;

pub use engine::ConsensusEngine;
pub use method::ConsensusMethod;
pub use methods::{Reconciler, Reconciliation, reconciler_for};
pub use participant::{ConsensusParticipant, Contribution};
pub use position::{extract_position, position_confidence};
pub use result::{ConsensusResult, Dissent, ParticipantSummary};
