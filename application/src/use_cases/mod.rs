//! Use cases (application services)
//!
//! - [`orchestrate`] - the full orchestration pipeline
//! - [`pool`] - agent pool manager (reuse, revival, spawning, cleanup)
//! - [`distribute`] - parallel dispatch, fan-in and quorum gate

pub mod distribute;
pub mod orchestrate;
pub mod pool;
