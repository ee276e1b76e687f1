//! Core domain concepts shared across all subdomains.
//!
//! - [`request::OrchestrationRequest`] - the immutable input to one orchestration call
//! - [`error`] - domain-level and consensus errors
//! - [`string`] - UTF-8 safe text helpers

pub mod error;
pub mod request;
pub mod string;
