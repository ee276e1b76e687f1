//! Progress reporting

pub mod reporter;
