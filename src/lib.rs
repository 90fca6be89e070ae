//! `econ-panel` library crate.
//!
//! The binary (`econ`) is a thin wrapper around this library so that:
//!
//! - the normalize/assemble core is testable without network access
//! - any `FetchGateway` can drive the same pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod assemble;
pub mod cli;
pub mod compare;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod resample;
