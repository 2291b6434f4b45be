//! # Application Module
//!
//! The verification service and the worker loop that hosts it.

pub mod job;
pub mod service;

pub use job::{response_channel, run_job};
pub use service::SpvVerifier;
