//! Scheduler runner -- registration, fan-out, and per-task execution.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, registration, and accessor methods
//! - `execution`: `run`, thread fan-out, and the wait-for-all barrier
//! - `isolation`: the per-task fault barrier that turns panics into results

mod core;
mod execution;
mod isolation;

pub use self::core::Scheduler;
