//! Command implementations.

pub mod augment;
pub mod config;
pub mod distribution;
pub mod segment;

mod batch;
mod chart;
mod console;
mod types;
