//! # pipechain
//!
//! Single-threaded, synchronous push pipelines. Records of any `Clone` type
//! flow through a chain of named stages; each stage may transform, drop or fan
//! out a record before pushing results to the next stage.

pub mod config;
pub mod error;
pub mod logger;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipeError, PipeResult};
pub use pipeline::{compose, Outlet, Pipeline, Process, Signal, Stage, StageRef};
