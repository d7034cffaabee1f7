//! Push pipelines built from chained stages
//!
//! A stage holds at most one successor. Executing a stage hands one record to
//! its logic, which forwards zero or more records to the successor before
//! returning, so a whole chain runs synchronously inside the head's `execute`
//! and no intermediate result list is ever built.
//!
//! Stages come in two forms:
//! - generator stages wrap a step callable returning [`Signal`]; the engine
//!   forwards after every `Continue` and once more after `Done`
//! - custom stages implement [`Process`] and forward through an [`Outlet`]
//!   as many times as they like
//!
//! # Example
//! ```
//! use pipechain::pipeline::{compose, Signal, Stage};
//! use pipechain::pipeline::stages::Collector;
//!
//! // Emit the record three times, bumping it each time
//! let mut left = 3;
//! let counter = Stage::generator("counter", move |x: &mut u32| {
//!     *x += 1;
//!     left -= 1;
//!     Signal::from_done(left == 0)
//! });
//! let sink = Collector::new("sink");
//!
//! let head = compose(vec![counter, sink.stage()]).unwrap();
//! head.execute(&0).unwrap();
//!
//! assert_eq!(sink.records(), vec![1, 2, 3]);
//! ```

pub mod compose;
pub mod core;
pub mod executor;
pub mod stage;
pub mod stages;

// Re-export main types
pub use self::compose::compose;
pub use self::core::{RunReport, Signal, StageReport, StageStats};
pub use self::executor::{Pipeline, PipelineBuilder};
pub use self::stage::{chain, Chain, Outlet, Process, Stage, StageRef};
