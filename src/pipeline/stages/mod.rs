//! Reusable stages
//!
//! Small building blocks on top of the two stage forms:
//! 1. `map` - one-to-one generator stage
//! 2. `filter` - forwards records that satisfy a predicate
//! 3. `inspect` - observes each record, then forwards it unchanged
//! 4. `expand` - forwards several mutated copies of each record
//! 5. `Collector` - keeps a copy of what reaches it, usually at the end of a chain

pub mod collector;
pub mod expand;
pub mod filter;
pub mod map;

// Re-export stages
pub use collector::Collector;
pub use expand::expand;
pub use filter::filter;
pub use map::{inspect, map};
