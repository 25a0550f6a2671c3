//! Task spawning, cancellation and bookkeeping for dataflow networks.
//!
//! # Architecture Overview
//!
//! A [`Network`] is the handle every combinator is built against. It owns:
//! - **Tasks**: one named OS thread per combinator call, tracked in a task registry
//! - **Cancellation**: a cooperative token threaded through every blocking send,
//!   receive and selection
//! - **Topology**: a graph of tasks and the streams between them, recorded at
//!   construction time
//! - **Faults**: structural misuse detected while wiring (shared readers or
//!   writers, seedless feedback loops, failed spawns)
//!
//! Tasks never talk to the network once started; the only runtime data path is
//! the streams themselves. The network's locks are taken while wiring and while
//! shutting down, never per value.
//!
//! # Multi-way selection
//!
//! Merges and fan-outs go through the [`selector`] functions, which complete
//! one operation on every channel of a set in whatever order the partners
//! become ready. Simultaneously ready channels are picked at random, so no
//! input or output is starved across rounds.

mod network;
pub(crate) mod selector;
mod task;
mod topology;

pub use network::*;
pub use task::*;
pub use topology::TopologySummary;
