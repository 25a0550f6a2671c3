//! # Stream combinators
//!
//! Each combinator spawns one task on a [`Network`](crate::runtime::Network),
//! wires it to the streams it reads and returns the stream(s) it writes.
//! Combinators that transform an existing stream are curried: they are first
//! configured (`transfer(&net, f)`) and then applied to their input(s), which
//! makes nested definitions read inside out like function composition.
//!
//! ## Organization
//!
//! ### [`elementary`]
//! - `constant` - the same value forever
//! - `transfer` - map every value through a function
//! - `prefix` - emit a seed value, then forward the input
//!
//! ### [`merge`]
//! - `transfer2` - combine one value from each of two streams per round
//! - `transfer_list` - combine one value from each of N streams per round
//! - `pairwise` - `transfer2` across two parallel lists of streams
//!
//! ### [`fanout`]
//! - `split` - duplicate a stream into two lock-step copies
//! - `split_list` - duplicate a stream into N lock-step copies
//! - `split_each` - `split` across a list of streams
//!
//! ### [`wiring`]
//! - `connect` - forward one stream into another
//! - `recursion` - define a stream from a delayed copy of itself

pub mod elementary;
pub mod fanout;
pub mod merge;
pub mod wiring;

pub use elementary::*;
pub use fanout::*;
pub use merge::*;
pub use wiring::*;
