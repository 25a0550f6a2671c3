//! Synchronous dataflow networks.
//!
//! A network is a graph of concurrently running tasks that talk to each other
//! only through rendezvous [`Stream`]s of a single scalar type. Every
//! combinator spawns one task, wires it to its input streams and hands back the
//! stream(s) it produces, so infinite numeric sequences can be written
//! declaratively:
//!
//! ```rust
//! use syncflow::prelude::*;
//!
//! let net = Network::new();
//! let naturals = recursion(&net, |c| prefix(&net, 0.0)(transfer(&net, |x| x + 1.0)(c)));
//!
//! assert_eq!(naturals.recv().unwrap(), 0.0);
//! assert_eq!(naturals.recv().unwrap(), 1.0);
//! assert_eq!(naturals.recv().unwrap(), 2.0);
//! net.shutdown().unwrap();
//! ```
//!
//! Feedback loops built with [`recursion`](combinators::recursion) must emit a
//! seed (usually through [`prefix`](combinators::prefix)) before reading their
//! own delayed output, otherwise the loop never produces a value.

pub mod channel;
pub mod combinators;
pub mod generators;
pub mod runtime;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use channel::{Stream, StreamError, StreamId};

/// The single value type carried by every stream of a network.
pub type Scalar = f32;

pub mod prelude {
    pub use crate::channel::{Stream, StreamError, StreamId};
    pub use crate::combinators::*;
    pub use crate::generators::*;
    pub use crate::runtime::{
        Fault, Network, NetworkConfig, NetworkConfigBuilder, NetworkError, TaskKind,
    };
    pub use crate::Scalar;
}
