//! Ready-made recursive streams.

use crate::Scalar;
use crate::channel::Stream;
use crate::combinators::{prefix, recursion, transfer, transfer2};
use crate::runtime::Network;

/// Counts up by one forever, starting from `start`.
pub fn nat_generator(net: &Network, start: Scalar) -> Stream {
    recursion(net, |c| prefix(net, start)(transfer(net, |x| x + 1.0)(c)))
}

/// `1!, 2!, 3!, ...`
///
/// Two feedback loops drive each other: the naturals from one, and the
/// running product of those naturals seeded with one.
pub fn factorial(net: &Network) -> Stream {
    let nat = nat_generator(net, 1.0);
    recursion(net, |c| transfer2(net, |n, acc| n * acc)(nat, prefix(net, 1.0)(c)))
}
