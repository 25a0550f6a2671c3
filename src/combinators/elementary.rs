use crate::Scalar;
use crate::channel::Stream;
use crate::runtime::{Network, TaskKind};

/// Creates a stream that yields `value` forever.
pub fn constant(net: &Network, value: Scalar) -> Stream {
    let out = net.stream();
    let writer = out.clone();
    net.spawn(TaskKind::Constant, &[], &[&out], move |task| {
        loop {
            task.send(&writer, value)?;
        }
    });
    out
}

/// Maps every value of a stream through `f`.
///
/// The n-th output is `f` applied to the n-th input; nothing is dropped,
/// duplicated or reordered.
///
/// # Examples
/// ```rust
/// use syncflow::prelude::*;
///
/// let net = Network::new();
/// let squares = transfer(&net, |x| x * x)(constant(&net, 3.0));
/// assert_eq!(squares.recv().unwrap(), 9.0);
/// ```
pub fn transfer<F>(net: &Network, f: F) -> impl FnOnce(Stream) -> Stream
where
    F: Fn(Scalar) -> Scalar + Send + 'static,
{
    let net = net.clone();
    move |input| {
        let out = net.stream();
        let (reader, writer) = (input.clone(), out.clone());
        net.spawn(TaskKind::Transfer, &[&input], &[&out], move |task| {
            loop {
                let value = task.recv(&reader)?;
                task.send(&writer, f(value))?;
            }
        });
        out
    }
}

/// Emits `seed`, then forwards the input unchanged.
///
/// The output is the input delayed by one step. Placing a prefix on a
/// feedback loop is what lets the loop produce its first value without
/// waiting on itself.
pub fn prefix(net: &Network, seed: Scalar) -> impl FnOnce(Stream) -> Stream {
    let net = net.clone();
    move |input| {
        let out = net.stream();
        let (reader, writer) = (input.clone(), out.clone());
        net.spawn(TaskKind::Prefix, &[&input], &[&out], move |task| {
            task.send(&writer, seed)?;
            loop {
                let value = task.recv(&reader)?;
                task.send(&writer, value)?;
            }
        });
        out
    }
}
