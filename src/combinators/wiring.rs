use crate::channel::Stream;
use crate::combinators::split;
use crate::runtime::{Network, TaskKind};

/// Forwards every value of `input` into `output`.
///
/// `output` must not have another writer; typically it is a bare stream from
/// [`Network::stream`] that some other part of the graph already reads.
pub fn connect(net: &Network, input: Stream, output: Stream) {
    let (reader, writer) = (input.clone(), output.clone());
    net.spawn(TaskKind::Connect, &[&input], &[&output], move |task| {
        loop {
            let value = task.recv(&reader)?;
            task.send(&writer, value)?;
        }
    });
}

/// Builds a stream from a delayed copy of itself.
///
/// `f` is handed a placeholder stream that will carry the result's own values,
/// one step late. Its output is split: one copy is returned, the other is fed
/// back into the placeholder. The returned stream `r` therefore satisfies
/// `r = f(r delayed by one)`.
///
/// `f` must write a value before it reads its input, normally by putting a
/// [`prefix`](crate::combinators::prefix) on the loop. A loop without a seed
/// never produces anything; it is recorded as
/// [`Fault::UnseededFeedback`](crate::runtime::Fault::UnseededFeedback).
///
/// # Examples
/// ```rust
/// use syncflow::prelude::*;
///
/// let net = Network::new();
/// let powers = recursion(&net, |c| prefix(&net, 1.0)(transfer(&net, |x| x * 2.0)(c)));
///
/// let first: Vec<Scalar> = (0..5).map(|_| powers.recv().unwrap()).collect();
/// assert_eq!(first, vec![1.0, 2.0, 4.0, 8.0, 16.0]);
/// ```
pub fn recursion<F>(net: &Network, f: F) -> Stream
where
    F: FnOnce(Stream) -> Stream,
{
    let feed_in = net.stream();
    let raw = f(feed_in.clone());
    let (external, feedback) = split(net, raw);
    connect(net, feedback, feed_in.clone());
    net.check_feedback(&feed_in);
    external
}
