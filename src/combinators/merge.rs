use crate::Scalar;
use crate::channel::Stream;
use crate::runtime::{Network, TaskKind};
use tracing::warn;

/// Combines one value from each of two streams per round.
///
/// The two reads complete in whichever order the inputs become ready; when
/// both are ready at once the choice is random, so neither input can starve
/// the other. The n-th output is always `f(left[n], right[n])`.
pub fn transfer2<F>(net: &Network, f: F) -> impl FnOnce(Stream, Stream) -> Stream
where
    F: Fn(Scalar, Scalar) -> Scalar + Send + 'static,
{
    let net = net.clone();
    move |left, right| {
        let out = net.stream();
        let (readers, writer) = ([left.clone(), right.clone()], out.clone());
        net.spawn(TaskKind::Transfer2, &[&left, &right], &[&out], move |task| {
            loop {
                let values = task.recv_each(&readers)?;
                task.send(&writer, f(values[0], values[1]))?;
            }
        });
        out
    }
}

/// Combines one value from every stream of a list per round.
///
/// `f` receives the round's values indexed like the input list, regardless of
/// the order they arrived in. No input is read twice within a round. An empty
/// list yields `f(&[])` every round.
///
/// # Examples
/// ```rust
/// use syncflow::prelude::*;
///
/// let net = Network::new();
/// let sum = transfer_list(&net, |values| values.iter().sum())(vec![
///     constant(&net, 1.0),
///     constant(&net, 2.0),
///     constant(&net, 4.0),
/// ]);
/// assert_eq!(sum.recv().unwrap(), 7.0);
/// ```
pub fn transfer_list<F>(net: &Network, f: F) -> impl FnOnce(Vec<Stream>) -> Stream
where
    F: Fn(&[Scalar]) -> Scalar + Send + 'static,
{
    let net = net.clone();
    move |inputs| {
        let out = net.stream();
        let (readers, writer) = (inputs.clone(), out.clone());
        let attached: Vec<&Stream> = inputs.iter().collect();
        net.spawn(TaskKind::TransferList, &attached, &[&out], move |task| {
            loop {
                let values = task.recv_each(&readers)?;
                task.send(&writer, f(&values))?;
            }
        });
        out
    }
}

/// Applies [`transfer2`] position by position across two lists of streams.
///
/// The i-th output combines the i-th stream of each list. Lists of unequal
/// length are truncated to the shorter one; the leftover streams are left
/// unread.
pub fn pairwise<F>(net: &Network, f: F) -> impl FnOnce(Vec<Stream>, Vec<Stream>) -> Vec<Stream>
where
    F: Fn(Scalar, Scalar) -> Scalar + Clone + Send + 'static,
{
    let net = net.clone();
    move |left, right| {
        if left.len() != right.len() {
            warn!(
                network = %net.name(),
                left = left.len(),
                right = right.len(),
                "pairwise over lists of unequal length"
            );
        }

        left.into_iter()
            .zip(right)
            .map(|(l, r)| transfer2(&net, f.clone())(l, r))
            .collect()
    }
}
