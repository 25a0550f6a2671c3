use crate::channel::Stream;
use crate::runtime::{Network, TaskKind};
use tracing::debug;

/// Duplicates a stream into two lock-step copies.
///
/// Every input value is handed to both outputs, in whichever order their
/// readers show up, before the next input value is read. A slow reader on
/// one branch therefore holds back the other branch by at most one value.
pub fn split(net: &Network, input: Stream) -> (Stream, Stream) {
    let (first, second) = (net.stream(), net.stream());
    let reader = input.clone();
    let writers = [first.clone(), second.clone()];
    net.spawn(TaskKind::Split, &[&input], &[&first, &second], move |task| {
        loop {
            let value = task.recv(&reader)?;
            task.send_each(&writers, value)?;
        }
    });
    (first, second)
}

/// Duplicates a stream into `n` lock-step copies.
///
/// Same contract as [`split`] for any number of outputs. With `n == 0`
/// nothing is spawned and the input is left unread.
pub fn split_list(net: &Network, input: Stream, n: usize) -> Vec<Stream> {
    if n == 0 {
        debug!(network = %net.name(), stream = %input.id(), "split into zero outputs");
        return Vec::new();
    }

    let outputs: Vec<Stream> = (0..n).map(|_| net.stream()).collect();
    let reader = input.clone();
    let writers = outputs.clone();
    let attached: Vec<&Stream> = outputs.iter().collect();
    net.spawn(TaskKind::SplitList, &[&input], &attached, move |task| {
        loop {
            let value = task.recv(&reader)?;
            task.send_each(&writers, value)?;
        }
    });
    outputs
}

/// Applies [`split`] to every stream of a list.
///
/// Returns two lists whose i-th streams are both copies of the i-th input.
pub fn split_each(net: &Network, inputs: Vec<Stream>) -> (Vec<Stream>, Vec<Stream>) {
    inputs.into_iter().map(|input| split(net, input)).unzip()
}
