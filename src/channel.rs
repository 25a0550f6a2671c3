use crate::Scalar;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use enum_as_inner::EnumAsInner;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, EnumAsInner)]
pub enum StreamError {
    #[error("network cancelled")]
    Cancelled,
    #[error("stream disconnected")]
    Disconnected,
}

/// Identifies a stream within its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(usize);

impl StreamId {
    pub(crate) const fn new(id: usize) -> Self {
        Self(id)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Cooperative cancellation signal shared by every stream of a network.
///
/// The paired sender never transmits; the token fires when that sender is
/// dropped, which disconnects `signal` and makes it permanently ready in any
/// selection.
#[derive(Debug, Clone)]
pub(crate) struct CancelToken {
    signal: Receiver<()>,
}

impl CancelToken {
    pub(crate) fn new() -> (Sender<()>, Self) {
        let (trigger, signal) = bounded(0);
        (trigger, Self { signal })
    }

    #[inline(always)]
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// An unbuffered, ordered channel of [`Scalar`] values.
///
/// A `Stream` is a handle: clones refer to the same channel. A send blocks
/// until a receiver takes the value, so there is never more than one value in
/// flight per stream. Streams are never closed; both operations only fail once
/// the owning network has been shut down.
///
/// A stream must have a single reader. Handing the same stream to two
/// consumers splits its values between them instead of duplicating them; use
/// [`split`](crate::combinators::split) to fan a stream out.
#[derive(Clone)]
pub struct Stream {
    id: StreamId,
    tx: Sender<Scalar>,
    rx: Receiver<Scalar>,
    cancel: CancelToken,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").field("id", &self.id).finish()
    }
}

impl Stream {
    pub(crate) fn new(id: StreamId, cancel: CancelToken) -> Self {
        let (tx, rx) = bounded(0);
        Self { id, tx, rx, cancel }
    }

    #[inline(always)]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Blocks until a reader takes `value`.
    pub fn send(&self, value: Scalar) -> Result<(), StreamError> {
        select! {
            send(self.tx, value) -> sent => sent.map_err(|_| StreamError::Disconnected),
            recv(self.cancel.signal()) -> _ => Err(StreamError::Cancelled),
        }
    }

    /// Blocks until a writer hands over the next value.
    pub fn recv(&self) -> Result<Scalar, StreamError> {
        select! {
            recv(self.rx) -> value => value.map_err(|_| StreamError::Disconnected),
            recv(self.cancel.signal()) -> _ => Err(StreamError::Cancelled),
        }
    }

    #[inline(always)]
    pub(crate) fn sender(&self) -> &Sender<Scalar> {
        &self.tx
    }

    #[inline(always)]
    pub(crate) fn receiver(&self) -> &Receiver<Scalar> {
        &self.rx
    }

    #[inline(always)]
    pub(crate) fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn stream() -> (Sender<()>, Stream) {
        let (trigger, cancel) = CancelToken::new();
        (trigger, Stream::new(StreamId::new(0), cancel))
    }

    #[test]
    fn test_send_waits_for_receiver() {
        let (_trigger, stream) = stream();
        let delivered = Arc::new(AtomicBool::new(false));

        let writer = {
            let stream = stream.clone();
            let delivered = delivered.clone();
            thread::spawn(move || {
                stream.send(7.0).unwrap();
                delivered.store(true, Ordering::SeqCst);
            })
        };

        // Nobody has read yet, so the writer must still be parked in send.
        thread::sleep(Duration::from_millis(50));
        assert!(!delivered.load(Ordering::SeqCst));

        assert_eq!(stream.recv().unwrap(), 7.0);
        writer.join().unwrap();
        assert!(delivered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_values_arrive_in_order() {
        let (_trigger, stream) = stream();
        let writer = {
            let stream = stream.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    stream.send(i as Scalar).unwrap();
                }
            })
        };

        let received: Vec<Scalar> = (0..10).map(|_| stream.recv().unwrap()).collect();
        writer.join().unwrap();
        assert_eq!(received, (0..10).map(|i| i as Scalar).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_wakes_blocked_receiver() {
        let (trigger, stream) = stream();
        let reader = {
            let stream = stream.clone();
            thread::spawn(move || stream.recv())
        };

        thread::sleep(Duration::from_millis(20));
        drop(trigger);

        assert_eq!(reader.join().unwrap(), Err(StreamError::Cancelled));
        assert!(stream.cancel_token().is_cancelled());
    }

    #[test]
    fn test_cancel_wakes_blocked_sender() {
        let (trigger, stream) = stream();
        let writer = {
            let stream = stream.clone();
            thread::spawn(move || stream.send(1.0))
        };

        thread::sleep(Duration::from_millis(20));
        drop(trigger);

        let result = writer.join().unwrap();
        assert!(result.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_token_not_cancelled_while_trigger_alive() {
        let (_trigger, cancel) = CancelToken::new();
        assert!(!cancel.is_cancelled());
    }
}
