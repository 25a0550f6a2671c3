use crate::Scalar;
use crate::channel::{Stream, StreamError};
use crate::runtime::{Network, NetworkConfig, TaskKind};
use std::ops::Deref;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// A [`Network`] that installs a test log subscriber and shuts itself down
/// when dropped, so tasks left blocked by a test do not outlive it.
pub struct TestNetwork {
    net: Network,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        init_tracing();
        Self {
            net: Network::with_config(config),
        }
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestNetwork {
    type Target = Network;

    fn deref(&self) -> &Self::Target {
        &self.net
    }
}

impl Drop for TestNetwork {
    fn drop(&mut self) {
        if let Err(err) = self.net.shutdown() {
            error!(network = %self.net.name(), %err, "test network shut down with failures");
        }
    }
}

/// Installs a subscriber writing to the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a stream that yields `values` in order and then goes quiet.
pub fn feed(net: &Network, values: impl IntoIterator<Item = Scalar>) -> Stream {
    let values: Vec<Scalar> = values.into_iter().collect();
    let out = net.stream();
    let writer = out.clone();
    net.spawn(TaskKind::Source, &[], &[&out], move |task| {
        values.into_iter().try_for_each(|value| task.send(&writer, value))
    });
    out
}

/// Reads the next `n` values of `stream`.
pub fn take(stream: &Stream, n: usize) -> Result<Vec<Scalar>, StreamError> {
    (0..n).map(|_| stream.recv()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NetworkConfigBuilder;

    #[test]
    fn test_feed_then_take() {
        let net = TestNetwork::new();
        let stream = feed(&net, [1.0, 2.0, 3.0]);
        assert_eq!(take(&stream, 3).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_drop_cancels_network() {
        let net = TestNetwork::new();
        let stream = feed(&net, [1.0]);
        drop(net);
        assert_eq!(stream.recv(), Err(StreamError::Cancelled));
    }

    #[test]
    fn test_traced_network() {
        let config = NetworkConfigBuilder::default()
            .name("traced")
            .trace_values(true)
            .build()
            .unwrap();
        let net = TestNetwork::with_config(config);
        let stream = feed(&net, [9.0]);
        assert_eq!(stream.recv().unwrap(), 9.0);
        assert_eq!(net.name(), "traced");
    }
}
