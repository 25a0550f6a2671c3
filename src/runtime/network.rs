use crate::channel::{CancelToken, Stream, StreamError, StreamId};
use crate::runtime::topology::{Topology, TopologySummary};
use crate::runtime::{TaskContext, TaskHandle, TaskKind};
use crossbeam_channel::Sender;
use derive_builder::Builder;
use enum_as_inner::EnumAsInner;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, error, warn};

const DEFAULT_NAME: &str = "syncflow";

/// Network configuration options.
#[derive(Debug, Clone, Builder)]
pub struct NetworkConfig {
    /// Prefix of every task thread name.
    #[builder(default = DEFAULT_NAME.to_string(), setter(into))]
    pub name: String,
    /// Stack size for task threads; the platform default when unset.
    #[builder(default, setter(strip_option))]
    pub stack_size: Option<usize>,
    /// Log every value crossing a task boundary at trace level.
    #[builder(default = false)]
    pub trace_values: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfigBuilder::default()
            .build()
            .expect("expected default builder")
    }
}

/// Structural misuse detected while a network is being wired.
///
/// Faults never stop construction; the offending network behaves exactly as
/// wired, which for most faults means values get stolen or the graph stalls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, EnumAsInner)]
pub enum Fault {
    #[error("stream {0} has more than one reader")]
    SharedConsumer(StreamId),
    #[error("stream {0} has more than one writer")]
    SharedProducer(StreamId),
    #[error("feedback loop through stream {0} has no seed value")]
    UnseededFeedback(StreamId),
    #[error("failed to spawn task {task}: {reason}")]
    SpawnFailed { task: String, reason: String },
}

#[derive(Debug, thiserror::Error, EnumAsInner)]
pub enum NetworkError {
    #[error("{} task(s) panicked: {}", .0.len(), .0.join(", "))]
    TaskPanicked(Vec<String>),
}

/// A dataflow network: the shared handle every combinator spawns its task on.
///
/// Cloning a `Network` yields another handle to the same network. Tasks run
/// until [`Network::shutdown`] is called or the last handle is dropped; both
/// fire the cancellation token, which makes every pending and future send or
/// receive on the network's streams return [`StreamError::Cancelled`].
///
/// # Example
/// ```rust
/// use syncflow::prelude::*;
///
/// let net = Network::new();
/// let doubled = transfer(&net, |x| x * 2.0)(constant(&net, 21.0));
/// assert_eq!(doubled.recv().unwrap(), 42.0);
///
/// net.shutdown().unwrap();
/// assert_eq!(doubled.recv(), Err(StreamError::Cancelled));
/// ```
#[derive(Clone)]
pub struct Network {
    inner: Arc<NetworkInner>,
}

struct NetworkInner {
    config: NetworkConfig,
    cancel: CancelToken,
    trigger: Mutex<Option<Sender<()>>>,
    tasks: Mutex<Vec<TaskHandle>>,
    topology: Mutex<Topology>,
    faults: Mutex<Vec<Fault>>,
    next_stream: AtomicUsize,
    next_task: AtomicUsize,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        let (trigger, cancel) = CancelToken::new();
        debug!(network = %config.name, "network created");
        Self {
            inner: Arc::new(NetworkInner {
                config,
                cancel,
                trigger: Mutex::new(Some(trigger)),
                tasks: Mutex::new(Vec::new()),
                topology: Mutex::new(Topology::new()),
                faults: Mutex::new(Vec::new()),
                next_stream: AtomicUsize::new(0),
                next_task: AtomicUsize::new(0),
            }),
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &NetworkConfig {
        &self.inner.config
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Creates a stream with neither a writer nor a reader attached.
    ///
    /// Combinators create their own output streams; a bare stream is useful as
    /// a placeholder to be wired later (see [`connect`](crate::combinators::connect))
    /// or for feeding values by hand.
    pub fn stream(&self) -> Stream {
        let id = StreamId::new(self.inner.next_stream.fetch_add(1, Ordering::Relaxed));
        Stream::new(id, self.inner.cancel.clone())
    }

    /// Number of tasks started and not yet joined by [`Network::shutdown`].
    pub fn task_count(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Structural faults recorded so far, in detection order.
    pub fn faults(&self) -> Vec<Fault> {
        self.inner.faults.lock().clone()
    }

    pub fn topology(&self) -> TopologySummary {
        self.inner.topology.lock().summary()
    }

    /// Cancels every task and waits for all of them to exit.
    ///
    /// Idempotent. A value is either handed over in full or not at all, so
    /// cancellation never leaves a partial or reordered value on any stream.
    /// Tasks whose combinator function panicked are reported by name.
    ///
    /// Joining is unbounded: a combinator function that loops forever without
    /// touching a stream keeps this call (and a test network's drop) from
    /// returning.
    pub fn shutdown(&self) -> Result<(), NetworkError> {
        if let Some(trigger) = self.inner.trigger.lock().take() {
            debug!(network = %self.name(), "cancellation requested");
            drop(trigger);
        }

        let tasks = std::mem::take(&mut *self.inner.tasks.lock());
        let joined = tasks.len();
        let mut panicked = Vec::new();
        for task in tasks {
            if task.handle.join().is_err() {
                error!(
                    network = %self.name(),
                    task = %task.name,
                    kind = %task.kind,
                    "task panicked"
                );
                panicked.push(task.name);
            }
        }

        debug!(network = %self.name(), joined, "network shut down");
        if panicked.is_empty() {
            Ok(())
        } else {
            Err(NetworkError::TaskPanicked(panicked))
        }
    }

    /// Records `kind` reading `inputs` and writing `outputs`, then starts
    /// `body` on its own thread.
    ///
    /// The body runs until it returns; an `Err` carrying
    /// [`StreamError::Cancelled`] is the normal way out after shutdown. Once
    /// the network is cancelled nothing is recorded or started, and streams
    /// wired afterwards only ever report [`StreamError::Cancelled`].
    pub(crate) fn spawn<F>(&self, kind: TaskKind, inputs: &[&Stream], outputs: &[&Stream], body: F)
    where
        F: FnOnce(&TaskContext) -> Result<(), StreamError> + Send + 'static,
    {
        if self.is_cancelled() {
            debug!(network = %self.name(), %kind, "network shut down, task not started");
            return;
        }

        let id = self.inner.next_task.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}-{}", self.name(), kind, id);

        let mut faults = Vec::new();
        {
            let mut topology = self.inner.topology.lock();
            let task = topology.add_task(kind);
            for input in inputs {
                if !topology.link_input(input.id(), task) {
                    faults.push(Fault::SharedConsumer(input.id()));
                }
            }
            for output in outputs {
                if !topology.link_output(task, output.id()) {
                    faults.push(Fault::SharedProducer(output.id()));
                }
            }
        }
        faults.into_iter().for_each(|fault| self.record(fault));

        let ctx = TaskContext::new(
            Arc::from(name.as_str()),
            self.inner.cancel.clone(),
            self.inner.config.trace_values,
        );

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(stack_size) = self.inner.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let spawned = builder.spawn(move || {
            debug!(task = ctx.name(), "task started");
            match body(&ctx) {
                Ok(()) => debug!(task = ctx.name(), "task finished"),
                Err(err) => debug!(task = ctx.name(), %err, "task stopped"),
            }
        });

        match spawned {
            Ok(handle) => self.inner.tasks.lock().push(TaskHandle { name, kind, handle }),
            Err(err) => {
                error!(task = %name, %err, "failed to spawn task");
                self.record(Fault::SpawnFailed {
                    task: name,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Flags `stream` if the feedback loop running through it has no seed.
    pub(crate) fn check_feedback(&self, stream: &Stream) {
        let seeded = self.inner.topology.lock().is_seeded(stream.id());
        if !seeded {
            self.record(Fault::UnseededFeedback(stream.id()));
        }
    }

    fn record(&self, fault: Fault) {
        warn!(network = %self.name(), %fault, "network fault");
        self.inner.faults.lock().push(fault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{constant, transfer};
    use crate::testing::TestNetwork;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.name, "syncflow");
        assert_eq!(config.stack_size, None);
        assert!(!config.trace_values);
    }

    #[test]
    fn test_config_builder() {
        let config = NetworkConfigBuilder::default()
            .name("pipeline")
            .stack_size(256 * 1024)
            .trace_values(true)
            .build()
            .unwrap();

        let net = Network::with_config(config);
        assert_eq!(net.name(), "pipeline");
        assert_eq!(net.config().stack_size, Some(256 * 1024));
        assert!(net.config().trace_values);
    }

    #[test]
    fn test_stream_ids_are_unique() {
        let net = Network::new();
        let a = net.stream();
        let b = net.stream();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_spawn_registers_task() {
        let net = TestNetwork::new();
        let out = net.stream();
        let writer = out.clone();
        net.spawn(TaskKind::Source, &[], &[&out], move |task| task.send(&writer, 3.0));

        assert_eq!(out.recv().unwrap(), 3.0);
        assert_eq!(net.task_count(), 1);
        assert_eq!(net.topology().tasks, 1);
        assert!(net.faults().is_empty());
    }

    #[test]
    fn test_shutdown_unblocks_tasks() {
        let net = Network::new();
        let out = net.stream();
        let writer = out.clone();
        // Nobody ever reads, so the task stays parked in send.
        net.spawn(TaskKind::Source, &[], &[&out], move |task| loop {
            task.send(&writer, 1.0)?;
        });

        net.shutdown().unwrap();
        assert!(net.is_cancelled());
        assert_eq!(net.task_count(), 0);
        assert_eq!(out.recv(), Err(StreamError::Cancelled));

        // Idempotent.
        net.shutdown().unwrap();
    }

    #[test]
    fn test_build_after_shutdown_starts_nothing() {
        let net = TestNetwork::new();
        net.shutdown().unwrap();

        let _ones = constant(&net, 1.0);
        let doubled = transfer(&net, |x| x * 2.0)(constant(&net, 2.0));

        assert_eq!(net.task_count(), 0);
        assert_eq!(net.topology().tasks, 0);
        assert_eq!(doubled.recv(), Err(StreamError::Cancelled));
    }

    #[test]
    fn test_fault_accessors() {
        let fault = Fault::SharedConsumer(StreamId::new(4));
        assert_eq!(fault.as_shared_consumer(), Some(&StreamId::new(4)));
        assert!(fault.as_unseeded_feedback().is_none());

        let err = NetworkError::TaskPanicked(vec!["demo-transfer-1".to_string()]);
        assert_eq!(err.into_task_panicked().unwrap(), vec!["demo-transfer-1"]);
    }

    #[test]
    fn test_shutdown_reports_panicked_task() {
        let net = Network::new();
        let out = net.stream();
        net.spawn(TaskKind::Source, &[], &[&out], |_| panic!("combinator function failed"));

        let err = net.shutdown().unwrap_err();
        let NetworkError::TaskPanicked(tasks) = err;
        assert_eq!(tasks, vec!["syncflow-source-0".to_string()]);
    }

    #[test]
    fn test_dropping_last_handle_cancels() {
        let net = Network::new();
        let stream = net.stream();
        drop(net);
        assert_eq!(stream.recv(), Err(StreamError::Cancelled));
    }
}
