use crate::Scalar;
use crate::channel::{CancelToken, Stream, StreamError};
use crate::runtime::selector;
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::trace;

/// The combinator a task was spawned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Constant,
    Transfer,
    Transfer2,
    TransferList,
    Prefix,
    Split,
    SplitList,
    Connect,
    /// A task feeding caller-supplied values into a stream.
    Source,
}

impl TaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskKind::Constant => "constant",
            TaskKind::Transfer => "transfer",
            TaskKind::Transfer2 => "transfer2",
            TaskKind::TransferList => "transfer-list",
            TaskKind::Prefix => "prefix",
            TaskKind::Split => "split",
            TaskKind::SplitList => "split-list",
            TaskKind::Connect => "connect",
            TaskKind::Source => "source",
        }
    }

    /// Whether the task writes a value before it first reads one.
    ///
    /// Only seeding tasks can make a feedback loop produce anything.
    pub const fn is_seed(self) -> bool {
        matches!(self, TaskKind::Prefix)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A running task owned by a [`Network`](crate::runtime::Network).
pub(crate) struct TaskHandle {
    pub(crate) name: String,
    pub(crate) kind: TaskKind,
    pub(crate) handle: JoinHandle<()>,
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// What a task body sees of its network: the cancellation token and the
/// tracing settings. Every blocking call made through it can be cancelled.
pub(crate) struct TaskContext {
    name: Arc<str>,
    cancel: CancelToken,
    trace_values: bool,
}

impl TaskContext {
    pub(crate) fn new(name: Arc<str>, cancel: CancelToken, trace_values: bool) -> Self {
        Self {
            name,
            cancel,
            trace_values,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn recv(&self, input: &Stream) -> Result<Scalar, StreamError> {
        let value = input.recv()?;
        if self.trace_values {
            trace!(task = %self.name, stream = %input.id(), value, "recv");
        }
        Ok(value)
    }

    pub(crate) fn send(&self, output: &Stream, value: Scalar) -> Result<(), StreamError> {
        if self.trace_values {
            trace!(task = %self.name, stream = %output.id(), value, "send");
        }
        output.send(value)
    }

    pub(crate) fn recv_each(&self, inputs: &[Stream]) -> Result<Vec<Scalar>, StreamError> {
        let values = selector::recv_each(inputs, &self.cancel)?;
        if self.trace_values {
            trace!(task = %self.name, ?values, "recv each");
        }
        Ok(values)
    }

    pub(crate) fn send_each(&self, outputs: &[Stream], value: Scalar) -> Result<(), StreamError> {
        if self.trace_values {
            trace!(task = %self.name, outputs = outputs.len(), value, "send each");
        }
        selector::send_each(outputs, value, &self.cancel)
    }
}
