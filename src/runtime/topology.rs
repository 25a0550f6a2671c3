use crate::channel::StreamId;
use crate::runtime::TaskKind;
use ahash::{HashMap, HashMapExt};
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::NodeFiltered;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vertex {
    Task(TaskKind),
    Stream(StreamId),
}

/// Counts of what has been wired into a network so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopologySummary {
    pub tasks: usize,
    pub streams: usize,
    pub edges: usize,
}

/// Bipartite graph of tasks and streams.
///
/// Edges run from a producing task to the stream it writes and from a stream
/// to the task reading it, so a stream vertex should end up with at most one
/// edge in each direction.
pub(crate) struct Topology {
    graph: DiGraph<Vertex, ()>,
    streams: HashMap<StreamId, NodeIndex>,
    tasks: usize,
}

impl Topology {
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            streams: HashMap::new(),
            tasks: 0,
        }
    }

    pub(crate) fn add_task(&mut self, kind: TaskKind) -> NodeIndex {
        self.tasks += 1;
        self.graph.add_node(Vertex::Task(kind))
    }

    fn stream_vertex(&mut self, stream: StreamId) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .streams
            .entry(stream)
            .or_insert_with(|| graph.add_node(Vertex::Stream(stream)))
    }

    /// Records `task` reading `stream`. Returns false if the stream already had
    /// a reader.
    pub(crate) fn link_input(&mut self, stream: StreamId, task: NodeIndex) -> bool {
        let vertex = self.stream_vertex(stream);
        let exclusive = self
            .graph
            .neighbors_directed(vertex, Direction::Outgoing)
            .next()
            .is_none();
        self.graph.add_edge(vertex, task, ());
        exclusive
    }

    /// Records `task` writing `stream`. Returns false if the stream already had
    /// a writer.
    pub(crate) fn link_output(&mut self, task: NodeIndex, stream: StreamId) -> bool {
        let vertex = self.stream_vertex(stream);
        let exclusive = self
            .graph
            .neighbors_directed(vertex, Direction::Incoming)
            .next()
            .is_none();
        self.graph.add_edge(task, vertex, ());
        exclusive
    }

    /// Whether every cycle through `stream` contains a seeding task.
    ///
    /// Seeding tasks are cut out of the graph; if `stream` still sits on a
    /// cycle, some path back to it never passes a seed. Streams outside any
    /// cycle are trivially seeded.
    pub(crate) fn is_seeded(&self, stream: StreamId) -> bool {
        let Some(&vertex) = self.streams.get(&stream) else {
            return true;
        };

        let unseeded = NodeFiltered::from_fn(&self.graph, |idx| {
            !matches!(self.graph[idx], Vertex::Task(kind) if kind.is_seed())
        });
        tarjan_scc(&unseeded)
            .into_iter()
            .find(|component| component.contains(&vertex))
            .is_none_or(|component| component.len() == 1)
    }

    pub(crate) fn summary(&self) -> TopologySummary {
        TopologySummary {
            tasks: self.tasks,
            streams: self.streams.len(),
            edges: self.graph.edge_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_reader_detected() {
        let mut topology = Topology::new();
        let stream = StreamId::new(0);
        let first = topology.add_task(TaskKind::Transfer);
        let second = topology.add_task(TaskKind::Transfer);

        assert!(topology.link_input(stream, first));
        assert!(!topology.link_input(stream, second));
    }

    #[test]
    fn test_second_writer_detected() {
        let mut topology = Topology::new();
        let stream = StreamId::new(0);
        let first = topology.add_task(TaskKind::Constant);
        let second = topology.add_task(TaskKind::Constant);

        assert!(topology.link_output(first, stream));
        assert!(!topology.link_output(second, stream));
    }

    #[test]
    fn test_loop_through_prefix_is_seeded() {
        // feed -> transfer -> s1 -> prefix -> s2 -> connect -> feed
        let mut topology = Topology::new();
        let (feed, s1, s2) = (StreamId::new(0), StreamId::new(1), StreamId::new(2));

        let transfer = topology.add_task(TaskKind::Transfer);
        topology.link_input(feed, transfer);
        topology.link_output(transfer, s1);
        let prefix = topology.add_task(TaskKind::Prefix);
        topology.link_input(s1, prefix);
        topology.link_output(prefix, s2);
        let connect = topology.add_task(TaskKind::Connect);
        topology.link_input(s2, connect);
        topology.link_output(connect, feed);

        assert!(topology.is_seeded(feed));
        assert_eq!(
            topology.summary(),
            TopologySummary {
                tasks: 3,
                streams: 3,
                edges: 6,
            }
        );
    }

    #[test]
    fn test_loop_without_prefix_is_unseeded() {
        let mut topology = Topology::new();
        let (feed, s1) = (StreamId::new(0), StreamId::new(1));

        let transfer = topology.add_task(TaskKind::Transfer);
        topology.link_input(feed, transfer);
        topology.link_output(transfer, s1);
        let connect = topology.add_task(TaskKind::Connect);
        topology.link_input(s1, connect);
        topology.link_output(connect, feed);

        assert!(!topology.is_seeded(feed));
    }

    #[test]
    fn test_loop_with_seedless_path_is_unseeded() {
        // feed -> split -> a -> prefix -> p -> add
        //              \-> b ---------------> add -> out -> connect -> feed
        let mut topology = Topology::new();
        let [feed, a, b, p, out] = [0, 1, 2, 3, 4].map(StreamId::new);

        let split = topology.add_task(TaskKind::Split);
        topology.link_input(feed, split);
        topology.link_output(split, a);
        topology.link_output(split, b);
        let prefix = topology.add_task(TaskKind::Prefix);
        topology.link_input(a, prefix);
        topology.link_output(prefix, p);
        let add = topology.add_task(TaskKind::Transfer2);
        topology.link_input(p, add);
        topology.link_input(b, add);
        topology.link_output(add, out);
        let connect = topology.add_task(TaskKind::Connect);
        topology.link_input(out, connect);
        topology.link_output(connect, feed);

        assert!(!topology.is_seeded(feed));
    }

    #[test]
    fn test_acyclic_stream_is_seeded() {
        let mut topology = Topology::new();
        let stream = StreamId::new(0);
        let constant = topology.add_task(TaskKind::Constant);
        topology.link_output(constant, stream);

        assert!(topology.is_seeded(stream));
        assert!(topology.is_seeded(StreamId::new(99)));
    }
}
