//! Graph topology: dense node ids with ordered outgoing neighbour lists.
//!
//! The [`Topology`] is the spatial backbone of the simulation. Nodes are
//! numbered `0..node_count`, which lets attribute storage index by id, and
//! every node keeps its outgoing neighbours in insertion order. That order is
//! observable: the decision core scans neighbours in it, so two graphs built
//! from the same edge list always produce the same trajectory.

use followflee_types::NodeId;

use crate::error::WorldError;

/// The graph the agents live on.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Topology {
    /// Outgoing adjacency: node index -> ordered neighbour ids.
    adjacency: Vec<Vec<NodeId>>,
    /// Largest outgoing degree seen so far.
    max_degree: usize,
}

impl Topology {
    /// Create a graph with `node_count` isolated nodes.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TooManyNodes`] if the nodes cannot all be
    /// addressed by a [`NodeId`].
    pub fn with_nodes(node_count: usize) -> Result<Self, WorldError> {
        if u32::try_from(node_count).is_err() {
            return Err(WorldError::TooManyNodes(node_count));
        }
        Ok(Self {
            adjacency: vec![Vec::new(); node_count],
            max_degree: 0,
        })
    }

    /// Build a graph from an edge list.
    ///
    /// When `bidirectional` is set every edge is inserted in both
    /// directions.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Topology::add_edge`].
    pub fn from_edges(
        node_count: usize,
        edges: &[(NodeId, NodeId)],
        bidirectional: bool,
    ) -> Result<Self, WorldError> {
        let mut topology = Self::with_nodes(node_count)?;
        for &(from, to) in edges {
            topology.add_edge(from, to, bidirectional)?;
        }
        Ok(topology)
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Add an edge from `from` to `to` (and back, if `bidirectional`).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if either endpoint is missing,
    /// [`WorldError::SelfLoop`] if both endpoints are the same node, or
    /// [`WorldError::DuplicateEdge`] if the edge already exists.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        bidirectional: bool,
    ) -> Result<(), WorldError> {
        if !self.contains(from) {
            return Err(WorldError::NodeNotFound(from));
        }
        if !self.contains(to) {
            return Err(WorldError::NodeNotFound(to));
        }
        if from == to {
            return Err(WorldError::SelfLoop(from));
        }
        if self.is_neighbour(from, to) || (bidirectional && self.is_neighbour(to, from)) {
            return Err(WorldError::DuplicateEdge { from, to });
        }

        self.push_neighbour(from, to)?;
        if bidirectional {
            self.push_neighbour(to, from)?;
        }
        Ok(())
    }

    /// Append `to` to the neighbour list of `from` and track the degree.
    fn push_neighbour(&mut self, from: NodeId, to: NodeId) -> Result<(), WorldError> {
        let list = self
            .adjacency
            .get_mut(from.index())
            .ok_or(WorldError::NodeNotFound(from))?;
        list.push(to);
        self.max_degree = self.max_degree.max(list.len());
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Iterate over all node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        // with_nodes() guarantees every index fits in a u32.
        (0..self.adjacency.len()).filter_map(|idx| u32::try_from(idx).ok().map(NodeId::new))
    }

    /// Whether `id` is a node of this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.adjacency.len()
    }

    /// Return the ordered outgoing neighbours of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `id` is not in the graph.
    pub fn neighbours(&self, id: NodeId) -> Result<&[NodeId], WorldError> {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or(WorldError::NodeNotFound(id))
    }

    /// Return the outgoing degree of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `id` is not in the graph.
    pub fn degree(&self, id: NodeId) -> Result<usize, WorldError> {
        self.neighbours(id).map(<[NodeId]>::len)
    }

    /// Whether `candidate` is an outgoing neighbour of `of`.
    ///
    /// Unknown nodes have no neighbours.
    pub fn is_neighbour(&self, of: NodeId, candidate: NodeId) -> bool {
        self.adjacency
            .get(of.index())
            .is_some_and(|list| list.contains(&candidate))
    }

    /// Graph-level neighbour count used to presize per-agent buffers.
    ///
    /// This is the largest outgoing degree of any node (4 or 8 on a full
    /// square lattice).
    pub const fn neighbours_hint(&self) -> usize {
        self.max_degree
    }

    /// Return the total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}
