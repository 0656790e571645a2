//! Network Topology: Directed Element Graph
//!
//! Nodes are [`NetworkElement`]s identified by their uid; edges are the
//! directed connections between them. Edge weight is the kilometre length
//! of the fiber the edge leads into (zero for any other element kind), so
//! shortest-path cost equals route distance. Adjacency lists are kept
//! sorted by neighbor uid, which makes every traversal deterministic.

use indexmap::IndexMap;
use lightpath_core::element::NetworkElement;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("duplicate node uid: {0}")]
    DuplicateNode(String),

    #[error("unknown node uid: {0}")]
    UnknownNode(String),
}

/// Dense index of a node within one topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Outgoing connection.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub to: NodeId,
    /// Length of the downstream fiber (km), 0 for non-fiber targets.
    pub weight_km: f64,
}

/// Immutable directed graph of network elements.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<NetworkElement>,
    by_uid: IndexMap<String, NodeId>,
    adjacency: Vec<Vec<Edge>>,
}

impl Topology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_id(&self, uid: &str) -> Result<NodeId, TopologyError> {
        self.by_uid
            .get(uid)
            .copied()
            .ok_or_else(|| TopologyError::UnknownNode(uid.into()))
    }

    pub fn element(&self, id: NodeId) -> &NetworkElement {
        &self.nodes[id.0]
    }

    pub fn uid(&self, id: NodeId) -> &str {
        self.nodes[id.0].uid()
    }

    /// Outgoing edges, sorted by neighbor uid.
    pub fn neighbors(&self, id: NodeId) -> &[Edge] {
        &self.adjacency[id.0]
    }

    /// All node ids, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }
}

/// Builder collecting nodes and directed connections.
#[derive(Default)]
pub struct TopologyBuilder {
    nodes: Vec<NetworkElement>,
    by_uid: IndexMap<String, NodeId>,
    connections: Vec<(NodeId, NodeId)>,
}

impl TopologyBuilder {
    pub fn add(mut self, element: NetworkElement) -> Result<Self, TopologyError> {
        let uid = element.uid().to_string();
        if self.by_uid.contains_key(&uid) {
            return Err(TopologyError::DuplicateNode(uid));
        }
        let id = NodeId(self.nodes.len());
        self.by_uid.insert(uid, id);
        self.nodes.push(element);
        Ok(self)
    }

    /// Directed connection from `from` to `to`.
    pub fn connect(mut self, from: &str, to: &str) -> Result<Self, TopologyError> {
        let a = self.lookup(from)?;
        let b = self.lookup(to)?;
        self.connections.push((a, b));
        Ok(self)
    }

    /// Both directions at once, for symmetric links.
    pub fn connect_both(self, a: &str, b: &str) -> Result<Self, TopologyError> {
        self.connect(a, b)?.connect(b, a)
    }

    fn lookup(&self, uid: &str) -> Result<NodeId, TopologyError> {
        self.by_uid
            .get(uid)
            .copied()
            .ok_or_else(|| TopologyError::UnknownNode(uid.into()))
    }

    pub fn build(self) -> Topology {
        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); self.nodes.len()];
        for (from, to) in self.connections {
            let weight_km = match &self.nodes[to.0] {
                NetworkElement::Fiber(f) => f.length_km(),
                _ => 0.0,
            };
            adjacency[from.0].push(Edge { to, weight_km });
        }
        for list in &mut adjacency {
            list.sort_by(|a, b| self.nodes[a.to.0].uid().cmp(self.nodes[b.to.0].uid()));
            list.dedup_by_key(|e| e.to);
        }
        Topology {
            nodes: self.nodes,
            by_uid: self.by_uid,
            adjacency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpath_core::element::Transceiver;
    use lightpath_core::equipment::FiberVariety;
    use lightpath_core::fiber::{Fiber, FiberParams};

    fn trx(uid: &str) -> NetworkElement {
        NetworkElement::Transceiver(Transceiver::new(uid))
    }

    fn fiber(uid: &str, km: f64) -> NetworkElement {
        NetworkElement::Fiber(Fiber::new(FiberParams {
            uid: uid.into(),
            length_km: km,
            con_in_db: 0.5,
            con_out_db: 0.5,
            att_in_db: 0.0,
            variety: FiberVariety::ssmf(),
        }))
    }

    #[test]
    fn test_build_and_lookup() {
        let topo = Topology::builder()
            .add(trx("trx A"))
            .unwrap()
            .add(fiber("fiber A-B", 80.0))
            .unwrap()
            .add(trx("trx B"))
            .unwrap()
            .connect("trx A", "fiber A-B")
            .unwrap()
            .connect("fiber A-B", "trx B")
            .unwrap()
            .build();
        assert_eq!(topo.len(), 3);
        let a = topo.node_id("trx A").unwrap();
        assert_eq!(topo.uid(a), "trx A");
        assert!(topo.node_id("trx Z").is_err());
    }

    #[test]
    fn test_duplicate_uid_rejected() {
        let res = Topology::builder().add(trx("trx A")).unwrap().add(trx("trx A"));
        assert!(matches!(res, Err(TopologyError::DuplicateNode(_))));
    }

    #[test]
    fn test_connect_unknown_node_rejected() {
        let res = Topology::builder()
            .add(trx("trx A"))
            .unwrap()
            .connect("trx A", "trx B");
        assert!(matches!(res, Err(TopologyError::UnknownNode(_))));
    }

    #[test]
    fn test_edge_weight_is_downstream_fiber_length() {
        let topo = Topology::builder()
            .add(trx("trx A"))
            .unwrap()
            .add(fiber("fiber A-B", 80.0))
            .unwrap()
            .add(trx("trx B"))
            .unwrap()
            .connect("trx A", "fiber A-B")
            .unwrap()
            .connect("fiber A-B", "trx B")
            .unwrap()
            .build();
        let a = topo.node_id("trx A").unwrap();
        let f = topo.node_id("fiber A-B").unwrap();
        assert!((topo.neighbors(a)[0].weight_km - 80.0).abs() < 1e-12);
        assert!(topo.neighbors(f)[0].weight_km.abs() < 1e-12);
    }

    #[test]
    fn test_neighbors_sorted_by_uid() {
        let topo = Topology::builder()
            .add(trx("hub"))
            .unwrap()
            .add(trx("zeta"))
            .unwrap()
            .add(trx("alpha"))
            .unwrap()
            .add(trx("mid"))
            .unwrap()
            .connect("hub", "zeta")
            .unwrap()
            .connect("hub", "alpha")
            .unwrap()
            .connect("hub", "mid")
            .unwrap()
            .build();
        let hub = topo.node_id("hub").unwrap();
        let names: Vec<&str> = topo.neighbors(hub).iter().map(|e| topo.uid(e.to)).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
