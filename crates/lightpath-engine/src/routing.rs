//! Path Search: Shortest Paths Under Constraints
//!
//! Dijkstra over the element graph with kilometre edge weights, plus a
//! bounded depth-first enumeration of simple paths used to satisfy ordered
//! waypoint constraints. Node and edge exclusion sets support disjointness
//! between requests. Equal-length candidate paths are ordered by their
//! lexicographic uid sequence, so repeated searches over the same topology
//! return the same path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::request::{DisjointnessMode, RelaxationPolicy, WaypointMode};
use crate::topology::{NodeId, Topology};

/// A concrete routed path and what was given up to get it.
#[derive(Debug, Clone)]
pub struct RoutedPath {
    pub nodes: Vec<NodeId>,
    pub total_km: f64,
    /// Waypoints dropped by loose-mode relaxation, in request order.
    pub relaxed_waypoints: Vec<String>,
}

/// Why no path was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// No route at all between the endpoints.
    Unreachable,
    /// Routes exist, but none satisfies the waypoint constraint.
    ConstraintUnsatisfiable,
}

#[derive(Clone, PartialEq)]
struct QueueState {
    cost: f64,
    node: NodeId,
}

impl Eq for QueueState {}

impl Ord for QueueState {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for min-heap; equal costs fall back to stable insertion-order ids
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bound on the depth-first simple-path enumeration.
const MAX_PATH_HOPS: usize = 80;

/// One search over a topology, carrying exclusions accumulated from
/// previously routed requests.
pub struct PathSearch<'a> {
    topo: &'a Topology,
    excluded_nodes: HashSet<NodeId>,
    excluded_edges: HashSet<(NodeId, NodeId)>,
}

impl<'a> PathSearch<'a> {
    pub fn new(topo: &'a Topology) -> Self {
        Self {
            topo,
            excluded_nodes: HashSet::new(),
            excluded_edges: HashSet::new(),
        }
    }

    /// Exclude a committed path from subsequent searches. Edges go in both
    /// directions; node-disjoint mode also removes the path interior
    /// (endpoints stay routable).
    pub fn exclude_path(&mut self, path: &RoutedPath, mode: DisjointnessMode) {
        if mode == DisjointnessMode::NodeDisjoint && path.nodes.len() > 2 {
            self.excluded_nodes
                .extend(path.nodes[1..path.nodes.len() - 1].iter().copied());
        }
        for pair in path.nodes.windows(2) {
            self.excluded_edges.insert((pair[0], pair[1]));
            self.excluded_edges.insert((pair[1], pair[0]));
        }
    }

    fn usable(&self, from: NodeId, to: NodeId) -> bool {
        !self.excluded_nodes.contains(&to) && !self.excluded_edges.contains(&(from, to))
    }

    /// Plain Dijkstra from `src` to `dst`.
    pub fn shortest(&self, src: NodeId, dst: NodeId) -> Option<RoutedPath> {
        let mut dist: HashMap<NodeId, f64> = HashMap::new();
        let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(src, 0.0);
        heap.push(QueueState { cost: 0.0, node: src });

        while let Some(QueueState { cost, node }) = heap.pop() {
            if node == dst {
                let mut nodes = vec![dst];
                let mut current = dst;
                while current != src {
                    current = prev[&current];
                    nodes.push(current);
                }
                nodes.reverse();
                return Some(RoutedPath {
                    nodes,
                    total_km: cost,
                    relaxed_waypoints: Vec::new(),
                });
            }
            if cost > *dist.get(&node).unwrap_or(&f64::INFINITY) {
                continue;
            }
            for edge in self.topo.neighbors(node) {
                if !self.usable(node, edge.to) {
                    continue;
                }
                let next = cost + edge.weight_km;
                if next < *dist.get(&edge.to).unwrap_or(&f64::INFINITY) {
                    dist.insert(edge.to, next);
                    prev.insert(edge.to, node);
                    heap.push(QueueState { cost: next, node: edge.to });
                }
            }
        }
        None
    }

    /// All simple paths from `src` to `dst`, depth-bounded, ordered by
    /// length then lexicographic uid sequence.
    fn simple_paths(&self, src: NodeId, dst: NodeId) -> Vec<RoutedPath> {
        let mut found = Vec::new();
        let mut stack = vec![src];
        let mut on_path: HashSet<NodeId> = HashSet::from([src]);
        self.dfs(src, dst, &mut stack, &mut on_path, 0.0, &mut found);
        found.sort_by(|a, b| {
            a.total_km
                .partial_cmp(&b.total_km)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    let ua = a.nodes.iter().map(|&n| self.topo.uid(n));
                    let ub = b.nodes.iter().map(|&n| self.topo.uid(n));
                    ua.cmp(ub)
                })
        });
        found
    }

    fn dfs(
        &self,
        node: NodeId,
        dst: NodeId,
        stack: &mut Vec<NodeId>,
        on_path: &mut HashSet<NodeId>,
        km: f64,
        found: &mut Vec<RoutedPath>,
    ) {
        if node == dst {
            found.push(RoutedPath {
                nodes: stack.clone(),
                total_km: km,
                relaxed_waypoints: Vec::new(),
            });
            return;
        }
        if stack.len() > MAX_PATH_HOPS {
            return;
        }
        for edge in self.topo.neighbors(node) {
            if on_path.contains(&edge.to) || !self.usable(node, edge.to) {
                continue;
            }
            stack.push(edge.to);
            on_path.insert(edge.to);
            self.dfs(edge.to, dst, stack, on_path, km + edge.weight_km, found);
            on_path.remove(&edge.to);
            stack.pop();
        }
    }

    /// True when `path` visits every id in `waypoints`, in order.
    fn visits_in_order(path: &[NodeId], waypoints: &[NodeId]) -> bool {
        let mut cursor = 0;
        for node in path {
            if cursor < waypoints.len() && *node == waypoints[cursor] {
                cursor += 1;
            }
        }
        cursor == waypoints.len()
    }

    /// Search honoring an ordered waypoint constraint.
    ///
    /// Strict mode fails with [`SearchFailure::ConstraintUnsatisfiable`]
    /// when no simple path visits all waypoints in order. Loose mode applies
    /// `policy`: dropping waypoints front-to-back until a path fits, or
    /// falling back to the unconstrained shortest path; the dropped
    /// waypoints are reported on the returned path.
    pub fn constrained(
        &self,
        src: NodeId,
        dst: NodeId,
        waypoints: &[NodeId],
        mode: WaypointMode,
        policy: RelaxationPolicy,
    ) -> Result<RoutedPath, SearchFailure> {
        if waypoints.is_empty() {
            return self.shortest(src, dst).ok_or(SearchFailure::Unreachable);
        }
        let candidates = self.simple_paths(src, dst);
        if candidates.is_empty() {
            return Err(SearchFailure::Unreachable);
        }
        if let Some(hit) = candidates
            .iter()
            .find(|p| Self::visits_in_order(&p.nodes, waypoints))
        {
            return Ok(hit.clone());
        }
        match mode {
            WaypointMode::Strict => Err(SearchFailure::ConstraintUnsatisfiable),
            WaypointMode::Loose => {
                let relaxed = self.relax(&candidates, waypoints, policy);
                debug!(
                    dropped = relaxed.relaxed_waypoints.len(),
                    "waypoint constraint relaxed"
                );
                Ok(relaxed)
            }
        }
    }

    fn relax(
        &self,
        candidates: &[RoutedPath],
        waypoints: &[NodeId],
        policy: RelaxationPolicy,
    ) -> RoutedPath {
        match policy {
            RelaxationPolicy::DropInOrder => {
                // drop waypoints front-to-back until some candidate fits
                let mut kept: Vec<NodeId> = waypoints.to_vec();
                let mut dropped: Vec<NodeId> = Vec::new();
                while !kept.is_empty() {
                    dropped.push(kept.remove(0));
                    if let Some(hit) = candidates
                        .iter()
                        .find(|p| Self::visits_in_order(&p.nodes, &kept))
                    {
                        let mut path = hit.clone();
                        path.relaxed_waypoints =
                            dropped.iter().map(|id| self.topo.uid(*id).to_string()).collect();
                        return path;
                    }
                }
                let mut path = candidates[0].clone();
                path.relaxed_waypoints =
                    dropped.iter().map(|id| self.topo.uid(*id).to_string()).collect();
                path
            }
            RelaxationPolicy::Fallback => {
                let mut path = candidates[0].clone();
                path.relaxed_waypoints = waypoints
                    .iter()
                    .map(|id| self.topo.uid(*id).to_string())
                    .collect();
                path
            }
        }
    }
}
