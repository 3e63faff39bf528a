//! Adjacency-component index: bounds how far a merge's locality check is
//! allowed to look, per the grey-edge (adjacency-only) partition of the
//! pinch graph.
//!
//! A vertex starts in exactly one component (its contig's connected run
//! under grey edges), but merges can weld components together without
//! literally merging every vertex in them, so a vertex may end up
//! straddling several components at once. The index therefore tracks
//! component membership as a *set* per vertex, plus an overlay graph of
//! which components are already linked by some black edge, and answers
//! locality queries by bounded-hop search over that overlay.

use super::vertex::VertexId;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet, VecDeque};

/// Identifier for an adjacency component. Stable for the lifetime of the
/// index; components are never split, only unioned via the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

#[derive(Debug, Clone, Default)]
pub struct AdjacencyComponentIndex {
    /// Components each vertex currently belongs to.
    membership: HashMap<VertexId, IndexSet<ComponentId>>,
    /// Overlay multigraph: an edge between two components exists once a
    /// black edge has bridged a vertex in one to a vertex in the other.
    overlay: HashMap<ComponentId, HashSet<ComponentId>>,
    next_component: usize,
}

impl AdjacencyComponentIndex {
    /// Allocate a fresh component and seed it with `vertices` (used at
    /// construction time, one component per contig's initial grey-edge
    /// chain).
    pub fn new_component(&mut self, vertices: impl IntoIterator<Item = VertexId>) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        self.overlay.entry(id).or_default();
        for v in vertices {
            self.membership.entry(v).or_default().insert(id);
        }
        id
    }

    pub fn components_of(&self, v: VertexId) -> impl Iterator<Item = ComponentId> + '_ {
        self.membership.get(&v).into_iter().flatten().copied()
    }

    /// Record that `a` and `b` are now joined by a black edge: each
    /// inherits the other's component membership, and every pair of
    /// components spanning the two vertices becomes adjacent in the
    /// overlay.
    pub fn record_black_edge(&mut self, a: VertexId, b: VertexId) {
        let comps_a: Vec<_> = self.components_of(a).collect();
        let comps_b: Vec<_> = self.components_of(b).collect();
        for &ca in &comps_a {
            for &cb in &comps_b {
                if ca != cb {
                    self.overlay.entry(ca).or_default().insert(cb);
                    self.overlay.entry(cb).or_default().insert(ca);
                }
            }
        }
        let union: IndexSet<ComponentId> = comps_a.iter().chain(comps_b.iter()).copied().collect();
        self.membership.entry(a).or_default().extend(union.iter().copied());
        self.membership.entry(b).or_default().extend(union.iter().copied());
    }

    /// Merge `from`'s component membership into `into` (used when two
    /// vertices are unioned by a whole-block merge).
    pub fn union_vertices(&mut self, into: VertexId, from: VertexId) {
        if let Some(comps) = self.membership.remove(&from) {
            self.membership.entry(into).or_default().extend(comps);
        }
    }

    /// Whether `a` and `b` lie within `bound` overlay hops of each other.
    /// `bound == 0` means strictly "share a component" (the conservative
    /// reading: a merge is only ever allowed within a single original
    /// adjacency component).
    pub fn within_overlap(&self, a: VertexId, b: VertexId, bound: u32) -> bool {
        let comps_a: HashSet<_> = self.components_of(a).collect();
        let comps_b: HashSet<_> = self.components_of(b).collect();
        if comps_a.is_empty() || comps_b.is_empty() {
            // Vertices with no recorded component (e.g. freshly split
            // midpoints not yet registered) are never locality-blocked.
            return true;
        }
        if !comps_a.is_disjoint(&comps_b) {
            return true;
        }
        if bound == 0 {
            return false;
        }
        let mut frontier: HashSet<ComponentId> = comps_a.clone();
        let mut visited: HashSet<ComponentId> = comps_a.clone();
        for _ in 0..bound {
            let mut next = HashSet::new();
            for c in &frontier {
                if let Some(neighbors) = self.overlay.get(c) {
                    for &n in neighbors {
                        if visited.insert(n) {
                            next.insert(n);
                        }
                    }
                }
            }
            if !next.is_disjoint(&comps_b) {
                return true;
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        false
    }

    /// Breadth-first distance in overlay hops between any component of
    /// `a` and any component of `b`, or `None` if unreachable. Exposed
    /// for diagnostics only.
    pub fn overlay_distance(&self, a: VertexId, b: VertexId) -> Option<u32> {
        let comps_a: HashSet<_> = self.components_of(a).collect();
        let comps_b: HashSet<_> = self.components_of(b).collect();
        if !comps_a.is_disjoint(&comps_b) {
            return Some(0);
        }
        let mut queue: VecDeque<(ComponentId, u32)> = comps_a.iter().map(|&c| (c, 0)).collect();
        let mut visited: HashSet<ComponentId> = comps_a.clone();
        while let Some((c, dist)) = queue.pop_front() {
            if comps_b.contains(&c) {
                return Some(dist);
            }
            if let Some(neighbors) = self.overlay.get(&c) {
                for &n in neighbors {
                    if visited.insert(n) {
                        queue.push_back((n, dist + 1));
                    }
                }
            }
        }
        None
    }
}
