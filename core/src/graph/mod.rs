//! The road graph: an arena of vertices and edges addressed by index.
//!
//! The source implementation ties vertices and edges together with shared
//! pointers, which gives each vertex a back-reference cycle into every edge
//! that touches it. Rust models the same adjacency without the cycle: the
//! registry owns flat arenas, and a [`Vertex`]'s incident list is a
//! collection of [`EdgeId`] indices rather than edge pointers. An index
//! only means something relative to the registry that produced it.

use std::collections::HashMap;

use crate::geometry::{Circle, Grid, Highway, Point};
use crate::trajectory::Interval;

/// Index of a [`Vertex`] within a [`ShapeRegistry`]'s vertex arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub(crate) u32);

/// Index of an [`Edge`] within a [`ShapeRegistry`]'s edge or implicit-edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

/// A road-graph vertex: a coordinate, a stable identifier from the shape
/// file, and the set of edges it is an endpoint of.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub point: Point,
    pub uid: u64,
    incident: Vec<EdgeId>,
}

impl Vertex {
    #[must_use]
    pub fn new(point: Point, uid: u64) -> Self {
        Self {
            point,
            uid,
            incident: Vec::new(),
        }
    }

    /// Records that `edge` has this vertex as one of its endpoints.
    pub fn add_edge(&mut self, edge: EdgeId) {
        self.incident.push(edge);
    }

    #[must_use]
    pub fn incident_edges(&self) -> &[EdgeId] {
        &self.incident
    }
}

/// A road-graph edge: an ordered pair of vertex endpoints, a stable
/// identifier, a road classification, and whether it came from the mapped
/// road network (`explicit`) or was inferred from trajectory data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub v1: VertexId,
    pub v2: VertexId,
    pub uid: u64,
    pub way_type: Highway,
    pub explicit: bool,
}

/// Owns the arenas for a parsed shape file: vertices, explicit edges,
/// implicit edges, circles, and grid cells.
///
/// Explicit and implicit edges maintain separate vertex arenas (mirroring
/// the source's separate `vertex_map_` / `implicit_edge_map_`), so a vertex
/// uid used by an implicit edge never aliases a same-numbered vertex used by
/// an explicit edge.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    vertices: Vec<Vertex>,
    vertex_by_uid: HashMap<u64, VertexId>,
    implicit_vertices: Vec<Vertex>,
    implicit_vertex_by_uid: HashMap<u64, VertexId>,
    edges: Vec<Edge>,
    implicit_edges: Vec<Edge>,
    pub(crate) circles: Vec<Circle>,
    pub(crate) grids: Vec<Grid>,
    pub(crate) critical_intervals: Vec<Interval>,
    pub(crate) privacy_intervals: Vec<Interval>,
}

impl ShapeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0 as usize]
    }

    #[must_use]
    pub fn implicit_vertex(&self, id: VertexId) -> &Vertex {
        &self.implicit_vertices[id.0 as usize]
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_uid(&self, uid: u64) -> Option<VertexId> {
        self.vertex_by_uid.get(&uid).copied()
    }

    #[must_use]
    pub fn implicit_vertex_uid(&self, uid: u64) -> Option<VertexId> {
        self.implicit_vertex_by_uid.get(&uid).copied()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn implicit_edges(&self) -> &[Edge] {
        &self.implicit_edges
    }

    #[must_use]
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    #[must_use]
    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    #[must_use]
    pub fn critical_intervals(&self) -> &[Interval] {
        &self.critical_intervals
    }

    #[must_use]
    pub fn privacy_intervals(&self) -> &[Interval] {
        &self.privacy_intervals
    }

    /// Finds or creates the explicit-edge vertex for `uid`, returning its id
    /// and whether it was newly created.
    pub(crate) fn intern_vertex(&mut self, uid: u64, point: Point) -> (VertexId, bool) {
        if let Some(&id) = self.vertex_by_uid.get(&uid) {
            (id, false)
        } else {
            let id = VertexId(u32::try_from(self.vertices.len()).expect("vertex arena overflow"));
            self.vertices.push(Vertex::new(point, uid));
            self.vertex_by_uid.insert(uid, id);
            (id, true)
        }
    }

    /// Finds or creates the implicit-edge vertex for `uid`.
    pub(crate) fn intern_implicit_vertex(&mut self, uid: u64, point: Point) -> (VertexId, bool) {
        if let Some(&id) = self.implicit_vertex_by_uid.get(&uid) {
            (id, false)
        } else {
            let id = VertexId(
                u32::try_from(self.implicit_vertices.len()).expect("vertex arena overflow"),
            );
            self.implicit_vertices.push(Vertex::new(point, uid));
            self.implicit_vertex_by_uid.insert(uid, id);
            (id, true)
        }
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(u32::try_from(self.edges.len()).expect("edge arena overflow"));
        self.vertices[edge.v1.0 as usize].add_edge(id);
        self.vertices[edge.v2.0 as usize].add_edge(id);
        self.edges.push(edge);
        id
    }

    pub(crate) fn push_implicit_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(u32::try_from(self.implicit_edges.len()).expect("edge arena overflow"));
        self.implicit_vertices[edge.v1.0 as usize].add_edge(id);
        self.implicit_vertices[edge.v2.0 as usize].add_edge(id);
        self.implicit_edges.push(edge);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_a_known_uid_reuses_the_vertex() {
        let mut reg = ShapeRegistry::new();
        let (a, created_a) = reg.intern_vertex(1, Point::new(42.3, -83.6));
        let (b, created_b) = reg.intern_vertex(1, Point::new(42.3, -83.6));
        assert!(created_a);
        assert!(!created_b);
        assert_eq!(a, b);
    }

    #[test]
    fn pushing_an_edge_updates_both_endpoints_incident_lists() {
        let mut reg = ShapeRegistry::new();
        let (v1, _) = reg.intern_vertex(1, Point::new(1.0, 1.0));
        let (v2, _) = reg.intern_vertex(2, Point::new(2.0, 2.0));
        let eid = reg.push_edge(Edge {
            v1,
            v2,
            uid: 100,
            way_type: Highway::Residential,
            explicit: true,
        });
        assert_eq!(reg.vertex(v1).incident_edges(), &[eid]);
        assert_eq!(reg.vertex(v2).incident_edges(), &[eid]);
    }
}
