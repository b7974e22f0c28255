//! Axis-aligned quadrilateral meshes carrying a per-vertex vector field.
//!
//! [`MeshQuery`] is the narrow interface the tracer needs: point location,
//! per-cell extents and corner samples, and edge adjacency. [`QuadMesh`] is
//! the in-tree implementation. Cells must be rectilinear: every corner of a
//! cell's bounding box has to be one of its four vertices.

use std::collections::HashMap;
use std::fmt;

use glam::DVec2;

use crate::error::FlowError;
use crate::field_source::FieldSource;
use crate::geometry::{Bounds, Corner, Point2, Side, Vector2};
use crate::singularity;

/// Index of a cell in its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub usize);

/// Index of a vertex in its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Index of an edge in its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Queries a tracer issues against a mesh.
///
/// Methods taking a [`CellId`], [`VertexId`] or [`EdgeId`] may panic when
/// handed an id that did not come from the same mesh.
pub trait MeshQuery {
    /// The cell enclosing `p`, or `None` outside the mesh. A point on a shared
    /// edge resolves to a single, implementation-defined cell.
    fn find_cell(&self, p: Point2) -> Option<CellId>;

    /// Axis-aligned extents of a cell.
    fn cell_bounds(&self, cell: CellId) -> Bounds;

    /// The vertex sitting at one corner of a cell.
    fn corner_vertex(&self, cell: CellId, corner: Corner) -> VertexId;

    /// Field value at one corner of a cell.
    fn corner_sample(&self, cell: CellId, corner: Corner) -> Vector2;

    /// The edge joining two vertices, if they share one.
    fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId>;

    /// The cell on the other side of `edge` from `cell`; `None` on the mesh
    /// boundary.
    fn other_cell(&self, edge: EdgeId, cell: CellId) -> Option<CellId>;

    /// Distance from `p` to the closest known singularity, or
    /// `f64::INFINITY` when none is known.
    fn nearest_singularity_distance(&self, p: Point2) -> f64;

    /// The cell adjacent to `cell` across one of its bounding lines.
    fn neighbor_across(&self, cell: CellId, side: Side) -> Option<CellId> {
        let (a, b) = side.corners();
        let edge = self.find_edge(self.corner_vertex(cell, a), self.corner_vertex(cell, b))?;
        self.other_cell(edge, cell)
    }

    /// All four corner samples, indexed by [`Corner::index`].
    fn corner_samples(&self, cell: CellId) -> [Vector2; 4] {
        Corner::ALL.map(|c| self.corner_sample(cell, c))
    }
}

/// A mesh vertex: a position and the field value sampled there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point2,
    pub field: Vector2,
}

impl Vertex {
    pub fn new(position: Point2, field: Vector2) -> Self {
        Self { position, field }
    }
}

#[derive(Debug, Clone)]
struct Quad {
    /// Vertices keyed by [`Corner::index`].
    corners: [VertexId; 4],
    bounds: Bounds,
    singularity: Option<Point2>,
}

#[derive(Debug, Clone)]
struct Edge {
    cells: [Option<CellId>; 2],
}

/// A quadrilateral mesh with edge adjacency and a bucketed point locator.
#[derive(Debug, Clone)]
pub struct QuadMesh {
    vertices: Vec<Vertex>,
    quads: Vec<Quad>,
    edges: Vec<Edge>,
    edge_index: HashMap<(usize, usize), EdgeId>,
    locator: CellLocator,
}

impl QuadMesh {
    /// Builds a mesh from vertices and quads given as four vertex indices in
    /// cyclic order.
    ///
    /// Returns `FlowError::InvalidMesh` when the mesh is empty, an index is
    /// out of range or repeated within a quad, a value is non-finite, a quad is
    /// not axis-aligned, or an edge is shared by more than two quads.
    pub fn new(vertices: Vec<Vertex>, quads: Vec<[usize; 4]>) -> Result<Self, FlowError> {
        if vertices.is_empty() || quads.is_empty() {
            return Err(FlowError::InvalidMesh("mesh has no cells".into()));
        }
        if let Some(i) = vertices
            .iter()
            .position(|v| !v.position.is_finite() || !v.field.is_finite())
        {
            return Err(FlowError::InvalidMesh(format!(
                "vertex {i} has a non-finite position or field value"
            )));
        }

        let mut built = Vec::with_capacity(quads.len());
        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_index: HashMap<(usize, usize), EdgeId> = HashMap::new();

        for (q, ids) in quads.iter().enumerate() {
            let cell = CellId(q);
            if let Some(&bad) = ids.iter().find(|&&v| v >= vertices.len()) {
                return Err(FlowError::InvalidMesh(format!(
                    "cell {q} references vertex {bad}, but the mesh has {} vertices",
                    vertices.len()
                )));
            }
            for i in 0..4 {
                if ids[i + 1..].contains(&ids[i]) {
                    return Err(FlowError::InvalidMesh(format!(
                        "cell {q} repeats vertex {}",
                        ids[i]
                    )));
                }
            }

            let positions = ids.map(|v| vertices[v].position);
            let bounds = Bounds::enclosing(&positions)
                .ok_or_else(|| FlowError::InvalidMesh(format!("cell {q} has no vertices")))?;
            let mut corners = [VertexId(0); 4];
            for corner in Corner::ALL {
                let at = bounds.corner(corner);
                let v = ids
                    .iter()
                    .find(|&&v| vertices[v].position == at)
                    .ok_or_else(|| {
                        FlowError::InvalidMesh(format!("cell {q} is not axis-aligned"))
                    })?;
                corners[corner.index()] = VertexId(*v);
            }

            for i in 0..4 {
                let (a, b) = (ids[i], ids[(i + 1) % 4]);
                let key = (a.min(b), a.max(b));
                let id = *edge_index.entry(key).or_insert_with(|| {
                    edges.push(Edge { cells: [None, None] });
                    EdgeId(edges.len() - 1)
                });
                let slots = &mut edges[id.0].cells;
                if slots[0].is_none() {
                    slots[0] = Some(cell);
                } else if slots[1].is_none() {
                    slots[1] = Some(cell);
                } else {
                    return Err(FlowError::InvalidMesh(format!(
                        "edge ({a}, {b}) is shared by more than two cells"
                    )));
                }
            }

            built.push(Quad {
                corners,
                bounds,
                singularity: None,
            });
        }

        let locator = CellLocator::new(&built);
        Ok(Self {
            vertices,
            quads: built,
            edges,
            edge_index,
            locator,
        })
    }

    /// Samples `source` at the vertices of an `nx` x `ny` structured grid
    /// spanning `[min, max]`.
    ///
    /// Vertices are numbered row-major (`j * (nx + 1) + i`) and cells likewise
    /// (`j * nx + i`), so cell 0 touches `min`.
    pub fn grid(
        min: Point2,
        max: Point2,
        nx: usize,
        ny: usize,
        source: &dyn FieldSource,
    ) -> Result<Self, FlowError> {
        if nx == 0 || ny == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        if !(max.x > min.x && max.y > min.y) {
            return Err(FlowError::InvalidMesh(format!(
                "grid extent ({}, {})..({}, {}) is empty",
                min.x, min.y, max.x, max.y
            )));
        }

        let coord = |lo: f64, hi: f64, i: usize, n: usize| {
            if i == n {
                hi
            } else {
                lo + (hi - lo) * i as f64 / n as f64
            }
        };

        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                let p = DVec2::new(coord(min.x, max.x, i, nx), coord(min.y, max.y, j, ny));
                vertices.push(Vertex::new(p, source.sample(p)));
            }
        }

        let vid = |i: usize, j: usize| j * (nx + 1) + i;
        let mut quads = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                quads.push([vid(i, j), vid(i + 1, j), vid(i + 1, j + 1), vid(i, j + 1)]);
            }
        }

        Self::new(vertices, quads)
    }

    /// Number of quads.
    pub fn cell_count(&self) -> usize {
        self.quads.len()
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct edges, shared edges counted once.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex by id. Panics if `id` is not from this mesh.
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    /// Extents of the whole mesh.
    pub fn bounds(&self) -> Bounds {
        self.locator.bounds
    }

    /// Singularity recorded for `cell`, if any.
    pub fn singularity(&self, cell: CellId) -> Option<Point2> {
        self.quads[cell.0].singularity
    }

    /// Records or clears the singularity of `cell`.
    pub fn set_singularity(&mut self, cell: CellId, at: Option<Point2>) {
        self.quads[cell.0].singularity = at;
    }

    /// Every recorded singularity with the cell holding it.
    pub fn singularities(&self) -> impl Iterator<Item = (CellId, Point2)> + '_ {
        self.quads
            .iter()
            .enumerate()
            .filter_map(|(i, q)| q.singularity.map(|s| (CellId(i), s)))
    }

    /// Replaces every cell's singularity marker with the zero of its bilinear
    /// field, if it has one strictly inside. Returns the number found.
    pub fn locate_singularities(&mut self) -> usize {
        let mut found = 0;
        for i in 0..self.quads.len() {
            let samples = self.corner_samples(CellId(i));
            let at = singularity::locate(self.quads[i].bounds, samples);
            found += usize::from(at.is_some());
            self.quads[i].singularity = at;
        }
        tracing::debug!(found, cells = self.quads.len(), "located singularities");
        found
    }

    /// Removes every singularity marker.
    pub fn clear_singularities(&mut self) {
        for q in &mut self.quads {
            q.singularity = None;
        }
    }
}

impl MeshQuery for QuadMesh {
    fn find_cell(&self, p: Point2) -> Option<CellId> {
        self.locator
            .candidates(p)?
            .iter()
            .copied()
            .find(|c| self.quads[c.0].bounds.contains(p))
    }

    fn cell_bounds(&self, cell: CellId) -> Bounds {
        self.quads[cell.0].bounds
    }

    fn corner_vertex(&self, cell: CellId, corner: Corner) -> VertexId {
        self.quads[cell.0].corners[corner.index()]
    }

    fn corner_sample(&self, cell: CellId, corner: Corner) -> Vector2 {
        self.vertices[self.corner_vertex(cell, corner).0].field
    }

    fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&(a.0.min(b.0), a.0.max(b.0))).copied()
    }

    fn other_cell(&self, edge: EdgeId, cell: CellId) -> Option<CellId> {
        match self.edges[edge.0].cells {
            [Some(a), b] if a == cell => b,
            [a, Some(b)] if b == cell => a,
            _ => None,
        }
    }

    fn nearest_singularity_distance(&self, p: Point2) -> f64 {
        self.singularities()
            .map(|(_, s)| s.distance(p))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Uniform bucket grid over the mesh extents. Each bucket lists, in
/// ascending id order, every cell whose bounding box overlaps it, so the
/// first containing candidate is also the first containing cell overall.
#[derive(Debug, Clone)]
struct CellLocator {
    bounds: Bounds,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<CellId>>,
}

impl CellLocator {
    fn new(quads: &[Quad]) -> Self {
        let corners: Vec<Point2> = quads
            .iter()
            .flat_map(|q| [q.bounds.corner(Corner::X1Y1), q.bounds.corner(Corner::X2Y2)])
            .collect();
        let bounds = Bounds::enclosing(&corners).unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
        let side = ((quads.len() as f64).sqrt().ceil() as usize).max(1);
        let mut locator = Self {
            bounds,
            nx: side,
            ny: side,
            buckets: vec![Vec::new(); side * side],
        };
        for (i, q) in quads.iter().enumerate() {
            let (i0, j0) = locator.bucket(q.bounds.corner(Corner::X1Y1));
            let (i1, j1) = locator.bucket(q.bounds.corner(Corner::X2Y2));
            for j in j0..=j1 {
                for ii in i0..=i1 {
                    locator.buckets[j * locator.nx + ii].push(CellId(i));
                }
            }
        }
        locator
    }

    fn bucket(&self, p: Point2) -> (usize, usize) {
        (
            bucket_coord(p.x, self.bounds.x1, self.bounds.width(), self.nx),
            bucket_coord(p.y, self.bounds.y1, self.bounds.height(), self.ny),
        )
    }

    fn candidates(&self, p: Point2) -> Option<&[CellId]> {
        if !self.bounds.contains(p) {
            return None;
        }
        let (i, j) = self.bucket(p);
        Some(&self.buckets[j * self.nx + i])
    }
}

fn bucket_coord(v: f64, lo: f64, span: f64, n: usize) -> usize {
    if span <= 0.0 {
        return 0;
    }
    (((v - lo) / span * n as f64).floor().max(0.0) as usize).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_source::Uniform;

    fn unit_grid(nx: usize, ny: usize) -> QuadMesh {
        QuadMesh::grid(
            DVec2::ZERO,
            DVec2::new(nx as f64, ny as f64),
            nx,
            ny,
            &Uniform::new(DVec2::X),
        )
        .unwrap()
    }

    fn square(x: f64, y: f64) -> Vec<Vertex> {
        [(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]
            .iter()
            .map(|&(px, py)| Vertex::new(DVec2::new(px, py), DVec2::X))
            .collect()
    }

    // -- Construction --

    #[test]
    fn grid_has_expected_counts() {
        let mesh = unit_grid(3, 2);
        assert_eq!(mesh.cell_count(), 6);
        assert_eq!(mesh.vertex_count(), 12);
        // 3 * 3 horizontal + 4 * 2 vertical
        assert_eq!(mesh.edge_count(), 17);
        assert_eq!(mesh.bounds(), Bounds::new(0.0, 0.0, 3.0, 2.0));
    }

    #[test]
    fn grid_with_zero_resolution_returns_error() {
        let src = Uniform::new(DVec2::X);
        let r = QuadMesh::grid(DVec2::ZERO, DVec2::ONE, 0, 2, &src);
        assert!(matches!(r, Err(FlowError::InvalidDimensions)));
    }

    #[test]
    fn grid_with_empty_extent_returns_error() {
        let src = Uniform::new(DVec2::X);
        let r = QuadMesh::grid(DVec2::ONE, DVec2::ONE, 2, 2, &src);
        assert!(matches!(r, Err(FlowError::InvalidMesh(_))));
    }

    #[test]
    fn grid_samples_source_at_vertices() {
        struct Position;
        impl FieldSource for Position {
            fn sample(&self, p: Point2) -> Vector2 {
                p
            }
        }
        let mesh = QuadMesh::grid(DVec2::ZERO, DVec2::new(2.0, 1.0), 2, 1, &Position).unwrap();
        for i in 0..mesh.vertex_count() {
            let v = mesh.vertex(VertexId(i));
            assert_eq!(v.position, v.field, "vertex {i}");
        }
    }

    #[test]
    fn new_rejects_empty_mesh() {
        assert!(matches!(
            QuadMesh::new(Vec::new(), Vec::new()),
            Err(FlowError::InvalidMesh(_))
        ));
    }

    #[test]
    fn new_rejects_out_of_range_vertex() {
        let r = QuadMesh::new(square(0.0, 0.0), vec![[0, 1, 2, 9]]);
        assert!(matches!(r, Err(FlowError::InvalidMesh(msg)) if msg.contains('9')));
    }

    #[test]
    fn new_rejects_repeated_vertex() {
        let r = QuadMesh::new(square(0.0, 0.0), vec![[0, 1, 1, 3]]);
        assert!(matches!(r, Err(FlowError::InvalidMesh(_))));
    }

    #[test]
    fn new_rejects_non_axis_aligned_quad() {
        let vertices = vec![
            Vertex::new(DVec2::new(0.0, 0.0), DVec2::X),
            Vertex::new(DVec2::new(1.0, 0.2), DVec2::X),
            Vertex::new(DVec2::new(1.0, 1.0), DVec2::X),
            Vertex::new(DVec2::new(0.0, 1.0), DVec2::X),
        ];
        let r = QuadMesh::new(vertices, vec![[0, 1, 2, 3]]);
        assert!(matches!(r, Err(FlowError::InvalidMesh(msg)) if msg.contains("axis-aligned")));
    }

    #[test]
    fn new_rejects_non_finite_values() {
        let mut vertices = square(0.0, 0.0);
        vertices[2].field = DVec2::new(f64::NAN, 0.0);
        let r = QuadMesh::new(vertices, vec![[0, 1, 2, 3]]);
        assert!(matches!(r, Err(FlowError::InvalidMesh(_))));
    }

    #[test]
    fn new_rejects_edge_shared_by_three_cells() {
        // Three quads stacked on the same pair of vertices 0-1.
        let mut vertices = square(0.0, 0.0);
        vertices.push(Vertex::new(DVec2::new(1.0, -1.0), DVec2::X));
        vertices.push(Vertex::new(DVec2::new(0.0, -1.0), DVec2::X));
        vertices.push(Vertex::new(DVec2::new(1.0, 2.0), DVec2::X));
        vertices.push(Vertex::new(DVec2::new(0.0, 2.0), DVec2::X));
        let quads = vec![[0, 1, 2, 3], [0, 1, 4, 5], [0, 1, 6, 7]];
        assert!(matches!(
            QuadMesh::new(vertices, quads),
            Err(FlowError::InvalidMesh(msg)) if msg.contains("more than two")
        ));
    }

    #[test]
    fn corners_are_resolved_regardless_of_winding() {
        // Clockwise winding starting at the top-right corner.
        let vertices = vec![
            Vertex::new(DVec2::new(2.0, 3.0), DVec2::new(4.0, 0.0)),
            Vertex::new(DVec2::new(2.0, 1.0), DVec2::new(2.0, 0.0)),
            Vertex::new(DVec2::new(0.0, 1.0), DVec2::new(1.0, 0.0)),
            Vertex::new(DVec2::new(0.0, 3.0), DVec2::new(3.0, 0.0)),
        ];
        let mesh = QuadMesh::new(vertices, vec![[0, 1, 2, 3]]).unwrap();
        let c = CellId(0);
        assert_eq!(mesh.cell_bounds(c), Bounds::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(mesh.corner_sample(c, Corner::X1Y1).x, 1.0);
        assert_eq!(mesh.corner_sample(c, Corner::X2Y1).x, 2.0);
        assert_eq!(mesh.corner_sample(c, Corner::X1Y2).x, 3.0);
        assert_eq!(mesh.corner_sample(c, Corner::X2Y2).x, 4.0);
    }

    // -- Point location --

    #[test]
    fn find_cell_locates_interior_points() {
        let mesh = unit_grid(2, 2);
        assert_eq!(mesh.find_cell(DVec2::new(0.5, 0.5)), Some(CellId(0)));
        assert_eq!(mesh.find_cell(DVec2::new(1.5, 0.5)), Some(CellId(1)));
        assert_eq!(mesh.find_cell(DVec2::new(0.5, 1.5)), Some(CellId(2)));
        assert_eq!(mesh.find_cell(DVec2::new(1.5, 1.5)), Some(CellId(3)));
    }

    #[test]
    fn find_cell_outside_returns_none() {
        let mesh = unit_grid(2, 2);
        assert_eq!(mesh.find_cell(DVec2::new(-0.1, 0.5)), None);
        assert_eq!(mesh.find_cell(DVec2::new(0.5, 2.0001)), None);
    }

    #[test]
    fn find_cell_on_mesh_boundary_is_inside() {
        let mesh = unit_grid(2, 2);
        assert_eq!(mesh.find_cell(DVec2::ZERO), Some(CellId(0)));
        assert_eq!(mesh.find_cell(DVec2::new(2.0, 2.0)), Some(CellId(3)));
    }

    #[test]
    fn find_cell_on_shared_edge_picks_lowest_id() {
        let mesh = unit_grid(2, 2);
        assert_eq!(mesh.find_cell(DVec2::new(1.0, 0.5)), Some(CellId(0)));
        assert_eq!(mesh.find_cell(DVec2::new(1.0, 1.0)), Some(CellId(0)));
        assert_eq!(mesh.find_cell(DVec2::new(1.5, 1.0)), Some(CellId(1)));
    }

    #[test]
    fn find_cell_handles_mesh_with_hole() {
        // Two unit squares separated by a gap.
        let mut vertices = square(0.0, 0.0);
        vertices.extend(square(3.0, 0.0));
        let mesh = QuadMesh::new(vertices, vec![[0, 1, 2, 3], [4, 5, 6, 7]]).unwrap();
        assert_eq!(mesh.find_cell(DVec2::new(0.5, 0.5)), Some(CellId(0)));
        assert_eq!(mesh.find_cell(DVec2::new(2.0, 0.5)), None);
        assert_eq!(mesh.find_cell(DVec2::new(3.5, 0.5)), Some(CellId(1)));
    }

    // -- Adjacency --

    #[test]
    fn neighbor_across_each_side() {
        let mesh = unit_grid(3, 3);
        let center = CellId(4);
        assert_eq!(mesh.neighbor_across(center, Side::Y1), Some(CellId(1)));
        assert_eq!(mesh.neighbor_across(center, Side::Y2), Some(CellId(7)));
        assert_eq!(mesh.neighbor_across(center, Side::X1), Some(CellId(3)));
        assert_eq!(mesh.neighbor_across(center, Side::X2), Some(CellId(5)));
    }

    #[test]
    fn neighbor_across_boundary_is_none() {
        let mesh = unit_grid(2, 2);
        assert_eq!(mesh.neighbor_across(CellId(0), Side::Y1), None);
        assert_eq!(mesh.neighbor_across(CellId(0), Side::X1), None);
        assert_eq!(mesh.neighbor_across(CellId(3), Side::X2), None);
    }

    #[test]
    fn other_cell_for_unrelated_cell_is_none() {
        let mesh = unit_grid(3, 1);
        let (a, b) = Side::X2.corners();
        let edge = mesh
            .find_edge(
                mesh.corner_vertex(CellId(0), a),
                mesh.corner_vertex(CellId(0), b),
            )
            .unwrap();
        assert_eq!(mesh.other_cell(edge, CellId(0)), Some(CellId(1)));
        assert_eq!(mesh.other_cell(edge, CellId(1)), Some(CellId(0)));
        assert_eq!(mesh.other_cell(edge, CellId(2)), None);
    }

    #[test]
    fn find_edge_is_order_independent() {
        let mesh = unit_grid(1, 1);
        let a = VertexId(0);
        let b = VertexId(1);
        assert!(mesh.find_edge(a, b).is_some());
        assert_eq!(mesh.find_edge(a, b), mesh.find_edge(b, a));
        // Diagonal is not an edge.
        assert_eq!(mesh.find_edge(VertexId(0), VertexId(3)), None);
    }

    // -- Singularities --

    #[test]
    fn no_singularities_means_infinite_distance() {
        let mesh = unit_grid(2, 2);
        assert_eq!(mesh.nearest_singularity_distance(DVec2::ONE), f64::INFINITY);
    }

    #[test]
    fn nearest_singularity_distance_picks_closest_marker() {
        let mut mesh = unit_grid(2, 2);
        mesh.set_singularity(CellId(0), Some(DVec2::new(0.5, 0.5)));
        mesh.set_singularity(CellId(3), Some(DVec2::new(1.5, 1.5)));
        let d = mesh.nearest_singularity_distance(DVec2::new(1.5, 1.0));
        assert!((d - 0.5).abs() < 1e-12, "got {d}");
        assert_eq!(mesh.singularities().count(), 2);
        mesh.clear_singularities();
        assert_eq!(mesh.singularities().count(), 0);
    }

    #[test]
    fn locate_singularities_finds_center_of_vortex_grid() {
        struct Spin;
        impl FieldSource for Spin {
            fn sample(&self, p: Point2) -> Vector2 {
                DVec2::new(-(p.y - 1.0), p.x - 1.0)
            }
        }
        // Cells are 1.25 wide so the zero at (1, 1) is strictly inside cell 0.
        let mut mesh = QuadMesh::grid(DVec2::ZERO, DVec2::new(2.5, 2.5), 2, 2, &Spin).unwrap();
        let found = mesh.locate_singularities();
        assert_eq!(found, 1);
        let (cell, at) = mesh.singularities().next().unwrap();
        assert_eq!(cell, CellId(0));
        assert!(at.abs_diff_eq(DVec2::ONE, 1e-9), "got {at}");
    }
}
