//! Spatial index of every point already placed, used to keep streamlines
//! apart.

use std::collections::HashMap;

use evenflow_core::{MeshQuery, Point2};

/// Relative slack on distance tests. Candidate seeds are built exactly
/// `d_sep` away from their sample, and rounding must not reject them.
pub const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Points bucketed on a uniform grid of square cells.
#[derive(Debug, Clone)]
pub struct PointGrid {
    cell_size: f64,
    buckets: HashMap<(i64, i64), Vec<Point2>>,
    len: usize,
}

impl PointGrid {
    /// `cell_size` should be close to the largest query radius. Non-positive
    /// or non-finite sizes fall back to `1.0`.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    fn key(&self, p: Point2) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Stores `p`.
    pub fn insert(&mut self, p: Point2) {
        let key = self.key(p);
        self.buckets.entry(key).or_default().push(p);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any stored point is closer than `radius` to `p`, less
    /// [`DISTANCE_TOLERANCE`].
    pub fn any_within(&self, p: Point2, radius: f64) -> bool {
        if radius <= 0.0 || self.len == 0 {
            return false;
        }
        let limit = radius * (1.0 - DISTANCE_TOLERANCE);
        let close = |q: &Point2| q.distance(p) < limit;
        let rings = (radius / self.cell_size).ceil();
        let span = 2.0 * rings + 1.0;
        if span * span >= self.buckets.len() as f64 {
            return self.buckets.values().flatten().any(close);
        }
        let rings = rings as i64;
        let (kx, ky) = self.key(p);
        (kx - rings..=kx + rings).any(|x| {
            (ky - rings..=ky + rings).any(|y| {
                self.buckets
                    .get(&(x, y))
                    .is_some_and(|bucket| bucket.iter().any(close))
            })
        })
    }
}

/// Every point of every streamline that has been kept so far: accepted,
/// current and pending alike.
///
/// The streamline being traced is not in here until it is finished, so a
/// streamline never blocks itself.
#[derive(Debug, Clone)]
pub struct Occupancy {
    grid: PointGrid,
}

impl Occupancy {
    /// See [`PointGrid::new`] for `cell_size`.
    pub fn new(cell_size: f64) -> Self {
        Self {
            grid: PointGrid::new(cell_size),
        }
    }

    /// Marks every point as occupied.
    pub fn insert_all(&mut self, points: impl IntoIterator<Item = Point2>) {
        for p in points {
            self.grid.insert(p);
        }
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// A point is valid when it lies in the mesh and no stored point is
    /// closer than `min_distance`. A point exactly `min_distance` away (up to
    /// rounding) is still valid.
    pub fn is_valid<M: MeshQuery + ?Sized>(&self, mesh: &M, p: Point2, min_distance: f64) -> bool {
        mesh.find_cell(p).is_some() && !self.grid.any_within(p, min_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evenflow_core::field_source::Uniform;
    use evenflow_core::QuadMesh;
    use glam::DVec2;

    fn mesh() -> QuadMesh {
        QuadMesh::grid(DVec2::ZERO, DVec2::new(4.0, 4.0), 4, 4, &Uniform::new(DVec2::X)).unwrap()
    }

    // -- PointGrid --

    #[test]
    fn empty_grid_has_nothing_within() {
        let g = PointGrid::new(1.0);
        assert!(g.is_empty());
        assert!(!g.any_within(DVec2::ZERO, 100.0));
    }

    #[test]
    fn finds_points_in_neighbouring_buckets() {
        let mut g = PointGrid::new(1.0);
        g.insert(DVec2::new(0.95, 0.95));
        assert_eq!(g.len(), 1);
        assert!(g.any_within(DVec2::new(1.05, 1.05), 0.2));
        assert!(!g.any_within(DVec2::new(1.5, 1.5), 0.2));
    }

    #[test]
    fn handles_negative_coordinates() {
        let mut g = PointGrid::new(0.5);
        g.insert(DVec2::new(-0.1, -0.1));
        assert!(g.any_within(DVec2::new(0.1, 0.1), 0.3));
    }

    #[test]
    fn radius_larger_than_cells_scans_far_buckets() {
        let mut g = PointGrid::new(0.1);
        for i in 0..50 {
            g.insert(DVec2::new(i as f64 * 0.1, 0.0));
        }
        assert!(g.any_within(DVec2::new(10.0, 0.0), 5.2));
        assert!(!g.any_within(DVec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn exact_distance_is_not_within() {
        let mut g = PointGrid::new(1.0);
        g.insert(DVec2::ZERO);
        assert!(!g.any_within(DVec2::new(0.8, 0.0), 0.8));
    }

    #[test]
    fn rounding_below_radius_is_not_within() {
        let mut g = PointGrid::new(1.0);
        g.insert(DVec2::ZERO);
        assert!(!g.any_within(DVec2::new(0.5 - 1e-15, 0.0), 0.5));
        assert!(g.any_within(DVec2::new(0.5 - 1e-6, 0.0), 0.5));
    }

    #[test]
    fn bad_cell_size_falls_back() {
        let mut g = PointGrid::new(0.0);
        g.insert(DVec2::ONE);
        assert!(g.any_within(DVec2::new(1.1, 1.0), 0.2));
    }

    // -- Occupancy --

    #[test]
    fn empty_occupancy_accepts_any_mesh_point() {
        let occ = Occupancy::new(0.8);
        assert!(occ.is_valid(&mesh(), DVec2::new(2.0, 2.0), 0.8));
    }

    #[test]
    fn point_outside_mesh_is_invalid() {
        let occ = Occupancy::new(0.8);
        assert!(!occ.is_valid(&mesh(), DVec2::new(-0.1, 2.0), 0.8));
        assert!(!occ.is_valid(&mesh(), DVec2::new(2.0, 4.5), 0.0));
    }

    #[test]
    fn point_near_stored_point_is_invalid() {
        let mut occ = Occupancy::new(0.8);
        occ.insert_all([DVec2::new(1.0, 1.0), DVec2::new(3.0, 3.0)]);
        let m = mesh();
        assert!(!occ.is_valid(&m, DVec2::new(1.0, 1.5), 0.8));
        assert!(occ.is_valid(&m, DVec2::new(1.0, 1.9), 0.8));
        assert!(occ.is_valid(&m, DVec2::new(1.0, 1.5), 0.4));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn point() -> impl Strategy<Value = Point2> {
            (0.0_f64..4.0, 0.0_f64..4.0).prop_map(|(x, y)| DVec2::new(x, y))
        }

        proptest! {
            #[test]
            fn grid_agrees_with_brute_force(
                points in prop::collection::vec(point(), 0..40),
                q in point(),
                radius in 0.01_f64..3.0,
                cell in 0.05_f64..2.0,
            ) {
                let mut g = PointGrid::new(cell);
                for &p in &points {
                    g.insert(p);
                }
                let limit = radius * (1.0 - DISTANCE_TOLERANCE);
                let brute = points.iter().any(|p| p.distance(q) < limit);
                prop_assert_eq!(g.any_within(q, radius), brute);
            }

            #[test]
            fn is_valid_is_idempotent(
                points in prop::collection::vec(point(), 0..20),
                q in point(),
                d in 0.0_f64..2.0,
            ) {
                let m = mesh();
                let mut occ = Occupancy::new(0.8);
                occ.insert_all(points);
                let first = occ.is_valid(&m, q, d);
                prop_assert_eq!(occ.is_valid(&m, q, d), first);
                prop_assert_eq!(occ.is_valid(&m, q, d), first);
            }
        }
    }
}
