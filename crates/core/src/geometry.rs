//! Planar geometry primitives shared by the mesh and the tracer.
//!
//! Points and vectors are both [`glam::DVec2`]; the aliases only document
//! intent at API boundaries.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A position in mesh space.
pub type Point2 = DVec2;

/// A field sample or direction in mesh space.
pub type Vector2 = DVec2;

/// Axis-aligned extents of a cell, with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    /// Builds bounds from two corners; callers keep `x1 <= x2` and `y1 <= y2`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Smallest box containing every point. Returns `None` for an empty slice.
    pub fn enclosing(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        Some(points.iter().skip(1).fold(
            Self::new(first.x, first.y, first.x, first.y),
            |b, p| Self::new(b.x1.min(p.x), b.y1.min(p.y), b.x2.max(p.x), b.y2.max(p.y)),
        ))
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Extent along y.
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    /// Position of a corner.
    pub fn corner(&self, corner: Corner) -> Point2 {
        match corner {
            Corner::X1Y1 => DVec2::new(self.x1, self.y1),
            Corner::X2Y1 => DVec2::new(self.x2, self.y1),
            Corner::X1Y2 => DVec2::new(self.x1, self.y2),
            Corner::X2Y2 => DVec2::new(self.x2, self.y2),
        }
    }
}

/// One of the four corners of an axis-aligned cell, named by which extent
/// it sits on in each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    X1Y1,
    X2Y1,
    X1Y2,
    X2Y2,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::X1Y1, Corner::X2Y1, Corner::X1Y2, Corner::X2Y2];

    /// Position of this corner in [`Corner::ALL`].
    pub fn index(self) -> usize {
        match self {
            Corner::X1Y1 => 0,
            Corner::X2Y1 => 1,
            Corner::X1Y2 => 2,
            Corner::X2Y2 => 3,
        }
    }
}

/// One of the four bounding lines of an axis-aligned cell.
///
/// The declaration order is the priority order used when a ray leaves a
/// cell through a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// `y = y1`
    Y1,
    /// `y = y2`
    Y2,
    /// `x = x1`
    X1,
    /// `x = x2`
    X2,
}

impl Side {
    pub const PRIORITY: [Side; 4] = [Side::Y1, Side::Y2, Side::X1, Side::X2];

    /// The two corners spanning this side.
    pub fn corners(self) -> (Corner, Corner) {
        match self {
            Side::Y1 => (Corner::X1Y1, Corner::X2Y1),
            Side::Y2 => (Corner::X1Y2, Corner::X2Y2),
            Side::X1 => (Corner::X1Y1, Corner::X1Y2),
            Side::X2 => (Corner::X2Y1, Corner::X2Y2),
        }
    }
}

/// A straight piece of a traced streamline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point2,
    pub end: Point2,
}

impl LineSegment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Ordered sequence of connected segments: one direction of one streamline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    segments: Vec<LineSegment>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: LineSegment) {
        self.segments.push(segment);
    }

    /// Segments in tracing order.
    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(LineSegment::length).sum()
    }

    /// Vertices in order: the first segment's start followed by every end.
    pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.segments
            .first()
            .map(|s| s.start)
            .into_iter()
            .chain(self.segments.iter().map(|s| s.end))
    }
}
