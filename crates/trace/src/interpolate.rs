//! Bilinear interpolation of the vertex field inside one cell.

use evenflow_core::{Bounds, CellId, Corner, FlowError, MeshQuery, Point2, Vector2};

/// A cell's extents together with its four corner samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    bounds: Bounds,
    samples: [Vector2; 4],
}

impl CellSample {
    /// Reads a cell from the mesh.
    ///
    /// Returns `FlowError::DegenerateCell` when the cell has zero or
    /// non-finite width or height.
    pub fn gather<M: MeshQuery + ?Sized>(mesh: &M, cell: CellId) -> Result<Self, FlowError> {
        Self::new(cell, mesh.cell_bounds(cell), mesh.corner_samples(cell))
    }

    /// `samples` are indexed by [`Corner::index`]. `cell` is only used in
    /// the error.
    pub fn new(cell: CellId, bounds: Bounds, samples: [Vector2; 4]) -> Result<Self, FlowError> {
        let (width, height) = (bounds.width(), bounds.height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FlowError::DegenerateCell {
                cell: cell.0,
                width,
                height,
            });
        }
        Ok(Self { bounds, samples })
    }

    /// Extents of the sampled cell.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Field vector stored at `corner`.
    pub fn sample(&self, corner: Corner) -> Vector2 {
        self.samples[corner.index()]
    }

    /// Bilinear blend of the corner samples at `p`. Points outside the cell
    /// extrapolate.
    pub fn interpolate(&self, p: Point2) -> Vector2 {
        let b = self.bounds;
        let area = b.width() * b.height();
        let (dx1, dx2) = (p.x - b.x1, b.x2 - p.x);
        let (dy1, dy2) = (p.y - b.y1, b.y2 - p.y);
        let weights = [
            (Corner::X1Y1, dx2 * dy2),
            (Corner::X2Y1, dx1 * dy2),
            (Corner::X1Y2, dx2 * dy1),
            (Corner::X2Y2, dx1 * dy1),
        ];
        weights
            .iter()
            .map(|&(corner, w)| self.sample(corner) * (w / area))
            .sum()
    }
}

/// Field value at `p`, interpolated inside `cell`.
pub fn interpolate<M: MeshQuery + ?Sized>(
    mesh: &M,
    cell: CellId,
    p: Point2,
) -> Result<Vector2, FlowError> {
    Ok(CellSample::gather(mesh, cell)?.interpolate(p))
}

/// Unit field direction at `p`.
///
/// `None` outside the mesh, where the field vanishes, or in a degenerate
/// cell.
pub fn field_direction<M: MeshQuery + ?Sized>(mesh: &M, p: Point2) -> Option<Vector2> {
    let cell = mesh.find_cell(p)?;
    interpolate(mesh, cell, p).ok()?.try_normalize()
}
