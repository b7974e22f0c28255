//! One integration step of a streamline, with cell-to-cell hand-off.

use evenflow_core::{Bounds, CellId, FlowError, MeshQuery, Point2, Side, Vector2};
use serde::{Deserialize, Serialize};

use crate::interpolate::CellSample;

/// Which way along the field a streamline grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// With the field.
    Forward,
    /// Against the field.
    Backward,
}

impl Direction {
    /// Tracing order for a streamline.
    pub const BOTH: [Direction; 2] = [Direction::Forward, Direction::Backward];

    /// `1.0` forward, `-1.0` backward; multiplies the field direction.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Moved to `position`, which lies in `cell`.
    Advanced { position: Point2, cell: CellId },
    /// Moved to `position`, which no cell contains.
    Exited { position: Point2 },
    /// Moved to `position`, which is closer than one step to a singularity.
    NearSingularity { position: Point2 },
    /// The field vanishes at the start position.
    Stalled,
}

impl StepOutcome {
    /// New position, if the step moved at all.
    pub fn position(&self) -> Option<Point2> {
        match *self {
            StepOutcome::Advanced { position, .. }
            | StepOutcome::Exited { position }
            | StepOutcome::NearSingularity { position } => Some(position),
            StepOutcome::Stalled => None,
        }
    }

    /// Cell to continue from; `None` for every outcome that ends the trace.
    pub fn cell(&self) -> Option<CellId> {
        match *self {
            StepOutcome::Advanced { cell, .. } => Some(cell),
            _ => None,
        }
    }
}

/// Where a ray leaves a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub side: Side,
    pub point: Point2,
}

/// Intersection of the ray `origin + t * dir` with the cell's bounding lines.
///
/// Lines are tried in [`Side::PRIORITY`] order. The first intersection that
/// lies within the perpendicular extent of the cell (inclusive) and ahead of
/// `origin` wins, so a ray through a corner exits via the y-side. A zero
/// direction component yields no candidate on the lines it runs parallel to.
pub fn select_crossing(bounds: Bounds, origin: Point2, dir: Vector2) -> Option<Crossing> {
    Side::PRIORITY.into_iter().find_map(|side| {
        let point = match side {
            Side::Y1 | Side::Y2 => {
                if dir.y == 0.0 {
                    return None;
                }
                let y = if side == Side::Y1 { bounds.y1 } else { bounds.y2 };
                let t = (y - origin.y) / dir.y;
                let x = origin.x + t * dir.x;
                if x < bounds.x1 || x > bounds.x2 {
                    return None;
                }
                Point2::new(x, y)
            }
            Side::X1 | Side::X2 => {
                if dir.x == 0.0 {
                    return None;
                }
                let x = if side == Side::X1 { bounds.x1 } else { bounds.x2 };
                let t = (x - origin.x) / dir.x;
                let y = origin.y + t * dir.y;
                if y < bounds.y1 || y > bounds.y2 {
                    return None;
                }
                Point2::new(x, y)
            }
        };
        ((point - origin).dot(dir) > 0.0).then_some(Crossing { side, point })
    })
}

/// Advances `position` (inside `cell`) by one step of length `step_size`
/// along the normalized field, negated for [`Direction::Backward`].
///
/// A step that would leave the cell is cut short at the crossing point and
/// continues in the neighbouring cell. When no crossing resolves, the
/// tentative position is located directly. A step landing closer than
/// `step_size` to a singularity reports [`StepOutcome::NearSingularity`].
pub fn step<M: MeshQuery + ?Sized>(
    mesh: &M,
    step_size: f64,
    position: Point2,
    cell: CellId,
    direction: Direction,
) -> Result<StepOutcome, FlowError> {
    let sample = CellSample::gather(mesh, cell)?;
    let Some(unit) = sample.interpolate(position).try_normalize() else {
        return Ok(StepOutcome::Stalled);
    };
    let dir = unit * direction.sign();
    let tentative = position + dir * step_size;
    let bounds = sample.bounds();

    let (next, next_cell) = if bounds.contains(tentative) {
        (tentative, Some(cell))
    } else if let Some(crossing) = select_crossing(bounds, position, dir) {
        (crossing.point, mesh.neighbor_across(cell, crossing.side))
    } else {
        tracing::trace!(cell = cell.0, x = tentative.x, y = tentative.y, "unresolved crossing");
        (tentative, mesh.find_cell(tentative))
    };

    if mesh.nearest_singularity_distance(next) < step_size {
        return Ok(StepOutcome::NearSingularity { position: next });
    }
    Ok(match next_cell {
        Some(cell) => StepOutcome::Advanced {
            position: next,
            cell,
        },
        None => StepOutcome::Exited { position: next },
    })
}
