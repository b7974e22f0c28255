//! Grows a full streamline from a seed in both directions.

use evenflow_core::{CellId, FlowError, LineSegment, MeshQuery, Point2, Polyline, TraceConfig};
use serde::Serialize;

use crate::occupancy::Occupancy;
use crate::stepper::{step, Direction, StepOutcome};

/// Why one direction of a streamline stopped growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The next position (or the seed) is outside the mesh.
    OutsideMesh,
    /// The next position is within one step of a singularity.
    NearSingularity,
    /// The next position is too close to another streamline.
    TooClose,
    /// `max_steps` steps were taken.
    StepBudgetExceeded,
    /// The field vanishes.
    Stalled,
    /// The path reached a cell with zero width or height.
    DegenerateCell { cell: usize },
}

/// A streamline traced from one seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracedStreamline {
    pub seed: Point2,
    /// Cell holding the seed; `None` when the seed is outside the mesh, in
    /// which case both polylines are empty.
    #[serde(skip)]
    pub seed_cell: Option<CellId>,
    pub forward: Polyline,
    pub backward: Polyline,
    pub forward_stop: StopReason,
    pub backward_stop: StopReason,
}

impl TracedStreamline {
    fn outside(seed: Point2) -> Self {
        Self {
            seed,
            seed_cell: None,
            forward: Polyline::new(),
            backward: Polyline::new(),
            forward_stop: StopReason::OutsideMesh,
            backward_stop: StopReason::OutsideMesh,
        }
    }

    /// The polyline grown in `direction`.
    pub fn polyline(&self, direction: Direction) -> &Polyline {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    /// Why `direction` stopped growing.
    pub fn stop_reason(&self, direction: Direction) -> StopReason {
        match direction {
            Direction::Forward => self.forward_stop,
            Direction::Backward => self.backward_stop,
        }
    }

    /// Every sample: the seed, then forward points, then backward points.
    /// Empty when the seed is outside the mesh.
    pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
        let ends = |line: &Polyline| line.segments().iter().map(|s| s.end).collect::<Vec<_>>();
        self.seed_cell
            .map(|_| {
                std::iter::once(self.seed)
                    .chain(ends(&self.forward))
                    .chain(ends(&self.backward))
            })
            .into_iter()
            .flatten()
    }

    /// The streamline as one drawable path: backward points from the far
    /// end, the seed, then forward points. Empty when the seed is outside
    /// the mesh.
    pub fn path(&self) -> Vec<Point2> {
        if self.seed_cell.is_none() {
            return Vec::new();
        }
        let backward = self.backward.segments().iter().rev().map(|s| s.end);
        let forward = self.forward.segments().iter().map(|s| s.end);
        backward
            .chain(std::iter::once(self.seed))
            .chain(forward)
            .collect()
    }

    /// Directions that stopped at a degenerate cell, with that cell.
    pub fn degenerate_cells(&self) -> impl Iterator<Item = usize> + '_ {
        [self.forward_stop, self.backward_stop]
            .into_iter()
            .filter_map(|stop| match stop {
                StopReason::DegenerateCell { cell } => Some(cell),
                _ => None,
            })
    }

    /// Segments in both directions.
    pub fn segment_count(&self) -> usize {
        self.forward.len() + self.backward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seed_cell.is_none()
    }

    /// Total arc length of both directions.
    pub fn length(&self) -> f64 {
        self.forward.length() + self.backward.length()
    }
}

/// Traces a streamline from `seed`.
///
/// Each direction takes at most `config.max_steps` steps and stops before
/// the first position that leaves the mesh, nears a singularity, or comes
/// within `config.self_avoidance_distance` of a point in `occupancy`. The new
/// streamline is not added to `occupancy`.
///
/// A direction that reaches a degenerate cell ends there with
/// [`StopReason::DegenerateCell`], keeping the segments already traced.
pub fn trace_streamline<M: MeshQuery + ?Sized>(
    mesh: &M,
    config: &TraceConfig,
    seed: Point2,
    occupancy: &Occupancy,
) -> Result<TracedStreamline, FlowError> {
    let Some(seed_cell) = mesh.find_cell(seed) else {
        tracing::debug!(x = seed.x, y = seed.y, "seed outside mesh");
        return Ok(TracedStreamline::outside(seed));
    };

    let (forward, forward_stop) =
        trace_direction(mesh, config, seed, seed_cell, Direction::Forward, occupancy)?;
    let (backward, backward_stop) =
        trace_direction(mesh, config, seed, seed_cell, Direction::Backward, occupancy)?;

    tracing::debug!(
        x = seed.x,
        y = seed.y,
        forward = forward.len(),
        backward = backward.len(),
        ?forward_stop,
        ?backward_stop,
        "traced streamline"
    );

    Ok(TracedStreamline {
        seed,
        seed_cell: Some(seed_cell),
        forward,
        backward,
        forward_stop,
        backward_stop,
    })
}

fn trace_direction<M: MeshQuery + ?Sized>(
    mesh: &M,
    config: &TraceConfig,
    seed: Point2,
    seed_cell: CellId,
    direction: Direction,
    occupancy: &Occupancy,
) -> Result<(Polyline, StopReason), FlowError> {
    let mut line = Polyline::new();
    let (mut position, mut cell) = (seed, seed_cell);

    for _ in 0..config.max_steps {
        let outcome = match step(mesh, config.step_size, position, cell, direction) {
            Ok(outcome) => outcome,
            Err(FlowError::DegenerateCell { cell, .. }) => {
                return Ok((line, StopReason::DegenerateCell { cell }))
            }
            Err(err) => return Err(err),
        };
        let next = match outcome {
            StepOutcome::Advanced { position, cell } => (position, cell),
            StepOutcome::Exited { .. } => return Ok((line, StopReason::OutsideMesh)),
            StepOutcome::NearSingularity { .. } => {
                return Ok((line, StopReason::NearSingularity))
            }
            StepOutcome::Stalled => return Ok((line, StopReason::Stalled)),
        };
        if !occupancy.is_valid(mesh, next.0, config.self_avoidance_distance) {
            return Ok((line, StopReason::TooClose));
        }
        line.push(LineSegment::new(position, next.0));
        (position, cell) = next;
    }
    Ok((line, StopReason::StepBudgetExceeded))
}
