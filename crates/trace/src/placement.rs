//! Evenly-spaced seeding (Jobard & Lefer).
//!
//! Starting from one streamline, candidate seeds are placed `d_sep` to
//! either side of every sample, perpendicular to the field. Each candidate
//! that keeps `d_sep` from every traced point is traced and queued. Queued
//! streamlines are processed in FIFO order until none remain.
//!
//! [`Placement`] is a step-driven state machine in the manner of a
//! simulation engine: call [`Placement::step`] to advance one state, or
//! [`Placement::run`] to drain it.

use std::collections::{HashSet, VecDeque};

use evenflow_core::{FlowError, LineSegment, MeshQuery, Point2, Polyline, TraceConfig, Vector2};
use glam::DVec2;
use serde::Serialize;

use crate::builder::{trace_streamline, TracedStreamline};
use crate::interpolate::field_direction;
use crate::occupancy::Occupancy;

/// Where a [`Placement`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementState {
    /// Nothing traced yet.
    Empty,
    /// A current streamline is waiting to spawn candidates.
    Processing,
    /// The current streamline has been accepted; the next is taken from the
    /// queue.
    Draining,
    /// No more work.
    Done,
}

/// A candidate seed that was accepted, with the segment from the sample it
/// was offset from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateTrace {
    pub seed: Point2,
    pub construction: LineSegment,
}

/// Counters for a placement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementStats {
    /// Streamlines that entered the worklist, including the first.
    pub streamlines: usize,
    /// Current streamlines processed.
    pub iterations: usize,
    /// Candidate seeds tested for validity.
    pub candidates_tested: usize,
    /// Candidate seeds that passed and were traced.
    pub candidates_accepted: usize,
    /// Streamline directions cut short at a degenerate cell.
    pub truncated: usize,
    /// Streamlines dropped because tracing failed.
    pub discarded: usize,
}

/// Result of a completed pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementOutput {
    /// Accepted streamlines in acceptance order.
    pub streamlines: Vec<TracedStreamline>,
    /// Accepted candidates; empty unless `record_candidates` is set.
    pub candidates: Vec<CandidateTrace>,
    pub stats: PlacementStats,
}

impl PlacementOutput {
    /// Every non-empty polyline, forward before backward per streamline.
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> + '_ {
        self.streamlines
            .iter()
            .flat_map(|s| [&s.forward, &s.backward])
            .filter(|line| !line.is_empty())
    }

    /// Segments over all streamlines.
    pub fn segment_count(&self) -> usize {
        self.streamlines.iter().map(TracedStreamline::segment_count).sum()
    }

    /// Arc length over all streamlines.
    pub fn total_length(&self) -> f64 {
        self.streamlines.iter().map(TracedStreamline::length).sum()
    }
}

/// Places evenly spaced streamlines over a mesh.
pub struct Placement<'m, M: MeshQuery + ?Sized> {
    mesh: &'m M,
    config: TraceConfig,
    state: PlacementState,
    occupancy: Occupancy,
    accepted: Vec<TracedStreamline>,
    current: Option<TracedStreamline>,
    pending: VecDeque<TracedStreamline>,
    candidates: Vec<CandidateTrace>,
    degenerate_cells: HashSet<usize>,
    stats: PlacementStats,
}

impl<'m, M: MeshQuery + ?Sized> Placement<'m, M> {
    /// Returns `FlowError::InvalidConfig` if `config` does not validate.
    pub fn new(mesh: &'m M, config: TraceConfig) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self {
            mesh,
            occupancy: Occupancy::new(config.separation_distance),
            config,
            state: PlacementState::Empty,
            accepted: Vec::new(),
            current: None,
            pending: VecDeque::new(),
            candidates: Vec::new(),
            degenerate_cells: HashSet::new(),
            stats: PlacementStats::default(),
        })
    }

    /// Current state of the machine.
    pub fn state(&self) -> PlacementState {
        self.state
    }

    /// Whether the pass has finished.
    pub fn is_done(&self) -> bool {
        self.state == PlacementState::Done
    }

    /// Counters so far.
    pub fn stats(&self) -> PlacementStats {
        self.stats
    }

    /// The validated configuration.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Streamlines accepted so far.
    pub fn accepted(&self) -> &[TracedStreamline] {
        &self.accepted
    }

    /// Streamlines queued behind the current one.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Advances one state and returns the new state. A no-op once done.
    pub fn step(&mut self) -> PlacementState {
        self.state = match self.state {
            PlacementState::Empty => self.start(),
            PlacementState::Processing => self.process_current(),
            PlacementState::Draining => self.next_current(),
            PlacementState::Done => PlacementState::Done,
        };
        self.state
    }

    /// Steps until done and returns everything accepted.
    pub fn run(mut self) -> PlacementOutput {
        while self.step() != PlacementState::Done {}
        tracing::info!(
            streamlines = self.accepted.len(),
            candidates_tested = self.stats.candidates_tested,
            truncated = self.stats.truncated,
            discarded = self.stats.discarded,
            "placement finished"
        );
        self.into_output()
    }

    /// Whatever has been accepted so far, without stepping further.
    pub fn into_output(self) -> PlacementOutput {
        PlacementOutput {
            streamlines: self.accepted,
            candidates: self.candidates,
            stats: self.stats,
        }
    }

    fn start(&mut self) -> PlacementState {
        let seed = self.config.initial_seed;
        match self.trace(seed) {
            Some(first) if !first.is_empty() => {
                self.admit(&first);
                self.current = Some(first);
                PlacementState::Processing
            }
            Some(_) => {
                let err = FlowError::SeedOutsideMesh {
                    x: seed.x,
                    y: seed.y,
                };
                tracing::warn!(error = %err, "initial seed produced no streamline");
                PlacementState::Done
            }
            None => {
                tracing::warn!(x = seed.x, y = seed.y, "initial seed produced no streamline");
                PlacementState::Done
            }
        }
    }

    fn process_current(&mut self) -> PlacementState {
        let Some(current) = self.current.take() else {
            return PlacementState::Draining;
        };
        self.stats.iterations += 1;

        let d_sep = self.config.separation_distance;
        let samples: Vec<Point2> = current.points().collect();
        for p in samples {
            if !self.has_budget() {
                break;
            }
            let Some(v) = field_direction(self.mesh, p) else {
                continue;
            };
            for candidate in candidate_seeds(p, v, d_sep) {
                if !self.has_budget() {
                    break;
                }
                self.stats.candidates_tested += 1;
                let valid = self.occupancy.is_valid(self.mesh, candidate, d_sep);
                tracing::trace!(x = candidate.x, y = candidate.y, valid, "candidate");
                if !valid {
                    continue;
                }
                let Some(traced) = self.trace(candidate) else {
                    continue;
                };
                self.stats.candidates_accepted += 1;
                if self.config.record_candidates {
                    self.candidates.push(CandidateTrace {
                        seed: candidate,
                        construction: LineSegment::new(p, candidate),
                    });
                }
                self.admit(&traced);
                self.pending.push_back(traced);
            }
        }

        tracing::debug!(
            accepted = self.accepted.len() + 1,
            pending = self.pending.len(),
            "streamline processed"
        );
        self.accepted.push(current);
        PlacementState::Draining
    }

    fn next_current(&mut self) -> PlacementState {
        match self.pending.pop_front() {
            Some(next) => {
                self.current = Some(next);
                PlacementState::Processing
            }
            None => PlacementState::Done,
        }
    }

    /// Traces from `seed`, logging and dropping the streamline on error.
    /// Each degenerate cell is reported once per pass.
    fn trace(&mut self, seed: Point2) -> Option<TracedStreamline> {
        match trace_streamline(self.mesh, &self.config, seed, &self.occupancy) {
            Ok(traced) => {
                for cell in traced.degenerate_cells() {
                    self.stats.truncated += 1;
                    if self.degenerate_cells.insert(cell) {
                        tracing::warn!(cell, "streamline stopped at degenerate cell");
                    }
                }
                Some(traced)
            }
            Err(err) => {
                tracing::warn!(x = seed.x, y = seed.y, error = %err, "discarding streamline");
                self.stats.discarded += 1;
                None
            }
        }
    }

    /// Records a streamline's points as occupied and counts it.
    fn admit(&mut self, traced: &TracedStreamline) {
        self.occupancy.insert_all(traced.points());
        self.stats.streamlines += 1;
    }

    fn has_budget(&self) -> bool {
        self.config
            .max_streamlines
            .map_or(true, |max| self.stats.streamlines < max)
    }
}

/// The two seeds `d_sep` to either side of `p`, perpendicular to the unit
/// direction `v`: clockwise first, then counter-clockwise.
pub fn candidate_seeds(p: Point2, v: Vector2, d_sep: f64) -> [Point2; 2] {
    [
        p - d_sep * DVec2::new(-v.y, v.x),
        p - d_sep * DVec2::new(v.y, -v.x),
    ]
}

/// Runs a full pass with `config`.
pub fn place_streamlines<M: MeshQuery + ?Sized>(
    mesh: &M,
    config: TraceConfig,
) -> Result<PlacementOutput, FlowError> {
    Ok(Placement::new(mesh, config)?.run())
}
