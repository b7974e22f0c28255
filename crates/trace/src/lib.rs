#![deny(unsafe_code)]
//! Streamline tracing and evenly-spaced placement over a [`MeshQuery`].
//!
//! The pieces build on each other: [`interpolate`] blends corner samples,
//! [`stepper`] advances one step and hands off between cells, [`builder`]
//! grows a streamline in both directions, [`occupancy`] answers spacing
//! queries, and [`placement`] drives the seeding loop.
//!
//! ```no_run
//! use evenflow_core::field_source::Vortex;
//! use evenflow_core::{QuadMesh, TraceConfig};
//! use glam::DVec2;
//!
//! let source = Vortex { center: DVec2::splat(5.0), strength: 1.0, radius: 2.0 };
//! let mesh = QuadMesh::grid(DVec2::ZERO, DVec2::splat(10.0), 20, 20, &source)?;
//! let config = TraceConfig { initial_seed: DVec2::new(7.0, 5.0), ..TraceConfig::default() };
//! let output = evenflow_trace::place_streamlines(&mesh, config)?;
//! println!("{} streamlines", output.streamlines.len());
//! # Ok::<(), evenflow_core::FlowError>(())
//! ```
//!
//! [`MeshQuery`]: evenflow_core::MeshQuery

pub mod builder;
pub mod interpolate;
pub mod occupancy;
pub mod placement;
pub mod stepper;

pub use builder::{trace_streamline, StopReason, TracedStreamline};
pub use interpolate::{field_direction, CellSample};
pub use occupancy::Occupancy;
pub use placement::{
    place_streamlines, CandidateTrace, Placement, PlacementOutput, PlacementState, PlacementStats,
};
pub use stepper::{select_crossing, step, Crossing, Direction, StepOutcome};
