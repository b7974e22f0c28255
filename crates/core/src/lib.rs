#![deny(unsafe_code)]
//! Core types for evenflow, an evenly-spaced streamline placer.
//!
//! Provides planar geometry (`Bounds`, `Polyline`), the quadrilateral mesh
//! and its `MeshQuery` interface, per-cell singularity location, analytic and
//! noise `FieldSource`s, `TraceConfig`, and JSON parameter helpers.

pub mod config;
pub mod error;
pub mod field_source;
pub mod geometry;
pub mod mesh;
pub mod params;
pub mod singularity;

pub use config::TraceConfig;
pub use error::FlowError;
pub use field_source::FieldSource;
pub use geometry::{Bounds, Corner, LineSegment, Point2, Polyline, Side, Vector2};
pub use mesh::{CellId, EdgeId, MeshQuery, QuadMesh, Vertex, VertexId};
