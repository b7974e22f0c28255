#![deny(unsafe_code)]
//! Scene registry: maps field names to [`FieldSource`]s, samples them onto a
//! grid mesh, and exports placement results.
//!
//! This crate sits between `evenflow-core`/`evenflow-trace` and the CLI so
//! that name-based dispatch lives in one place.

pub mod export;

use evenflow_core::field_source::{
    CompositeField, CurlField, FieldSource, PerlinField, PointAttractor, PointRepulsor, Saddle, Uniform, Vortex,
};
use evenflow_core::params::{param_bool, param_f64, param_point, param_u32, param_usize};
use evenflow_core::{Bounds, FlowError, Point2, QuadMesh, TraceConfig};
use evenflow_trace::{place_streamlines, PlacementOutput};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// All available field names.
const FIELD_NAMES: &[&str] = &[
    "uniform",
    "vortex",
    "saddle",
    "source",
    "sink",
    "perlin",
    "curl",
    "composite",
];

/// Named analytic and noise fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Constant direction.
    Uniform,
    /// Rotation about a center.
    Vortex,
    /// Hyperbolic saddle.
    Saddle,
    /// Radial outflow.
    Source,
    /// Radial inflow.
    Sink,
    /// Perlin noise vectors.
    Perlin,
    /// Curl of Perlin noise.
    Curl,
    /// Sum of other named fields.
    Composite,
}

impl FieldKind {
    /// Looks a field up by name.
    ///
    /// Returns `FlowError::UnknownField` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "uniform" => Ok(FieldKind::Uniform),
            "vortex" => Ok(FieldKind::Vortex),
            "saddle" => Ok(FieldKind::Saddle),
            "source" => Ok(FieldKind::Source),
            "sink" => Ok(FieldKind::Sink),
            "perlin" => Ok(FieldKind::Perlin),
            "curl" => Ok(FieldKind::Curl),
            "composite" => Ok(FieldKind::Composite),
            _ => Err(FlowError::UnknownField(name.to_string())),
        }
    }

    /// The name [`FieldKind::from_name`] accepts.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Uniform => "uniform",
            FieldKind::Vortex => "vortex",
            FieldKind::Saddle => "saddle",
            FieldKind::Source => "source",
            FieldKind::Sink => "sink",
            FieldKind::Perlin => "perlin",
            FieldKind::Curl => "curl",
            FieldKind::Composite => "composite",
        }
    }

    /// Returns a slice of all recognized field names.
    pub fn list_fields() -> &'static [&'static str] {
        FIELD_NAMES
    }

    /// Builds the field from JSON parameters. Centers default to the middle
    /// of `extent` and radii to a quarter of its smaller side.
    ///
    /// A composite reads `parts`, an array of objects that each name a
    /// `field` alongside that field's own parameters. Returns
    /// `FlowError::UnknownField` if a part names no known field.
    pub fn build(
        self,
        params: &Value,
        extent: Bounds,
    ) -> Result<Box<dyn FieldSource>, FlowError> {
        let middle = DVec2::new(
            (extent.x1 + extent.x2) / 2.0,
            (extent.y1 + extent.y2) / 2.0,
        );
        let center = param_point(params, "center", middle);
        let strength = param_f64(params, "strength", 1.0);
        let radius = param_f64(params, "radius", extent.width().min(extent.height()) / 4.0);
        let scale = param_f64(params, "scale", 0.3);
        let seed = param_u32(params, "seed", 0);

        let source: Box<dyn FieldSource> = match self {
            FieldKind::Uniform => Box::new(Uniform::new(
                DVec2::from_angle(param_f64(params, "angle", 0.0).to_radians()) * strength,
            )),
            FieldKind::Vortex => Box::new(Vortex {
                center,
                strength,
                radius,
            }),
            FieldKind::Saddle => Box::new(Saddle { center, strength }),
            FieldKind::Source => Box::new(PointRepulsor {
                center,
                strength,
                radius,
            }),
            FieldKind::Sink => Box::new(PointAttractor {
                center,
                strength,
                radius,
            }),
            FieldKind::Perlin => Box::new(PerlinField::new(scale, strength, seed)),
            FieldKind::Curl => Box::new(CurlField::new(scale, strength, seed)),
            FieldKind::Composite => {
                let parts = params
                    .get("parts")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let mut composite = CompositeField::new();
                for part in parts {
                    let name = part.get("field").and_then(Value::as_str).unwrap_or_default();
                    composite = composite.add(FieldKind::from_name(name)?.build(part, extent)?);
                }
                Box::new(composite)
            }
        };
        Ok(source)
    }

    /// Describes the parameters [`FieldKind::build`] reads.
    pub fn param_schema(self) -> Value {
        let strength = json!({"type": "number", "default": 1.0, "description": "field magnitude"});
        let center = json!({
            "type": "point",
            "default": "grid center",
            "description": "[x, y] of the feature"
        });
        let radius = json!({
            "type": "number",
            "default": "quarter of the smaller grid side",
            "description": "distance over which the magnitude halves"
        });
        let scale = json!({"type": "number", "default": 0.3, "description": "noise frequency"});
        let seed = json!({"type": "integer", "default": 0, "description": "noise seed"});
        match self {
            FieldKind::Uniform => json!({
                "angle": {"type": "number", "default": 0.0, "description": "direction in degrees"},
                "strength": strength,
            }),
            FieldKind::Vortex | FieldKind::Source | FieldKind::Sink => json!({
                "center": center,
                "strength": strength,
                "radius": radius,
            }),
            FieldKind::Saddle => json!({"center": center, "strength": strength}),
            FieldKind::Perlin | FieldKind::Curl => json!({
                "scale": scale,
                "strength": strength,
                "seed": seed,
            }),
            FieldKind::Composite => json!({
                "parts": {
                    "type": "array",
                    "default": [],
                    "description": "objects naming a \"field\" plus that field's parameters"
                },
            }),
        }
    }
}

/// Extent and resolution of a sampled grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub min: Point2,
    pub max: Point2,
    pub nx: usize,
    pub ny: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            min: DVec2::ZERO,
            max: DVec2::splat(10.0),
            nx: 20,
            ny: 20,
        }
    }
}

impl GridSpec {
    /// Reads `min`, `max`, `nx` and `ny`, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            min: param_point(params, "min", d.min),
            max: param_point(params, "max", d.max),
            nx: param_usize(params, "nx", d.nx),
            ny: param_usize(params, "ny", d.ny),
        }
    }

    /// The grid's extent as bounds.
    pub fn extent(&self) -> Bounds {
        Bounds::new(self.min.x, self.min.y, self.max.x, self.max.y)
    }
}

/// A named field sampled onto a grid mesh.
#[derive(Debug, Clone)]
pub struct Scene {
    pub kind: FieldKind,
    pub grid: GridSpec,
    pub mesh: QuadMesh,
}

impl Scene {
    /// Samples field `name` onto `grid`. Singularities are located unless
    /// `params.locate_singularities` is `false`.
    pub fn build(name: &str, grid: GridSpec, params: &Value) -> Result<Self, FlowError> {
        let kind = FieldKind::from_name(name)?;
        let source = kind.build(params, grid.extent())?;
        let mut mesh = QuadMesh::grid(grid.min, grid.max, grid.nx, grid.ny, source.as_ref())?;
        if param_bool(params, "locate_singularities", true) {
            mesh.locate_singularities();
        }
        tracing::debug!(
            field = kind.name(),
            cells = mesh.cell_count(),
            singularities = mesh.singularities().count(),
            "scene built"
        );
        Ok(Self { kind, grid, mesh })
    }

    /// Number of cells holding a singularity marker.
    pub fn singularity_count(&self) -> usize {
        self.mesh.singularities().count()
    }

    /// Runs a placement pass over the scene's mesh.
    pub fn place(&self, config: TraceConfig) -> Result<PlacementOutput, FlowError> {
        place_streamlines(&self.mesh, config)
    }
}
