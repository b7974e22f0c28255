//! Field sources: analytic and noise-based 2D vector fields that can be
//! sampled onto mesh vertices.
//!
//! A [`FieldSource`] is only consulted when a mesh is built (see
//! [`QuadMesh::grid`](crate::mesh::QuadMesh::grid)); tracing reads the
//! sampled vertex values, never the source itself.
//!
//! All implementations are deterministic: same inputs produce the same output.

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use crate::geometry::{Point2, Vector2};

/// A steady 2D vector field.
pub trait FieldSource: Send + Sync {
    /// Field value at `p`.
    fn sample(&self, p: Point2) -> Vector2;
}

/// Distances below this are treated as zero.
const SINGULARITY_EPS: f64 = 1e-10;

/// Offset between the two noise lookups that make up a Perlin vector.
const NOISE_OFFSET: f64 = 100.0;

// ---------------------------------------------------------------------------
// Analytic sources
// ---------------------------------------------------------------------------

/// The same vector everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Uniform {
    pub value: Vector2,
}

impl Uniform {
    pub fn new(value: Vector2) -> Self {
        Self { value }
    }
}

impl FieldSource for Uniform {
    fn sample(&self, _p: Point2) -> Vector2 {
        self.value
    }
}

/// Counter-clockwise rotation about `center`; speed decays as
/// `strength / (1 + r / radius)`. The center itself is a zero.
#[derive(Debug, Clone, Copy)]
pub struct Vortex {
    pub center: Point2,
    pub strength: f64,
    pub radius: f64,
}

impl FieldSource for Vortex {
    fn sample(&self, p: Point2) -> Vector2 {
        let r = p - self.center;
        let dist = r.length();
        if dist < SINGULARITY_EPS || self.radius.abs() < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        r.perp() / dist * (self.strength / (1.0 + dist / self.radius))
    }
}

/// Linear saddle `(x - cx, cy - y) * strength`: inflow along y, outflow
/// along x.
#[derive(Debug, Clone, Copy)]
pub struct Saddle {
    pub center: Point2,
    pub strength: f64,
}

impl FieldSource for Saddle {
    fn sample(&self, p: Point2) -> Vector2 {
        let r = p - self.center;
        DVec2::new(r.x, -r.y) * self.strength
    }
}

/// Pulls toward a point with distance-based falloff.
#[derive(Debug, Clone, Copy)]
pub struct PointAttractor {
    pub center: Point2,
    pub strength: f64,
    pub radius: f64,
}

/// Pushes away from a point; the negated [`PointAttractor`].
#[derive(Debug, Clone, Copy)]
pub struct PointRepulsor {
    pub center: Point2,
    pub strength: f64,
    pub radius: f64,
}

/// Unit vector toward `target` scaled by `strength / (1 + d / radius)`.
/// Zero at the target and for a zero radius.
fn attract_toward(target: Point2, p: Point2, strength: f64, radius: f64) -> Vector2 {
    let toward = target - p;
    let dist = toward.length();
    if dist < SINGULARITY_EPS || radius.abs() < SINGULARITY_EPS {
        return DVec2::ZERO;
    }
    toward / dist * (strength / (1.0 + dist / radius))
}

impl FieldSource for PointAttractor {
    fn sample(&self, p: Point2) -> Vector2 {
        attract_toward(self.center, p, self.strength, self.radius)
    }
}

impl FieldSource for PointRepulsor {
    fn sample(&self, p: Point2) -> Vector2 {
        -attract_toward(self.center, p, self.strength, self.radius)
    }
}

// ---------------------------------------------------------------------------
// Noise-based sources
// ---------------------------------------------------------------------------

/// Two offset Perlin lookups form the x and y components.
pub struct PerlinField {
    noise: Perlin,
    scale: f64,
    strength: f64,
}

impl PerlinField {
    /// `scale` multiplies positions before the noise lookup; `strength` scales the result.
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
        }
    }
}

impl FieldSource for PerlinField {
    fn sample(&self, p: Point2) -> Vector2 {
        let s = p * self.scale;
        DVec2::new(
            self.noise.get([s.x, s.y]),
            self.noise.get([s.x + NOISE_OFFSET, s.y + NOISE_OFFSET]),
        ) * self.strength
    }
}

/// Curl of scalar Perlin noise: approximately divergence-free, so its
/// streamlines swirl without converging.
pub struct CurlField {
    noise: Perlin,
    scale: f64,
    strength: f64,
    eps: f64,
}

impl CurlField {
    /// Central differences use a step of `0.001` in noise space.
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
            eps: 0.001,
        }
    }
}

impl FieldSource for CurlField {
    fn sample(&self, p: Point2) -> Vector2 {
        let s = p * self.scale;
        let eps = self.eps * self.scale;
        if eps.abs() < SINGULARITY_EPS {
            return DVec2::ZERO;
        }
        // curl F = (dF/dy, -dF/dx)
        let df_dy =
            (self.noise.get([s.x, s.y + eps]) - self.noise.get([s.x, s.y - eps])) / (2.0 * eps);
        let df_dx =
            (self.noise.get([s.x + eps, s.y]) - self.noise.get([s.x - eps, s.y])) / (2.0 * eps);
        DVec2::new(df_dy, -df_dx) * self.strength
    }
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// Sums the values of several sources.
#[derive(Default)]
pub struct CompositeField {
    sources: Vec<Box<dyn FieldSource>>,
}

impl CompositeField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source (builder pattern).
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, source: Box<dyn FieldSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FieldSource for CompositeField {
    fn sample(&self, p: Point2) -> Vector2 {
        self.sources
            .iter()
            .fold(DVec2::ZERO, |acc, source| acc + source.sample(p))
    }
}
