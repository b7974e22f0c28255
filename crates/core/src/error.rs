//! Error types for evenflow.

use thiserror::Error;

/// Errors produced by mesh construction, configuration, and tracing.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A cell's bounding box has zero (or non-finite) width or height, so
    /// bilinear weights cannot be formed.
    #[error("degenerate cell {cell}: extent {width} x {height}")]
    DegenerateCell { cell: usize, width: f64, height: f64 },

    /// A seed point does not lie inside any cell of the mesh.
    #[error("seed ({x}, {y}) lies outside the mesh")]
    SeedOutsideMesh { x: f64, y: f64 },

    /// The mesh topology or geometry is unusable.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Grid resolution was zero in one or both directions.
    #[error("invalid dimensions: grid resolution must be non-zero")]
    InvalidDimensions,

    /// A trace configuration value is out of range.
    #[error("invalid config value for '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A requested field name does not match any known field source.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// An I/O error (e.g. writing an export).
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_cell_includes_index_and_extent() {
        let err = FlowError::DegenerateCell {
            cell: 7,
            width: 0.0,
            height: 2.5,
        };
        let msg = format!("{err}");
        assert!(msg.contains('7'), "missing cell index in: {msg}");
        assert!(msg.contains("2.5"), "missing height in: {msg}");
    }

    #[test]
    fn seed_outside_mesh_includes_coordinates() {
        let err = FlowError::SeedOutsideMesh { x: -1.5, y: 3.25 };
        let msg = format!("{err}");
        assert!(msg.contains("-1.5"), "missing x in: {msg}");
        assert!(msg.contains("3.25"), "missing y in: {msg}");
    }

    #[test]
    fn invalid_config_includes_name_and_reason() {
        let err = FlowError::InvalidConfig {
            name: "step_size".into(),
            reason: "must be positive".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("step_size"), "missing name in: {msg}");
        assert!(msg.contains("must be positive"), "missing reason in: {msg}");
    }

    #[test]
    fn unknown_field_includes_name() {
        let err = FlowError::UnknownField("tornado".into());
        assert!(format!("{err}").contains("tornado"));
    }

    #[test]
    fn invalid_dimensions_mentions_resolution() {
        let msg = format!("{}", FlowError::InvalidDimensions);
        assert!(msg.contains("resolution"), "got: {msg}");
    }

    #[test]
    fn flow_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlowError>();
    }

    #[test]
    fn flow_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<FlowError>();
    }
}
