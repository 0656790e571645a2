//! Engine-level error type.
//!
//! [`EngineError`] covers malformed inputs and equipment data problems.
//! Physical or routing infeasibility is not an error: it is reported as a
//! blocked outcome on the evaluation result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Topology(#[from] crate::topology::TopologyError),

    #[error(transparent)]
    Equipment(#[from] lightpath_core::equipment::EquipmentError),

    #[error(transparent)]
    Spectral(#[from] lightpath_core::spectral::SpectralError),

    #[error("element failure during propagation: {0}")]
    Element(#[from] lightpath_core::edfa::ElementError),

    #[error("mode {mode} needs {min_spacing_hz} Hz spacing, grid provides {spacing_hz} Hz")]
    SpacingBelowMode {
        mode: String,
        min_spacing_hz: f64,
        spacing_hz: f64,
    },
}
