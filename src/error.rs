//! Error types for building and configuring simulations.

use thiserror::Error;

/// Errors raised while validating configuration or constructing a body.
///
/// Run-time contract violations (a state buffer of the wrong length handed
/// to `set_state`) are not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Integrator mode is not one of `e`, `t`, `r`.
    #[error("unrecognized integrator mode `{0}` (expected e, t or r)")]
    UnknownIntegrator(String),

    /// Step size must be positive and finite.
    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    /// Simulated duration must be positive and finite.
    #[error("duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    /// Frame rate of the driver clock must be positive and finite.
    #[error("frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f64),

    /// Particle mass must be positive and finite.
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    /// Cloth grids need at least 2x2 particles.
    #[error("cloth grid must be at least 2x2, got {width}x{height}")]
    InvalidGrid {
        /// Particles per row.
        width: usize,
        /// Number of rows.
        height: usize,
    },

    /// Hair strands need at least two particles.
    #[error("hair strand needs at least 2 particles, got {0}")]
    InvalidStrandLength(usize),

    /// A body needs at least one particle.
    #[error("body has no particles")]
    EmptyBody,

    /// Spring endpoint does not name a particle of the body.
    #[error("spring {spring} references particle {index} (body has {count})")]
    SpringOutOfRange {
        /// Position of the spring in the network.
        spring: usize,
        /// Offending endpoint.
        index: usize,
        /// Number of particles in the body.
        count: usize,
    },

    /// Rest length and stiffness must be non-negative and finite.
    #[error("spring {spring} has invalid parameters (rest length {rest_length}, stiffness {stiffness})")]
    InvalidSpring {
        /// Position of the spring in the network.
        spring: usize,
        /// Rest length given.
        rest_length: f64,
        /// Stiffness given.
        stiffness: f64,
    },

    /// Fixed-point index does not name a particle of the body.
    #[error("fixed point {index} out of range (body has {count} particles)")]
    FixedPointOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of particles in the body.
        count: usize,
    },

    /// Interpolation weights must be non-empty, match the sources and sum to 1.
    #[error("invalid interpolation weights: {0}")]
    InvalidWeights(String),

    /// Interpolated strand references a strand that does not exist.
    #[error("interpolated strand references strand {index} (group has {count})")]
    SourceOutOfRange {
        /// Offending source index.
        index: usize,
        /// Number of real strands.
        count: usize,
    },
}

/// Check that a step size is usable by the integrators
pub fn validate_step_size(h: f64) -> Result<f64, SimError> {
    if h.is_finite() && h > 0.0 {
        Ok(h)
    } else {
        Err(SimError::InvalidStepSize(h))
    }
}

/// Check that a particle mass is usable by the force evaluator
pub fn validate_mass(m: f64) -> Result<f64, SimError> {
    if m.is_finite() && m > 0.0 {
        Ok(m)
    } else {
        Err(SimError::InvalidMass(m))
    }
}
