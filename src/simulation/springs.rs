//! Spring network shared by every body type.
//!
//! A spring joins two particles of the same body and pulls them toward its
//! rest length with a Hookean force
//!
//!   F_a = -k * (|d| - L) * d / |d|,   d = x_a - x_b,   F_b = -F_a
//!
//! Compression and extension are not special-cased; the sign of
//! `|d| - L` flips the direction on its own.

use crate::error::SimError;
use crate::simulation::states::{pos_index, vel_index, NVec3};

/// Below this separation a spring has no usable direction and contributes nothing.
pub const MIN_SPRING_LENGTH: f64 = 1e-12;

/// Role of a spring within a body's topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringKind {
    /// Cloth: right/up neighbour
    Structural,
    /// Cloth: diagonal neighbour one row up
    Shear,
    /// Cloth: neighbour two apart, resists folding
    Flexion,
    /// Hair: consecutive particles
    Core,
    /// Hair: particles two apart
    SupportNear,
    /// Hair: particles three apart
    SupportFar,
    /// Anything hand-specified (pendulum graphs, tests)
    Custom,
}

/// One spring between particles `a` and `b`
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub rest_length: f64,
    pub stiffness: f64,
    pub kind: SpringKind,
}

impl Spring {
    pub fn new(a: usize, b: usize, rest_length: f64, stiffness: f64, kind: SpringKind) -> Self {
        Self { a, b, rest_length, stiffness, kind }
    }

    /// Force on endpoint `a` for the given endpoint positions
    /// (endpoint `b` feels the negation)
    pub fn force(&self, xa: NVec3, xb: NVec3) -> NVec3 {
        let d = xa - xb;
        let len = d.norm();
        if len < MIN_SPRING_LENGTH {
            return NVec3::zeros();
        }
        -self.stiffness * (len - self.rest_length) * (d / len)
    }
}

/// All springs of one body
#[derive(Debug, Clone, Default)]
pub struct SpringNetwork {
    springs: Vec<Spring>,
}

impl SpringNetwork {
    pub fn new() -> Self {
        Self { springs: Vec::new() }
    }

    pub fn push(&mut self, spring: Spring) {
        self.springs.push(spring);
    }

    /// Add a spring (builder style)
    pub fn with(mut self, spring: Spring) -> Self {
        self.springs.push(spring);
        self
    }

    pub fn len(&self) -> usize {
        self.springs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.springs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spring> {
        self.springs.iter()
    }

    /// Springs of one kind
    pub fn of_kind(&self, kind: SpringKind) -> impl Iterator<Item = &Spring> {
        self.springs.iter().filter(move |s| s.kind == kind)
    }

    /// Make sure every endpoint names one of `count` particles
    /// and every spring has sane parameters
    pub fn validate(&self, count: usize) -> Result<(), SimError> {
        for (spring, s) in self.springs.iter().enumerate() {
            for index in [s.a, s.b] {
                if index >= count {
                    return Err(SimError::SpringOutOfRange { spring, index, count });
                }
            }
            let ok = s.rest_length.is_finite()
                && s.rest_length >= 0.0
                && s.stiffness.is_finite()
                && s.stiffness >= 0.0;
            if !ok {
                return Err(SimError::InvalidSpring {
                    spring,
                    rest_length: s.rest_length,
                    stiffness: s.stiffness,
                });
            }
        }
        Ok(())
    }

    /// Set the rest length of every spring of `kind`
    pub fn set_rest_length(&mut self, kind: SpringKind, rest_length: f64) {
        for s in self.springs.iter_mut().filter(|s| s.kind == kind) {
            s.rest_length = rest_length;
        }
    }

    /// Add spring accelerations (force / mass) into the velocity slots of `out`
    pub fn accumulate(&self, state: &[NVec3], inv_mass: f64, out: &mut [NVec3]) {
        for s in &self.springs {
            let f = s.force(state[pos_index(s.a)], state[pos_index(s.b)]) * inv_mass;
            out[vel_index(s.a)] += f;
            out[vel_index(s.b)] -= f;
        }
    }
}
