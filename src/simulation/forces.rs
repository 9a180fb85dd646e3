//! Acceleration contributors for mass-spring bodies
//!
//! Every term adds into the velocity slots (`2 * i + 1`) of a derivative
//! buffer laid out like the state buffer. Terms are summed, so the order
//! they are registered in does not matter.

use rand::Rng;
use tracing::warn;

use crate::simulation::states::{particle_count, pos_index, vel_index, NVec3};

/// Trait for acceleration sources acting on a state buffer
/// Implementations add their contribution into `out[2 * i + 1]` for each particle
pub trait Acceleration {
    fn acceleration(&self, state: &[NVec3], out: &mut [NVec3]);
}

/// Collection of acceleration terms (gravity, drag, collision, etc.)
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per particle
#[derive(Default)]
pub struct ForceSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn push<T>(&mut self, term: T)
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations for all particles in `state`
    /// - the velocity slot of `out` is reset, then every term adds to it
    /// - position slots are left untouched
    pub fn accumulate_accels(&self, state: &[NVec3], out: &mut [NVec3]) {
        for i in 0..particle_count(state) {
            out[vel_index(i)] = NVec3::zeros();
        }
        for term in &self.terms {
            term.acceleration(state, out);
        }
    }
}

/// Constant downward pull `(0, -g, 0)`
#[derive(Debug, Clone, Copy)]
pub struct UniformGravity {
    pub g: f64,
}

impl Acceleration for UniformGravity {
    fn acceleration(&self, state: &[NVec3], out: &mut [NVec3]) {
        let a = NVec3::new(0.0, -self.g, 0.0);
        for i in 0..particle_count(state) {
            out[vel_index(i)] += a;
        }
    }
}

/// Linear viscous drag `-(kd / m) * v`
#[derive(Debug, Clone, Copy)]
pub struct ViscousDrag {
    pub kd: f64,
    pub mass: f64,
}

impl Acceleration for ViscousDrag {
    fn acceleration(&self, state: &[NVec3], out: &mut [NVec3]) {
        let c = self.kd / self.mass;
        for i in 0..particle_count(state) {
            out[vel_index(i)] -= c * state[vel_index(i)];
        }
    }
}

/// Pushes particles out of a sphere with a constant radial acceleration
/// once they come closer than `radius` to `center`
#[derive(Debug, Clone, Copy)]
pub struct SphereRepulsion {
    pub center: NVec3,
    pub radius: f64,
    pub strength: f64,
}

impl Acceleration for SphereRepulsion {
    fn acceleration(&self, state: &[NVec3], out: &mut [NVec3]) {
        for i in 0..particle_count(state) {
            let r = state[pos_index(i)] - self.center;
            if r.norm() >= self.radius {
                continue;
            }
            // Exactly at the center there is no outward direction
            if let Some(dir) = r.try_normalize(1e-12) {
                out[vel_index(i)] += self.strength * dir;
            }
        }
    }
}

/// Which particles feel the wind and how strongly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindProfile {
    /// Every particle, full strength
    Uniform,
    /// Lower half of a strand only (index >= n/2), scaled by `i / (n - 1)`
    FreeEnd,
}

impl WindProfile {
    pub fn weight(&self, i: usize, n: usize) -> f64 {
        match self {
            WindProfile::Uniform => 1.0,
            WindProfile::FreeEnd => {
                if n < 2 || i < n / 2 {
                    0.0
                } else {
                    i as f64 / (n - 1) as f64
                }
            }
        }
    }
}

/// Switchable wind with an optional random gust.
///
/// The gust is drawn by [`Wind::resample`] (once per integration step) and
/// held in `current`; evaluating the acceleration never touches the RNG.
#[derive(Debug, Clone)]
pub struct Wind {
    pub enabled: bool,
    pub direction: NVec3,
    pub strength: f64,
    /// Half-width of the uniform gust range around `strength`
    pub gust: f64,
    pub profile: WindProfile,
    current: f64,
}

impl Wind {
    pub fn new(direction: NVec3, strength: f64, gust: f64, profile: WindProfile) -> Self {
        Self {
            enabled: false,
            direction: direction.try_normalize(1e-12).unwrap_or_else(NVec3::zeros),
            strength,
            gust: gust.abs(),
            profile,
            current: strength,
        }
    }

    /// Magnitude used by the current step
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Redirect the wind. Non-finite input leaves the wind as it was.
    pub fn set(&mut self, direction: NVec3, strength: f64) {
        if !strength.is_finite() || !direction.iter().all(|c| c.is_finite()) {
            warn!(?direction, strength, "ignoring non-finite wind");
            return;
        }
        self.direction = direction.try_normalize(1e-12).unwrap_or_else(NVec3::zeros);
        self.strength = strength;
        self.current = strength;
    }

    /// Draw the magnitude for the next step
    pub fn resample<R: Rng>(&mut self, rng: &mut R) {
        let (low, high) = (self.strength - self.gust, self.strength + self.gust);
        self.current = if self.enabled && self.gust > 0.0 && low.is_finite() && high.is_finite() {
            rng.gen_range(low..=high)
        } else {
            self.strength
        };
    }
}

impl Acceleration for Wind {
    fn acceleration(&self, state: &[NVec3], out: &mut [NVec3]) {
        if !self.enabled {
            return;
        }
        let n = particle_count(state);
        let a = self.current * self.direction;
        for i in 0..n {
            let w = self.profile.weight(i, n);
            if w > 0.0 {
                out[vel_index(i)] += w * a;
            }
        }
    }
}
