//! Core state types for the mass-spring simulation.
//!
//! A body's state is one flat buffer of `NVec3`, two slots per particle:
//! - `state[2 * i]`     position of particle `i`
//! - `state[2 * i + 1]` velocity of particle `i`
//!
//! The derivative produced by `eval_f` uses the same layout
//! (velocity in the position slot, acceleration in the velocity slot).

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

/// Index of particle `i`'s position slot
#[inline]
pub fn pos_index(i: usize) -> usize {
    2 * i
}

/// Index of particle `i`'s velocity slot
#[inline]
pub fn vel_index(i: usize) -> usize {
    2 * i + 1
}

/// Number of particles stored in a state buffer
#[inline]
pub fn particle_count(state: &[NVec3]) -> usize {
    state.len() / 2
}

/// Iterator over the positions of a state buffer
pub fn positions(state: &[NVec3]) -> impl Iterator<Item = &NVec3> + '_ {
    state.iter().step_by(2)
}

/// Iterator over the velocities of a state buffer
pub fn velocities(state: &[NVec3]) -> impl Iterator<Item = &NVec3> + '_ {
    state.iter().skip(1).step_by(2)
}

/// Anything that can be advanced by an integrator.
///
/// `eval_f` must be a pure function of its input and the body's fixed
/// configuration. Integrators call `begin_step` once per step before
/// reading the state, so any time-varying input (a random gust) is sampled
/// there and held constant across the sub-evaluations of that step.
pub trait ParticleSystem {
    /// Current state buffer
    fn state(&self) -> &[NVec3];

    /// Replace the state buffer wholesale.
    /// Panics if the length differs from the current buffer.
    fn set_state(&mut self, state: Vec<NVec3>);

    /// Time derivative of `state`
    fn eval_f(&self, state: &[NVec3]) -> Vec<NVec3>;

    /// Hook run once at the start of every `take_step`
    fn begin_step(&mut self) {}

    fn num_particles(&self) -> usize {
        particle_count(self.state())
    }

    fn position(&self, i: usize) -> NVec3 {
        self.state()[pos_index(i)]
    }

    fn velocity(&self, i: usize) -> NVec3 {
        self.state()[vel_index(i)]
    }
}

/// Display colour of a body. Presentation state only; never read by `eval_f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}
