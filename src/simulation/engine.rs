//! Fixed-step catch-up loop
//!
//! The driver hands the engine the elapsed wall-clock (or frame-clock) time;
//! the engine keeps stepping until the simulated time has caught up. A stall
//! on the driver side therefore turns into several back-to-back steps
//! before the next frame is drawn.

use tracing::{debug, warn};

use crate::configuration::config::IntegratorConfig;
use crate::error::{validate_step_size, SimError};
use crate::simulation::body::SpringBody;
use crate::simulation::cloth::Cloth;
use crate::simulation::hair::HairStrand;
use crate::simulation::hair_group::HairGroup;
use crate::simulation::pendulum::Pendulum;

/// More steps than this in one catch-up call usually means the driver stalled
const STALL_STEPS: usize = 1000;

/// Fraction of a step below which the clock counts as caught up
const CLOCK_TOLERANCE: f64 = 1e-9;

/// Something the engine can advance by one step
pub trait Steppable {
    fn step(&mut self, integrator: IntegratorConfig, h: f64);
}

impl Steppable for SpringBody {
    fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        integrator.take_step(self, h);
    }
}

impl Steppable for Cloth {
    fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        integrator.take_step(self, h);
    }
}

impl Steppable for HairStrand {
    fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        integrator.take_step(self, h);
    }
}

impl Steppable for Pendulum {
    fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        integrator.take_step(self, h);
    }
}

impl Steppable for HairGroup {
    fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        HairGroup::step(self, integrator, h);
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorConfig, // euler, trapezoidal or rk4
    h: f64,                           // fixed step size
    steps: u64,                       // total steps taken
}

impl Engine {
    pub fn new(integrator: IntegratorConfig, h: f64) -> Result<Self, SimError> {
        Ok(Self {
            integrator,
            h: validate_step_size(h)?,
            steps: 0,
        })
    }

    pub fn step_size(&self) -> f64 {
        self.h
    }

    /// Simulated seconds so far, `steps * h`
    pub fn simulated_s(&self) -> f64 {
        self.steps as f64 * self.h
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Take exactly one step
    pub fn step<S: Steppable + ?Sized>(&mut self, world: &mut S) {
        world.step(self.integrator, self.h);
        self.steps += 1;
    }

    /// Step until the simulated time reaches `elapsed_s`; returns the number of steps taken
    pub fn catch_up<S: Steppable + ?Sized>(&mut self, world: &mut S, elapsed_s: f64) -> usize {
        let mut taken = 0;
        while self.simulated_s() < elapsed_s - CLOCK_TOLERANCE * self.h {
            self.step(world);
            taken += 1;
        }
        if taken > STALL_STEPS {
            warn!(steps = taken, elapsed_s, "catch-up ran many steps in one call");
        } else {
            debug!(steps = taken, simulated_s = self.simulated_s(), "caught up");
        }
        taken
    }

    /// Rewind the clock to zero
    pub fn reset(&mut self) {
        self.steps = 0;
    }
}
