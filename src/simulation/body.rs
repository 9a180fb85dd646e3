//! Generic spring body.
//!
//! `SpringBody` owns everything `eval_f` needs: the state buffer, the spring
//! network, the fixed points, the particle mass, a [`ForceSet`] of static
//! acceleration terms and an optional switchable [`Wind`]. Cloth, hair and
//! pendulum are thin constructors around it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{validate_mass, SimError};
use crate::simulation::forces::{Acceleration, ForceSet, UniformGravity, ViscousDrag, Wind};
use crate::simulation::springs::{Spring, SpringNetwork};
use crate::simulation::states::{particle_count, pos_index, vel_index, NVec3, ParticleSystem};

pub struct SpringBody {
    state: Vec<NVec3>,
    springs: SpringNetwork,
    fixed: Vec<usize>,
    mass: f64,
    forces: ForceSet,
    wind: Option<Wind>,
    rng: StdRng,
}

impl SpringBody {
    pub fn builder() -> SpringBodyBuilder {
        SpringBodyBuilder::new()
    }

    pub fn springs(&self) -> &SpringNetwork {
        &self.springs
    }

    pub(crate) fn springs_mut(&mut self) -> &mut SpringNetwork {
        &mut self.springs
    }

    pub fn fixed_points(&self) -> &[usize] {
        &self.fixed
    }

    pub fn is_fixed(&self, i: usize) -> bool {
        self.fixed.contains(&i)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn wind(&self) -> Option<&Wind> {
        self.wind.as_ref()
    }

    pub fn wind_mut(&mut self) -> Option<&mut Wind> {
        self.wind.as_mut()
    }

    /// Rigidly move every particle (fixed ones included) by `offset`.
    /// Velocities are kept.
    pub fn translate(&mut self, offset: NVec3) {
        let mut next = self.state.clone();
        for i in 0..particle_count(&next) {
            next[pos_index(i)] += offset;
        }
        self.set_state(next);
    }

    /// Positions only, in particle order
    pub fn positions(&self) -> Vec<NVec3> {
        self.state.iter().step_by(2).copied().collect()
    }
}

impl ParticleSystem for SpringBody {
    fn state(&self) -> &[NVec3] {
        &self.state
    }

    fn set_state(&mut self, state: Vec<NVec3>) {
        assert_eq!(
            state.len(),
            self.state.len(),
            "state buffer length changed ({} -> {})",
            self.state.len(),
            state.len()
        );
        self.state = state;
    }

    fn eval_f(&self, state: &[NVec3]) -> Vec<NVec3> {
        debug_assert_eq!(state.len(), self.state.len());
        let n = particle_count(state);
        let mut f = vec![NVec3::zeros(); state.len()];

        // gravity, drag and any body-specific terms
        self.forces.accumulate_accels(state, &mut f);

        for i in 0..n {
            f[pos_index(i)] = state[vel_index(i)];
        }

        self.springs.accumulate(state, 1.0 / self.mass, &mut f);

        if let Some(wind) = &self.wind {
            wind.acceleration(state, &mut f);
        }

        // must stay last: nothing may move a pinned particle
        for &i in &self.fixed {
            f[pos_index(i)] = NVec3::zeros();
            f[vel_index(i)] = NVec3::zeros();
        }
        f
    }

    fn begin_step(&mut self) {
        if let Some(wind) = &mut self.wind {
            wind.resample(&mut self.rng);
        }
    }
}

/// Step-by-step construction of a [`SpringBody`]
pub struct SpringBodyBuilder {
    state: Vec<NVec3>,
    springs: SpringNetwork,
    fixed: Vec<usize>,
    mass: f64,
    gravity: f64,
    drag: f64,
    forces: ForceSet,
    wind: Option<Wind>,
    seed: u64,
}

impl SpringBodyBuilder {
    pub fn new() -> Self {
        Self {
            state: Vec::new(),
            springs: SpringNetwork::new(),
            fixed: Vec::new(),
            mass: 1.0,
            gravity: 0.0,
            drag: 0.0,
            forces: ForceSet::new(),
            wind: None,
            seed: 0,
        }
    }

    /// Add a particle at rest
    pub fn particle(self, position: NVec3) -> Self {
        self.particle_with_velocity(position, NVec3::zeros())
    }

    pub fn particle_with_velocity(mut self, position: NVec3, velocity: NVec3) -> Self {
        self.state.push(position);
        self.state.push(velocity);
        self
    }

    pub fn spring(mut self, spring: Spring) -> Self {
        self.springs.push(spring);
        self
    }

    pub fn springs(mut self, springs: SpringNetwork) -> Self {
        for s in springs.iter() {
            self.springs.push(s.clone());
        }
        self
    }

    pub fn fix(mut self, i: usize) -> Self {
        if !self.fixed.contains(&i) {
            self.fixed.push(i);
        }
        self
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Magnitude of the downward gravitational acceleration
    pub fn gravity(mut self, g: f64) -> Self {
        self.gravity = g;
        self
    }

    /// Viscous drag coefficient `kd` (acceleration is `-(kd / m) * v`)
    pub fn drag(mut self, kd: f64) -> Self {
        self.drag = kd;
        self
    }

    /// Extra acceleration term evaluated alongside gravity and drag
    pub fn term<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.forces.push(term);
        self
    }

    pub fn wind(mut self, wind: Wind) -> Self {
        self.wind = Some(wind);
        self
    }

    /// Seed for the body's gust sampling
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<SpringBody, SimError> {
        let count = particle_count(&self.state);
        if count == 0 {
            return Err(SimError::EmptyBody);
        }
        let mass = validate_mass(self.mass)?;
        self.springs.validate(count)?;
        if let Some(&index) = self.fixed.iter().find(|&&i| i >= count) {
            return Err(SimError::FixedPointOutOfRange { index, count });
        }

        let mut forces = self.forces;
        if self.gravity != 0.0 {
            forces.push(UniformGravity { g: self.gravity });
        }
        if self.drag != 0.0 {
            forces.push(ViscousDrag { kd: self.drag, mass });
        }

        debug!(
            particles = count,
            springs = self.springs.len(),
            fixed = self.fixed.len(),
            terms = forces.len(),
            "built spring body"
        );

        Ok(SpringBody {
            state: self.state,
            springs: self.springs,
            fixed: self.fixed,
            mass,
            forces,
            wind: self.wind,
            rng: StdRng::seed_from_u64(self.seed),
        })
    }
}

impl Default for SpringBodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
