//! Multi-mass pendulum.
//!
//! Particle 0 is the anchor at `(0, 1, 0)`; the free masses start on the
//! y axis with a small random height so runs are not perfectly symmetric.
//! The springs form a small partially connected graph rather than a simple
//! chain: every mass hangs from the anchor and the first mass is braced
//! against the next two.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::PendulumConfig;
use crate::error::SimError;
use crate::simulation::body::SpringBody;
use crate::simulation::springs::{Spring, SpringKind};
use crate::simulation::states::{NVec3, ParticleSystem};
use crate::simulation::Rgb;

pub const MASS: f64 = 1.0;
pub const K_DRAG: f64 = 0.5;
pub const GRAVITY: f64 = 9.8;
pub const DEFAULT_PARTICLES: usize = 4;

/// (a, b, rest length, stiffness)
const DEFAULT_SPRINGS: [(usize, usize, f64, f64); 6] = [
    (0, 1, 0.3, 10.0),
    (0, 2, 2.5, 10.0),
    (0, 3, 2.8, 10.0),
    (0, 4, 3.0, 10.0),
    (1, 2, 1.9, 10.0),
    (1, 3, 2.4, 10.0),
];

#[derive(Debug, Clone)]
pub struct PendulumParams {
    /// Free masses below the anchor
    pub particles: usize,
    pub mass: f64,
    pub drag: f64,
    pub gravity: f64,
    pub springs: Vec<Spring>,
    pub seed: u64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            particles: DEFAULT_PARTICLES,
            mass: MASS,
            drag: K_DRAG,
            gravity: GRAVITY,
            springs: DEFAULT_SPRINGS
                .iter()
                .map(|&(a, b, l, k)| Spring::new(a, b, l, k, SpringKind::Custom))
                .collect(),
            seed: 0,
        }
    }
}

impl From<&PendulumConfig> for PendulumParams {
    fn from(cfg: &PendulumConfig) -> Self {
        let d = PendulumParams::default();
        Self {
            particles: cfg.particles.unwrap_or(d.particles),
            mass: cfg.mass.unwrap_or(d.mass),
            drag: cfg.drag.unwrap_or(d.drag),
            gravity: cfg.gravity.unwrap_or(d.gravity),
            springs: match &cfg.springs {
                Some(list) => list
                    .iter()
                    .map(|s| Spring::new(s.a, s.b, s.rest_length, s.stiffness, SpringKind::Custom))
                    .collect(),
                None => d.springs,
            },
            seed: cfg.seed.unwrap_or(d.seed),
        }
    }
}

pub struct Pendulum {
    body: SpringBody,
    color: Rgb,
}

impl Pendulum {
    pub fn new(params: &PendulumParams) -> Result<Self, SimError> {
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut builder = SpringBody::builder()
            .mass(params.mass)
            .gravity(params.gravity)
            .drag(params.drag)
            .particle(NVec3::new(0.0, 1.0, 0.0))
            .fix(0);

        for _ in 0..params.particles {
            let y: f64 = rng.gen_range(-0.5..0.5);
            builder = builder.particle(NVec3::new(0.0, y, 0.0));
        }
        for s in &params.springs {
            builder = builder.spring(s.clone());
        }

        Ok(Self {
            body: builder.build()?,
            color: Rgb::new(0.73, 0.0, 0.83),
        })
    }

    pub fn body(&self) -> &SpringBody {
        &self.body
    }

    pub fn anchor(&self) -> NVec3 {
        self.position(0)
    }

    pub fn translate(&mut self, offset: NVec3) {
        self.body.translate(offset);
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}

impl ParticleSystem for Pendulum {
    fn state(&self) -> &[NVec3] {
        self.body.state()
    }

    fn set_state(&mut self, state: Vec<NVec3>) {
        self.body.set_state(state);
    }

    fn eval_f(&self, state: &[NVec3]) -> Vec<NVec3> {
        self.body.eval_f(state)
    }
}
