//! Single hair strand growing out of the scalp.
//!
//! Particle 0 is the root and is pinned. Particle `i > 0` starts at
//! `root + ((-1)^i * 0.3, i * unit, -(-1)^i * 0.2)`, a slight zig-zag so the
//! support springs are not degenerate at rest.
//!
//! Springs:
//! - core `(i, i+1)`, rest `unit`, k = 60
//! - near support `(i, i+2)`, rest `curl * unit` (0.5 uncurled), k = 30
//! - far support `(i, i+3)`, rest `3 * unit`, k = 30
//!
//! Particles that sink closer than 1.1 to the head centre are pushed back
//! out with a constant radial acceleration.

use crate::error::SimError;
use crate::simulation::body::SpringBody;
use crate::simulation::forces::{SphereRepulsion, Wind, WindProfile};
use crate::simulation::springs::{Spring, SpringKind};
use crate::simulation::states::{NVec3, ParticleSystem};
use crate::simulation::Rgb;

pub const GRAVITY: f64 = 9.8;
pub const K_DRAG: f64 = 0.015;
pub const MASS: f64 = 0.01;
pub const COLLISION_ACCEL: f64 = 1000.0;
pub const COLLISION_RADIUS: f64 = 1.1;

pub const UNIT_HEIGHT: f64 = 0.5;
pub const HORI_DELTA: f64 = 0.3;
pub const VERTI_DELTA: f64 = 0.2;

pub const CORE_K: f64 = 60.0;
pub const SUPPORT_K: f64 = 30.0;
/// Near-support rest length as a fraction of the unit height
pub const DEFAULT_CURL: f64 = 0.5;

pub const DEFAULT_LENGTH: usize = 8;
pub const DEFAULT_WIND_STRENGTH: f64 = 4.0;

/// Physical parameters of one strand
#[derive(Debug, Clone)]
pub struct HairParams {
    pub length: usize,
    pub unit_height: f64,
    pub curl: f64,
    pub head_center: NVec3,
    pub wind_direction: NVec3,
    pub wind_strength: f64,
    pub seed: u64,
}

impl Default for HairParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            unit_height: UNIT_HEIGHT,
            curl: DEFAULT_CURL,
            head_center: NVec3::zeros(),
            wind_direction: NVec3::new(1.0, 0.0, 0.0),
            wind_strength: DEFAULT_WIND_STRENGTH,
            seed: 0,
        }
    }
}

pub struct HairStrand {
    body: SpringBody,
    unit_height: f64,
    color: Rgb,
}

impl HairStrand {
    pub fn new(root: NVec3, params: &HairParams) -> Result<Self, SimError> {
        let n = params.length;
        if n < 2 {
            return Err(SimError::InvalidStrandLength(n));
        }
        let unit = params.unit_height;

        let mut builder = SpringBody::builder()
            .mass(MASS)
            .gravity(GRAVITY)
            .drag(K_DRAG)
            .term(SphereRepulsion {
                center: params.head_center,
                radius: COLLISION_RADIUS,
                strength: COLLISION_ACCEL,
            })
            .wind(Wind::new(
                params.wind_direction,
                params.wind_strength,
                0.25 * params.wind_strength,
                WindProfile::FreeEnd,
            ))
            .seed(params.seed)
            .fix(0);

        builder = builder.particle(root);
        for i in 1..n {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let offset = NVec3::new(sign * HORI_DELTA, i as f64 * unit, -sign * VERTI_DELTA);
            builder = builder.particle(root + offset);
        }

        for i in 0..n - 1 {
            builder = builder.spring(Spring::new(i, i + 1, unit, CORE_K, SpringKind::Core));
        }
        for i in 0..n.saturating_sub(2) {
            builder = builder.spring(Spring::new(i, i + 2, params.curl * unit, SUPPORT_K, SpringKind::SupportNear));
        }
        for i in 0..n.saturating_sub(3) {
            builder = builder.spring(Spring::new(i, i + 3, 3.0 * unit, SUPPORT_K, SpringKind::SupportFar));
        }

        Ok(Self {
            body: builder.build()?,
            unit_height: unit,
            color: Rgb::new(0.6, 0.3, 0.0),
        })
    }

    pub fn body(&self) -> &SpringBody {
        &self.body
    }

    pub fn root(&self) -> NVec3 {
        self.position(0)
    }

    /// Set the near-support rest length to `curl * unit_height`
    pub fn set_curl(&mut self, curl: f64) {
        let rest = (curl * self.unit_height).max(0.0);
        self.body.springs_mut().set_rest_length(SpringKind::SupportNear, rest);
    }

    pub fn wind_enabled(&self) -> bool {
        self.body.wind().is_some_and(|w| w.enabled)
    }

    pub fn toggle_wind(&mut self) {
        if let Some(wind) = self.body.wind_mut() {
            wind.enabled = !wind.enabled;
        }
    }

    pub fn set_wind(&mut self, direction: NVec3, strength: f64) {
        if let Some(wind) = self.body.wind_mut() {
            wind.set(direction, strength);
            wind.gust = 0.25 * wind.strength.abs();
        }
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

impl ParticleSystem for HairStrand {
    fn state(&self) -> &[NVec3] {
        self.body.state()
    }

    fn set_state(&mut self, state: Vec<NVec3>) {
        self.body.set_state(state);
    }

    fn eval_f(&self, state: &[NVec3]) -> Vec<NVec3> {
        self.body.eval_f(state)
    }

    fn begin_step(&mut self) {
        self.body.begin_step();
    }
}
