//! Rectangular cloth sheet.
//!
//! Particle `(i, j)` (column `i`, row `j`) lives at index `j * W + i` and
//! starts at `origin + (spacing * i, spacing * j, 0)`; row `H - 1` is the
//! top. Three spring layers hold the sheet together:
//! - structural: right and upper neighbour, rest `spacing`
//! - shear: both diagonals one row up, rest `spacing * sqrt(2)`
//! - flexion: two apart horizontally and vertically, rest `2 * spacing`
//!
//! The two top corners are pinned.

use std::f64::consts::SQRT_2;

use crate::configuration::config::ClothConfig;
use crate::error::SimError;
use crate::simulation::body::SpringBody;
use crate::simulation::forces::{Wind, WindProfile};
use crate::simulation::springs::{Spring, SpringKind, SpringNetwork};
use crate::simulation::states::{NVec3, ParticleSystem};
use crate::simulation::Rgb;

pub const DEFAULT_SIZE: usize = 8;
pub const DEFAULT_SPACING: f64 = 0.5;
pub const DEFAULT_STIFFNESS: f64 = 1.5;
pub const DEFAULT_DRAG: f64 = 0.3;
pub const DEFAULT_MASS: f64 = 0.01;
pub const GRAVITY: f64 = 9.8;

/// Breeze blows along -z with a magnitude drawn from [8, 11] each step
const BREEZE_STRENGTH: f64 = 9.5;
const BREEZE_GUST: f64 = 1.5;

/// Distance covered by one `move_*` control
const MOVE_DELTA: f64 = 0.5;

/// Physical parameters of a cloth sheet
#[derive(Debug, Clone)]
pub struct ClothParams {
    pub width: usize,
    pub height: usize,
    pub spacing: f64,
    pub stiffness: f64,
    pub drag: f64,
    pub mass: f64,
    pub gravity: f64,
    pub origin: NVec3,
    pub seed: u64,
}

impl Default for ClothParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            spacing: DEFAULT_SPACING,
            stiffness: DEFAULT_STIFFNESS,
            drag: DEFAULT_DRAG,
            mass: DEFAULT_MASS,
            gravity: GRAVITY,
            origin: NVec3::new(0.4, 1.0, 0.0),
            seed: 0,
        }
    }
}

impl From<&ClothConfig> for ClothParams {
    fn from(cfg: &ClothConfig) -> Self {
        let d = ClothParams::default();
        Self {
            width: cfg.width.unwrap_or(d.width),
            height: cfg.height.unwrap_or(d.height),
            spacing: cfg.spacing.unwrap_or(d.spacing),
            stiffness: cfg.stiffness.unwrap_or(d.stiffness),
            drag: cfg.drag.unwrap_or(d.drag),
            mass: cfg.mass.unwrap_or(d.mass),
            gravity: cfg.gravity.unwrap_or(d.gravity),
            origin: cfg.origin.map(NVec3::from).unwrap_or(d.origin),
            seed: cfg.seed.unwrap_or(d.seed),
        }
    }
}

pub struct Cloth {
    body: SpringBody,
    width: usize,
    height: usize,
    color: Rgb,
}

impl Cloth {
    pub fn new(params: &ClothParams) -> Result<Self, SimError> {
        let (w, h) = (params.width, params.height);
        if w < 2 || h < 2 {
            return Err(SimError::InvalidGrid { width: w, height: h });
        }
        let index_of = |i: usize, j: usize| j * w + i;
        let unit = params.spacing;
        let k = params.stiffness;

        let mut builder = SpringBody::builder()
            .mass(params.mass)
            .gravity(params.gravity)
            .drag(params.drag)
            .wind(Wind::new(
                NVec3::new(0.0, 0.0, -1.0),
                BREEZE_STRENGTH,
                BREEZE_GUST,
                WindProfile::Uniform,
            ))
            .seed(params.seed);

        for j in 0..h {
            for i in 0..w {
                builder = builder.particle(params.origin + NVec3::new(unit * i as f64, unit * j as f64, 0.0));
            }
        }

        let mut springs = SpringNetwork::new();

        // structural: up and right
        for j in 0..h {
            for i in 0..w {
                if j + 1 < h {
                    springs.push(Spring::new(index_of(i, j), index_of(i, j + 1), unit, k, SpringKind::Structural));
                }
                if i + 1 < w {
                    springs.push(Spring::new(index_of(i, j), index_of(i + 1, j), unit, k, SpringKind::Structural));
                }
            }
        }

        // shear: both diagonals into the next row
        for j in 0..h - 1 {
            for i in 0..w {
                if i >= 1 {
                    springs.push(Spring::new(index_of(i, j), index_of(i - 1, j + 1), unit * SQRT_2, k, SpringKind::Shear));
                }
                if i + 1 < w {
                    springs.push(Spring::new(index_of(i, j), index_of(i + 1, j + 1), unit * SQRT_2, k, SpringKind::Shear));
                }
            }
        }

        // flexion: skip one particle
        for j in 0..h {
            for i in 0..w {
                if j + 2 < h {
                    springs.push(Spring::new(index_of(i, j), index_of(i, j + 2), 2.0 * unit, k, SpringKind::Flexion));
                }
                if i + 2 < w {
                    springs.push(Spring::new(index_of(i, j), index_of(i + 2, j), 2.0 * unit, k, SpringKind::Flexion));
                }
            }
        }

        let body = builder
            .springs(springs)
            .fix(index_of(0, h - 1))
            .fix(index_of(w - 1, h - 1))
            .build()?;

        Ok(Self {
            body,
            width: w,
            height: h,
            color: Rgb::new(0.9, 0.9, 0.9),
        })
    }

    /// Particle index of column `i`, row `j`
    pub fn index_of(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn body(&self) -> &SpringBody {
        &self.body
    }

    pub fn breeze_enabled(&self) -> bool {
        self.body.wind().is_some_and(|w| w.enabled)
    }

    pub fn toggle_breeze(&mut self) {
        if let Some(wind) = self.body.wind_mut() {
            wind.enabled = !wind.enabled;
        }
    }

    /// Redirect the breeze; the gust range stays centred on `strength`
    pub fn set_wind(&mut self, direction: NVec3, strength: f64) {
        if let Some(wind) = self.body.wind_mut() {
            wind.set(direction, strength);
        }
    }

    pub fn translate(&mut self, offset: NVec3) {
        self.body.translate(offset);
    }

    pub fn move_up(&mut self) {
        self.translate(NVec3::new(0.0, MOVE_DELTA, 0.0));
    }

    pub fn move_down(&mut self) {
        self.translate(NVec3::new(0.0, -MOVE_DELTA, 0.0));
    }

    pub fn move_left(&mut self) {
        self.translate(NVec3::new(-MOVE_DELTA, 0.0, 0.0));
    }

    pub fn move_right(&mut self) {
        self.translate(NVec3::new(MOVE_DELTA, 0.0, 0.0));
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}

impl ParticleSystem for Cloth {
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
