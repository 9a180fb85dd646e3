//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing:
//! - the engine (`Engine`: integrator, step size, simulated clock)
//! - the scene (`Scene`: cloth, hair group or pendulum at t = 0)
//! - the run length and frame rate of the headless driver

use tracing::info;

use crate::configuration::config::{BodyConfig, IntegratorConfig, ScenarioConfig};
use crate::error::SimError;
use crate::simulation::cloth::{Cloth, ClothParams};
use crate::simulation::engine::{Engine, Steppable};
use crate::simulation::hair_group::{HairGroup, HairGroupParams};
use crate::simulation::pendulum::{Pendulum, PendulumParams};
use crate::simulation::states::{positions, velocities, NVec3, ParticleSystem};

/// One of the three simulated structures
pub enum Scene {
    Cloth(Cloth),
    Hair(HairGroup),
    Pendulum(Pendulum),
}

impl Scene {
    pub fn from_config(cfg: &BodyConfig) -> Result<Self, SimError> {
        Ok(match cfg {
            BodyConfig::Cloth(c) => {
                let mut cloth = Cloth::new(&ClothParams::from(c))?;
                if c.breeze {
                    cloth.toggle_breeze();
                }
                Scene::Cloth(cloth)
            }
            BodyConfig::Hair(c) => {
                let mut group = HairGroup::new(&HairGroupParams::from(c))?;
                if c.wind {
                    group.toggle_wind();
                }
                Scene::Hair(group)
            }
            BodyConfig::Pendulum(c) => Scene::Pendulum(Pendulum::new(&PendulumParams::from(c))?),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scene::Cloth(_) => "cloth",
            Scene::Hair(_) => "hair",
            Scene::Pendulum(_) => "pendulum",
        }
    }

    /// One summary per independently integrated body
    pub fn summaries(&self) -> Vec<BodySummary> {
        match self {
            Scene::Cloth(c) => vec![BodySummary::of(c.state())],
            Scene::Hair(g) => g.hairs().iter().map(|h| BodySummary::of(h.state())).collect(),
            Scene::Pendulum(p) => vec![BodySummary::of(p.state())],
        }
    }
}

impl Steppable for Scene {
    fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        match self {
            Scene::Cloth(c) => c.step(integrator, h),
            Scene::Hair(g) => g.step(integrator, h),
            Scene::Pendulum(p) => p.step(integrator, h),
        }
    }
}

/// Coarse description of a state buffer for logs
#[derive(Debug, Clone, Copy)]
pub struct BodySummary {
    pub particles: usize,
    pub centroid: NVec3,
    pub lowest_y: f64,
    pub max_speed: f64,
}

impl BodySummary {
    pub fn of(state: &[NVec3]) -> Self {
        let particles = state.len() / 2;
        let (sum, lowest_y) = positions(state).fold((NVec3::zeros(), f64::INFINITY), |(s, low), p| {
            (s + p, low.min(p.y))
        });
        let max_speed = velocities(state).map(|v| v.norm()).fold(0.0, f64::max);
        Self {
            particles,
            centroid: if particles > 0 { sum / particles as f64 } else { sum },
            lowest_y,
            max_speed,
        }
    }
}

/// Runtime bundle constructed from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub scene: Scene,
    pub t_end: f64,
    pub fps: f64,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, SimError> {
        cfg.engine.validate()?;
        let engine = Engine::new(cfg.engine.integrator, cfg.engine.h)?;
        let scene = Scene::from_config(&cfg.body)?;

        info!(
            scene = scene.name(),
            integrator = engine.integrator.name(),
            h = engine.step_size(),
            t_end = cfg.engine.t_end,
            "scenario built"
        );

        Ok(Self {
            engine,
            scene,
            t_end: cfg.engine.t_end,
            fps: cfg.engine.fps,
        })
    }

    /// Drive the catch-up loop on a fixed frame clock until `t_end`.
    /// Returns the number of frames.
    pub fn run(&mut self) -> usize {
        self.run_with(|_, _| {})
    }

    /// Like [`Scenario::run`], calling `on_frame` with the scene after every
    /// frame's catch-up (the point where a renderer would read the state)
    pub fn run_with<F>(&mut self, mut on_frame: F) -> usize
    where
        F: FnMut(&Scene, usize),
    {
        let frame_dt = 1.0 / self.fps;
        let mut frames = 0;
        let mut elapsed = 0.0;
        while elapsed < self.t_end {
            elapsed = (elapsed + frame_dt).min(self.t_end);
            let steps = self.engine.catch_up(&mut self.scene, elapsed);
            on_frame(&self.scene, steps);
            frames += 1;
        }
        frames
    }
}
