//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`] – integrator, step size, duration and frame rate
//! - [`BodyConfig`]   – which body to simulate and its physical parameters
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! Every body parameter is optional; missing values fall back to the
//! defaults of the corresponding body module.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "rk4"       # euler | trapezoidal | rk4 (or e | t | r)
//!   h: 0.005                # fixed step size
//!   t_end: 5.0              # simulated seconds
//!   fps: 60.0               # frame clock of the headless driver
//!
//! body:
//!   kind: cloth
//!   width: 8
//!   height: 8
//!   spacing: 0.5
//!   stiffness: 1.5
//!   breeze: true
//! ```

use serde::Deserialize;

use crate::error::{validate_step_size, SimError};

/// Which integrator method is used by the engine
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler", alias = "e")] // Explicit forward Euler, one evaluation per step
    Euler,

    #[serde(rename = "trapezoidal", alias = "t")] // Improved Euler / Heun, two evaluations per step
    Trapezoidal,

    #[serde(rename = "rk4", alias = "r")] // Classical 4th-order Runge–Kutta, four evaluations per step
    Rk4,
}

impl IntegratorConfig {
    /// Parse the command-line mode selector (`e`, `t`, `r` or the full name)
    pub fn from_mode(mode: &str) -> Result<Self, SimError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "e" | "euler" => Ok(IntegratorConfig::Euler),
            "t" | "trapezoidal" => Ok(IntegratorConfig::Trapezoidal),
            "r" | "rk4" => Ok(IntegratorConfig::Rk4),
            _ => Err(SimError::UnknownIntegrator(mode.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntegratorConfig::Euler => "euler",
            IntegratorConfig::Trapezoidal => "trapezoidal",
            IntegratorConfig::Rk4 => "rk4",
        }
    }
}

impl std::str::FromStr for IntegratorConfig {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mode(s)
    }
}

/// Engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // Time integrator used for advancing the state
    pub h: f64,                       // fixed step size
    #[serde(default = "default_t_end")]
    pub t_end: f64, // simulated seconds
    #[serde(default = "default_fps")]
    pub fps: f64, // frames per simulated second for the catch-up driver
}

fn default_t_end() -> f64 {
    1.0
}

fn default_fps() -> f64 {
    60.0
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        validate_step_size(self.h)?;
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(SimError::InvalidDuration(self.t_end));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(SimError::InvalidFrameRate(self.fps));
        }
        Ok(())
    }
}

/// Cloth grid parameters
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ClothConfig {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub spacing: Option<f64>,
    pub stiffness: Option<f64>,
    pub drag: Option<f64>,
    pub mass: Option<f64>,
    pub gravity: Option<f64>,
    pub origin: Option<[f64; 3]>,
    pub breeze: bool,
    pub seed: Option<u64>,
}

/// Hair group parameters
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct HairConfig {
    pub length: Option<usize>,     // particles per strand
    pub rounds: Option<usize>,     // latitude bands on the scalp
    pub per_round: Option<usize>,  // strands per band
    pub interpolated_per_gap: Option<usize>,
    pub unit_height: Option<f64>,
    pub curl: Option<f64>,
    pub wind: bool,
    pub wind_strength: Option<f64>,
    pub wind_direction: Option<[f64; 3]>,
    pub seed: Option<u64>,
}

/// One pendulum spring: endpoints, rest length, stiffness
#[derive(Deserialize, Debug, Clone)]
pub struct SpringConfig {
    pub a: usize,
    pub b: usize,
    pub rest_length: f64,
    pub stiffness: f64,
}

/// Pendulum chain parameters
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PendulumConfig {
    pub particles: Option<usize>, // free particles below the anchor
    pub mass: Option<f64>,
    pub drag: Option<f64>,
    pub gravity: Option<f64>,
    pub springs: Option<Vec<SpringConfig>>,
    pub seed: Option<u64>,
}

/// Body to simulate, tagged by `kind`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyConfig {
    Cloth(ClothConfig),
    Hair(HairConfig),
    Pendulum(PendulumConfig),
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // Engine-level configuration
    pub body: BodyConfig,     // The simulated body
}

impl ScenarioConfig {
    /// Parse and validate a scenario from YAML text
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_str(text)?;
        cfg.engine.validate()?;
        Ok(cfg)
    }
}
