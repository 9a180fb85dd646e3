pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{NVec3, ParticleSystem, Rgb};
pub use simulation::springs::{Spring, SpringKind, SpringNetwork};
pub use simulation::forces::{Acceleration, ForceSet, UniformGravity, ViscousDrag, SphereRepulsion, Wind, WindProfile};
pub use simulation::body::{SpringBody, SpringBodyBuilder};
pub use simulation::integrator::{euler_step, trapezoidal_step, rk4_step};
pub use simulation::cloth::{Cloth, ClothParams};
pub use simulation::hair::{HairStrand, HairParams};
pub use simulation::hair_group::{HairGroup, HairGroupParams, InterpolatedStrand};
pub use simulation::pendulum::{Pendulum, PendulumParams};
pub use simulation::engine::{Engine, Steppable};
pub use simulation::scenario::{Scenario, Scene, BodySummary};

pub use configuration::config::{IntegratorConfig, EngineConfig, BodyConfig, ClothConfig, HairConfig, PendulumConfig, SpringConfig, ScenarioConfig};

pub use error::SimError;

pub use benchmark::benchmark::{bench_eval, bench_integrators, bench_cloth_curve, bench_hair_group};
