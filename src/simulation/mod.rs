pub mod states;
pub mod springs;
pub mod forces;
pub mod body;
pub mod integrator;
pub mod cloth;
pub mod hair;
pub mod hair_group;
pub mod pendulum;
pub mod engine;
pub mod scenario;

pub use states::Rgb;
