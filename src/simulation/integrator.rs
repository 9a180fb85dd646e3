//! Fixed-step time integrators for mass-spring bodies
//!
//! Provides forward Euler, trapezoidal (Heun) and classical RK4. All three
//! read the body's state, call `eval_f` one or more times, build a new
//! buffer of the same length and hand it back through `set_state`.

use crate::configuration::config::IntegratorConfig;
use crate::simulation::states::{NVec3, ParticleSystem};

/// `base + h * slope`, element-wise
fn offset(base: &[NVec3], h: f64, slope: &[NVec3]) -> Vec<NVec3> {
    base.iter().zip(slope).map(|(x, d)| *x + h * *d).collect()
}

/// Advance the body by one step using forward Euler
/// x_n+1 = x_n + h f(x_n)
pub fn euler_step<S: ParticleSystem + ?Sized>(sys: &mut S, h: f64) {
    sys.begin_step();
    let old = sys.state().to_vec();
    let f = sys.eval_f(&old);
    let new = offset(&old, h, &f);
    sys.set_state(new);
}

/// Advance the body by one step using the trapezoidal rule (Heun's method)
/// Uses two force evaluations: one at x_n and one at the Euler predictor
pub fn trapezoidal_step<S: ParticleSystem + ?Sized>(sys: &mut S, h: f64) {
    sys.begin_step();
    let old = sys.state().to_vec();

    // f0 at x_n, predictor x_n + h f0
    let f0 = sys.eval_f(&old);
    let predictor = offset(&old, h, &f0);

    // f1 at the predictor
    let f1 = sys.eval_f(&predictor);

    // x_n+1 = x_n + h/2 (f0 + f1)
    let half_h = 0.5 * h;
    let new = old
        .iter()
        .zip(f0.iter().zip(&f1))
        .map(|(x, (a, b))| *x + half_h * (*a + *b))
        .collect();
    sys.set_state(new);
}

/// Advance the body by one step using classical 4th-order Runge-Kutta
/// Four force evaluations at x_n, two midpoints and the end point
pub fn rk4_step<S: ParticleSystem + ?Sized>(sys: &mut S, h: f64) {
    sys.begin_step();
    let old = sys.state().to_vec();
    let half_h = 0.5 * h;

    let k1 = sys.eval_f(&old);
    let k2 = sys.eval_f(&offset(&old, half_h, &k1));
    let k3 = sys.eval_f(&offset(&old, half_h, &k2));
    let k4 = sys.eval_f(&offset(&old, h, &k3));

    // x_n+1 = x_n + h/6 (k1 + 2 k2 + 2 k3 + k4)
    let sixth_h = h / 6.0;
    let new = (0..old.len())
        .map(|i| old[i] + sixth_h * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
        .collect();
    sys.set_state(new);
}

impl IntegratorConfig {
    /// Advance `sys` by one step of size `h` with this strategy
    pub fn take_step<S: ParticleSystem + ?Sized>(&self, sys: &mut S, h: f64) {
        match self {
            IntegratorConfig::Euler => euler_step(sys, h),
            IntegratorConfig::Trapezoidal => trapezoidal_step(sys, h),
            IntegratorConfig::Rk4 => rk4_step(sys, h),
        }
    }

    /// Number of `eval_f` calls per step
    pub fn evaluations_per_step(&self) -> usize {
        match self {
            IntegratorConfig::Euler => 1,
            IntegratorConfig::Trapezoidal => 2,
            IntegratorConfig::Rk4 => 4,
        }
    }
}
