use std::hint::black_box;
use std::time::Instant;

use crate::configuration::config::IntegratorConfig;
use crate::simulation::cloth::{Cloth, ClothParams};
use crate::simulation::engine::Steppable;
use crate::simulation::hair_group::{HairGroup, HairGroupParams};
use crate::simulation::pendulum::{Pendulum, PendulumParams};
use crate::simulation::states::ParticleSystem;

const INTEGRATORS: [IntegratorConfig; 3] = [
    IntegratorConfig::Euler,
    IntegratorConfig::Trapezoidal,
    IntegratorConfig::Rk4,
];

/// Average seconds per step of `world` over `steps` steps, after one warm-up step
fn time_steps<S: Steppable>(world: &mut S, integrator: IntegratorConfig, h: f64, steps: usize) -> f64 {
    world.step(integrator, h);
    let t0 = Instant::now();
    for _ in 0..steps {
        world.step(integrator, h);
    }
    t0.elapsed().as_secs_f64() / steps as f64
}

/// Cloth of `n x n` particles with default physics
fn make_cloth(n: usize) -> Cloth {
    let params = ClothParams {
        width: n,
        height: n,
        ..ClothParams::default()
    };
    // n >= 2 everywhere below
    Cloth::new(&params).unwrap_or_else(|e| panic!("benchmark cloth: {e}"))
}

/// Time a single `eval_f` on growing cloth grids
pub fn bench_eval() {
    let ns = [8, 16, 32, 64, 128];

    for n in ns {
        let cloth = make_cloth(n);
        let state = cloth.state().to_vec();

        // Warm up
        black_box(cloth.eval_f(black_box(&state)));

        let reps = 20;
        let t0 = Instant::now();
        for _ in 0..reps {
            black_box(cloth.eval_f(black_box(&state)));
        }
        let per_eval = t0.elapsed().as_secs_f64() / reps as f64;

        println!(
            "cloth {n:3}x{n:<3} particles = {:6}, springs = {:6}, eval_f = {:10.6} ms",
            n * n,
            cloth.body().springs().len(),
            per_eval * 1000.0
        );
    }
}

/// Steps per second of every integrator on every body kind
pub fn bench_integrators() {
    let h = 0.001;
    let steps = 500;

    println!("{:<10} {:<12} {:>14}", "body", "integrator", "steps/s");
    for integrator in INTEGRATORS {
        let mut cloth = make_cloth(8);
        let per_step = time_steps(&mut cloth, integrator, h, steps);
        println!("{:<10} {:<12} {:>14.1}", "cloth", integrator.name(), 1.0 / per_step);

        if let Ok(mut pendulum) = Pendulum::new(&PendulumParams::default()) {
            let per_step = time_steps(&mut pendulum, integrator, h, steps);
            println!("{:<10} {:<12} {:>14.1}", "pendulum", integrator.name(), 1.0 / per_step);
        }

        if let Ok(mut hair) = HairGroup::new(&HairGroupParams::default()) {
            let per_step = time_steps(&mut hair, integrator, h, steps);
            println!("{:<10} {:<12} {:>14.1}", "hair", integrator.name(), 1.0 / per_step);
        }
    }
}

/// Per-step cost of the three integrators as the cloth grows
/// Paste output directly into a spreadsheet to graph
pub fn bench_cloth_curve() {
    println!("n,euler_ms,trapezoidal_ms,rk4_ms");

    for n in (4..=64).step_by(4) {
        // Small grids: average over more steps to smooth noise
        let steps = if n <= 16 { 200 } else { 20 };

        let ms: Vec<f64> = INTEGRATORS
            .iter()
            .map(|&integrator| {
                let mut cloth = make_cloth(n);
                time_steps(&mut cloth, integrator, 0.001, steps) * 1000.0
            })
            .collect();

        println!("{},{:.6},{:.6},{:.6}", n, ms[0], ms[1], ms[2]);
    }
}

/// Hair group stepping cost as the number of strands grows
pub fn bench_hair_group() {
    for per_round in [4, 8, 16, 32] {
        let params = HairGroupParams {
            per_round,
            ..HairGroupParams::default()
        };
        let Ok(mut group) = HairGroup::new(&params) else {
            continue;
        };
        let per_step = time_steps(&mut group, IntegratorConfig::Rk4, 0.001, 200);
        println!(
            "strands = {:4}, interpolated = {:5}, rk4 step = {:8.6} ms",
            group.hairs().len(),
            group.interpolated().len(),
            per_step * 1000.0
        );
    }
}
