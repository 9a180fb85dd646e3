use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mssim::simulation::states::{positions, vel_index};
use mssim::{
    BodyConfig, Cloth, ClothParams, Engine, EngineConfig, HairGroup, HairGroupParams, HairParams, HairStrand, IntegratorConfig,
    InterpolatedStrand, NVec3, ParticleSystem, Pendulum, PendulumParams, Rgb, Scenario, ScenarioConfig, Scene,
    SimError, SpringKind, Wind, WindProfile,
};

/// The 8x8 sheet with every default
fn default_cloth() -> Cloth {
    Cloth::new(&ClothParams::default()).unwrap()
}

fn load_scenario_file(name: &str) -> ScenarioConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    ScenarioConfig::from_yaml(&text).unwrap()
}

// ==================================================================================
// Cloth tests
// ==================================================================================

#[test]
fn cloth_topology() {
    let cloth = default_cloth();
    let springs = cloth.body().springs();

    assert_eq!(cloth.num_particles(), 64);
    assert_eq!(springs.of_kind(SpringKind::Structural).count(), 2 * 8 * 7);
    assert_eq!(springs.of_kind(SpringKind::Shear).count(), 2 * 7 * 7);
    assert_eq!(springs.of_kind(SpringKind::Flexion).count(), 2 * 8 * 6);
    assert_eq!(cloth.body().fixed_points(), &[cloth.index_of(0, 7), cloth.index_of(7, 7)]);

    for s in springs.of_kind(SpringKind::Shear) {
        assert!((s.rest_length - 0.5 * 2f64.sqrt()).abs() < 1e-12);
    }
    for s in springs.of_kind(SpringKind::Flexion) {
        assert!((s.rest_length - 1.0).abs() < 1e-12);
    }
}

#[test]
fn cloth_starts_flat_at_rest() {
    let cloth = default_cloth();
    assert_eq!(cloth.position(cloth.index_of(0, 0)), NVec3::new(0.4, 1.0, 0.0));
    assert!((cloth.position(cloth.index_of(2, 3)) - NVec3::new(1.4, 2.5, 0.0)).norm() < 1e-12);
    for i in 0..cloth.num_particles() {
        assert_eq!(cloth.velocity(i), NVec3::zeros());
    }
}

#[test]
fn too_small_cloth_is_rejected() {
    let params = ClothParams {
        width: 1,
        ..ClothParams::default()
    };
    assert_eq!(Cloth::new(&params).err(), Some(SimError::InvalidGrid { width: 1, height: 8 }));
}

#[test]
fn cloth_sags_under_gravity_with_pinned_corners() {
    let mut cloth = default_cloth();
    let initial = cloth.state().to_vec();
    let fixed = cloth.body().fixed_points().to_vec();

    for _ in 0..1000 {
        IntegratorConfig::Euler.take_step(&mut cloth, 0.001);
    }

    for i in 0..cloth.num_particles() {
        if fixed.contains(&i) {
            let (before, after) = (initial[2 * i], cloth.position(i));
            assert_eq!(before.x.to_bits(), after.x.to_bits());
            assert_eq!(before.y.to_bits(), after.y.to_bits());
            assert_eq!(before.z.to_bits(), after.z.to_bits());
            assert_eq!(cloth.velocity(i), NVec3::zeros());
        } else {
            assert!(
                cloth.position(i).y < initial[2 * i].y,
                "particle {} did not sag: {} -> {}",
                i,
                initial[2 * i].y,
                cloth.position(i).y
            );
        }
    }
}

#[test]
fn cloth_moves_rigidly() {
    let mut cloth = default_cloth();
    let before: Vec<NVec3> = positions(cloth.state()).copied().collect();

    cloth.move_up();
    cloth.move_left();
    let after: Vec<NVec3> = positions(cloth.state()).copied().collect();

    for (b, a) in before.iter().zip(&after) {
        assert!((a - b - NVec3::new(-0.5, 0.5, 0.0)).norm() < 1e-12);
    }

    cloth.move_down();
    cloth.move_right();
    let back: Vec<NVec3> = positions(cloth.state()).copied().collect();
    for (b, a) in before.iter().zip(&back) {
        assert!((a - b).norm() < 1e-12);
    }
}

#[test]
fn breeze_pushes_cloth_along_negative_z() {
    let mut cloth = default_cloth();
    assert!(!cloth.breeze_enabled());
    cloth.toggle_breeze();
    assert!(cloth.breeze_enabled());

    for _ in 0..200 {
        IntegratorConfig::Trapezoidal.take_step(&mut cloth, 0.001);
    }
    let fixed = cloth.body().fixed_points().to_vec();
    for i in (0..cloth.num_particles()).filter(|i| !fixed.contains(i)) {
        assert!(cloth.position(i).z < 0.0, "particle {} not blown back", i);
    }
}

#[test]
fn breeze_samples_do_not_depend_on_the_integrator() {
    let params = ClothParams {
        seed: 11,
        ..ClothParams::default()
    };
    let mut euler = Cloth::new(&params).unwrap();
    let mut rk4 = Cloth::new(&params).unwrap();
    euler.toggle_breeze();
    rk4.toggle_breeze();

    for _ in 0..20 {
        IntegratorConfig::Euler.take_step(&mut euler, 0.001);
        IntegratorConfig::Rk4.take_step(&mut rk4, 0.001);
        let a = euler.body().wind().unwrap().current();
        let b = rk4.body().wind().unwrap().current();
        assert_eq!(a, b);
        assert!((8.0..=11.0).contains(&a));
    }
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut cloth = Cloth::new(&ClothParams { seed: 5, ..ClothParams::default() }).unwrap();
        cloth.toggle_breeze();
        for _ in 0..100 {
            IntegratorConfig::Rk4.take_step(&mut cloth, 0.002);
        }
        cloth.state().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn cloth_color_is_cosmetic() {
    let mut a = default_cloth();
    let b = default_cloth();
    a.set_color(Rgb::new(1.0, 0.0, 0.0));
    assert_eq!(a.color(), Rgb::new(1.0, 0.0, 0.0));
    assert_eq!(a.eval_f(a.state()), b.eval_f(b.state()));
}

#[test]
fn cloth_set_wind_redirects_the_breeze() {
    let calm = default_cloth();
    let mut windy = default_cloth();
    windy.toggle_breeze();
    windy.set_wind(NVec3::new(2.0, 0.0, 0.0), 5.0);

    let state = calm.state().to_vec();
    let f_calm = calm.eval_f(&state);
    let f_windy = windy.eval_f(&state);
    let fixed = calm.body().fixed_points().to_vec();

    for i in 0..calm.num_particles() {
        let diff = f_windy[vel_index(i)] - f_calm[vel_index(i)];
        let expected = if fixed.contains(&i) { NVec3::zeros() } else { NVec3::new(5.0, 0.0, 0.0) };
        assert!((diff - expected).norm() < 1e-9, "particle {}: {:?}", i, diff);
    }

    let mut calm = calm;
    for _ in 0..100 {
        IntegratorConfig::Rk4.take_step(&mut calm, 0.001);
        IntegratorConfig::Rk4.take_step(&mut windy, 0.001);
        let current = windy.body().wind().unwrap().current();
        assert!((3.5..=6.5).contains(&current));
    }
    for i in (0..windy.num_particles()).filter(|i| !fixed.contains(i)) {
        assert!(windy.position(i).x > calm.position(i).x, "particle {} not blown along +x", i);
    }
}

#[test]
fn cloth_ignores_non_finite_wind() {
    let mut cloth = default_cloth();
    cloth.toggle_breeze();
    cloth.set_wind(NVec3::new(0.0, 0.0, -1.0), f64::NAN);
    cloth.set_wind(NVec3::new(f64::INFINITY, 0.0, 0.0), 3.0);

    let wind = cloth.body().wind().unwrap();
    assert_eq!(wind.strength, 9.5);
    assert_eq!(wind.direction, NVec3::new(0.0, 0.0, -1.0));

    for integrator in [IntegratorConfig::Euler, IntegratorConfig::Trapezoidal, IntegratorConfig::Rk4] {
        integrator.take_step(&mut cloth, 0.001);
    }
    assert!(cloth.state().iter().all(|v| v.iter().all(|c| c.is_finite())));
}

// ==================================================================================
// Hair tests
// ==================================================================================

#[test]
fn hair_strand_topology() {
    let strand = HairStrand::new(NVec3::new(0.0, 1.0, 0.0), &HairParams::default()).unwrap();
    let springs = strand.body().springs();

    assert_eq!(strand.num_particles(), 8);
    assert_eq!(springs.of_kind(SpringKind::Core).count(), 7);
    assert_eq!(springs.of_kind(SpringKind::SupportNear).count(), 6);
    assert_eq!(springs.of_kind(SpringKind::SupportFar).count(), 5);
    assert_eq!(strand.body().fixed_points(), &[0usize]);
    assert_eq!(strand.root(), NVec3::new(0.0, 1.0, 0.0));

    // zig-zag start
    assert!((strand.position(1) - NVec3::new(-0.3, 1.5, 0.2)).norm() < 1e-12);
    assert!((strand.position(2) - NVec3::new(0.3, 2.0, -0.2)).norm() < 1e-12);
}

#[test]
fn short_strand_is_rejected() {
    let params = HairParams {
        length: 1,
        ..HairParams::default()
    };
    assert_eq!(HairStrand::new(NVec3::zeros(), &params).err(), Some(SimError::InvalidStrandLength(1)));
}

#[test]
fn curl_rescales_only_near_support_springs() {
    let mut strand = HairStrand::new(NVec3::new(0.0, 1.0, 0.0), &HairParams::default()).unwrap();
    strand.set_curl(1.2);

    let springs = strand.body().springs();
    for s in springs.of_kind(SpringKind::SupportNear) {
        assert!((s.rest_length - 0.6).abs() < 1e-12);
    }
    for s in springs.of_kind(SpringKind::Core) {
        assert!((s.rest_length - 0.5).abs() < 1e-12);
    }
    for s in springs.of_kind(SpringKind::SupportFar) {
        assert!((s.rest_length - 1.5).abs() < 1e-12);
    }
}

#[test]
fn hair_wind_reaches_only_the_free_end() {
    let root = NVec3::new(0.0, 1.0, 0.0);
    let calm = HairStrand::new(root, &HairParams::default()).unwrap();
    let mut windy = HairStrand::new(root, &HairParams::default()).unwrap();
    windy.set_wind(NVec3::new(0.0, 0.0, 2.0), 3.0);
    windy.toggle_wind();
    assert!(windy.wind_enabled());

    let state = calm.state().to_vec();
    let f_calm = calm.eval_f(&state);
    let f_windy = windy.eval_f(&state);

    let n = calm.num_particles();
    for i in 0..n {
        let diff = f_windy[vel_index(i)] - f_calm[vel_index(i)];
        if i < n / 2 {
            assert!(diff.norm() < 1e-12, "particle {} felt wind", i);
        } else {
            let expected = NVec3::new(0.0, 0.0, 3.0 * i as f64 / (n - 1) as f64);
            assert!((diff - expected).norm() < 1e-9, "particle {}: {:?}", i, diff);
        }
    }
}

#[test]
fn hair_root_stays_pinned() {
    let mut strand = HairStrand::new(NVec3::new(0.0, 1.0, 0.0), &HairParams::default()).unwrap();
    for integrator in [IntegratorConfig::Trapezoidal, IntegratorConfig::Rk4] {
        for _ in 0..2000 {
            integrator.take_step(&mut strand, 0.001);
        }
        assert_eq!(strand.root(), NVec3::new(0.0, 1.0, 0.0));
        assert_eq!(strand.velocity(0), NVec3::zeros());
    }
    for i in 1..strand.num_particles() {
        assert!(strand.position(i).iter().all(|c| c.is_finite()));
    }
}

#[test]
fn hair_ignores_non_finite_wind() {
    let mut strand = HairStrand::new(NVec3::new(0.0, 1.0, 0.0), &HairParams::default()).unwrap();
    strand.toggle_wind();
    strand.set_wind(NVec3::new(1.0, 0.0, 0.0), f64::INFINITY);

    let wind = strand.body().wind().unwrap();
    assert_eq!(wind.strength, 4.0);
    assert_eq!(wind.gust, 1.0);

    IntegratorConfig::Euler.take_step(&mut strand, 0.001);
    assert!(strand.state().iter().all(|v| v.iter().all(|c| c.is_finite())));
}

#[test]
fn unbounded_gust_range_falls_back_to_strength() {
    let mut wind = Wind::new(NVec3::new(1.0, 0.0, 0.0), 2.0, f64::INFINITY, WindProfile::Uniform);
    wind.enabled = true;
    let mut rng = StdRng::seed_from_u64(0);
    wind.resample(&mut rng);
    assert_eq!(wind.current(), 2.0);
}

// ==================================================================================
// Hair group tests
// ==================================================================================

#[test]
fn hair_group_layout() {
    let group = HairGroup::new(&HairGroupParams::default()).unwrap();
    assert_eq!(group.hairs().len(), 12);
    // 2 per latitude gap (8), 2 per longitude gap (9), 4 per cell (6)
    assert_eq!(group.interpolated().len(), 16 + 18 + 24);

    for h in group.hairs() {
        assert!((h.root().norm() - 1.0).abs() < 1e-12, "root not on the scalp");
    }
    for s in group.interpolated() {
        let sum: f64 = s.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((s.origin().norm() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn interpolated_strands_follow_their_sources() {
    let mut group = HairGroup::new(&HairGroupParams::default()).unwrap();
    for _ in 0..50 {
        group.step(IntegratorConfig::Rk4, 0.002);
    }

    let all = group.interpolated_points();
    for (strand, points) in group.interpolated().iter().zip(&all) {
        assert_eq!(points.len(), 8);
        assert_eq!(points[0], strand.origin());
        for i in 1..points.len() {
            let mut expected = NVec3::zeros();
            for (&s, &w) in strand.sources().iter().zip(strand.weights()) {
                expected += w * group.hairs()[s].position(i);
            }
            assert!((points[i] - expected).norm() < 1e-12);
        }
    }
}

#[test]
fn single_source_interpolation_copies_the_strand() {
    let group = HairGroup::new(&HairGroupParams {
        interpolated_per_gap: 0,
        ..HairGroupParams::default()
    })
    .unwrap();
    assert!(group.interpolated().is_empty());

    let copy = InterpolatedStrand::new(NVec3::zeros(), vec![3], vec![1.0], group.hairs().len()).unwrap();
    let points = copy.points(group.hairs());
    for i in 1..points.len() {
        assert_eq!(points[i], group.hairs()[3].position(i));
    }
}

#[test]
fn bad_interpolation_weights_are_rejected() {
    let n = 4;
    assert!(matches!(
        InterpolatedStrand::new(NVec3::zeros(), vec![0, 1], vec![0.5, 0.6], n),
        Err(SimError::InvalidWeights(_))
    ));
    assert!(matches!(
        InterpolatedStrand::new(NVec3::zeros(), vec![0, 1], vec![1.0], n),
        Err(SimError::InvalidWeights(_))
    ));
    assert!(matches!(
        InterpolatedStrand::new(NVec3::zeros(), vec![], vec![], n),
        Err(SimError::InvalidWeights(_))
    ));
    assert_eq!(
        InterpolatedStrand::new(NVec3::zeros(), vec![7], vec![1.0], n).err(),
        Some(SimError::SourceOutOfRange { index: 7, count: 4 })
    );
}

#[test]
fn group_controls_reach_every_strand() {
    let mut group = HairGroup::new(&HairGroupParams::default()).unwrap();
    group.toggle_wind();
    group.set_curl(0.8);
    group.set_color(Rgb::new(0.1, 0.2, 0.3));

    for h in group.hairs() {
        assert!(h.wind_enabled());
        assert_eq!(h.color(), Rgb::new(0.1, 0.2, 0.3));
        for s in h.body().springs().of_kind(SpringKind::SupportNear) {
            assert!((s.rest_length - 0.4).abs() < 1e-12);
        }
    }
    for s in group.interpolated() {
        assert_eq!(s.color(), Rgb::new(0.1, 0.2, 0.3));
    }
    assert!(group.strand(2, 3).wind_enabled());
}

#[test]
fn group_survives_non_finite_wind() {
    let mut group = HairGroup::new(&HairGroupParams::default()).unwrap();
    group.toggle_wind();
    group.set_wind(NVec3::new(1.0, 0.0, 0.0), f64::INFINITY);
    group.step(IntegratorConfig::Rk4, 0.002);
    for h in group.hairs() {
        assert!(h.state().iter().all(|v| v.iter().all(|c| c.is_finite())));
    }
}

// ==================================================================================
// Pendulum tests
// ==================================================================================

#[test]
fn pendulum_layout() {
    let pendulum = Pendulum::new(&PendulumParams::default()).unwrap();
    assert_eq!(pendulum.num_particles(), 5);
    assert_eq!(pendulum.body().springs().len(), 6);
    assert_eq!(pendulum.anchor(), NVec3::new(0.0, 1.0, 0.0));
    for i in 1..5 {
        let p = pendulum.position(i);
        assert_eq!((p.x, p.z), (0.0, 0.0));
        assert!((-0.5..0.5).contains(&p.y));
    }
}

#[test]
fn pendulum_settles_below_the_anchor() {
    let mut pendulum = Pendulum::new(&PendulumParams::default()).unwrap();
    for _ in 0..3000 {
        IntegratorConfig::Rk4.take_step(&mut pendulum, 0.01);
    }
    assert_eq!(pendulum.anchor(), NVec3::new(0.0, 1.0, 0.0));
    for i in 1..5 {
        assert!(pendulum.position(i).y < 1.0);
        assert!(pendulum.velocity(i).norm() < 0.1, "mass {} still moving", i);
    }
}

#[test]
fn pendulum_spring_out_of_range_is_rejected() {
    let mut params = PendulumParams::default();
    params.particles = 2;
    assert!(matches!(
        Pendulum::new(&params).err(),
        Some(SimError::SpringOutOfRange { count: 3, .. })
    ));
}

// ==================================================================================
// Engine and configuration tests
// ==================================================================================

#[test]
fn engine_catches_up_in_fixed_steps() {
    let mut pendulum = Pendulum::new(&PendulumParams::default()).unwrap();
    let mut engine = Engine::new(IntegratorConfig::Trapezoidal, 0.25).unwrap();

    assert_eq!(engine.catch_up(&mut pendulum, 1.0), 4);
    assert_eq!(engine.catch_up(&mut pendulum, 1.0), 0);
    assert_eq!(engine.catch_up(&mut pendulum, 1.1), 1);
    assert_eq!(engine.steps(), 5);
    assert_eq!(engine.simulated_s(), 1.25);

    engine.reset();
    assert_eq!(engine.simulated_s(), 0.0);
}

#[test]
fn engine_clock_does_not_drift() {
    let mut pendulum = Pendulum::new(&PendulumParams::default()).unwrap();

    let mut engine = Engine::new(IntegratorConfig::Euler, 0.1).unwrap();
    assert_eq!(engine.catch_up(&mut pendulum, 1.0), 10);
    assert_eq!(engine.catch_up(&mut pendulum, 1.0), 0);
    assert!((engine.simulated_s() - 1.0).abs() < 1e-12);

    let mut engine = Engine::new(IntegratorConfig::Euler, 0.001).unwrap();
    let mut total = 0;
    for frame in 1..=60 {
        total += engine.catch_up(&mut pendulum, frame as f64 / 60.0);
    }
    assert_eq!(total, 1000);
    assert_eq!(engine.steps(), 1000);
    assert!((engine.simulated_s() - 1.0).abs() < 1e-12);
}

#[test]
fn engine_rejects_bad_step_sizes() {
    for h in [0.0, -0.01, f64::NAN, f64::INFINITY] {
        assert!(Engine::new(IntegratorConfig::Euler, h).is_err());
    }
}

#[test]
fn integrator_modes_parse() {
    assert_eq!(IntegratorConfig::from_mode("e"), Ok(IntegratorConfig::Euler));
    assert_eq!(IntegratorConfig::from_mode("t"), Ok(IntegratorConfig::Trapezoidal));
    assert_eq!(IntegratorConfig::from_mode("r"), Ok(IntegratorConfig::Rk4));
    assert_eq!(IntegratorConfig::from_mode("RK4"), Ok(IntegratorConfig::Rk4));
    assert_eq!(
        IntegratorConfig::from_mode("x"),
        Err(SimError::UnknownIntegrator("x".to_string()))
    );
}

#[test]
fn shipped_scenarios_load_and_run() {
    for (file, name) in [("cloth.yaml", "cloth"), ("hair.yaml", "hair"), ("pendulum.yaml", "pendulum")] {
        let mut cfg = load_scenario_file(file);
        cfg.engine.t_end = 0.05;
        let mut scenario = Scenario::build_scenario(&cfg).unwrap();
        assert_eq!(scenario.scene.name(), name);

        let frames = scenario.run();
        assert!(frames >= 3);
        assert!(scenario.engine.simulated_s() >= 0.05 - 1e-12);
        for s in scenario.scene.summaries() {
            assert!(s.centroid.iter().all(|c| c.is_finite()));
        }
    }
}

#[test]
fn scenario_yaml_defaults_and_overrides() {
    let text = r#"
engine:
  integrator: "t"
  h: 0.002
body:
  kind: cloth
  width: 4
  height: 5
  breeze: true
"#;
    let cfg = ScenarioConfig::from_yaml(text).unwrap();
    assert_eq!(cfg.engine.integrator, IntegratorConfig::Trapezoidal);
    assert_eq!(cfg.engine.t_end, 1.0);
    assert_eq!(cfg.engine.fps, 60.0);

    let scenario = Scenario::build_scenario(&cfg).unwrap();
    match &scenario.scene {
        Scene::Cloth(cloth) => {
            assert_eq!((cloth.width(), cloth.height()), (4, 5));
            assert!(cloth.breeze_enabled());
        }
        _ => panic!("expected a cloth scene"),
    }
}

#[test]
fn scenario_yaml_rejects_bad_input() {
    let bad_step = "engine: { integrator: euler, h: -1.0 }\nbody: { kind: pendulum }\n";
    assert!(ScenarioConfig::from_yaml(bad_step).is_err());

    let bad_mode = "engine: { integrator: verlet, h: 0.01 }\nbody: { kind: pendulum }\n";
    assert!(ScenarioConfig::from_yaml(bad_mode).is_err());

    let bad_kind = "engine: { integrator: rk4, h: 0.01 }\nbody: { kind: rope }\n";
    assert!(ScenarioConfig::from_yaml(bad_kind).is_err());
}

#[test]
fn bad_frame_rate_is_reported_as_such() {
    let engine = EngineConfig {
        integrator: IntegratorConfig::Rk4,
        h: 0.01,
        t_end: 1.0,
        fps: 0.0,
    };
    assert_eq!(engine.validate(), Err(SimError::InvalidFrameRate(0.0)));

    let text = "engine: { integrator: rk4, h: 0.01, fps: -30.0 }\nbody: { kind: pendulum }\n";
    let err = ScenarioConfig::from_yaml(text).unwrap_err();
    assert!(err.to_string().contains("frame rate"), "{}", err);
}

#[test]
fn frame_callback_sees_every_frame() {
    let cfg = ScenarioConfig {
        engine: EngineConfig {
            integrator: IntegratorConfig::Euler,
            h: 0.001,
            t_end: 0.1,
            fps: 50.0,
        },
        body: BodyConfig::Hair(Default::default()),
    };
    let mut scenario = Scenario::build_scenario(&cfg).unwrap();
    let mut seen = 0;
    let mut steps = 0;
    let frames = scenario.run_with(|scene, n| {
        seen += 1;
        steps += n;
        if let Scene::Hair(group) = scene {
            assert_eq!(group.interpolated_points().len(), group.interpolated().len());
        }
    });
    assert_eq!(seen, frames);
    assert_eq!(steps as u64, scenario.engine.steps());
}
