//! End-to-end tick behavior: lifecycle, wrap, grid consistency, and the
//! persistence round trip through a running simulation.

use torus_life::{Lifecycle, Simulation, Vec2, WorldSettings};

fn settings_200() -> WorldSettings {
    WorldSettings {
        width: 200.0,
        height: 200.0,
        initial_count: 0,
        ..WorldSettings::default()
    }
}

#[test]
fn lone_particle_only_decays() {
    let mut sim = Simulation::new(settings_200());
    sim.spawn_at(0.0, 0.0);
    sim.particles_mut()[0].velocity = Vec2::new(4.0, 3.0);

    let half_life = sim.settings().friction_half_life;
    sim.step(half_life);

    let p = &sim.particles()[0];
    assert_eq!(p.acceleration, Vec2::zeros());
    assert!((p.velocity.x - 2.0).abs() < 1e-12);
    assert!((p.velocity.y - 1.5).abs() < 1e-12);
    assert!((0.0..=200.0).contains(&p.position.x));
    assert!((0.0..=200.0).contains(&p.position.y));
    assert!(sim.check_grid_consistency());
}

#[test]
fn position_wraps_to_opposite_edge() {
    let mut sim = Simulation::new(settings_200());
    sim.spawn_at(199.0, 100.0);
    sim.particles_mut()[0].velocity = Vec2::new(5.0, 0.0);
    sim.set_friction_half_life(0.0); // keep the velocity as-is

    sim.step(16.0);
    let p = &sim.particles()[0];
    assert_eq!(p.position.x, 0.0);
    assert!(sim.check_grid_consistency());
}

#[test]
fn overcrowded_particle_fades_out_and_is_replaced() {
    let mut sim = Simulation::new(WorldSettings {
        width: 600.0,
        height: 600.0,
        initial_count: 0,
        force_scale: 0.0,
        ..WorldSettings::default()
    });

    // Target in the middle of a 30-strong ring tighter than the crowd
    // radius (0.10 * 150 = 15). Ring members only see a handful of each
    // other, so the target alone crosses the threshold.
    sim.spawn_at(300.0, 300.0);
    for k in 0..30 {
        let angle = k as f64 / 30.0 * std::f64::consts::TAU;
        sim.spawn_at(300.0 + 13.0 * angle.cos(), 300.0 + 13.0 * angle.sin());
    }
    for p in sim.particles_mut() {
        p.lifecycle = Lifecycle::Alive;
        p.opacity = 1.0;
    }

    sim.step(16.0);
    assert_eq!(sim.particles()[0].lifecycle, Lifecycle::FadingOut);
    let fading = sim
        .particles()
        .iter()
        .filter(|p| p.lifecycle == Lifecycle::FadingOut)
        .count();
    assert_eq!(fading, 1, "only the ring center should be overcrowded");

    let fade_out_ticks = sim.settings().fade_out_ticks;
    for _ in 0..fade_out_ticks {
        sim.step(16.0);
    }

    // Exactly one replacement, fading in, population conserved.
    assert_eq!(sim.particles().len(), 31);
    assert_eq!(sim.particles()[0].lifecycle, Lifecycle::FadingIn);
    assert!(sim.check_grid_consistency());
}

#[test]
fn grid_stays_consistent_under_real_forces() {
    let mut sim = Simulation::new(WorldSettings {
        width: 600.0,
        height: 450.0,
        initial_count: 300,
        ..WorldSettings::default()
    });

    for _ in 0..60 {
        sim.step(16.0);
        assert!(sim.check_grid_consistency());
    }
    for p in sim.particles() {
        assert!((0.0..=600.0).contains(&p.position.x));
        assert!((0.0..=450.0).contains(&p.position.y));
    }
}

#[test]
fn matrix_round_trips_across_type_counts() {
    let small = Simulation::new(WorldSettings {
        initial_count: 0,
        type_count: 3,
        ..WorldSettings::default()
    });
    let snapshot = small.snapshot_matrix();

    let mut large = Simulation::new(WorldSettings {
        initial_count: 0,
        type_count: 5,
        ..WorldSettings::default()
    });
    large.load_matrix(&snapshot).unwrap();

    assert_eq!(large.matrix().size(), 5);
    for i in 0..5 {
        for j in 0..5 {
            let value = large.matrix().get(i, j);
            if i < 3 && j < 3 {
                assert_eq!(value, snapshot.coefficients[i][j]);
            } else {
                assert!((-10.0..=10.0).contains(&value));
            }
        }
    }
}

#[test]
fn spawn_admission_between_ticks() {
    let mut sim = Simulation::new(settings_200());
    sim.step(16.0);
    sim.spawn_at(50.0, 50.0);
    sim.spawn_at(60.0, 60.0);
    sim.step(16.0);

    assert_eq!(sim.particles().len(), 2);
    assert!(sim.check_grid_consistency());
    assert!(sim.particles()[0].opacity > 0.0);
}
