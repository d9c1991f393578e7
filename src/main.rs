use std::time::Instant;

use log::info;
use torus_life::{Lifecycle, Simulation, WorldSettings};

/// Headless demo loop: steps the simulation at wall-clock pace and logs
/// population stats. Pass a tick count to run a bounded session.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = WorldSettings::load()?;
    info!(
        "world {}x{}, {} particles, {} types",
        settings.width, settings.height, settings.initial_count, settings.type_count
    );

    let max_ticks: Option<u64> = std::env::args().nth(1).map(|s| s.parse()).transpose()?;
    let mut sim = Simulation::new(settings);

    let mut last_tick = Instant::now();
    let mut tick: u64 = 0;
    loop {
        let elapsed_ms = last_tick.elapsed().as_secs_f64() * 1000.0;
        last_tick = Instant::now();
        sim.step(elapsed_ms);
        tick += 1;

        if tick % 120 == 0 {
            let fading_out = sim
                .particles()
                .iter()
                .filter(|p| p.lifecycle == Lifecycle::FadingOut)
                .count();
            let avg_speed = sim
                .particles()
                .iter()
                .map(|p| p.velocity.norm())
                .sum::<f64>()
                / sim.particles().len().max(1) as f64;
            info!(
                "tick {}: {} particles, {} fading out, avg speed {:.3}",
                tick,
                sim.particles().len(),
                fading_out,
                avg_speed
            );
        }

        if max_ticks.is_some_and(|max| tick >= max) {
            info!("done after {} ticks", tick);
            return Ok(());
        }
    }
}
