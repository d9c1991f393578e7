use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// World parameters read at the start of every tick and mutable between
/// ticks through the simulation's control surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    /// World width in world units; positions wrap at this bound.
    pub width: f64,
    /// World height in world units.
    pub height: f64,
    /// Hard cap on particle speed per tick.
    pub max_speed: f64,
    /// Interaction cutoff radius; also the grid cell size.
    pub distance_unit: f64,
    /// Shape parameter of the force curve, in (0, 1).
    pub beta: f64,
    /// Scale applied to every pairwise force.
    pub force_scale: f64,
    /// Multiplier mapping a raw slider value onto `force_scale`.
    pub force_scale_multiplier: f64,
    /// Exponential velocity-decay half-life in milliseconds; zero or
    /// negative disables decay entirely.
    pub friction_half_life: f64,
    pub particle_mass: f64,
    /// Visual radius handed to renderers; the core never reads it.
    pub particle_size: f64,
    /// Ticks for a fresh particle to reach full opacity.
    pub fade_in_ticks: u32,
    /// Ticks for an overcrowded particle to vanish.
    pub fade_out_ticks: u32,
    /// Crowd radius as a fraction of `distance_unit`.
    pub overcrowding_distance_factor: f64,
    /// Neighbor count within the crowd radius that triggers fade-out.
    pub overcrowding_threshold: usize,
    pub initial_count: usize,
    pub type_count: usize,
    pub min_types: usize,
    pub max_types: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            max_speed: 10.0,
            distance_unit: 150.0,
            beta: 0.3,
            force_scale: 0.00005,
            force_scale_multiplier: 0.00001,
            friction_half_life: 200.0,
            particle_mass: 1.0,
            particle_size: 5.0,
            fade_in_ticks: 30,
            fade_out_ticks: 6,
            overcrowding_distance_factor: 0.10,
            overcrowding_threshold: 30,
            initial_count: 1200,
            type_count: 5,
            min_types: 2,
            max_types: 10,
        }
    }
}

impl WorldSettings {
    const SETTINGS_FILE: &'static str = "world.toml";

    /// Loads settings from `world.toml`, or returns defaults if the file
    /// doesn't exist. A malformed file is an error, not a silent default.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(Path::new(Self::SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let settings: WorldSettings = toml::from_str(&contents)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }
}
