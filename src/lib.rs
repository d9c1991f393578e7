//! Particle-life simulation on a toroidal 2D plane.
//!
//! Thousands of point-mass particles interact through a type-indexed,
//! asymmetric force matrix. A uniform spatial grid sized to the
//! interaction cutoff keeps neighbor queries near-constant time, and a
//! fade-in / fade-out lifecycle recycles overcrowded particles while
//! conserving the population.
//!
//! Rendering and UI live outside this crate: renderers read the particle
//! slice, controls mutate the [`Simulation`] between ticks.

pub mod forces;
pub mod grid;
pub mod math;
pub mod particle;
pub mod pool;
pub mod settings;
pub mod simulation;

pub use forces::{force_response, ForceMatrix, MatrixSnapshot, SnapshotError};
pub use grid::SpatialGrid;
pub use math::Vec2;
pub use particle::{Lifecycle, Particle};
pub use pool::ScratchPool;
pub use settings::WorldSettings;
pub use simulation::Simulation;
