//! Per-tick simulation orchestration.
//!
//! One `Simulation` value owns the whole engine state: settings, force
//! matrix, particle store, spatial grid, and scratch pool. A tick is a
//! single synchronous pass with no suspension points; external controls
//! (sliders, type edits, matrix loads) must be applied between ticks.

use log::warn;
use rand::Rng;

use crate::forces::{force_response, ForceMatrix, MatrixSnapshot, SnapshotError};
use crate::grid::{Cell, SpatialGrid};
use crate::math::{limit, wrapped_delta, Vec2};
use crate::particle::{Lifecycle, Particle};
use crate::pool::ScratchPool;
use crate::settings::WorldSettings;

pub struct Simulation {
    settings: WorldSettings,
    matrix: ForceMatrix,
    /// Particles live in stable slots; the grid stores slot indices and a
    /// death respawns its replacement in the same slot.
    particles: Vec<Particle>,
    grid: SpatialGrid,
    pool: ScratchPool,
    neighbor_buf: Vec<usize>,
}

impl Simulation {
    pub fn new(settings: WorldSettings) -> Self {
        let mut rng = rand::thread_rng();
        let matrix = ForceMatrix::random(settings.type_count, &mut rng);
        let grid = SpatialGrid::new(settings.width, settings.height, settings.distance_unit);

        let mut sim = Self {
            settings,
            matrix,
            particles: Vec::new(),
            grid,
            pool: ScratchPool::default(),
            neighbor_buf: Vec::new(),
        };
        for _ in 0..sim.settings.initial_count {
            sim.spawn_random();
        }
        sim
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn matrix(&self) -> &ForceMatrix {
        &self.matrix
    }

    /// Read access for renderers: position, type, opacity per particle.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable particle access for collaborators that perturb velocities
    /// (e.g. a cursor drag tool). A moved position is re-indexed on the
    /// next tick through the normal relocate path.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    // ------------------------------------------------------------------
    // Admission
    // ------------------------------------------------------------------

    /// Spawns one particle at a caller-supplied point, fading in.
    pub fn spawn_at(&mut self, x: f64, y: f64) {
        let mut rng = rand::thread_rng();
        let type_id = rng.gen_range(0..self.matrix.size());
        let mut particle = Particle::spawn(Vec2::new(x, y), type_id, self.settings.particle_mass);

        let slot = self.particles.len();
        particle.cell = Some(self.grid.insert(slot, x, y));
        self.particles.push(particle);
    }

    /// Spawns one particle at a uniform-random point.
    pub fn spawn_random(&mut self) {
        let (x, y) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0.0..self.settings.width),
                rng.gen_range(0.0..self.settings.height),
            )
        };
        self.spawn_at(x, y);
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Runs one full tick: force accumulation, integration, toroidal
    /// wrap, grid relocation, overcrowding detection, and lifecycle
    /// advance with respawn-on-death. `elapsed_ms` is the wall time since
    /// the previous tick and only shapes the friction decay.
    pub fn step(&mut self, elapsed_ms: f64) {
        let friction = self.friction(elapsed_ms);
        let crowd_radius =
            self.settings.overcrowding_distance_factor * self.settings.distance_unit;
        let mut neighbors = std::mem::take(&mut self.neighbor_buf);

        // Repair every stale type up front: a particle is read as a
        // neighbor before its own slot comes up, so the matrix may see
        // its type before a per-slot repair would.
        for slot in 0..self.particles.len() {
            self.repair_type(slot);
        }

        for slot in 0..self.particles.len() {
            if self.particles[slot].lifecycle == Lifecycle::FadingOut {
                continue;
            }
            let cell = self.ensure_indexed(slot);

            let crowd = self.accumulate_forces(slot, cell, &mut neighbors, crowd_radius);
            self.integrate(slot, friction);

            let (x, y, cell) = {
                let p = &self.particles[slot];
                (p.position.x, p.position.y, p.cell)
            };
            self.particles[slot].cell = Some(self.grid.relocate(slot, cell, x, y));

            if crowd >= self.settings.overcrowding_threshold {
                self.particles[slot].begin_fade_out();
            }
        }

        self.advance_lifecycles();
        self.neighbor_buf = neighbors;
    }

    /// Frame-duration-aware exponential velocity decay. A non-positive
    /// half-life means no decay rather than a division blowup.
    pub fn friction(&self, elapsed_ms: f64) -> f64 {
        if self.settings.friction_half_life <= 0.0 {
            1.0
        } else {
            0.5f64.powf(elapsed_ms / self.settings.friction_half_life)
        }
    }

    /// Remaps an out-of-range type to a valid random one instead of
    /// letting a stale index reach the matrix.
    fn repair_type(&mut self, slot: usize) {
        if self.particles[slot].type_id >= self.matrix.size() {
            let mut rng = rand::thread_rng();
            let fixed = rng.gen_range(0..self.matrix.size());
            warn!(
                "particle {} had stale type {}, remapped to {}",
                slot, self.particles[slot].type_id, fixed
            );
            self.particles[slot].type_id = fixed;
        }
    }

    /// A missing cell cache means the particle was never inserted (or the
    /// grid was rebuilt under it); treat it as needing insertion.
    fn ensure_indexed(&mut self, slot: usize) -> Cell {
        if let Some(cell) = self.particles[slot].cell {
            return cell;
        }
        let (x, y) = {
            let p = &self.particles[slot];
            (p.position.x, p.position.y)
        };
        let cell = self.grid.insert(slot, x, y);
        self.particles[slot].cell = Some(cell);
        cell
    }

    /// Zeroes the slot's acceleration, then folds in the response to every
    /// grid neighbor. Returns how many neighbors sat inside the crowd
    /// radius.
    fn accumulate_forces(
        &mut self,
        slot: usize,
        cell: Cell,
        neighbors: &mut Vec<usize>,
        crowd_radius: f64,
    ) -> usize {
        let du = self.settings.distance_unit;
        let beta = self.settings.beta;
        let force_scale = self.settings.force_scale;
        let (width, height) = (self.settings.width, self.settings.height);

        let (position, type_id, mass) = {
            let p = &self.particles[slot];
            (p.position, p.type_id, p.mass)
        };
        self.grid.neighbors(slot, cell, neighbors);

        let mut acceleration = Vec2::zeros();
        let mut crowd = 0usize;

        for &other in neighbors.iter() {
            let other_p = &self.particles[other];

            // Pooled scratch vector, held only for this one pair.
            let mut delta = self.pool.acquire();
            delta.copy_from(&wrapped_delta(
                position,
                other_p.position,
                width,
                height,
            ));
            let distance = delta.norm();

            if distance < crowd_radius {
                crowd += 1;
            }
            if distance > 0.0 && distance < du {
                let coefficient = self.matrix.get(type_id, other_p.type_id) / 10.0;
                let strength = force_response(distance / du, coefficient, beta) * force_scale;
                acceleration += delta * (strength * du / distance) / mass;
            }
            self.pool.release(delta);
        }

        self.particles[slot].acceleration = acceleration;
        crowd
    }

    /// Friction, acceleration, speed clamp, position update, and the hard
    /// jump-to-opposite-edge wrap at the world bounds.
    fn integrate(&mut self, slot: usize, friction: f64) {
        let (max_speed, width, height) = (
            self.settings.max_speed,
            self.settings.width,
            self.settings.height,
        );
        let p = &mut self.particles[slot];

        p.velocity *= friction;
        p.velocity += p.acceleration;
        p.velocity = limit(p.velocity, max_speed);
        p.position += p.velocity;

        if p.position.x > width {
            p.position.x = 0.0;
        } else if p.position.x < 0.0 {
            p.position.x = width;
        }
        if p.position.y > height {
            p.position.y = 0.0;
        } else if p.position.y < 0.0 {
            p.position.y = height;
        }
    }

    /// Advances fades and replaces each fully vanished particle with a
    /// fresh one in the same slot, conserving the population.
    fn advance_lifecycles(&mut self) {
        let (fade_in, fade_out) = (self.settings.fade_in_ticks, self.settings.fade_out_ticks);

        for slot in 0..self.particles.len() {
            if self.particles[slot].advance_fade(fade_in, fade_out) {
                self.grid.remove(slot, self.particles[slot].cell);
                self.respawn_slot(slot);
            }
        }
    }

    fn respawn_slot(&mut self, slot: usize) {
        let (x, y, type_id) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0.0..self.settings.width),
                rng.gen_range(0.0..self.settings.height),
                rng.gen_range(0..self.matrix.size()),
            )
        };
        let mut replacement =
            Particle::spawn(Vec2::new(x, y), type_id, self.settings.particle_mass);
        replacement.cell = Some(self.grid.insert(slot, x, y));
        self.particles[slot] = replacement;
    }

    // ------------------------------------------------------------------
    // Control surface (applied between ticks)
    // ------------------------------------------------------------------

    /// Appends a particle type: the matrix grows by one random row and
    /// column. No-op at `max_types`.
    pub fn add_type(&mut self) {
        if self.matrix.size() >= self.settings.max_types {
            return;
        }
        let mut rng = rand::thread_rng();
        self.matrix.grow(&mut rng);
        self.settings.type_count = self.matrix.size();
    }

    /// Removes the last particle type and reassigns any particle of that
    /// type to a random remaining one. No-op at `min_types`.
    pub fn remove_type(&mut self) {
        if self.matrix.size() <= self.settings.min_types {
            return;
        }
        self.matrix.shrink();
        self.settings.type_count = self.matrix.size();
        self.reindex_types();
    }

    fn reindex_types(&mut self) {
        let size = self.matrix.size();
        let mut rng = rand::thread_rng();
        for p in &mut self.particles {
            if p.type_id >= size {
                p.type_id = rng.gen_range(0..size);
            }
        }
    }

    /// Direct edit of one interaction coefficient.
    pub fn set_coefficient(&mut self, i: usize, j: usize, value: f64) {
        if i < self.matrix.size() && j < self.matrix.size() {
            self.matrix.set(i, j, value);
        } else {
            warn!(
                "ignoring coefficient edit at ({}, {}) beyond {} types",
                i,
                j,
                self.matrix.size()
            );
        }
    }

    /// Slider derivation: the raw control value times the configured
    /// multiplier becomes the effective force scale.
    pub fn set_force_scale_raw(&mut self, raw: f64) {
        self.settings.force_scale = raw * self.settings.force_scale_multiplier;
    }

    pub fn set_friction_half_life(&mut self, half_life_ms: f64) {
        self.settings.friction_half_life = half_life_ms;
    }

    /// Opaque persistence snapshot of the current force matrix.
    pub fn snapshot_matrix(&self) -> MatrixSnapshot {
        self.matrix.snapshot()
    }

    /// Loads a saved matrix, resize-and-merging it onto the current type
    /// count: overlapping entries are copied positionally, the rest are
    /// freshly randomized. A corrupt snapshot is rejected and the running
    /// matrix is left untouched.
    pub fn load_matrix(&mut self, snapshot: &MatrixSnapshot) -> Result<(), SnapshotError> {
        let mut rng = rand::thread_rng();
        self.matrix = ForceMatrix::from_snapshot(snapshot, self.settings.type_count, &mut rng)?;
        Ok(())
    }

    /// Resizes the world; the grid layout is invalidated so it is rebuilt
    /// in full and every particle re-inserted.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.settings.width = width;
        self.settings.height = height;
        self.rebuild_grid();
    }

    /// Changes the interaction cutoff (and with it the grid cell size).
    pub fn set_distance_unit(&mut self, distance_unit: f64) {
        self.settings.distance_unit = distance_unit;
        self.rebuild_grid();
    }

    fn rebuild_grid(&mut self) {
        self.grid.rebuild(
            self.settings.width,
            self.settings.height,
            self.settings.distance_unit,
        );
        for slot in 0..self.particles.len() {
            let (x, y) = {
                let p = &self.particles[slot];
                (p.position.x, p.position.y)
            };
            self.particles[slot].cell = Some(self.grid.insert(slot, x, y));
        }
    }

    /// Grid/particle consistency check: every particle's cached cell must
    /// match the cell the grid derives from its position, and the grid's
    /// bucket for that cell must actually hold the slot.
    pub fn check_grid_consistency(&self) -> bool {
        self.particles.iter().enumerate().all(|(slot, p)| match p.cell {
            Some(cell) => {
                cell == self.grid.cell_for(p.position.x, p.position.y)
                    && self.grid.contains(slot, cell)
            }
            None => false,
        })
    }
}
