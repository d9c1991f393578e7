use crate::grid::Cell;
use crate::math::Vec2;

/// Visual lifecycle phase, layered on top of the physical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Opacity climbing toward 1 after a spawn.
    FadingIn,
    Alive,
    /// Opacity falling toward 0 after overcrowding; physics is frozen.
    FadingOut,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub mass: f64,
    pub type_id: usize,
    /// Visual alpha in [0, 1]; renderers skip drawing at 0.
    pub opacity: f64,
    pub lifecycle: Lifecycle,
    /// Ticks spent in the current fade phase; opacity derives from this
    /// so fades complete in exactly the configured tick count instead of
    /// drifting on accumulated float error.
    pub fade_ticks: u32,
    /// Cached grid placement; `None` until first insertion. Outside an
    /// in-flight relocate this always matches the cell the grid stores
    /// the particle under.
    pub cell: Option<Cell>,
}

impl Particle {
    /// Fresh particle in `FadingIn` at the given point, fully transparent.
    pub fn spawn(position: Vec2, type_id: usize, mass: f64) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            acceleration: Vec2::zeros(),
            mass,
            type_id,
            opacity: 0.0,
            lifecycle: Lifecycle::FadingIn,
            fade_ticks: 0,
            cell: None,
        }
    }

    /// Switches the particle to `FadingOut` and restarts its fade counter.
    pub fn begin_fade_out(&mut self) {
        self.lifecycle = Lifecycle::FadingOut;
        self.fade_ticks = 0;
    }

    /// Advances the fade state by one tick. Returns `true` when a
    /// fading-out particle has fully vanished and should be replaced.
    pub fn advance_fade(&mut self, fade_in_ticks: u32, fade_out_ticks: u32) -> bool {
        match self.lifecycle {
            Lifecycle::FadingIn => {
                let span = fade_in_ticks.max(1);
                self.fade_ticks += 1;
                if self.fade_ticks >= span {
                    self.opacity = 1.0;
                    self.lifecycle = Lifecycle::Alive;
                } else {
                    self.opacity = f64::from(self.fade_ticks) / f64::from(span);
                }
                false
            }
            Lifecycle::Alive => false,
            Lifecycle::FadingOut => {
                let span = fade_out_ticks.max(1);
                self.fade_ticks += 1;
                self.opacity = (1.0 - f64::from(self.fade_ticks) / f64::from(span)).max(0.0);
                self.fade_ticks >= span
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_starts_transparent() {
        let p = Particle::spawn(Vec2::new(5.0, 5.0), 2, 1.0);
        assert_eq!(p.lifecycle, Lifecycle::FadingIn);
        assert_eq!(p.opacity, 0.0);
        assert!(p.cell.is_none());
    }

    #[test]
    fn test_fade_in_reaches_alive() {
        let mut p = Particle::spawn(Vec2::zeros(), 0, 1.0);
        for _ in 0..30 {
            assert!(!p.advance_fade(30, 6));
        }
        assert_eq!(p.lifecycle, Lifecycle::Alive);
        assert_eq!(p.opacity, 1.0);
    }

    #[test]
    fn test_fade_out_signals_removal() {
        let mut p = Particle::spawn(Vec2::zeros(), 0, 1.0);
        p.opacity = 1.0;
        p.begin_fade_out();

        for _ in 0..5 {
            assert!(!p.advance_fade(30, 6));
        }
        assert!(p.advance_fade(30, 6));
        assert_eq!(p.opacity, 0.0);
    }

    #[test]
    fn test_fade_spans_are_exact_tick_counts() {
        // Counter-driven fades must not pick up a stray extra tick from
        // float rounding, even for spans like 30 where 1/30 is inexact.
        let mut p = Particle::spawn(Vec2::zeros(), 0, 1.0);
        for tick in 1..=29 {
            p.advance_fade(30, 6);
            assert_eq!(p.lifecycle, Lifecycle::FadingIn, "still fading at tick {tick}");
            assert!(p.opacity < 1.0);
        }
        p.advance_fade(30, 6);
        assert_eq!(p.lifecycle, Lifecycle::Alive);
        assert_eq!(p.opacity, 1.0);

        p.begin_fade_out();
        let mut removed_at = 0;
        for tick in 1..=10 {
            if p.advance_fade(30, 6) {
                removed_at = tick;
                break;
            }
        }
        assert_eq!(removed_at, 6);
    }

    #[test]
    fn test_alive_fade_is_stable() {
        let mut p = Particle::spawn(Vec2::zeros(), 0, 1.0);
        p.opacity = 1.0;
        p.lifecycle = Lifecycle::Alive;
        assert!(!p.advance_fade(30, 6));
        assert_eq!(p.opacity, 1.0);
    }
}
