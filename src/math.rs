use nalgebra::Vector2;

pub type Vec2 = Vector2<f64>;

/// Clamps a vector's magnitude to `max`, leaving shorter vectors untouched.
pub fn limit(v: Vec2, max: f64) -> Vec2 {
    let norm = v.norm();
    if norm > max && norm > 0.0 {
        v * (max / norm)
    } else {
        v
    }
}

/// Component-wise shortest displacement from `from` to `to` on a torus of
/// `width` x `height`: any component longer than half the world folds to
/// the wrapped-around direction instead.
pub fn wrapped_delta(from: Vec2, to: Vec2, width: f64, height: f64) -> Vec2 {
    let mut dx = to.x - from.x;
    let mut dy = to.y - from.y;

    if dx.abs() > width / 2.0 {
        dx -= dx.signum() * width;
    }
    if dy.abs() > height / 2.0 {
        dy -= dy.signum() * height;
    }

    Vec2::new(dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_limit_clamps_long_vectors() {
        let v = limit(Vec2::new(30.0, 40.0), 10.0);
        assert_relative_eq!(v.norm(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(v.x, 6.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_limit_keeps_short_vectors() {
        let v = limit(Vec2::new(1.0, 2.0), 10.0);
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, 2.0);
    }

    #[test]
    fn test_limit_zero_vector() {
        let v = limit(Vec2::zeros(), 10.0);
        assert_eq!(v, Vec2::zeros());
    }

    #[test]
    fn test_wrapped_delta_direct_path() {
        let d = wrapped_delta(Vec2::new(10.0, 10.0), Vec2::new(30.0, 40.0), 200.0, 200.0);
        assert_relative_eq!(d.x, 20.0);
        assert_relative_eq!(d.y, 30.0);
    }

    #[test]
    fn test_wrapped_delta_folds_across_edges() {
        // 190 -> 10 is 20 units through the right edge, not 180 back.
        let d = wrapped_delta(Vec2::new(190.0, 5.0), Vec2::new(10.0, 195.0), 200.0, 200.0);
        assert_relative_eq!(d.x, 20.0);
        assert_relative_eq!(d.y, -10.0);
    }
}
