use std::f32::consts::{FRAC_PI_2, PI};

/// Wrap an angle into `(-π/2, π/2]`, i.e. treat it as an undirected line.
pub fn bound_half_pi(theta: f32) -> f32 {
    let mut t = theta.rem_euclid(PI); // [0, π)
    if t > FRAC_PI_2 {
        t -= PI;
    }
    if t <= -FRAC_PI_2 {
        t += PI;
    }
    t
}

/// Smallest distance between two undirected angles (period π), in `[0, π/2]`.
pub fn angle_dist_half_pi(a: f32, b: f32) -> f32 {
    bound_half_pi(a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn bounds_into_half_open_interval() {
        assert_relative_eq!(bound_half_pi(0.3), 0.3);
        assert_relative_eq!(bound_half_pi(0.3 + PI), 0.3, epsilon = 1e-6);
        assert_relative_eq!(bound_half_pi(-0.3 - 2.0 * PI), -0.3, epsilon = 1e-5);
        assert_relative_eq!(bound_half_pi(3.0 * FRAC_PI_4), -FRAC_PI_4, epsilon = 1e-6);
        for k in -20..20 {
            let t = bound_half_pi(k as f32 * 0.37);
            assert!(t > -FRAC_PI_2 && t <= FRAC_PI_2);
        }
    }

    #[test]
    fn distance_wraps_at_pi() {
        assert_relative_eq!(angle_dist_half_pi(1.5, -1.5), PI - 3.0, epsilon = 1e-6);
        assert_relative_eq!(angle_dist_half_pi(0.2, 0.1), 0.1, epsilon = 1e-6);
    }
}
