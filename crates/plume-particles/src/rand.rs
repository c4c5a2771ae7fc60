//! Lightweight xorshift32 PRNG, seedable so initial particle data is reproducible

use plume_core::Vec3;
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits fit the f32 mantissa exactly, so the result never rounds up to 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a unit direction inside a cone around `axis`.
    ///
    /// The polar angle is uniform in `[0, half_angle]` (radians) and the azimuth
    /// uniform in `[0, 2π)`. This clusters samples toward the axis, which is the
    /// spray look the demos are tuned for.
    pub fn cone_direction(&mut self, axis: Vec3, half_angle: f32) -> Vec3 {
        let theta = self.range(0.0, half_angle.max(0.0));
        let phi = self.range(0.0, TAU);

        let local = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
        rotate_to_basis(axis, local)
    }
}

/// Rotates `local` (expressed around +Z) so that +Z maps onto `forward`
fn rotate_to_basis(forward: Vec3, local: Vec3) -> Vec3 {
    let fwd = forward.normalized();
    let fwd = if fwd == Vec3::ZERO { Vec3::UP } else { fwd };
    let up = if fwd.y.abs() > 0.99 {
        Vec3::RIGHT
    } else {
        Vec3::UP
    };
    let right = up.cross(&fwd).normalized();
    let actual_up = fwd.cross(&right);

    right * local.x + actual_up * local.y + fwd * local.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn next_f32_never_reaches_one() {
        let mut rng = ParticleRng::new(7);
        for _ in 0..100_000 {
            assert!(rng.next_f32() < 1.0);
        }
    }

    #[test]
    fn zero_seed_is_not_stuck() {
        let mut rng = ParticleRng::new(0);
        let a = rng.next_f32();
        let b = rng.next_f32();
        assert_ne!(a, b);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ParticleRng::new(1234);
        let mut b = ParticleRng::new(1234);
        for _ in 0..64 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn cone_direction_zero_spread() {
        let mut rng = ParticleRng::new(99);
        let dir = rng.cone_direction(Vec3::UP, 0.0);
        assert!(dir.x.abs() < 1e-6);
        assert!((dir.y - 1.0).abs() < 1e-6);
        assert!(dir.z.abs() < 1e-6);
    }

    #[test]
    fn cone_direction_within_half_angle() {
        let mut rng = ParticleRng::new(5);
        let axes = [Vec3::UP, Vec3::RIGHT, Vec3::new(0.3, -0.4, 0.8)];
        for axis in axes {
            for _ in 0..500 {
                let half = std::f32::consts::FRAC_PI_6;
                let d = rng.cone_direction(axis, half);
                assert!((d.length() - 1.0).abs() < 1e-4);
                assert!(d.angle_between(&axis) <= half + 1e-3);
            }
        }
    }
}
