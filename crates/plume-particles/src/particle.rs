//! Particle data: one simulation frame's worth of particle state

use plume_core::Vec3;

/// The per-frame particle streams of one buffer set.
///
/// Two sets exist for the life of a simulation; each frame one is read and the
/// other is written.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub spawn_times: Vec<f32>,
}

impl ParticleSet {
    /// An allocated set with every stream zeroed
    pub fn zeroed(count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            velocities: vec![Vec3::ZERO; count],
            spawn_times: vec![0.0; count],
        }
    }

    pub fn from_seed(seed: &ParticleSeed) -> Self {
        Self {
            positions: seed.positions.clone(),
            velocities: seed.velocities.clone(),
            spawn_times: seed.spawn_times.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Initial particle data produced by the initializer.
///
/// The first three streams fill set A. The `initial_*` streams are immutable
/// and shared by both sets; the update program reads them to respawn an
/// expired particle without sampling randomness on the GPU.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSeed {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub spawn_times: Vec<f32>,
    pub initial_velocities: Vec<Vec3>,
    pub initial_positions: Vec<Vec3>,
}

impl ParticleSeed {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn particle_count(&self) -> u32 {
        self.len() as u32
    }
}

/// Pack 3D vectors with a 16-byte stride for `array<vec4<f32>>` storage
pub fn pack_vec3s(values: &[Vec3]) -> Vec<[f32; 4]> {
    values.iter().map(Vec3::to_padded).collect()
}

/// Inverse of [`pack_vec3s`]
pub fn unpack_vec3s(values: &[[f32; 4]]) -> Vec<Vec3> {
    values.iter().copied().map(Vec3::from_padded).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_set_has_requested_shape() {
        let set = ParticleSet::zeroed(16);
        assert_eq!(set.len(), 16);
        assert_eq!(set.velocities.len(), 16);
        assert_eq!(set.spawn_times.len(), 16);
        assert!(set.positions.iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn packed_stride_is_sixteen_bytes() {
        let packed = pack_vec3s(&[Vec3::new(1.0, 2.0, 3.0), Vec3::UP]);
        assert_eq!(std::mem::size_of_val(packed.as_slice()), 32);
        assert_eq!(packed[0], [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(unpack_vec3s(&packed)[1], Vec3::UP);
    }
}
