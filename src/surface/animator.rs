//! Per-frame breathing motion of projected particles.

use std::f32::consts::TAU;

use super::projector::SurfaceParticleSet;

/// Traveling pulse that pushes particles along their position vectors
#[derive(Debug, Clone, Default)]
pub struct SurfaceAnimator {
    phase: f32,
    pulse_speed: f32,
    volume_boost: f32,
}

impl SurfaceAnimator {
    pub fn new(pulse_speed: f32, volume_boost: f32) -> Self {
        Self {
            phase: 0.0,
            pulse_speed,
            volume_boost,
        }
    }

    /// Advance the pulse by `dt` seconds and displace every particle
    ///
    /// Formula: displaced = p + normalize(p) * (offset + boost*volume) *
    /// intensity * sin(2π * ((i/count + phase) mod 1))
    pub fn animate(
        &mut self,
        set: &mut SurfaceParticleSet,
        dt: f32,
        volume: f32,
        surface_offset: f32,
        intensity: f32,
    ) {
        self.phase += dt * self.pulse_speed;

        let count = set.positions.len();
        let amplitude = (surface_offset + volume * self.volume_boost) * intensity;

        for (i, (displaced, base)) in set.displaced.iter_mut().zip(&set.positions).enumerate() {
            let flow = (i as f32 / count as f32 + self.phase).rem_euclid(1.0);
            *displaced = *base + base.normalize_or_zero() * amplitude * (flow * TAU).sin();
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ring_set(count: usize) -> SurfaceParticleSet {
        let positions: Vec<Vec3> = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                Vec3::new(angle.cos(), angle.sin(), 0.0) * 2.0
            })
            .collect();
        SurfaceParticleSet {
            displaced: positions.clone(),
            colors: vec![[1.0; 3]; count],
            size_jitter: vec![1.0; count],
            positions,
            ..SurfaceParticleSet::default()
        }
    }

    #[test]
    fn test_displacement_is_radial_and_bounded() {
        let mut set = ring_set(16);
        let mut animator = SurfaceAnimator::new(10.0, 0.2);
        animator.animate(&mut set, 0.016, 1.0, 0.05, 1.0);

        for (base, moved) in set.positions.iter().zip(&set.displaced) {
            let delta = *moved - *base;
            assert!(delta.length() <= 0.25 + 1e-5);
            assert!(delta.cross(*base).length() < 1e-4);
        }
    }

    #[test]
    fn test_phase_offsets_particles() {
        let mut set = ring_set(4);
        let mut animator = SurfaceAnimator::new(10.0, 0.2);
        // dt 0 keeps phase at 0: particle i sits at flow i/4
        animator.animate(&mut set, 0.0, 0.0, 0.1, 1.0);

        let radial = |i: usize| set.displaced[i].length() - set.positions[i].length();
        assert!(radial(0).abs() < 1e-5);
        assert!((radial(1) - 0.1).abs() < 1e-5);
        assert!(radial(2).abs() < 1e-5);
        assert!((radial(3) + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_settle_restores_vertices() {
        let mut set = ring_set(8);
        let mut animator = SurfaceAnimator::new(10.0, 0.2);
        animator.animate(&mut set, 0.03, 0.5, 0.05, 2.0);
        assert_ne!(set.displaced, set.positions);
        set.settle();
        assert_eq!(set.displaced, set.positions);
        assert!((animator.phase() - 0.3).abs() < 1e-6);
    }
}
