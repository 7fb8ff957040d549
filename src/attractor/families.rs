//! Recurrences and coloring rules for each attractor family.
//!
//! Discrete maps return the next state directly; flows return the
//! derivative, which the definition integrates with forward Euler.

use glam::DVec3;

use super::color::angle_hue;
use super::ParamSlots;

/// Attractor families known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttractorKind {
    Clifford,
    PeterDeJong,
    Halvorsen,
    Aizawa,
    RabinovichFabrikant,
    SprottA,
    SprottB,
    SprottC,
}

impl AttractorKind {
    /// Next state of a discrete map (z is always 0)
    ///
    /// Only meaningful for the 2D families; flows fall through to `derivative`.
    pub fn map(self, s: DVec3, p: &ParamSlots) -> DVec3 {
        match self {
            // x' = sin(a·y) + c·cos(a·x); y' = sin(b·x) + d·cos(b·y)
            Self::Clifford => {
                let [a, b, c, d, ..] = p.0;
                DVec3::new(
                    (a * s.y).sin() + c * (a * s.x).cos(),
                    (b * s.x).sin() + d * (b * s.y).cos(),
                    0.0,
                )
            }
            // x' = sin(a·y) - cos(b·x); y' = sin(c·x) - cos(d·y)
            Self::PeterDeJong => {
                let [a, b, c, d, ..] = p.0;
                DVec3::new(
                    (a * s.y).sin() - (b * s.x).cos(),
                    (c * s.x).sin() - (d * s.y).cos(),
                    0.0,
                )
            }
            _ => self.derivative(s, p),
        }
    }

    /// Time derivative of a continuous flow
    pub fn derivative(self, s: DVec3, p: &ParamSlots) -> DVec3 {
        let DVec3 { x, y, z } = s;
        match self {
            Self::Halvorsen => {
                let a = p.0[0];
                DVec3::new(
                    -a * x - 4.0 * y - 4.0 * z - y * y,
                    -a * y - 4.0 * z - 4.0 * x - z * z,
                    -a * z - 4.0 * x - 4.0 * y - x * x,
                )
            }
            Self::Aizawa => {
                let [a, b, c, d, e, f] = p.0;
                DVec3::new(
                    (z - b) * x - d * y,
                    d * x + (z - b) * y,
                    c + a * z - (z * z * z) / 3.0 - (x * x + y * y) * (1.0 + e * z)
                        + f * z * x * x * x,
                )
            }
            Self::RabinovichFabrikant => {
                let [alpha, gamma, ..] = p.0;
                DVec3::new(
                    y * (z - 1.0 + x * x) + gamma * x,
                    x * (3.0 * z + 1.0 - x * x) + gamma * y,
                    -2.0 * z * (alpha + x * y),
                )
            }
            Self::SprottA => DVec3::new(y, -x + y * z, 1.0 - y * y),
            Self::SprottB => DVec3::new(y * z, x - y, 1.0 - x * y),
            Self::SprottC => DVec3::new(y * z, x - y, 1.0 - x * x),
            Self::Clifford | Self::PeterDeJong => self.map(s, p),
        }
    }

    /// Hue and lightness for a freshly computed state
    ///
    /// `velocity` is the derivative that produced the state (flows) or the
    /// displacement from the previous state (maps).
    pub fn hue_lightness(self, s: DVec3, velocity: DVec3) -> (f64, f64) {
        let planar = (s.x * s.x + s.y * s.y).sqrt();
        match self {
            Self::Clifford => (angle_hue(s.y, s.x), 0.35 + planar * 0.08),
            Self::PeterDeJong => (angle_hue(s.y, s.x), 0.35 + planar * 0.1),
            Self::Halvorsen => (angle_hue(s.z, s.x), 0.35 + s.length() * 0.02),
            Self::Aizawa => ((s.z * 0.1 + 0.5).rem_euclid(1.0), 0.35 + s.z.abs() * 0.03),
            Self::RabinovichFabrikant => {
                let speed = velocity.length();
                ((speed * 0.5).rem_euclid(1.0), 0.35 + speed * 0.05)
            }
            Self::SprottA => (angle_hue(s.y, s.x), 0.35 + s.z.abs() * 0.05),
            Self::SprottB => ((s.z * 0.2 + 0.6).rem_euclid(1.0), 0.35 + planar * 0.05),
            Self::SprottC => (angle_hue(s.z, s.y), 0.35 + s.x.abs() * 0.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(values: &[f64]) -> ParamSlots {
        let mut p = ParamSlots::default();
        p.0[..values.len()].copy_from_slice(values);
        p
    }

    #[test]
    fn test_clifford_map_from_origin() {
        let p = slots(&[-1.4, 1.6, 1.0, 0.7]);
        let next = AttractorKind::Clifford.map(DVec3::ZERO, &p);
        assert!((next.x - 1.0).abs() < 1e-12);
        assert!((next.y - 0.7).abs() < 1e-12);
        assert_eq!(next.z, 0.0);
    }

    #[test]
    fn test_peter_de_jong_map_from_origin() {
        // sin(0) - cos(0) = -1 on both axes
        let p = slots(&[1.4, -2.3, 2.4, -2.1]);
        let next = AttractorKind::PeterDeJong.map(DVec3::ZERO, &p);
        assert!((next.x + 1.0).abs() < 1e-12);
        assert!((next.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sprott_a_derivative() {
        let d =
            AttractorKind::SprottA.derivative(DVec3::new(0.0, 1.0, 0.0), &ParamSlots::default());
        assert_eq!(d, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_halvorsen_derivative() {
        let p = slots(&[1.4]);
        let d = AttractorKind::Halvorsen.derivative(DVec3::new(0.1, 0.0, 0.0), &p);
        assert!((d.x + 0.14).abs() < 1e-12);
        assert!((d.y + 0.4).abs() < 1e-12);
        assert!((d.z + 0.4 + 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_rabinovich_fabrikant_hue_uses_speed() {
        let (h_slow, l_slow) =
            AttractorKind::RabinovichFabrikant.hue_lightness(DVec3::ONE, DVec3::new(0.2, 0.0, 0.0));
        let (h_fast, l_fast) =
            AttractorKind::RabinovichFabrikant.hue_lightness(DVec3::ONE, DVec3::new(1.0, 0.0, 0.0));
        assert!((h_slow - 0.1).abs() < 1e-12);
        assert!((h_fast - 0.5).abs() < 1e-12);
        assert!(l_fast > l_slow);
    }

    #[test]
    fn test_aizawa_hue_wraps_negative_heights() {
        let (hue, _) =
            AttractorKind::Aizawa.hue_lightness(DVec3::new(0.0, 0.0, -10.0), DVec3::ZERO);
        assert!((0.0..1.0).contains(&hue));
        assert!((hue - 0.5).abs() < 1e-12);
    }
}
