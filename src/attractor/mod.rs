//! Attractor library: a fixed registry of dynamical-system definitions.
//!
//! Each definition bundles a recurrence, a fixed starting state, default
//! parameters, a coloring rule and the audio bands that nudge its
//! parameters. The registry is built at compile time and never mutated.

mod color;
mod families;

use std::collections::BTreeMap;

use glam::DVec3;

pub use color::{angle_hue, hsl_to_rgb};
pub use families::AttractorKind;

use crate::audio::{AudioBand, AudioBands};
use crate::error::AttractorError;

/// Parameter values keyed by name (UI-facing boundary type)
pub type ParameterVector = BTreeMap<String, f64>;

/// Most parameters any family declares
pub const MAX_PARAMS: usize = 6;

/// Parameters projected into fixed slots for the hot loop
///
/// Slot order follows the definition's declared parameter order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamSlots(pub [f64; MAX_PARAMS]);

/// Spatial dimension of the rendered pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Two,
    Three,
}

/// How a definition advances its state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integrator {
    /// Iterate the recurrence directly
    Map,
    /// Forward Euler with a fixed step
    Euler { dt: f64 },
}

/// A declared parameter and its default value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub default: f64,
}

/// Which band nudges which parameter, and by how much
///
/// Formula: target = base + bands[band] * intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioMapping {
    pub param: &'static str,
    pub band: AudioBand,
    pub intensity: f64,
}

/// Result of one step: the new state and its velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: DVec3,
    pub velocity: DVec3,
}

/// Named parameter set
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub values: &'static [(&'static str, f64)],
}

impl Preset {
    pub fn params(&self) -> ParameterVector {
        self.values
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }
}

/// Immutable description of one attractor
#[derive(Debug)]
pub struct AttractorDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: AttractorKind,
    pub dimension: Dimension,
    /// Points generated per recompute
    pub iterations: usize,
    pub integrator: Integrator,
    /// Multiplier from state space to render space
    pub scale: f64,
    pub initial_state: DVec3,
    pub params: &'static [ParamSpec],
    pub audio_mappings: &'static [AudioMapping],
    pub presets: &'static [Preset],
}

impl AttractorDefinition {
    /// Default parameter vector
    pub fn default_params(&self) -> ParameterVector {
        self.params
            .iter()
            .map(|spec| (spec.key.to_string(), spec.default))
            .collect()
    }

    /// Keep declared keys only, filling missing ones with defaults
    pub fn reconcile(&self, params: &ParameterVector) -> ParameterVector {
        self.params
            .iter()
            .map(|spec| {
                let value = params.get(spec.key).copied().unwrap_or(spec.default);
                (spec.key.to_string(), value)
            })
            .collect()
    }

    /// Project a parameter vector into hot-loop slots
    pub fn slots(&self, params: &ParameterVector) -> ParamSlots {
        let mut slots = ParamSlots::default();
        for (slot, spec) in slots.0.iter_mut().zip(self.params) {
            *slot = params.get(spec.key).copied().unwrap_or(spec.default);
        }
        slots
    }

    /// Advance the state by one iteration
    #[inline]
    pub fn step(&self, state: DVec3, slots: &ParamSlots) -> Step {
        match self.integrator {
            Integrator::Map => {
                let next = self.kind.map(state, slots);
                Step {
                    state: next,
                    velocity: next - state,
                }
            }
            Integrator::Euler { dt } => {
                let derivative = self.kind.derivative(state, slots);
                Step {
                    state: state + derivative * dt,
                    velocity: derivative,
                }
            }
        }
    }

    /// RGB color of a step
    ///
    /// Saturation is 0.8, or 0.7 + 0.3·volume while audio-reactive.
    #[inline]
    pub fn color(&self, step: &Step, audio_reactive: bool, bands: &AudioBands) -> [f32; 3] {
        let (hue, lightness) = self.kind.hue_lightness(step.state, step.velocity);
        let saturation = if audio_reactive {
            0.7 + bands.volume as f64 * 0.3
        } else {
            0.8
        };
        hsl_to_rgb(hue, saturation, lightness)
    }

    /// True if the definition has free parameters
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

const fn param(key: &'static str, default: f64) -> ParamSpec {
    ParamSpec { key, default }
}

const fn mapping(param: &'static str, band: AudioBand, intensity: f64) -> AudioMapping {
    AudioMapping {
        param,
        band,
        intensity,
    }
}

static CLIFFORD_PRESETS: [Preset; 4] = [
    Preset {
        name: "Classic",
        values: &[("a", -1.4), ("b", 1.6), ("c", 1.0), ("d", 0.7)],
    },
    Preset {
        name: "Spiral",
        values: &[("a", 1.7), ("b", 1.7), ("c", 0.6), ("d", 1.2)],
    },
    Preset {
        name: "Chaotic",
        values: &[("a", 1.5), ("b", -1.8), ("c", 1.6), ("d", 0.9)],
    },
    Preset {
        name: "Symmetric",
        values: &[("a", -1.9), ("b", -1.9), ("c", -0.8), ("d", -1.2)],
    },
];

static REGISTRY: [AttractorDefinition; 8] = [
    AttractorDefinition {
        key: "clifford",
        name: "Clifford",
        description: "Classic 2D strange attractor",
        kind: AttractorKind::Clifford,
        dimension: Dimension::Two,
        iterations: 75_000,
        integrator: Integrator::Map,
        scale: 0.5,
        initial_state: DVec3::ZERO,
        params: &[
            param("a", -1.4),
            param("b", 1.6),
            param("c", 1.0),
            param("d", 0.7),
        ],
        audio_mappings: &[
            mapping("a", AudioBand::Bass, 0.5),
            mapping("b", AudioBand::Mid, 0.5),
            mapping("c", AudioBand::High, 0.3),
            mapping("d", AudioBand::High, 0.3),
        ],
        presets: &CLIFFORD_PRESETS,
    },
    AttractorDefinition {
        key: "peter-de-jong",
        name: "Peter de Jong",
        description: "Beautiful 2D map attractor",
        kind: AttractorKind::PeterDeJong,
        dimension: Dimension::Two,
        iterations: 75_000,
        integrator: Integrator::Map,
        scale: 0.35,
        initial_state: DVec3::ZERO,
        params: &[
            param("a", 1.4),
            param("b", -2.3),
            param("c", 2.4),
            param("d", -2.1),
        ],
        audio_mappings: &[
            mapping("a", AudioBand::Bass, 0.4),
            mapping("b", AudioBand::Mid, 0.4),
            mapping("c", AudioBand::High, 0.3),
            mapping("d", AudioBand::Volume, 0.3),
        ],
        presets: &[],
    },
    AttractorDefinition {
        key: "halvorsen",
        name: "Halvorsen",
        description: "3D chaotic flow system",
        kind: AttractorKind::Halvorsen,
        dimension: Dimension::Three,
        iterations: 50_000,
        integrator: Integrator::Euler { dt: 0.005 },
        scale: 0.08,
        initial_state: DVec3::new(0.1, 0.0, 0.0),
        params: &[param("a", 1.4)],
        audio_mappings: &[mapping("a", AudioBand::Bass, 0.4)],
        presets: &[],
    },
    AttractorDefinition {
        key: "aizawa",
        name: "Aizawa",
        description: "Complex 3D attractor",
        kind: AttractorKind::Aizawa,
        dimension: Dimension::Three,
        iterations: 50_000,
        integrator: Integrator::Euler { dt: 0.01 },
        scale: 0.3,
        initial_state: DVec3::new(0.1, 0.0, 0.0),
        params: &[
            param("a", 0.95),
            param("b", 0.7),
            param("c", 0.6),
            param("d", 3.5),
            param("e", 0.25),
            param("f", 0.1),
        ],
        audio_mappings: &[
            mapping("a", AudioBand::Bass, 0.3),
            mapping("b", AudioBand::Mid, 0.3),
            mapping("d", AudioBand::High, 0.4),
            mapping("e", AudioBand::Volume, 0.2),
        ],
        presets: &[],
    },
    AttractorDefinition {
        key: "rabinovich-fabrikant",
        name: "Rabinovich-Fabrikant",
        description: "3D attractor from plasma physics",
        kind: AttractorKind::RabinovichFabrikant,
        dimension: Dimension::Three,
        iterations: 50_000,
        integrator: Integrator::Euler { dt: 0.01 },
        scale: 0.25,
        initial_state: DVec3::new(0.1, 0.1, 0.5),
        params: &[param("alpha", 0.14), param("gamma", 0.1)],
        audio_mappings: &[
            mapping("alpha", AudioBand::Bass, 0.15),
            mapping("gamma", AudioBand::Mid, 0.12),
        ],
        presets: &[],
    },
    AttractorDefinition {
        key: "sprott-a",
        name: "Sprott A",
        description: "Simple chaotic system (Case A)",
        kind: AttractorKind::SprottA,
        dimension: Dimension::Three,
        iterations: 50_000,
        integrator: Integrator::Euler { dt: 0.05 },
        scale: 0.3,
        initial_state: DVec3::new(0.0, 1.0, 0.0),
        params: &[],
        audio_mappings: &[],
        presets: &[],
    },
    AttractorDefinition {
        key: "sprott-b",
        name: "Sprott B",
        description: "Simple chaotic system (Case B)",
        kind: AttractorKind::SprottB,
        dimension: Dimension::Three,
        iterations: 50_000,
        integrator: Integrator::Euler { dt: 0.08 },
        scale: 0.35,
        initial_state: DVec3::new(0.1, 0.1, 0.0),
        params: &[],
        audio_mappings: &[],
        presets: &[],
    },
    AttractorDefinition {
        key: "sprott-c",
        name: "Sprott C",
        description: "Simple chaotic system (Case C)",
        kind: AttractorKind::SprottC,
        dimension: Dimension::Three,
        iterations: 50_000,
        integrator: Integrator::Euler { dt: 0.08 },
        scale: 0.35,
        initial_state: DVec3::new(0.1, 0.0, 0.5),
        params: &[],
        audio_mappings: &[],
        presets: &[],
    },
];

/// Look up a definition by registry key
pub fn lookup(key: &str) -> Result<&'static AttractorDefinition, AttractorError> {
    REGISTRY
        .iter()
        .find(|def| def.key == key)
        .ok_or_else(|| AttractorError::UnknownType(key.to_string()))
}

/// All registered keys, in registry order
pub fn keys() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|def| def.key)
}

/// All registered definitions
pub fn definitions() -> &'static [AttractorDefinition] {
    &REGISTRY
}

/// Named presets for a definition (empty if it has none)
pub fn presets(key: &str) -> Result<&'static [Preset], AttractorError> {
    lookup(key).map(|def| def.presets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keys_are_unique() {
        let mut all: Vec<_> = keys().collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(total, 8);
    }

    #[test]
    fn test_lookup_miss_is_an_error() {
        assert_eq!(
            lookup("lorenz").unwrap_err(),
            AttractorError::UnknownType("lorenz".to_string())
        );
        assert_eq!(lookup("aizawa").unwrap().name, "Aizawa");
    }

    #[test]
    fn test_mappings_reference_declared_params() {
        for def in definitions() {
            assert!(def.params.len() <= MAX_PARAMS);
            for m in def.audio_mappings {
                assert!(
                    def.params.iter().any(|p| p.key == m.param),
                    "{} maps undeclared param {}",
                    def.key,
                    m.param
                );
            }
        }
    }

    #[test]
    fn test_sprott_variants_are_parameter_free() {
        for key in ["sprott-a", "sprott-b", "sprott-c"] {
            let def = lookup(key).unwrap();
            assert!(!def.has_params());
            assert!(def.audio_mappings.is_empty());
        }
    }

    #[test]
    fn test_reconcile_drops_extras_and_fills_defaults() {
        let def = lookup("rabinovich-fabrikant").unwrap();
        let mut params = ParameterVector::new();
        params.insert("alpha".to_string(), 0.2);
        params.insert("a".to_string(), 9.0);

        let reconciled = def.reconcile(&params);
        assert_eq!(reconciled.len(), 2);
        assert_eq!(reconciled["alpha"], 0.2);
        assert_eq!(reconciled["gamma"], 0.1);
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        let def = lookup("aizawa").unwrap();
        let slots = def.slots(&def.default_params());
        assert_eq!(slots.0, [0.95, 0.7, 0.6, 3.5, 0.25, 0.1]);
    }

    #[test]
    fn test_sprott_a_first_step() {
        let def = lookup("sprott-a").unwrap();
        let step = def.step(def.initial_state, &ParamSlots::default());
        assert!((step.state - DVec3::new(0.05, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_saturation_follows_volume() {
        let def = lookup("clifford").unwrap();
        let step = def.step(def.initial_state, &def.slots(&def.default_params()));
        let quiet = def.color(&step, false, &AudioBands::default());
        let loud = def.color(
            &step,
            true,
            &AudioBands {
                volume: 1.0,
                ..AudioBands::default()
            },
        );
        let spread = |c: [f32; 3]| {
            c.iter().cloned().fold(f32::MIN, f32::max) - c.iter().cloned().fold(f32::MAX, f32::min)
        };
        assert!(spread(loud) > spread(quiet));
    }

    #[test]
    fn test_clifford_presets() {
        let presets = presets("clifford").unwrap();
        assert_eq!(presets.len(), 4);
        assert_eq!(presets[1].name, "Spiral");
        assert_eq!(presets[1].params()["d"], 1.2);
        assert!(super::presets("halvorsen").unwrap().is_empty());
    }
}
