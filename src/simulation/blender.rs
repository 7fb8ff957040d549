//! Exponential smoothing of parameter vectors.

use crate::attractor::{AudioMapping, ParameterVector};
use crate::audio::AudioBands;

/// Current and target parameters for one attractor instance
///
/// Each tick moves every current value a fixed fraction of the way toward
/// its target. Keys only in the target are adopted as-is; keys missing from
/// the target are dropped.
#[derive(Debug, Clone, Default)]
pub struct ParameterBlender {
    current: ParameterVector,
    target: ParameterVector,
}

impl ParameterBlender {
    pub fn new(initial: ParameterVector) -> Self {
        Self {
            target: initial.clone(),
            current: initial,
        }
    }

    /// Jump straight to `params` (attractor type switches)
    pub fn reset(&mut self, params: ParameterVector) {
        self.target.clone_from(&params);
        self.current = params;
    }

    pub fn set_target(&mut self, target: &ParameterVector) {
        self.target.clone_from(target);
    }

    /// Advance current toward target by `rate` (0 = hold, 1 = snap)
    pub fn tick(&mut self, rate: f64) -> &ParameterVector {
        for (key, &target) in &self.target {
            match self.current.get_mut(key) {
                Some(current) => *current = (1.0 - rate) * *current + rate * target,
                None => {
                    self.current.insert(key.clone(), target);
                }
            }
        }

        let target = &self.target;
        self.current.retain(|key, _| target.contains_key(key));

        &self.current
    }

    pub fn current(&self) -> &ParameterVector {
        &self.current
    }

    pub fn target(&self) -> &ParameterVector {
        &self.target
    }
}

/// Base parameters nudged by the mapped audio bands
///
/// Formula: target[k] = base[k] + bands[band] * intensity. Mappings for keys
/// absent from `base` are ignored.
pub fn modulated_target(
    base: &ParameterVector,
    mappings: &[AudioMapping],
    bands: &AudioBands,
) -> ParameterVector {
    let mut target = base.clone();
    for mapping in mappings {
        if let (Some(slot), Some(&value)) = (target.get_mut(mapping.param), base.get(mapping.param))
        {
            *slot = value + bands.get(mapping.band) as f64 * mapping.intensity;
        }
    }
    target
}
