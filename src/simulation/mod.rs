//! Attractor simulation: parameter blending, point generation and rotation.
//!
//! An `AttractorInstance` owns everything that must change together when the
//! attractor type switches: the definition, the parameter blender and the
//! point buffer. `select` swaps all three before the next frame reads any.

mod blender;
mod buffer;
mod rotation;
mod simulator;

pub use blender::{modulated_target, ParameterBlender};
pub use buffer::PointCloudBuffer;
pub use rotation::ViewRotation;
pub use simulator::{recompute, recompute_points};

use crate::attractor::{self, AttractorDefinition, ParameterVector};
use crate::audio::AudioBands;
use crate::error::AttractorError;
use crate::params::{BlendConfig, RotationConfig};

/// What happened on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Buffer regenerated
    Updated,
    /// No valid definition selected; buffer left as-is
    Skipped,
}

/// One live attractor and its per-frame state
pub struct AttractorInstance {
    definition: Option<&'static AttractorDefinition>,
    base: ParameterVector,
    blender: ParameterBlender,
    buffer: PointCloudBuffer,
    rotation: ViewRotation,
    blend_config: BlendConfig,
    rotation_config: RotationConfig,
}

impl AttractorInstance {
    pub fn new(blend_config: BlendConfig, rotation_config: RotationConfig) -> Self {
        Self {
            definition: None,
            base: ParameterVector::new(),
            blender: ParameterBlender::default(),
            buffer: PointCloudBuffer::default(),
            rotation: ViewRotation::default(),
            blend_config,
            rotation_config,
        }
    }

    /// Switch to `key`, starting from `params` (or the defaults)
    ///
    /// Unknown keys deactivate the instance: later ticks are skipped until a
    /// valid key is selected.
    pub fn select(
        &mut self,
        key: &str,
        params: Option<&ParameterVector>,
    ) -> Result<&'static AttractorDefinition, AttractorError> {
        let def = match attractor::lookup(key) {
            Ok(def) => def,
            Err(err) => {
                log::warn!("{}", err);
                self.definition = None;
                return Err(err);
            }
        };

        let base = match params {
            Some(params) => def.reconcile(params),
            None => def.default_params(),
        };

        self.buffer.resize(def.iterations);
        self.blender.reset(base.clone());
        self.base = base;
        self.definition = Some(def);

        log::info!(
            "Attractor: {} ({} points, {} params)",
            def.name,
            def.iterations,
            def.params.len()
        );
        Ok(def)
    }

    /// Replace the base parameters; the blender eases toward them
    pub fn set_base_params(&mut self, params: &ParameterVector) {
        self.base = match self.definition {
            Some(def) => def.reconcile(params),
            None => params.clone(),
        };
    }

    /// Set a single base parameter, ignoring keys the definition lacks
    pub fn set_param(&mut self, key: &str, value: f64) -> bool {
        match self.base.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                log::debug!("Ignoring unknown parameter '{}'", key);
                false
            }
        }
    }

    /// Blend, regenerate and rotate for one frame
    pub fn tick(&mut self, audio_reactive: bool, bands: &AudioBands) -> FrameOutcome {
        let Some(def) = self.definition else {
            return FrameOutcome::Skipped;
        };

        if audio_reactive && !def.audio_mappings.is_empty() {
            let target = modulated_target(&self.base, def.audio_mappings, bands);
            self.blender.set_target(&target);
        } else {
            self.blender.set_target(&self.base);
        }

        let current = self.blender.tick(self.blend_config.rate(audio_reactive));
        let slots = def.slots(current);

        recompute(def, &slots, audio_reactive, bands, &mut self.buffer);
        self.rotation.advance(
            def.dimension,
            audio_reactive,
            bands.volume,
            &self.rotation_config,
        );

        FrameOutcome::Updated
    }

    pub fn definition(&self) -> Option<&'static AttractorDefinition> {
        self.definition
    }

    pub fn base_params(&self) -> &ParameterVector {
        &self.base
    }

    pub fn current_params(&self) -> &ParameterVector {
        self.blender.current()
    }

    pub fn buffer(&self) -> &PointCloudBuffer {
        &self.buffer
    }

    pub fn rotation(&self) -> &ViewRotation {
        &self.rotation
    }
}

impl Default for AttractorInstance {
    fn default() -> Self {
        Self::new(BlendConfig::default(), RotationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_skips_frames() {
        let mut instance = AttractorInstance::default();
        instance.select("clifford", None).unwrap();
        assert_eq!(
            instance.tick(false, &AudioBands::default()),
            FrameOutcome::Updated
        );

        assert!(instance.select("lorenz", None).is_err());
        assert!(instance.definition().is_none());
        assert_eq!(
            instance.tick(false, &AudioBands::default()),
            FrameOutcome::Skipped
        );
    }

    #[test]
    fn test_type_switch_resizes_before_next_frame() {
        let mut instance = AttractorInstance::default();
        instance.select("clifford", None).unwrap();
        instance.tick(false, &AudioBands::default());
        assert_eq!(instance.buffer().len(), 75_000);

        instance.select("halvorsen", None).unwrap();
        assert_eq!(instance.buffer().len(), 50_000);
        assert_eq!(instance.current_params().len(), 1);
        assert_eq!(instance.current_params()["a"], 1.4);

        instance.tick(false, &AudioBands::default());
        assert_eq!(instance.buffer().len(), 50_000);
    }

    #[test]
    fn test_param_edits_are_eased() {
        let mut instance = AttractorInstance::default();
        instance.select("halvorsen", None).unwrap();
        assert!(instance.set_param("a", 2.4));
        assert!(!instance.set_param("b", 1.0));

        instance.tick(false, &AudioBands::default());
        assert!((instance.current_params()["a"] - 1.65).abs() < 1e-12);
    }

    #[test]
    fn test_silence_leaves_params_at_base() {
        let mut instance = AttractorInstance::default();
        instance.select("clifford", None).unwrap();
        for _ in 0..10 {
            instance.tick(true, &AudioBands::default());
        }
        assert_eq!(instance.current_params(), instance.base_params());
    }

    #[test]
    fn test_bass_pulls_mapped_param() {
        let mut instance = AttractorInstance::default();
        instance.select("halvorsen", None).unwrap();
        let bands = AudioBands {
            bass: 1.0,
            ..AudioBands::default()
        };
        instance.tick(true, &bands);
        // target 1.8, reactive rate 0.5
        assert!((instance.current_params()["a"] - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_select_reconciles_params() {
        let mut instance = AttractorInstance::default();
        let mut params = ParameterVector::new();
        params.insert("a".to_string(), 1.7);
        params.insert("zeta".to_string(), 3.0);

        instance.select("clifford", Some(&params)).unwrap();
        assert_eq!(instance.base_params().len(), 4);
        assert_eq!(instance.base_params()["a"], 1.7);
        assert_eq!(instance.base_params()["b"], 1.6);
    }
}
