//! Point cloud generation from a definition and a parameter set.

use crate::attractor::{AttractorDefinition, ParamSlots};
use crate::audio::AudioBands;

use super::buffer::PointCloudBuffer;

/// Regenerate every point of `buffer` from the definition's fixed start
///
/// The buffer is sized to `def.iterations` first (no-op when it already
/// matches). Deterministic for a given definition, slots and color inputs.
pub fn recompute(
    def: &AttractorDefinition,
    slots: &ParamSlots,
    audio_reactive: bool,
    bands: &AudioBands,
    buffer: &mut PointCloudBuffer,
) {
    recompute_points(def, slots, def.iterations, audio_reactive, bands, buffer);
}

/// Like `recompute`, but with an explicit point count
///
/// Used for the surface source cloud, which is sampled at a fixed count
/// independent of the definition.
pub fn recompute_points(
    def: &AttractorDefinition,
    slots: &ParamSlots,
    points: usize,
    audio_reactive: bool,
    bands: &AudioBands,
    buffer: &mut PointCloudBuffer,
) {
    buffer.resize(points);

    let scale = def.scale;
    let mut state = def.initial_state;
    let (positions, colors) = buffer.parts_mut();

    for (position, color) in positions.iter_mut().zip(colors.iter_mut()) {
        let step = def.step(state, slots);
        state = step.state;

        *position = (state * scale).as_vec3().to_array();
        *color = def.color(&step, audio_reactive, bands);
    }
}
