//! Headless rasterizer for both point clouds.
//!
//! Orthographic view down the z axis, additive blending, square splats.
//! The surface layer is drawn in attractor units so it overlays the cloud it
//! was sampled from.

use std::path::Path;

use glam::{EulerRot, Mat3, Vec3};
use image::{Rgb, RgbImage};

use crate::error::SnapshotError;
use crate::params::SnapshotConfig;
use crate::simulation::{PointCloudBuffer, ViewRotation};
use crate::surface::SurfaceParticleSet;

/// Attractor cloud as the renderer sees it this frame
pub struct CloudLayer<'a> {
    pub buffer: &'a PointCloudBuffer,
    pub rotation: &'a ViewRotation,
    pub point_size: f32,
    pub opacity: f32,
}

/// Projected surface particles as the renderer sees them this frame
pub struct SurfaceLayer<'a> {
    pub set: &'a SurfaceParticleSet,
    pub point_size: f32,
    pub opacity: f32,
}

/// Additive RGB accumulator
struct Canvas {
    width: u32,
    height: u32,
    extent: f32,
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    fn new(config: &SnapshotConfig) -> Self {
        Self {
            width: config.width.max(1),
            height: config.height.max(1),
            extent: config.extent.max(f32::EPSILON),
            pixels: vec![[0.0; 3]; (config.width.max(1) * config.height.max(1)) as usize],
        }
    }

    /// Splat width in pixels for a world-space point size
    fn splat_px(&self, size: f32) -> i64 {
        ((size / (2.0 * self.extent)) * self.width as f32).round().max(1.0) as i64
    }

    fn splat(&mut self, p: Vec3, size_px: i64, color: [f32; 3], opacity: f32) {
        let fx = (p.x / self.extent + 1.0) * 0.5 * self.width as f32;
        let fy = (1.0 - p.y / self.extent) * 0.5 * self.height as f32;
        // Diverged points (non-finite or far off canvas) are skipped
        let reach = size_px as f32;
        if !(fx > -reach && fx < self.width as f32 + reach)
            || !(fy > -reach && fy < self.height as f32 + reach)
        {
            return;
        }

        let cx = fx as i64;
        let cy = fy as i64;
        let half = size_px / 2;

        for y in (cy - half)..(cy - half + size_px) {
            if y < 0 || y >= self.height as i64 {
                continue;
            }
            for x in (cx - half)..(cx - half + size_px) {
                if x < 0 || x >= self.width as i64 {
                    continue;
                }
                let pixel = &mut self.pixels[(y * self.width as i64 + x) as usize];
                for (channel, c) in pixel.iter_mut().zip(color) {
                    *channel += c * opacity;
                }
            }
        }
    }

    fn into_image(self) -> RgbImage {
        let width = self.width;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.pixels[(y * width + x) as usize];
            let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb([quantize(r), quantize(g), quantize(b)])
        })
    }
}

/// Rasterize the cloud and (optionally) the surface particles
pub fn render(
    cloud: &CloudLayer<'_>,
    surface: Option<&SurfaceLayer<'_>>,
    config: &SnapshotConfig,
) -> RgbImage {
    let mut canvas = Canvas::new(config);

    let view = cloud.rotation.matrix();
    let size_px = canvas.splat_px(cloud.point_size);
    for (position, color) in cloud.buffer.positions().iter().zip(cloud.buffer.colors()) {
        let p = view * Vec3::from_array(*position);
        canvas.splat(p, size_px, *color, cloud.opacity);
    }

    if let Some(layer) = surface {
        let set = layer.set;
        let rotation =
            Mat3::from_euler(EulerRot::XYZ, set.rotation.x, set.rotation.y, set.rotation.z);
        let to_cloud_units = 4.0 / set.scale.max(f32::EPSILON);

        let particles = set.displaced.iter().zip(&set.colors).zip(&set.size_jitter);
        for ((position, color), jitter) in particles {
            let p = rotation * *position * to_cloud_units;
            let size_px = canvas.splat_px(layer.point_size * jitter);
            canvas.splat(p, size_px, *color, layer.opacity);
        }
    }

    canvas.into_image()
}

/// Write `image` as PNG, creating the parent directory if needed
pub fn save_png(image: &RgbImage, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image::save_buffer(
        path,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgb8,
    )?;
    log::debug!("Saved snapshot {}", path.display());
    Ok(())
}
