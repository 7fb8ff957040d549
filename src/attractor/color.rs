//! HSL color helpers shared by all coloring rules.

/// Convert HSL to linear RGB in [0, 1]
///
/// Hue wraps into [0, 1); saturation and lightness are clamped.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l as f32; 3];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0) as f32,
        hue_to_channel(p, q, h) as f32,
        hue_to_channel(p, q, h - 1.0 / 3.0) as f32,
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Hue from a polar angle, mapped from [-π, π] onto [0, 1]
pub fn angle_hue(y: f64, x: f64) -> f64 {
    (y.atan2(x) / std::f64::consts::PI + 1.0) * 0.5
}
