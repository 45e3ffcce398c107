use super::surface::Color;

/// HSL-with-alpha to straight-alpha RGBA. Hue in degrees (wraps outside
/// 0-360), saturation and lightness in percent. All of the mode color
/// formulas speak hue/lightness, so this is the one conversion the raster
/// seam needs.
pub fn hsla(hue_deg: f32, saturation_pct: f32, lightness_pct: f32, alpha: f32) -> Color {
    let h = hue_deg.rem_euclid(360.0) / 360.0;
    let s = (saturation_pct / 100.0).clamp(0.0, 1.0);
    let l = (lightness_pct / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, alpha);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Color::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        alpha,
    )
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
