/// Texel addressing for scaled and mirrored draws
///
/// Destination pixel centers are mapped into the source rectangle in
/// continuous texel coordinates; filters then pick texels clamped to the
/// source surface.

use glam::Vec4;
use framebuffer_translator::fbt::{Filter, TextureFormat};
use crate::cpu_image::CpuSubresource;

/// Source coordinate of the center of destination pixel `pixel`
pub(crate) fn source_coordinate(
    pixel: i32,
    dst_origin: i32,
    dst_extent: i32,
    src_origin: i32,
    src_extent: i32,
    flipped: bool,
) -> f64 {
    let mut t = (pixel as f64 + 0.5 - dst_origin as f64) / dst_extent as f64;
    if flipped {
        t = 1.0 - t;
    }
    src_origin as f64 + t * src_extent as f64
}

/// Texel containing `coordinate`, clamped to `[0, limit)`
pub(crate) fn nearest_index(coordinate: f64, limit: u32) -> u32 {
    (coordinate.floor() as i64).clamp(0, limit as i64 - 1) as u32
}

/// The two texels around `coordinate` and the weight of the second
pub(crate) fn linear_taps(coordinate: f64, limit: u32) -> (u32, u32, f32) {
    let centered = coordinate - 0.5;
    let base = centered.floor();
    let weight = (centered - base) as f32;
    let clamp = |value: f64| (value as i64).clamp(0, limit as i64 - 1) as u32;
    (clamp(base), clamp(base + 1.0), weight)
}

/// Filtered color of sample 0 at continuous coordinates (`u`, `v`)
pub(crate) fn sample_color(sub: &CpuSubresource, format: TextureFormat, u: f64, v: f64, filter: Filter) -> Vec4 {
    match filter {
        Filter::Nearest => {
            let x = nearest_index(u, sub.width);
            let y = nearest_index(v, sub.height);
            format.decode_color(sub.texel(x, y, 0))
        }
        Filter::Linear => {
            let (x0, x1, wx) = linear_taps(u, sub.width);
            let (y0, y1, wy) = linear_taps(v, sub.height);
            let texel = |x: u32, y: u32| format.decode_color(sub.texel(x, y, 0));
            let top = texel(x0, y0).lerp(texel(x1, y0), wx);
            let bottom = texel(x0, y1).lerp(texel(x1, y1), wx);
            top.lerp(bottom, wy)
        }
    }
}

#[cfg(test)]
#[path = "cpu_sampling_tests.rs"]
mod tests;
