/// Texture formats, texel codecs and storage substitution

use glam::Vec4;
use crate::features::{Feature, FeatureRegistry};
use crate::framebuffer::{ColorMask, Planes};

/// Logical or storage format of an image
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    R8G8B8_UNORM,
    R5G6B5_UNORM,
    R8_UNORM,
    R8G8_UNORM,
    R32G32B32A32_SFLOAT,
    D16_UNORM,
    D24_UNORM_S8_UINT,
    D32_FLOAT,
    D32_FLOAT_S8_UINT,
}

impl TextureFormat {
    /// Size of one texel of a color format in storage
    ///
    /// Depth formats report their nominal packed size.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::R8G8_UNORM | TextureFormat::R5G6B5_UNORM | TextureFormat::D16_UNORM => 2,
            TextureFormat::R8G8B8_UNORM => 3,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::D24_UNORM_S8_UINT
            | TextureFormat::D32_FLOAT => 4,
            TextureFormat::D32_FLOAT_S8_UINT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }

    pub fn is_color(self) -> bool {
        self.planes() == Planes::COLOR
    }

    pub fn has_depth(self) -> bool {
        self.planes().contains(Planes::DEPTH)
    }

    pub fn has_stencil(self) -> bool {
        self.planes().contains(Planes::STENCIL)
    }

    pub fn has_alpha(self) -> bool {
        self.channel_mask().contains(ColorMask::A)
    }

    pub fn is_srgb(self) -> bool {
        self == TextureFormat::R8G8B8A8_SRGB
    }

    /// Planes an image of this format holds
    pub fn planes(self) -> Planes {
        match self {
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT => Planes::DEPTH,
            TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8_UINT => Planes::DEPTH_STENCIL,
            _ => Planes::COLOR,
        }
    }

    /// Color channels the format stores
    pub fn channel_mask(self) -> ColorMask {
        match self {
            TextureFormat::R8_UNORM => ColorMask::R,
            TextureFormat::R8G8_UNORM => ColorMask::R | ColorMask::G,
            TextureFormat::R8G8B8_UNORM | TextureFormat::R5G6B5_UNORM => ColorMask::RGB,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::R32G32B32A32_SFLOAT => ColorMask::ALL,
            _ => ColorMask::empty(),
        }
    }

    /// Format a backend stores this logical format in
    pub fn storage_format(self, features: &FeatureRegistry) -> TextureFormat {
        match self {
            TextureFormat::R8G8B8_UNORM => TextureFormat::R8G8B8A8_UNORM,
            TextureFormat::R5G6B5_UNORM
                if features.is_feature_enabled(Feature::PromotePackedFormatsTo8BitPerChannel) =>
            {
                TextureFormat::R8G8B8A8_UNORM
            }
            TextureFormat::D24_UNORM_S8_UINT
                if features.is_feature_enabled(Feature::ForceD24S8AsUnsupported) =>
            {
                TextureFormat::D32_FLOAT_S8_UINT
            }
            other => other,
        }
    }

    /// Decode one color texel to RGBA
    ///
    /// Missing channels read as 0 (color) or 1 (alpha). sRGB values are
    /// returned encoded. Depth formats decode to zero.
    pub fn decode_color(self, texel: &[u8]) -> Vec4 {
        let unorm = |byte: u8| byte as f32 / 255.0;
        match self {
            TextureFormat::R8G8B8A8_UNORM | TextureFormat::R8G8B8A8_SRGB => {
                Vec4::new(unorm(texel[0]), unorm(texel[1]), unorm(texel[2]), unorm(texel[3]))
            }
            TextureFormat::B8G8R8A8_UNORM => {
                Vec4::new(unorm(texel[2]), unorm(texel[1]), unorm(texel[0]), unorm(texel[3]))
            }
            TextureFormat::R8G8B8_UNORM => Vec4::new(unorm(texel[0]), unorm(texel[1]), unorm(texel[2]), 1.0),
            TextureFormat::R8G8_UNORM => Vec4::new(unorm(texel[0]), unorm(texel[1]), 0.0, 1.0),
            TextureFormat::R8_UNORM => Vec4::new(unorm(texel[0]), 0.0, 0.0, 1.0),
            TextureFormat::R5G6B5_UNORM => {
                let packed = u16::from_le_bytes([texel[0], texel[1]]);
                Vec4::new(
                    ((packed >> 11) & 0x1F) as f32 / 31.0,
                    ((packed >> 5) & 0x3F) as f32 / 63.0,
                    (packed & 0x1F) as f32 / 31.0,
                    1.0,
                )
            }
            TextureFormat::R32G32B32A32_SFLOAT => {
                Vec4::from_array(bytemuck::pod_read_unaligned::<[f32; 4]>(&texel[..16]))
            }
            _ => Vec4::ZERO,
        }
    }

    /// Encode an RGBA value into one color texel
    ///
    /// Unsigned-normalized channels are clamped to `[0, 1]`. Depth formats
    /// are left untouched.
    pub fn encode_color(self, color: Vec4, texel: &mut [u8]) {
        let unorm = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        match self {
            TextureFormat::R8G8B8A8_UNORM | TextureFormat::R8G8B8A8_SRGB => {
                texel[..4].copy_from_slice(&[unorm(color.x), unorm(color.y), unorm(color.z), unorm(color.w)]);
            }
            TextureFormat::B8G8R8A8_UNORM => {
                texel[..4].copy_from_slice(&[unorm(color.z), unorm(color.y), unorm(color.x), unorm(color.w)]);
            }
            TextureFormat::R8G8B8_UNORM => {
                texel[..3].copy_from_slice(&[unorm(color.x), unorm(color.y), unorm(color.z)]);
            }
            TextureFormat::R8G8_UNORM => {
                texel[..2].copy_from_slice(&[unorm(color.x), unorm(color.y)]);
            }
            TextureFormat::R8_UNORM => texel[0] = unorm(color.x),
            TextureFormat::R5G6B5_UNORM => {
                let quantize = |value: f32, max: f32| (value.clamp(0.0, 1.0) * max).round() as u16;
                let packed = (quantize(color.x, 31.0) << 11)
                    | (quantize(color.y, 63.0) << 5)
                    | quantize(color.z, 31.0);
                texel[..2].copy_from_slice(&packed.to_le_bytes());
            }
            TextureFormat::R32G32B32A32_SFLOAT => {
                texel[..16].copy_from_slice(bytemuck::bytes_of(&color.to_array()));
            }
            _ => {}
        }
    }
}

/// sRGB transfer function (linear -> encoded)
pub fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.0031308 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Inverse sRGB transfer function (encoded -> linear)
pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
