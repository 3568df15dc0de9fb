/// CPU image storage

use glam::Vec4;
use framebuffer_translator::fbt::{Rect, TextureFormat};

/// Creation parameters of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    /// Mip levels
    pub levels: u32,
    /// Array layers
    pub layers: u32,
    pub samples: u32,
    /// Logical format (the backend may store a substitute)
    pub format: TextureFormat,
}

impl ImageDesc {
    /// Single-level, single-layer, single-sampled image
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self { width, height, levels: 1, layers: 1, samples: 1, format }
    }

    pub fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Size of mip `level`
    pub fn level_size(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }

    /// Largest valid level count for this size
    pub fn max_levels(&self) -> u32 {
        32 - self.width.max(self.height).leading_zeros()
    }
}

/// Texels of one level/layer
///
/// Texels are stored row-major with samples innermost. Color formats fill
/// `color` (storage format bytes); depth/stencil formats fill `depth` and/or
/// `stencil`.
pub(crate) struct CpuSubresource {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub texel_size: usize,
    pub color: Vec<u8>,
    pub depth: Vec<f32>,
    pub stencil: Vec<u8>,
}

impl CpuSubresource {
    fn new(width: u32, height: u32, samples: u32, logical: TextureFormat, storage: TextureFormat) -> Self {
        let count = width as usize * height as usize * samples as usize;
        let texel_size = if storage.is_color() { storage.bytes_per_pixel() } else { 0 };

        let mut color = vec![0u8; count * texel_size];
        // Channels the logical format lacks read as opaque
        if storage.is_color() && !logical.has_alpha() && storage.has_alpha() {
            let mut opaque = vec![0u8; texel_size];
            storage.encode_color(Vec4::new(0.0, 0.0, 0.0, 1.0), &mut opaque);
            for texel in color.chunks_exact_mut(texel_size) {
                texel.copy_from_slice(&opaque);
            }
        }

        Self {
            width,
            height,
            samples,
            texel_size,
            color,
            depth: if storage.has_depth() { vec![0.0; count] } else { Vec::new() },
            stencil: if storage.has_stencil() { vec![0; count] } else { Vec::new() },
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Index of one sample in `depth` / `stencil`
    pub fn sample_index(&self, x: u32, y: u32, sample: u32) -> usize {
        ((y as usize * self.width as usize + x as usize) * self.samples as usize) + sample as usize
    }

    pub fn texel(&self, x: u32, y: u32, sample: u32) -> &[u8] {
        let start = self.sample_index(x, y, sample) * self.texel_size;
        &self.color[start..start + self.texel_size]
    }

    pub fn texel_mut(&mut self, x: u32, y: u32, sample: u32) -> &mut [u8] {
        let start = self.sample_index(x, y, sample) * self.texel_size;
        &mut self.color[start..start + self.texel_size]
    }
}

/// Image with all of its subresources
pub(crate) struct CpuImage {
    pub desc: ImageDesc,
    pub storage_format: TextureFormat,
    /// Level-major: `level * layers + layer`
    subresources: Vec<CpuSubresource>,
}

impl CpuImage {
    pub fn new(desc: ImageDesc, storage_format: TextureFormat) -> Self {
        let mut subresources = Vec::with_capacity((desc.levels * desc.layers) as usize);
        for level in 0..desc.levels {
            let (width, height) = desc.level_size(level);
            for _ in 0..desc.layers {
                subresources.push(CpuSubresource::new(width, height, desc.samples, desc.format, storage_format));
            }
        }
        Self { desc, storage_format, subresources }
    }

    fn index(&self, level: u32, layer: u32) -> Option<usize> {
        (level < self.desc.levels && layer < self.desc.layers)
            .then(|| (level * self.desc.layers + layer) as usize)
    }

    pub fn subresource(&self, level: u32, layer: u32) -> Option<&CpuSubresource> {
        self.index(level, layer).map(|index| &self.subresources[index])
    }

    pub fn subresource_mut(&mut self, level: u32, layer: u32) -> Option<&mut CpuSubresource> {
        self.index(level, layer).map(move |index| &mut self.subresources[index])
    }
}

#[cfg(test)]
#[path = "cpu_image_tests.rs"]
mod tests;
