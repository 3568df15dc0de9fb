/// CpuResources - image table and view memo of the CPU backend

use std::sync::{Arc, Mutex, Weak};
use glam::Vec4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use framebuffer_translator::fbt::{Attachment, Error, FeatureRegistry, ImageKey, RenderTarget, Result, TextureFormat};
use framebuffer_translator::{shim_bail, shim_debug, shim_err};
use crate::cpu_image::{CpuImage, CpuSubresource, ImageDesc};
use crate::cpu_render_target::CpuRenderTarget;

const SOURCE: &str = "fbt::cpu::Resources";

/// Sample counts the backend can allocate
const SUPPORTED_SAMPLE_COUNTS: [u32; 5] = [1, 2, 4, 8, 16];

/// All images of one CPU backend
///
/// Views are memoized per (image, level, layer) and owned here; the
/// translator only keeps weak references to them. Deleting an image drops
/// its views.
pub struct CpuResources {
    images: SlotMap<ImageKey, CpuImage>,
    views: FxHashMap<(ImageKey, u32, u32), Arc<CpuRenderTarget>>,
    features: Arc<FeatureRegistry>,
}

impl CpuResources {
    pub fn new(features: Arc<FeatureRegistry>) -> Self {
        Self {
            images: SlotMap::with_key(),
            views: FxHashMap::default(),
            features,
        }
    }

    // ===== IMAGES =====

    /// Allocate an image; the storage format follows the feature registry
    ///
    /// # Errors
    ///
    /// `OutOfRange` for empty sizes, invalid level/layer counts, unsupported
    /// sample counts or multisampled mip chains.
    pub fn create_image(&mut self, desc: ImageDesc) -> Result<ImageKey> {
        if desc.width == 0 || desc.height == 0 {
            shim_bail!(SOURCE, Error::OutOfRange(format!("Image size {}x{}", desc.width, desc.height)));
        }
        if desc.levels == 0 || desc.levels > desc.max_levels() || desc.layers == 0 {
            shim_bail!(SOURCE, Error::OutOfRange(format!(
                "{} levels x {} layers for a {}x{} image", desc.levels, desc.layers, desc.width, desc.height)));
        }
        if !SUPPORTED_SAMPLE_COUNTS.contains(&desc.samples) || (desc.samples > 1 && desc.levels > 1) {
            shim_bail!(SOURCE, Error::OutOfRange(format!(
                "{} samples with {} levels", desc.samples, desc.levels)));
        }

        let storage_format = desc.format.storage_format(&self.features);
        if storage_format != desc.format {
            shim_debug!(SOURCE, "Storing {:?} as {:?}", desc.format, storage_format);
        }
        Ok(self.images.insert(CpuImage::new(desc, storage_format)))
    }

    /// Delete an image and its views; returns whether it existed
    pub fn delete_image(&mut self, image: ImageKey) -> bool {
        self.views.retain(|(key, _, _), _| *key != image);
        self.images.remove(image).is_some()
    }

    pub fn image_desc(&self, image: ImageKey) -> Option<ImageDesc> {
        self.images.get(image).map(|image| image.desc)
    }

    pub fn storage_format(&self, image: ImageKey) -> Option<TextureFormat> {
        self.images.get(image).map(|image| image.storage_format)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    // ===== VIEWS =====

    /// Memoized view of `attachment`
    pub(crate) fn view(&mut self, attachment: &Attachment) -> Result<Arc<CpuRenderTarget>> {
        let key = (attachment.image, attachment.level, attachment.layer);
        if let Some(view) = self.views.get(&key) {
            return Ok(view.clone());
        }

        let image = self.images.get(attachment.image).ok_or_else(|| {
            shim_err!(SOURCE, Error::ResourceResolutionFailure(format!("Image {:?} does not exist", attachment.image)))
        })?;
        let sub = image.subresource(attachment.level, attachment.layer).ok_or_else(|| {
            shim_err!(SOURCE, Error::ResourceResolutionFailure(format!(
                "Image {:?} has no level {} layer {}", attachment.image, attachment.level, attachment.layer)))
        })?;

        let view = Arc::new(CpuRenderTarget {
            image: attachment.image,
            level: attachment.level,
            layer: attachment.layer,
            width: sub.width,
            height: sub.height,
            samples: sub.samples,
            format: image.desc.format,
            storage_format: image.storage_format,
            owner: None,
        });
        self.views.insert(key, view.clone());
        Ok(view)
    }

    /// Single-sampled temporary shaped like `src`, deleted with its view
    pub(crate) fn create_transient(&mut self, src: &dyn RenderTarget, owner: Weak<Mutex<CpuResources>>) -> Arc<CpuRenderTarget> {
        let desc = ImageDesc::new(src.width(), src.height(), src.format());
        let image = self.images.insert(CpuImage::new(desc, src.storage_format()));
        Arc::new(CpuRenderTarget {
            image,
            level: 0,
            layer: 0,
            width: src.width(),
            height: src.height(),
            samples: 1,
            format: src.format(),
            storage_format: src.storage_format(),
            owner: Some(owner),
        })
    }

    pub(crate) fn release_transient(&mut self, image: ImageKey) {
        self.images.remove(image);
    }

    pub(crate) fn subresource(&self, target: &dyn RenderTarget) -> Result<&CpuSubresource> {
        self.images
            .get(target.image())
            .and_then(|image| image.subresource(target.level(), target.layer()))
            .ok_or_else(|| shim_err!(SOURCE, Error::BackendError(format!(
                "Render target of deleted image {:?}", target.image()))))
    }

    pub(crate) fn subresource_mut(&mut self, target: &dyn RenderTarget) -> Result<&mut CpuSubresource> {
        self.images
            .get_mut(target.image())
            .and_then(|image| image.subresource_mut(target.level(), target.layer()))
            .ok_or_else(|| shim_err!(SOURCE, Error::BackendError(format!(
                "Render target of deleted image {:?}", target.image()))))
    }

    // ===== TEXEL ACCESS (level 0, layer 0) =====

    fn base(&self, image: ImageKey) -> Result<(&CpuSubresource, TextureFormat)> {
        let entry = self.images.get(image).ok_or_else(|| {
            shim_err!(SOURCE, Error::OutOfRange(format!("Image {:?} does not exist", image)))
        })?;
        let sub = entry.subresource(0, 0).ok_or_else(|| {
            shim_err!(SOURCE, Error::OutOfRange(format!("Image {:?} has no base level", image)))
        })?;
        Ok((sub, entry.storage_format))
    }

    fn base_mut(&mut self, image: ImageKey) -> Result<(&mut CpuSubresource, TextureFormat)> {
        let entry = self.images.get_mut(image).ok_or_else(|| {
            shim_err!(SOURCE, Error::OutOfRange(format!("Image {:?} does not exist", image)))
        })?;
        let storage_format = entry.storage_format;
        let sub = entry.subresource_mut(0, 0).ok_or_else(|| {
            shim_err!(SOURCE, Error::OutOfRange(format!("Image {:?} has no base level", image)))
        })?;
        Ok((sub, storage_format))
    }

    fn check_pixel(sub: &CpuSubresource, x: u32, y: u32, sample: u32) -> Result<()> {
        if x >= sub.width || y >= sub.height || sample >= sub.samples {
            shim_bail!(SOURCE, Error::OutOfRange(format!(
                "Texel ({}, {}) sample {} outside {}x{}x{}", x, y, sample, sub.width, sub.height, sub.samples)));
        }
        Ok(())
    }

    /// Set every sample of every texel of a color image
    pub fn fill_color(&mut self, image: ImageKey, color: Vec4) -> Result<()> {
        let (sub, storage) = self.base_mut(image)?;
        for texel in sub.color.chunks_exact_mut(sub.texel_size.max(1)) {
            storage.encode_color(color, texel);
        }
        Ok(())
    }

    /// Set every sample of one texel
    pub fn set_color(&mut self, image: ImageKey, x: u32, y: u32, color: Vec4) -> Result<()> {
        let samples = self.base(image)?.0.samples;
        for sample in 0..samples {
            self.set_sample_color(image, x, y, sample, color)?;
        }
        Ok(())
    }

    pub fn set_sample_color(&mut self, image: ImageKey, x: u32, y: u32, sample: u32, color: Vec4) -> Result<()> {
        let (sub, storage) = self.base_mut(image)?;
        Self::check_pixel(sub, x, y, sample)?;
        storage.encode_color(color, sub.texel_mut(x, y, sample));
        Ok(())
    }

    /// Decoded sample 0 of one texel
    pub fn color_at(&self, image: ImageKey, x: u32, y: u32) -> Result<Vec4> {
        let (sub, storage) = self.base(image)?;
        Self::check_pixel(sub, x, y, 0)?;
        Ok(storage.decode_color(sub.texel(x, y, 0)))
    }

    /// Raw storage bytes of sample 0 of one texel
    pub fn texel_at(&self, image: ImageKey, x: u32, y: u32) -> Result<Vec<u8>> {
        let (sub, _) = self.base(image)?;
        Self::check_pixel(sub, x, y, 0)?;
        Ok(sub.texel(x, y, 0).to_vec())
    }

    /// Set depth and stencil of every sample (planes the format lacks are ignored)
    pub fn fill_depth_stencil(&mut self, image: ImageKey, depth: f32, stencil: u8) -> Result<()> {
        let (sub, _) = self.base_mut(image)?;
        sub.depth.iter_mut().for_each(|value| *value = depth);
        sub.stencil.iter_mut().for_each(|value| *value = stencil);
        Ok(())
    }

    pub fn depth_at(&self, image: ImageKey, x: u32, y: u32) -> Result<Option<f32>> {
        let (sub, _) = self.base(image)?;
        Self::check_pixel(sub, x, y, 0)?;
        Ok(sub.depth.get(sub.sample_index(x, y, 0)).copied())
    }

    pub fn stencil_at(&self, image: ImageKey, x: u32, y: u32) -> Result<Option<u8>> {
        let (sub, _) = self.base(image)?;
        Self::check_pixel(sub, x, y, 0)?;
        Ok(sub.stencil.get(sub.sample_index(x, y, 0)).copied())
    }
}

#[cfg(test)]
#[path = "cpu_resources_tests.rs"]
mod tests;
