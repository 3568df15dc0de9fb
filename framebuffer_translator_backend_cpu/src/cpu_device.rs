/// CpuDevice - Device implementation over system-memory images
///
/// Commands are executed immediately. Capabilities the configured
/// `DeviceCaps` do not grant are refused with `BackendError`, so a translator
/// that picks the wrong path fails loudly instead of producing plausible
/// pixels.

use std::sync::{Arc, Mutex, MutexGuard};
use glam::Vec4;
use rustc_hash::FxHashMap;
use framebuffer_translator::fbt::{
    linear_to_srgb, srgb_to_linear, ColorMask, DepthStencilSnapshot, Device, DeviceCaps, Error, Filter, Flip,
    ImageKey, Planes, Rect, RenderTarget, Result,
};
use framebuffer_translator::{shim_bail, shim_err, shim_trace};
use crate::cpu_image::CpuSubresource;
use crate::cpu_resources::CpuResources;
use crate::cpu_sampling::{nearest_index, sample_color, source_coordinate};

const SOURCE: &str = "fbt::cpu::Device";

pub struct CpuDevice {
    caps: DeviceCaps,
    resources: Arc<Mutex<CpuResources>>,
    /// Every `discard_view` call, in order
    discards: Vec<(ImageKey, Option<Rect>)>,
    content_changes: FxHashMap<ImageKey, usize>,
}

impl CpuDevice {
    pub fn new(caps: DeviceCaps, resources: Arc<Mutex<CpuResources>>) -> Self {
        Self {
            caps,
            resources,
            discards: Vec::new(),
            content_changes: FxHashMap::default(),
        }
    }

    pub fn discards(&self) -> &[(ImageKey, Option<Rect>)] {
        &self.discards
    }

    /// How often `mark_image_contents_changed` was called for `image`
    pub fn content_changes(&self, image: ImageKey) -> usize {
        self.content_changes.get(&image).copied().unwrap_or(0)
    }

    fn lock_resources(&self) -> Result<MutexGuard<'_, CpuResources>> {
        self.resources
            .lock()
            .map_err(|_| shim_err!(SOURCE, Error::BackendError("Resource lock poisoned".to_string())))
    }

    fn refuse(&self, what: &str) -> Error {
        shim_err!(SOURCE, Error::BackendError(format!("{} is not supported by this device", what)))
    }
}

/// Fail unless `area` is a normalized rectangle inside `sub`
fn check_area(sub: &CpuSubresource, area: Rect) -> Result<()> {
    if area.width < 0 || area.height < 0 || !sub.bounds().contains(&area) {
        shim_bail!(SOURCE, Error::BackendError(format!(
            "Area {:?} outside {}x{} surface", area, sub.width, sub.height)));
    }
    Ok(())
}

/// Pixels of a normalized rectangle, row-major
fn pixels(area: Rect) -> impl Iterator<Item = (u32, u32)> {
    (area.y..area.y1()).flat_map(move |y| (area.x..area.x1()).map(move |x| (x as u32, y as u32)))
}

fn convert_transfer(color: Vec4, from_srgb: bool, to_srgb: bool) -> Vec4 {
    match (from_srgb, to_srgb) {
        (true, false) => Vec4::new(srgb_to_linear(color.x), srgb_to_linear(color.y), srgb_to_linear(color.z), color.w),
        (false, true) => Vec4::new(linear_to_srgb(color.x), linear_to_srgb(color.y), linear_to_srgb(color.z), color.w),
        _ => color,
    }
}

fn requested_planes(depth: Option<f32>, stencil: Option<u8>) -> Planes {
    let mut planes = Planes::empty();
    if depth.is_some() {
        planes |= Planes::DEPTH;
    }
    if stencil.is_some() {
        planes |= Planes::STENCIL;
    }
    planes
}

impl CpuDevice {
    /// Masked color write; `color` is linear and encoded for sRGB storage
    fn write_color(&self, target: &dyn RenderTarget, color: Vec4, mask: ColorMask, area: Rect) -> Result<()> {
        let storage = target.storage_format();
        let color = convert_transfer(color, false, storage.is_srgb());
        let mut resources = self.lock_resources()?;
        let sub = resources.subresource_mut(target)?;
        check_area(sub, area)?;

        for (x, y) in pixels(area) {
            for sample in 0..sub.samples {
                let texel = sub.texel_mut(x, y, sample);
                let mut value = storage.decode_color(texel);
                for channel in 0..4 {
                    if mask.channel(channel) {
                        value[channel] = color[channel];
                    }
                }
                storage.encode_color(value, texel);
            }
        }
        Ok(())
    }
}

impl Device for CpuDevice {
    fn caps(&self) -> DeviceCaps {
        self.caps
    }

    fn clear_render_target(&mut self, target: &dyn RenderTarget, color: Vec4, area: Rect) -> Result<()> {
        let storage = target.storage_format();
        let mut encoded = vec![0u8; storage.bytes_per_pixel()];
        storage.encode_color(convert_transfer(color, false, storage.is_srgb()), &mut encoded);

        let mut resources = self.lock_resources()?;
        let sub = resources.subresource_mut(target)?;
        check_area(sub, area)?;
        for (x, y) in pixels(area) {
            for sample in 0..sub.samples {
                sub.texel_mut(x, y, sample).copy_from_slice(&encoded);
            }
        }
        Ok(())
    }

    fn clear_render_target_masked(
        &mut self,
        target: &dyn RenderTarget,
        color: Vec4,
        mask: ColorMask,
        area: Rect,
    ) -> Result<()> {
        if !self.caps.supports_independent_color_masks {
            return Err(self.refuse("Masked clear"));
        }
        self.write_color(target, color, mask, area)
    }

    fn draw_clear(&mut self, target: &dyn RenderTarget, color: Vec4, mask: ColorMask, area: Rect) -> Result<()> {
        self.write_color(target, color, mask, area)
    }

    fn clear_depth_stencil(
        &mut self,
        target: &dyn RenderTarget,
        depth: Option<f32>,
        stencil: Option<u8>,
        area: Rect,
    ) -> Result<()> {
        let surface = target.storage_format().planes() & Planes::DEPTH_STENCIL;
        if requested_planes(depth, stencil) & surface != surface && !self.caps.supports_separate_depth_stencil_clear {
            return Err(self.refuse("Single-plane depth/stencil clear"));
        }

        let mut resources = self.lock_resources()?;
        let sub = resources.subresource_mut(target)?;
        check_area(sub, area)?;
        for (x, y) in pixels(area) {
            for sample in 0..sub.samples {
                let index = sub.sample_index(x, y, sample);
                if let (Some(value), Some(slot)) = (depth, sub.depth.get_mut(index)) {
                    *slot = value;
                }
                if let (Some(value), Some(slot)) = (stencil, sub.stencil.get_mut(index)) {
                    *slot = value;
                }
            }
        }
        Ok(())
    }

    fn read_depth_stencil(&mut self, target: &dyn RenderTarget, area: Rect, planes: Planes) -> Result<DepthStencilSnapshot> {
        let resources = self.lock_resources()?;
        let sub = resources.subresource(target)?;
        check_area(sub, area)?;

        let read_depth = planes.contains(Planes::DEPTH) && !sub.depth.is_empty();
        let read_stencil = planes.contains(Planes::STENCIL) && !sub.stencil.is_empty();
        let mut depth = Vec::new();
        let mut stencil = Vec::new();
        for (x, y) in pixels(area) {
            for sample in 0..sub.samples {
                let index = sub.sample_index(x, y, sample);
                if read_depth {
                    depth.push(sub.depth[index]);
                }
                if read_stencil {
                    stencil.push(sub.stencil[index]);
                }
            }
        }

        Ok(DepthStencilSnapshot {
            area,
            samples: sub.samples,
            depth: read_depth.then_some(depth),
            stencil: read_stencil.then_some(stencil),
        })
    }

    fn write_depth_stencil(&mut self, target: &dyn RenderTarget, snapshot: &DepthStencilSnapshot) -> Result<()> {
        let mut resources = self.lock_resources()?;
        let sub = resources.subresource_mut(target)?;
        check_area(sub, snapshot.area)?;

        let expected = snapshot.area.area() * sub.samples as usize;
        let depth = snapshot.depth.as_deref().filter(|_| !sub.depth.is_empty());
        let stencil = snapshot.stencil.as_deref().filter(|_| !sub.stencil.is_empty());
        if snapshot.samples != sub.samples
            || depth.is_some_and(|values| values.len() != expected)
            || stencil.is_some_and(|values| values.len() != expected)
        {
            shim_bail!(SOURCE, Error::BackendError("Snapshot does not match the target".to_string()));
        }

        let mut cursor = 0;
        for (x, y) in pixels(snapshot.area) {
            for sample in 0..sub.samples {
                let index = sub.sample_index(x, y, sample);
                if let Some(values) = depth {
                    sub.depth[index] = values[cursor];
                }
                if let Some(values) = stencil {
                    sub.stencil[index] = values[cursor];
                }
                cursor += 1;
            }
        }
        Ok(())
    }

    fn read_pixels(&mut self, target: &dyn RenderTarget, area: Rect) -> Result<Vec<u8>> {
        if target.samples() > 1 {
            return Err(self.refuse("Reading a multisampled target"));
        }
        let resources = self.lock_resources()?;
        let sub = resources.subresource(target)?;
        check_area(sub, area)?;

        let mut data = Vec::with_capacity(area.area() * sub.texel_size);
        for (x, y) in pixels(area) {
            data.extend_from_slice(sub.texel(x, y, 0));
        }
        Ok(data)
    }

    fn write_pixels(&mut self, target: &dyn RenderTarget, area: Rect, data: &[u8]) -> Result<()> {
        let mut resources = self.lock_resources()?;
        let sub = resources.subresource_mut(target)?;
        check_area(sub, area)?;
        if data.len() != area.area() * sub.texel_size {
            shim_bail!(SOURCE, Error::BackendError(format!(
                "{} bytes for {} texels of {} bytes", data.len(), area.area(), sub.texel_size)));
        }

        let texel_size = sub.texel_size;
        for (index, (x, y)) in pixels(area).enumerate() {
            let texel = &data[index * texel_size..(index + 1) * texel_size];
            for sample in 0..sub.samples {
                sub.texel_mut(x, y, sample).copy_from_slice(texel);
            }
        }
        Ok(())
    }

    fn copy_region(
        &mut self,
        src: &dyn RenderTarget,
        src_area: Rect,
        dst: &dyn RenderTarget,
        dst_x: i32,
        dst_y: i32,
        flip: Flip,
    ) -> Result<()> {
        if !flip.is_none() && !self.caps.supports_flipped_copy {
            return Err(self.refuse("Flipped copy"));
        }
        if src.storage_format() != dst.storage_format() || src.samples() != dst.samples() {
            shim_bail!(SOURCE, Error::BackendError(format!(
                "Copy between {:?}x{} and {:?}x{}",
                src.storage_format(), src.samples(), dst.storage_format(), dst.samples())));
        }

        let mut resources = self.lock_resources()?;

        // Gather first: source and destination may be the same subresource
        let data = {
            let sub = resources.subresource(src)?;
            check_area(sub, src_area)?;
            let mut data = Vec::with_capacity(src_area.area() * sub.texel_size * sub.samples as usize);
            for (i, j) in pixels(Rect::new(0, 0, src_area.width, src_area.height)) {
                let x = if flip.x { src_area.x1() as u32 - 1 - i } else { src_area.x as u32 + i };
                let y = if flip.y { src_area.y1() as u32 - 1 - j } else { src_area.y as u32 + j };
                for sample in 0..sub.samples {
                    data.extend_from_slice(sub.texel(x, y, sample));
                }
            }
            data
        };

        let sub = resources.subresource_mut(dst)?;
        let dst_area = Rect::new(dst_x, dst_y, src_area.width, src_area.height);
        check_area(sub, dst_area)?;
        let texel_size = sub.texel_size;
        let mut chunks = data.chunks_exact(texel_size.max(1));
        for (x, y) in pixels(dst_area) {
            for sample in 0..sub.samples {
                if let Some(texel) = chunks.next() {
                    sub.texel_mut(x, y, sample).copy_from_slice(texel);
                }
            }
        }

        shim_trace!(SOURCE, "Copied {:?} to ({}, {}) flip {:?}", src_area, dst_x, dst_y, flip);
        Ok(())
    }

    fn draw_textured_quad(
        &mut self,
        src: &dyn RenderTarget,
        src_area: Rect,
        dst: &dyn RenderTarget,
        dst_area: Rect,
        clip: Rect,
        flip: Flip,
        filter: Filter,
    ) -> Result<()> {
        if src.samples() > 1 {
            return Err(self.refuse("Sampling a multisampled target"));
        }
        if !src.storage_format().is_color() || !dst.storage_format().is_color() {
            return Err(self.refuse("Textured draw of a depth/stencil target"));
        }
        let src_format = src.storage_format();
        let dst_format = dst.storage_format();
        let opaque = !dst.format().has_alpha();

        let mut resources = self.lock_resources()?;
        let colors: Vec<Vec4> = {
            let sub = resources.subresource(src)?;
            pixels(clip)
                .map(|(x, y)| {
                    let u = source_coordinate(x as i32, dst_area.x, dst_area.width, src_area.x, src_area.width, flip.x);
                    let v = source_coordinate(y as i32, dst_area.y, dst_area.height, src_area.y, src_area.height, flip.y);
                    let mut color = convert_transfer(
                        sample_color(sub, src_format, u, v, filter),
                        src_format.is_srgb(),
                        dst_format.is_srgb(),
                    );
                    if opaque {
                        color.w = 1.0;
                    }
                    color
                })
                .collect()
        };

        let sub = resources.subresource_mut(dst)?;
        check_area(sub, clip)?;
        for ((x, y), color) in pixels(clip).zip(colors) {
            for sample in 0..sub.samples {
                dst_format.encode_color(color, sub.texel_mut(x, y, sample));
            }
        }
        Ok(())
    }

    fn blit_depth_stencil(
        &mut self,
        src: &dyn RenderTarget,
        src_area: Rect,
        dst: &dyn RenderTarget,
        dst_area: Rect,
        clip: Rect,
        flip: Flip,
        planes: Planes,
    ) -> Result<()> {
        let surface = dst.storage_format().planes() & Planes::DEPTH_STENCIL;
        let planes = planes & surface;
        if planes != surface && !self.caps.supports_partial_depth_stencil_blit {
            return Err(self.refuse("Single-plane depth/stencil blit"));
        }
        if src.samples() > 1 {
            return Err(self.refuse("Blitting from a multisampled depth/stencil target"));
        }

        let mut resources = self.lock_resources()?;
        let values: Vec<(f32, u8)> = {
            let sub = resources.subresource(src)?;
            pixels(clip)
                .map(|(x, y)| {
                    let u = source_coordinate(x as i32, dst_area.x, dst_area.width, src_area.x, src_area.width, flip.x);
                    let v = source_coordinate(y as i32, dst_area.y, dst_area.height, src_area.y, src_area.height, flip.y);
                    let index = sub.sample_index(nearest_index(u, sub.width), nearest_index(v, sub.height), 0);
                    (
                        sub.depth.get(index).copied().unwrap_or(0.0),
                        sub.stencil.get(index).copied().unwrap_or(0),
                    )
                })
                .collect()
        };

        let sub = resources.subresource_mut(dst)?;
        check_area(sub, clip)?;
        for ((x, y), (depth, stencil)) in pixels(clip).zip(values) {
            for sample in 0..sub.samples {
                let index = sub.sample_index(x, y, sample);
                if planes.contains(Planes::DEPTH) {
                    sub.depth[index] = depth;
                }
                if planes.contains(Planes::STENCIL) {
                    sub.stencil[index] = stencil;
                }
            }
        }
        Ok(())
    }

    fn create_resolve_target(&mut self, src: &dyn RenderTarget) -> Result<Arc<dyn RenderTarget>> {
        let owner = Arc::downgrade(&self.resources);
        let mut resources = self.lock_resources()?;
        let target: Arc<dyn RenderTarget> = resources.create_transient(src, owner);
        Ok(target)
    }

    fn resolve_subresource(&mut self, src: &dyn RenderTarget, dst: &dyn RenderTarget) -> Result<()> {
        if src.width() != dst.width() || src.height() != dst.height() || dst.samples() != 1 {
            shim_bail!(SOURCE, Error::BackendError(format!(
                "Cannot resolve {}x{} into {}x{}x{}", src.width(), src.height(), dst.width(), dst.height(), dst.samples())));
        }
        let src_format = src.storage_format();
        let dst_format = dst.storage_format();

        let mut resources = self.lock_resources()?;
        let (colors, depth, stencil) = {
            let sub = resources.subresource(src)?;
            let mut colors = Vec::new();
            let mut depth = Vec::new();
            let mut stencil = Vec::new();
            for (x, y) in pixels(sub.bounds()) {
                if sub.texel_size > 0 {
                    let sum = (0..sub.samples).fold(Vec4::ZERO, |sum, sample| {
                        sum + src_format.decode_color(sub.texel(x, y, sample))
                    });
                    colors.push(sum / sub.samples as f32);
                }
                // Depth and stencil take sample 0
                let index = sub.sample_index(x, y, 0);
                depth.extend(sub.depth.get(index).copied());
                stencil.extend(sub.stencil.get(index).copied());
            }
            (colors, depth, stencil)
        };

        let sub = resources.subresource_mut(dst)?;
        for (index, (x, y)) in pixels(sub.bounds()).enumerate() {
            if let Some(color) = colors.get(index) {
                dst_format.encode_color(*color, sub.texel_mut(x, y, 0));
            }
            let slot = sub.sample_index(x, y, 0);
            if let (Some(value), Some(out)) = (depth.get(index), sub.depth.get_mut(slot)) {
                *out = *value;
            }
            if let (Some(value), Some(out)) = (stencil.get(index), sub.stencil.get_mut(slot)) {
                *out = *value;
            }
        }
        Ok(())
    }

    fn discard_view(&mut self, target: &dyn RenderTarget, area: Option<Rect>) -> Result<()> {
        if !self.caps.supports_discard_hint {
            return Err(self.refuse("Discard hint"));
        }
        self.discards.push((target.image(), area));
        Ok(())
    }

    fn mark_image_contents_changed(&mut self, image: ImageKey) {
        *self.content_changes.entry(image).or_insert(0) += 1;
    }
}

#[cfg(test)]
#[path = "cpu_device_tests.rs"]
mod tests;
