/// Clear lowering
///
/// Color path per attachment, first match wins:
/// forced draw (workarounds) -> native full clear -> native masked clear ->
/// masked draw (`emulateIndependentColorMasks`) -> read-modify-write.

use std::sync::Arc;
use glam::Vec4;
use crate::device::{linear_to_srgb, srgb_to_linear, Device, DeviceCaps, RenderTarget};
use crate::error::{Error, Result};
use crate::features::Feature;
use super::translator::SOURCE;
use super::{
    apply_depth_stencil_plan, plan_depth_stencil, AttachmentPoint, ClearParameters, ColorMask,
    DepthStencilPlan, FramebufferState, FramebufferTranslator, PartialPlanePolicy, Planes, Rect,
};

/// How one color attachment gets cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorClearPath {
    Native,
    NativeMasked,
    Draw,
    ReadModifyWrite,
}

/// One color attachment's clear, decided before anything is issued
struct ColorClear {
    target: Arc<dyn RenderTarget>,
    area: Rect,
    color: Vec4,
    mask: ColorMask,
    path: ColorClearPath,
}

struct DepthStencilClear {
    target: Arc<dyn RenderTarget>,
    area: Rect,
    plan: DepthStencilPlan,
    /// Stencil write mask when it is neither empty nor full
    masked_stencil: Option<u8>,
}

impl FramebufferTranslator {
    /// Clear the bound attachments
    ///
    /// Color slots that are bound, enabled in the draw buffers and have a
    /// non-empty mask are cleared to `params.color_value`. Depth and stencil
    /// are cleared when requested and present. Everything is restricted to
    /// the scissor.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` when a plane is requested on an unattached
    /// framebuffer, when one plane of a combined depth-stencil surface must
    /// be cleared on a backend that cannot and the preserve fallback is off,
    /// or when a multisampled color attachment would need read-modify-write.
    /// All of these are detected before any attachment is written.
    pub fn clear(&mut self, state: &mut FramebufferState, params: &ClearParameters) -> Result<()> {
        self.sync(state)?;

        if !params.clears_anything() {
            return Ok(());
        }
        if self.render_targets_empty()? {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Clear requested on a framebuffer with no attachment".to_string()));
        }

        let mut color_targets = Vec::new();
        for (index, target) in self.draw_targets()? {
            let mask = params.color_masks[index as usize];
            if !mask.is_empty() {
                color_targets.push((target, mask));
            }
        }

        let mut device = self.lock_device()?;
        let caps = device.caps();

        // Validate every attachment before touching anything
        let mut color_clears = Vec::with_capacity(color_targets.len());
        for (target, mask) in color_targets {
            if let Some(clear) = self.plan_color_clear(&caps, target, mask, params)? {
                color_clears.push(clear);
            }
        }
        let depth_stencil = self.plan_depth_stencil_clear(&caps, params)?;

        let repeats = if self.is_enabled(Feature::CallClearTwice) { 2 } else { 1 };
        for clear in &color_clears {
            let target = clear.target.as_ref();
            for _ in 0..repeats {
                match clear.path {
                    ColorClearPath::Native => device.clear_render_target(target, clear.color, clear.area)?,
                    ColorClearPath::NativeMasked => {
                        device.clear_render_target_masked(target, clear.color, clear.mask, clear.area)?
                    }
                    ColorClearPath::Draw => device.draw_clear(target, clear.color, clear.mask, clear.area)?,
                    ColorClearPath::ReadModifyWrite => {
                        read_modify_write(&mut *device, target, clear.color, clear.mask, clear.area)?
                    }
                }
            }
            device.mark_image_contents_changed(target.image());
        }

        if let Some(clear) = depth_stencil {
            let depth = params.depth_value.clamp(0.0, 1.0);
            let stencil = params.stencil_value;
            let target = clear.target.as_ref();
            let area = clear.area;

            apply_depth_stencil_plan(&mut *device, target, area, clear.plan, |device, planes| {
                device.clear_depth_stencil(
                    target,
                    planes.contains(Planes::DEPTH).then_some(depth),
                    planes.contains(Planes::STENCIL).then_some(stencil),
                    area,
                )
            })?;

            if let Some(mask) = clear.masked_stencil {
                let mut snapshot = device.read_depth_stencil(target, area, Planes::STENCIL)?;
                snapshot.merge_stencil(stencil, mask);
                device.write_depth_stencil(target, &snapshot)?;
            }

            if clear.plan != DepthStencilPlan::Skip || clear.masked_stencil.is_some() {
                device.mark_image_contents_changed(target.image());
            }
        }

        Ok(())
    }

    fn render_targets_empty(&self) -> Result<bool> {
        Ok(self.bound_targets()?.is_empty())
    }

    fn plan_depth_stencil_clear(&self, caps: &DeviceCaps, params: &ClearParameters) -> Result<Option<DepthStencilClear>> {
        if !params.clear_depth && !params.clear_stencil {
            return Ok(None);
        }
        let Some(target) = self.target(AttachmentPoint::DepthStencil)? else {
            return Ok(None);
        };
        let Some(area) = clear_area(target.as_ref(), params.scissor) else {
            return Ok(None);
        };

        let surface = target.storage_format().planes();
        let mut requested = Planes::empty();
        if params.clear_depth {
            requested |= Planes::DEPTH;
        }

        let mut masked_stencil = None;
        if params.clear_stencil && surface.contains(Planes::STENCIL) {
            match params.stencil_write_mask {
                0 => {}
                0xFF => requested |= Planes::STENCIL,
                mask => masked_stencil = Some(mask),
            }
        }

        let policy = if self.is_enabled(Feature::PreserveUnclearedDepthStencilPlane) {
            PartialPlanePolicy::PreserveAndRewrite
        } else {
            PartialPlanePolicy::Reject
        };
        let plan = plan_depth_stencil(requested, surface, caps.supports_separate_depth_stencil_clear, policy)?;

        crate::shim_trace!(SOURCE, "Depth/stencil clear plan {:?} (masked stencil {:?})", plan, masked_stencil);
        Ok(Some(DepthStencilClear { target, area, plan, masked_stencil }))
    }

    fn plan_color_clear(
        &self,
        caps: &DeviceCaps,
        target: Arc<dyn RenderTarget>,
        mask: ColorMask,
        params: &ClearParameters,
    ) -> Result<Option<ColorClear>> {
        let Some(area) = clear_area(target.as_ref(), params.scissor) else {
            return Ok(None);
        };

        let logical = target.format();
        let storage = target.storage_format();
        let logical_mask = logical.channel_mask() & storage.channel_mask();
        let mut mask = mask & logical_mask;
        if mask.is_empty() {
            return Ok(None);
        }

        // Values reaching the device are linear unless the logical format is
        // sRGB over linear storage, where the encoded value is stored as is.
        let mut color = params.color_value;
        if logical.is_srgb() && !storage.is_srgb() {
            color = Vec4::new(linear_to_srgb(color.x), linear_to_srgb(color.y), linear_to_srgb(color.z), color.w);
        } else if !logical.is_srgb() && storage.is_srgb() {
            color = Vec4::new(srgb_to_linear(color.x), srgb_to_linear(color.y), srgb_to_linear(color.z), color.w);
        }
        // Emulated channels keep their constant: a full logical mask rewrites
        // them, a partial one leaves them alone.
        if !logical.has_alpha() {
            color.w = 1.0;
        }
        if mask == logical_mask {
            mask = storage.channel_mask();
        }

        let path = self.color_clear_path(caps, mask == storage.channel_mask(), color);
        if path == ColorClearPath::ReadModifyWrite && target.samples() > 1 {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Masked clear of a multisampled target needs native masks or emulateIndependentColorMasks".to_string()));
        }
        crate::shim_trace!(SOURCE, "Clearing {:?} with {:?} (mask {:?})", logical, path, mask);

        Ok(Some(ColorClear { target, area, color, mask, path }))
    }

    fn color_clear_path(&self, caps: &DeviceCaps, full_mask: bool, color: Vec4) -> ColorClearPath {
        let zero_or_one = color.to_array().iter().any(|&channel| channel == 0.0 || channel == 1.0);
        if self.is_enabled(Feature::PreferDrawClearOverClearAttachments)
            || (zero_or_one && self.is_enabled(Feature::ClearToZeroOrOneBroken))
        {
            ColorClearPath::Draw
        } else if full_mask {
            ColorClearPath::Native
        } else if caps.supports_independent_color_masks {
            ColorClearPath::NativeMasked
        } else if self.is_enabled(Feature::EmulateIndependentColorMasks) {
            ColorClearPath::Draw
        } else {
            ColorClearPath::ReadModifyWrite
        }
    }
}

/// Scissor intersected with the target, `None` when empty
fn clear_area(target: &dyn RenderTarget, scissor: Option<Rect>) -> Option<Rect> {
    let bounds = target.bounds();
    match scissor {
        Some(scissor) => bounds.intersect(&scissor),
        None if bounds.is_empty() => None,
        None => Some(bounds),
    }
}

fn read_modify_write(
    device: &mut dyn Device,
    target: &dyn RenderTarget,
    color: Vec4,
    mask: ColorMask,
    area: Rect,
) -> Result<()> {
    let format = target.storage_format();
    // Texels are merged in storage encoding
    let color = if format.is_srgb() {
        Vec4::new(linear_to_srgb(color.x), linear_to_srgb(color.y), linear_to_srgb(color.z), color.w)
    } else {
        color
    };
    let mut texels = device.read_pixels(target, area)?;
    for texel in texels.chunks_exact_mut(format.bytes_per_pixel()) {
        let mut value = format.decode_color(texel);
        for channel in 0..4 {
            if mask.channel(channel) {
                value[channel] = color[channel];
            }
        }
        format.encode_color(value, texel);
    }
    device.write_pixels(target, area, &texels)
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
