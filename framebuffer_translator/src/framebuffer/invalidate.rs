/// Invalidate / discard lowering
///
/// Contents of invalidated attachments become undefined. Backends with a
/// native hint get `discard_view`; others get a zero clear when
/// `clearInvalidatedAttachmentsToZero` is enabled and nothing otherwise.

use crate::device::{Device, RenderTarget};
use crate::error::{Error, Result};
use crate::features::Feature;
use super::translator::SOURCE;
use super::{
    apply_depth_stencil_plan, plan_depth_stencil, AttachmentName, AttachmentPoint, DepthStencilPlan,
    FramebufferState, FramebufferTranslator, PartialPlanePolicy, Planes, Rect,
};
use glam::Vec4;

/// How invalidated contents are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvalidateMode {
    Hint,
    ZeroClear,
}

impl FramebufferTranslator {
    /// Legacy discard entry point
    ///
    /// Accepts the default-framebuffer enums as well. Naming one plane of a
    /// combined depth-stencil surface discards the whole surface when
    /// `discardPartialDepthStencilForExt` is enabled.
    pub fn discard(&mut self, state: &mut FramebufferState, attachments: &[u32]) -> Result<()> {
        self.invalidate_base(state, attachments, None, true)
    }

    /// Invalidate the whole of the named attachments
    pub fn invalidate(&mut self, state: &mut FramebufferState, attachments: &[u32]) -> Result<()> {
        self.invalidate_base(state, attachments, None, false)
    }

    /// Invalidate `area` of the named attachments
    ///
    /// # Errors
    ///
    /// `InvalidRectangle` for a negative width or height.
    pub fn invalidate_sub(&mut self, state: &mut FramebufferState, attachments: &[u32], area: Rect) -> Result<()> {
        self.invalidate_base(state, attachments, Some(area), false)
    }

    fn invalidate_base(
        &mut self,
        state: &mut FramebufferState,
        attachments: &[u32],
        area: Option<Rect>,
        use_ext_behavior: bool,
    ) -> Result<()> {
        let names = attachments
            .iter()
            .map(|&value| AttachmentName::from_enum(value, use_ext_behavior))
            .collect::<Result<Vec<_>>>()?;

        if let Some(area) = area {
            if area.width < 0 || area.height < 0 {
                crate::shim_bail!(SOURCE, Error::InvalidRectangle(format!(
                    "Invalidate area {}x{} has a negative size", area.width, area.height)));
            }
        }

        self.sync(state)?;

        let mut device = self.lock_device()?;
        let caps = device.caps();
        let mode = if caps.supports_discard_hint {
            InvalidateMode::Hint
        } else if self.is_enabled(Feature::ClearInvalidatedAttachmentsToZero) {
            InvalidateMode::ZeroClear
        } else {
            crate::shim_trace!(SOURCE, "Invalidate ignored: no discard hint");
            return Ok(());
        };

        let mut color_indices: Vec<u8> = Vec::new();
        let mut depth_stencil = Planes::empty();
        for name in names {
            match name {
                AttachmentName::Color(index) => {
                    if !color_indices.contains(&index) {
                        color_indices.push(index);
                    }
                }
                _ => depth_stencil |= name.planes(),
            }
        }

        for index in color_indices {
            if let Some(target) = self.target(AttachmentPoint::Color(index))? {
                self.invalidate_target(&mut *device, mode, target.as_ref(), Planes::COLOR, area)?;
            }
        }

        if depth_stencil.is_empty() {
            return Ok(());
        }
        let Some(target) = self.target(AttachmentPoint::DepthStencil)? else {
            return Ok(());
        };

        let policy = if use_ext_behavior && self.is_enabled(Feature::DiscardPartialDepthStencilForExt) {
            PartialPlanePolicy::Widen
        } else {
            PartialPlanePolicy::Skip
        };
        // A hint always drops the whole view
        let separate = mode == InvalidateMode::ZeroClear && caps.supports_separate_depth_stencil_clear;
        let plan = plan_depth_stencil(depth_stencil, target.storage_format().planes(), separate, policy)?;
        if plan == DepthStencilPlan::Skip {
            crate::shim_debug!(SOURCE, "Skipping partial invalidate of {:?}", depth_stencil);
            return Ok(());
        }

        let target = target.as_ref();
        let bounds = target.bounds();
        apply_depth_stencil_plan(&mut *device, target, bounds, plan, |device, planes| {
            self.invalidate_target(device, mode, target, planes, area)
        })
    }

    fn invalidate_target(
        &self,
        device: &mut dyn Device,
        mode: InvalidateMode,
        target: &dyn RenderTarget,
        planes: Planes,
        area: Option<Rect>,
    ) -> Result<()> {
        if self.is_enabled(Feature::PreferSkippingInvalidateForEmulatedFormats)
            && target.format() != target.storage_format()
        {
            crate::shim_trace!(SOURCE, "Not invalidating emulated {:?}", target.format());
            return Ok(());
        }

        let bounds = target.bounds();
        let region = match area {
            Some(area) => match bounds.intersect(&area) {
                Some(region) if region == bounds => None,
                Some(region) => Some(region),
                None => return Ok(()),
            },
            None => None,
        };

        match mode {
            InvalidateMode::Hint => device.discard_view(target, region)?,
            InvalidateMode::ZeroClear => {
                let region = region.unwrap_or(bounds);
                if planes.contains(Planes::COLOR) {
                    device.clear_render_target(target, Vec4::ZERO, region)?;
                } else {
                    device.clear_depth_stencil(
                        target,
                        planes.contains(Planes::DEPTH).then_some(0.0),
                        planes.contains(Planes::STENCIL).then_some(0),
                        region,
                    )?;
                }
            }
        }

        device.mark_image_contents_changed(target.image());
        Ok(())
    }
}

#[cfg(test)]
#[path = "invalidate_tests.rs"]
mod tests;
