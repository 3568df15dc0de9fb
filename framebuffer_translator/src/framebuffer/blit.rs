/// Blit lowering
///
/// Each destination gets either an exact copy (unscaled, same storage format,
/// source inside its bounds, no flip unless the backend copies flipped) or a
/// textured draw. Multisampled sources are resolved into a temporary first.

use std::sync::Arc;
use crate::device::{Device, DeviceCaps, Flip, RenderTarget};
use crate::error::{Error, Result};
use crate::features::Feature;
use super::translator::SOURCE;
use super::{
    apply_depth_stencil_plan, plan_depth_stencil, AttachmentPoint, BlitRegion, DepthStencilPlan, Filter,
    FramebufferState, FramebufferTranslator, PartialPlanePolicy, Planes, Rect,
};

/// Normalized rectangles of one blit after clipping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct BlitGeometry {
    pub src: Rect,
    pub dst: Rect,
    /// Destination pixels actually written (inside `dst`)
    pub clip: Rect,
    pub flip: Flip,
}

struct ColorBlit {
    dst: Arc<dyn RenderTarget>,
    geometry: BlitGeometry,
    exact_copy: bool,
}

struct DepthStencilBlit {
    src: Arc<dyn RenderTarget>,
    dst: Arc<dyn RenderTarget>,
    geometry: BlitGeometry,
    plan: DepthStencilPlan,
}

impl FramebufferTranslator {
    /// Copy `region` from `source` into this framebuffer
    ///
    /// Color comes from the source read buffer and goes to every bound,
    /// draw-enabled color slot. Depth/stencil go between the depth-stencil
    /// slots. Regions that clip to nothing are a silent no-op.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` when a requested plane is unbound on either
    /// side, for linear depth/stencil blits, multisampled destinations and
    /// scaled multisample resolves, or when a partial depth/stencil blit is
    /// impossible on this backend. `InvalidRectangle` when a rectangle's far
    /// corner does not fit an `i32`. Nothing is issued in those cases.
    pub fn blit(
        &mut self,
        state: &mut FramebufferState,
        source: &mut FramebufferTranslator,
        source_state: &mut FramebufferState,
        region: &BlitRegion,
    ) -> Result<()> {
        self.sync(state)?;
        source.sync(source_state)?;
        self.blit_synced(source, region)
    }

    /// Copy `region` between attachments of this framebuffer
    ///
    /// Same rules as [`blit`](Self::blit) with this framebuffer as both
    /// source and destination.
    pub fn blit_within(&mut self, state: &mut FramebufferState, region: &BlitRegion) -> Result<()> {
        self.sync(state)?;
        self.blit_synced(self, region)
    }

    fn blit_synced(&self, source: &FramebufferTranslator, region: &BlitRegion) -> Result<()> {
        let rects = [Some(region.source), Some(region.destination), region.scissor];
        if let Some(rect) = rects.into_iter().flatten().find(|rect| !rect.is_representable()) {
            crate::shim_bail!(SOURCE, Error::InvalidRectangle(format!(
                "Blit rectangle {:?} has a corner outside the i32 range", rect)));
        }
        let depth_stencil_planes = region.planes & Planes::DEPTH_STENCIL;
        if !depth_stencil_planes.is_empty() && region.filter == Filter::Linear {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Depth/stencil blits require nearest filtering".to_string()));
        }

        let adjust = self.is_enabled(Feature::AdjustSrcDstRegionForBlitFramebuffer);
        let mut device = self.lock_device()?;
        let caps = device.caps();

        let color = if region.planes.contains(Planes::COLOR) {
            Some(self.prepare_color_blit(source, region, &caps, adjust)?)
        } else {
            None
        };
        let depth_stencil = if depth_stencil_planes.is_empty() {
            None
        } else {
            self.prepare_depth_stencil_blit(source, region, depth_stencil_planes, &caps, adjust)?
        };

        if let Some((src, blits)) = color {
            execute_color_blits(&mut *device, src, blits, region.filter)?;
        }

        if let Some(blit) = depth_stencil {
            let DepthStencilBlit { src, dst, geometry, plan } = blit;
            apply_depth_stencil_plan(&mut *device, dst.as_ref(), geometry.clip, plan, |device, planes| {
                device.blit_depth_stencil(
                    src.as_ref(),
                    geometry.src,
                    dst.as_ref(),
                    geometry.dst,
                    geometry.clip,
                    geometry.flip,
                    planes,
                )
            })?;
            if plan != DepthStencilPlan::Skip {
                device.mark_image_contents_changed(dst.image());
            }
        }

        Ok(())
    }

    fn prepare_color_blit(
        &self,
        source: &FramebufferTranslator,
        region: &BlitRegion,
        caps: &DeviceCaps,
        adjust: bool,
    ) -> Result<(Arc<dyn RenderTarget>, Vec<ColorBlit>)> {
        let Some(src) = source.read_target()? else {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Blit source has no color read buffer bound".to_string()));
        };
        let destinations = self.draw_targets()?;
        if destinations.is_empty() {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Blit destination has no color attachment bound".to_string()));
        }

        let flipped_copy = caps.supports_flipped_copy && !self.is_enabled(Feature::DisableFlippingBlitWithCommand);
        let mut blits = Vec::new();

        for (_, dst) in destinations {
            if dst.samples() > 1 {
                crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                    "Blit into a multisampled color attachment".to_string()));
            }
            let Some(geometry) = blit_geometry(region, src.bounds(), dst.bounds(), adjust) else {
                crate::shim_trace!(SOURCE, "Blit region clipped away");
                continue;
            };

            let scaled = geometry.src.width != geometry.dst.width || geometry.src.height != geometry.dst.height;
            if scaled && src.samples() > 1 {
                crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                    "Scaled blit from a multisampled color attachment".to_string()));
            }

            let exact_copy = !scaled
                && src.storage_format() == dst.storage_format()
                && src.bounds().contains(&geometry.src)
                && (geometry.flip.is_none() || flipped_copy);

            blits.push(ColorBlit { dst, geometry, exact_copy });
        }

        Ok((src, blits))
    }

    fn prepare_depth_stencil_blit(
        &self,
        source: &FramebufferTranslator,
        region: &BlitRegion,
        planes: Planes,
        caps: &DeviceCaps,
        adjust: bool,
    ) -> Result<Option<DepthStencilBlit>> {
        let src = source.target(AttachmentPoint::DepthStencil)?;
        let dst = self.target(AttachmentPoint::DepthStencil)?;
        let (src, dst) = match (src, dst) {
            (Some(src), Some(dst))
                if src.format().planes().contains(planes) && dst.format().planes().contains(planes) =>
            {
                (src, dst)
            }
            _ => crate::shim_bail!(SOURCE, Error::UnsupportedOperation(format!(
                "Blit of {:?} needs the plane bound on both framebuffers", planes))),
        };

        if src.samples() > 1 || dst.samples() > 1 {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Multisampled depth/stencil blit".to_string()));
        }

        let Some(geometry) = blit_geometry(region, src.bounds(), dst.bounds(), adjust) else {
            return Ok(None);
        };

        let policy = if self.is_enabled(Feature::DepthStencilBlitExtraCopy) {
            PartialPlanePolicy::PreserveAndRewrite
        } else {
            PartialPlanePolicy::Reject
        };
        let plan = plan_depth_stencil(
            planes,
            dst.storage_format().planes(),
            caps.supports_partial_depth_stencil_blit,
            policy,
        )?;

        Ok(Some(DepthStencilBlit { src, dst, geometry, plan }))
    }
}

fn execute_color_blits(
    device: &mut dyn Device,
    src: Arc<dyn RenderTarget>,
    blits: Vec<ColorBlit>,
    filter: Filter,
) -> Result<()> {
    if blits.is_empty() {
        return Ok(());
    }

    let src = if src.samples() > 1 {
        let resolved = device.create_resolve_target(src.as_ref())?;
        device.resolve_subresource(src.as_ref(), resolved.as_ref())?;
        resolved
    } else {
        src
    };

    for blit in blits {
        let geometry = blit.geometry;
        if blit.exact_copy {
            let source_area = copy_source_area(&geometry);
            crate::shim_trace!(SOURCE, "Blit as copy {:?} -> {:?}", source_area, geometry.clip);
            device.copy_region(
                src.as_ref(),
                source_area,
                blit.dst.as_ref(),
                geometry.clip.x,
                geometry.clip.y,
                geometry.flip,
            )?;
        } else {
            crate::shim_trace!(SOURCE, "Blit as draw {:?} -> {:?}", geometry.src, geometry.dst);
            device.draw_textured_quad(
                src.as_ref(),
                geometry.src,
                blit.dst.as_ref(),
                geometry.dst,
                geometry.clip,
                geometry.flip,
                filter,
            )?;
        }
        device.mark_image_contents_changed(blit.dst.image());
    }
    Ok(())
}

/// Normalize, optionally clip the source to its bounds, and clip the
/// destination to its bounds and the scissor
///
/// Returns `None` when nothing is left to write.
pub(super) fn blit_geometry(region: &BlitRegion, src_bounds: Rect, dst_bounds: Rect, adjust: bool) -> Option<BlitGeometry> {
    let flip = Flip {
        x: region.source.is_reversed_x() != region.destination.is_reversed_x(),
        y: region.source.is_reversed_y() != region.destination.is_reversed_y(),
    };
    let mut src = region.source.normalized();
    let mut dst = region.destination.normalized();
    if src.is_empty() || dst.is_empty() {
        return None;
    }

    if adjust {
        let (sx0, sx1, dx0, dx1) = clip_source_axis(
            (src.x, src.x1()), (dst.x, dst.x1()), (src_bounds.x, src_bounds.x1()), flip.x)?;
        let (sy0, sy1, dy0, dy1) = clip_source_axis(
            (src.y, src.y1()), (dst.y, dst.y1()), (src_bounds.y, src_bounds.y1()), flip.y)?;
        src = Rect::from_corners(sx0, sy0, sx1, sy1);
        dst = Rect::from_corners(dx0, dy0, dx1, dy1);
    }

    let mut clip = dst.intersect(&dst_bounds)?;
    if let Some(scissor) = region.scissor {
        clip = clip.intersect(&scissor)?;
    }

    Some(BlitGeometry { src, dst, clip, flip })
}

/// Clip one axis of the source to `bounds` and shrink the destination by the
/// same proportion (mirrored when flipped)
fn clip_source_axis(
    (s0, s1): (i32, i32),
    (d0, d1): (i32, i32),
    (b0, b1): (i32, i32),
    flip: bool,
) -> Option<(i32, i32, i32, i32)> {
    let c0 = s0.max(b0);
    let c1 = s1.min(b1);
    if c1 <= c0 {
        return None;
    }
    if c0 == s0 && c1 == s1 {
        return Some((s0, s1, d0, d1));
    }

    let scale = (d1 as f64 - d0 as f64) / (s1 as f64 - s0 as f64);
    let low = (c0 as f64 - s0 as f64) * scale;
    let high = (c1 as f64 - s0 as f64) * scale;
    let (n0, n1) = if flip {
        (d1 as f64 - high, d1 as f64 - low)
    } else {
        (d0 as f64 + low, d0 as f64 + high)
    };
    let (n0, n1) = (narrow_coordinate(n0), narrow_coordinate(n1));
    if n1 <= n0 {
        return None;
    }
    Some((c0, c1, n0, n1))
}

fn narrow_coordinate(value: f64) -> i32 {
    value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Source texels feeding `geometry.clip` of an unscaled blit
fn copy_source_area(geometry: &BlitGeometry) -> Rect {
    let offset_x = geometry.clip.x - geometry.dst.x;
    let offset_y = geometry.clip.y - geometry.dst.y;
    let x = if geometry.flip.x {
        geometry.src.x + (geometry.dst.width - offset_x - geometry.clip.width)
    } else {
        geometry.src.x + offset_x
    };
    let y = if geometry.flip.y {
        geometry.src.y + (geometry.dst.height - offset_y - geometry.clip.height)
    } else {
        geometry.src.y + offset_y
    };
    Rect::new(x, y, geometry.clip.width, geometry.clip.height)
}

#[cfg(test)]
#[path = "blit_tests.rs"]
mod tests;
