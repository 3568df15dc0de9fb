/// Pixel readback
///
/// Storage texels are decoded to RGBA, swizzled and encoded into the caller's
/// buffer following the pack state. sRGB values are returned encoded.

use std::sync::Arc;
use crate::device::RenderTarget;
use crate::error::{Error, Result};
use super::translator::SOURCE;
use super::{
    encode_pixel, pixel_size, FramebufferState, FramebufferTranslator, PackLayout, PixelFormat, PixelPackState,
    PixelType, Rect,
};

impl FramebufferTranslator {
    /// Read `area` of the read buffer into `out`
    ///
    /// `pitch > 0` overrides the row pitch derived from `pack`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` without a color read buffer
    /// - `InvalidRectangle` for a negative size, an area past the target
    ///   bounds, or an `out` buffer too small for the packed rectangle
    /// - `OutOfRange` for an invalid pack alignment
    #[allow(clippy::too_many_arguments)]
    pub fn read_pixels(
        &mut self,
        state: &mut FramebufferState,
        area: Rect,
        format: PixelFormat,
        ty: PixelType,
        pitch: usize,
        pack: &PixelPackState,
        out: &mut [u8],
    ) -> Result<()> {
        self.sync(state)?;

        let Some(target) = self.read_target()? else {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(
                "Readback from a framebuffer without a color read buffer".to_string()));
        };
        if !target.format().is_color() {
            crate::shim_bail!(SOURCE, Error::UnsupportedOperation(format!(
                "Readback of {:?} is not supported", target.format())));
        }

        if area.width < 0 || area.height < 0 {
            crate::shim_bail!(SOURCE, Error::InvalidRectangle(format!(
                "Readback area {}x{} has a negative size", area.width, area.height)));
        }
        if area.is_empty() {
            return Ok(());
        }
        if !target.bounds().contains(&area) {
            crate::shim_bail!(SOURCE, Error::InvalidRectangle(format!(
                "Readback area {:?} exceeds {}x{}", area, target.width(), target.height())));
        }

        let layout = PackLayout::new(
            area.width as usize,
            area.height as usize,
            pixel_size(format, ty),
            pitch,
            pack,
        )?;
        if out.len() < layout.required_size() {
            crate::shim_bail!(SOURCE, Error::InvalidRectangle(format!(
                "Readback needs {} bytes, buffer holds {}", layout.required_size(), out.len())));
        }

        let mut device = self.lock_device()?;
        let resolved: Arc<dyn RenderTarget>;
        let source: &dyn RenderTarget = if target.samples() > 1 {
            resolved = device.create_resolve_target(target.as_ref())?;
            device.resolve_subresource(target.as_ref(), resolved.as_ref())?;
            resolved.as_ref()
        } else {
            target.as_ref()
        };

        let texels = device.read_pixels(source, area)?;
        drop(device);

        let storage = source.storage_format();
        let texel_size = storage.bytes_per_pixel();
        let width = area.width as usize;
        let keep_alpha = target.format().has_alpha();
        if texels.len() < area.area() * texel_size {
            crate::shim_bail!(SOURCE, Error::BackendError(format!(
                "Backend returned {} bytes for {:?}", texels.len(), area)));
        }

        for row in 0..layout.rows {
            let dst_row = if pack.reverse_row_order { layout.rows - 1 - row } else { row };
            let row_start = layout.row_offset(dst_row);
            for column in 0..width {
                let offset = (row * width + column) * texel_size;
                let mut rgba = storage.decode_color(&texels[offset..offset + texel_size]);
                if !keep_alpha {
                    rgba.w = 1.0;
                }
                let pixel = row_start + column * layout.pixel_size;
                encode_pixel(rgba, format, ty, &mut out[pixel..pixel + layout.pixel_size]);
            }
        }

        crate::shim_trace!(SOURCE, "Read {:?} as {:?}/{:?}", area, format, ty);
        Ok(())
    }
}

#[cfg(test)]
#[path = "read_pixels_tests.rs"]
mod tests;
