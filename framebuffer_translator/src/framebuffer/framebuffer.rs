/// Framebuffer - attachment state paired with its translator

use std::sync::{Arc, Mutex};
use glam::Vec2;
use crate::device::{Device, RenderTargetResolver, TextureFormat};
use crate::error::Result;
use crate::features::FeatureRegistry;
use super::{
    Attachment, AttachmentPoint, BlitRegion, ClearParameters, FramebufferState, FramebufferTranslator, ImageKey,
    PixelFormat, PixelPackState, PixelType, Rect,
};

/// A framebuffer object
///
/// State changes go through the methods below so the translator is notified;
/// every operation synchronizes before touching the device.
pub struct Framebuffer {
    state: FramebufferState,
    translator: FramebufferTranslator,
}

impl Framebuffer {
    pub fn new(
        device: Arc<Mutex<dyn Device>>,
        resolver: Arc<dyn RenderTargetResolver>,
        features: Arc<FeatureRegistry>,
    ) -> Self {
        let mut state = FramebufferState::new();
        let translator = FramebufferTranslator::new(&mut state, device, resolver, features);
        Self { state, translator }
    }

    pub fn state(&self) -> &FramebufferState {
        &self.state
    }

    pub fn translator(&self) -> &FramebufferTranslator {
        &self.translator
    }

    // ===== STATE =====

    pub fn attach(&mut self, point: AttachmentPoint, attachment: Attachment) -> Result<()> {
        self.state.attach(point, attachment)
    }

    pub fn detach(&mut self, point: AttachmentPoint) -> Result<()> {
        self.state.detach(point)
    }

    /// Enable color slots by bit
    pub fn set_draw_buffers(&mut self, mask: u8) {
        self.state.set_draw_buffers(mask);
    }

    pub fn set_read_buffer(&mut self, index: Option<u32>) -> Result<()> {
        self.state.set_read_buffer(index)
    }

    /// Storage behind `image` was reallocated
    pub fn on_image_changed(&mut self, image: ImageKey) {
        self.state.on_image_changed(image);
    }

    pub fn sync(&mut self) -> Result<()> {
        self.translator.sync(&mut self.state)
    }

    // ===== OPERATIONS =====

    pub fn clear(&mut self, params: &ClearParameters) -> Result<()> {
        self.translator.clear(&mut self.state, params)
    }

    /// Blit from `source`'s read buffer (and depth/stencil) into this framebuffer
    pub fn blit_from(&mut self, source: &mut Framebuffer, region: &BlitRegion) -> Result<()> {
        self.translator.blit(&mut self.state, &mut source.translator, &mut source.state, region)
    }

    /// Blit within one framebuffer
    pub fn blit_self(&mut self, region: &BlitRegion) -> Result<()> {
        self.translator.blit_within(&mut self.state, region)
    }

    pub fn discard(&mut self, attachments: &[u32]) -> Result<()> {
        self.translator.discard(&mut self.state, attachments)
    }

    pub fn invalidate(&mut self, attachments: &[u32]) -> Result<()> {
        self.translator.invalidate(&mut self.state, attachments)
    }

    pub fn invalidate_sub(&mut self, attachments: &[u32], area: Rect) -> Result<()> {
        self.translator.invalidate_sub(&mut self.state, attachments, area)
    }

    pub fn read_pixels(
        &mut self,
        area: Rect,
        format: PixelFormat,
        ty: PixelType,
        pitch: usize,
        pack: &PixelPackState,
        out: &mut [u8],
    ) -> Result<()> {
        self.translator.read_pixels(&mut self.state, area, format, ty, pitch, pack, out)
    }

    pub fn sample_position(&mut self, index: u32) -> Result<Vec2> {
        self.translator.sample_position(&mut self.state, index)
    }

    pub fn mark_attachments_dirty(&mut self) -> Result<()> {
        self.translator.mark_attachments_dirty(&mut self.state)
    }

    /// Storage format of the image bound at `point`
    pub fn implementation_format(&mut self, point: AttachmentPoint) -> Result<Option<TextureFormat>> {
        self.sync()?;
        Ok(self
            .translator
            .target(point)?
            .map(|target| self.translator.implementation_format(target.as_ref())))
    }
}
