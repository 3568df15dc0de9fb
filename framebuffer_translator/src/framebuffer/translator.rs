/// FramebufferTranslator - render-target cache and operation lowering
///
/// One translator per logical framebuffer. It subscribes to the
/// framebuffer's `FramebufferState` at construction and resynchronizes its
/// cache from the pending dirty bits before every operation. The operations
/// themselves live in `clear.rs`, `blit.rs`, `invalidate.rs` and
/// `read_pixels.rs`.

use std::sync::{Arc, Mutex, MutexGuard};
use glam::Vec2;
use crate::device::{Device, RenderTarget, RenderTargetResolver, TextureFormat};
use crate::error::{Error, Result};
use crate::features::{Feature, FeatureRegistry};
use super::{
    normalized_position, standard_sample_positions, AttachmentPoint, DirtyBits, FramebufferState,
    RenderTargetCache, SubscriptionKey, MAX_COLOR_ATTACHMENTS,
};

pub(super) const SOURCE: &str = "fbt::FramebufferTranslator";

pub struct FramebufferTranslator {
    subscription: SubscriptionKey,
    device: Arc<Mutex<dyn Device>>,
    resolver: Arc<dyn RenderTargetResolver>,
    features: Arc<FeatureRegistry>,
    render_targets: RenderTargetCache,
    /// Bits of a failed sync, retried by the next one
    pending_dirty_bits: DirtyBits,
    draw_buffers: u8,
    read_buffer: Option<u8>,
}

impl FramebufferTranslator {
    /// Create a translator observing `state`
    ///
    /// The cache starts empty; the first sync resolves every bound attachment.
    pub fn new(
        state: &mut FramebufferState,
        device: Arc<Mutex<dyn Device>>,
        resolver: Arc<dyn RenderTargetResolver>,
        features: Arc<FeatureRegistry>,
    ) -> Self {
        Self {
            subscription: state.subscribe(),
            device,
            resolver,
            features,
            render_targets: RenderTargetCache::new(),
            pending_dirty_bits: DirtyBits::empty(),
            draw_buffers: 0,
            read_buffer: None,
        }
    }

    /// Stop observing `state`
    pub fn destroy(self, state: &mut FramebufferState) {
        state.unsubscribe(self.subscription);
    }

    pub fn subscription(&self) -> SubscriptionKey {
        self.subscription
    }

    pub fn features(&self) -> &Arc<FeatureRegistry> {
        &self.features
    }

    // ===== SYNCHRONIZATION =====

    /// Bring the cache up to date for `dirty_bits`
    ///
    /// Re-resolves exactly the named slots (plus any left pending by an
    /// earlier failure). Issues no device calls. On failure every bit is kept
    /// pending and the error is returned.
    pub fn sync_state(&mut self, state: &FramebufferState, dirty_bits: DirtyBits) -> Result<()> {
        let dirty = self.pending_dirty_bits | dirty_bits;
        if dirty.is_empty() {
            return Ok(());
        }

        if let Err(error) = self.render_targets.update(state, self.resolver.as_ref(), dirty) {
            self.pending_dirty_bits = dirty;
            return Err(error);
        }

        if dirty.contains(DirtyBits::DRAW_BUFFERS) {
            self.draw_buffers = state.draw_buffers();
        }
        if dirty.contains(DirtyBits::READ_BUFFER) {
            self.read_buffer = state.read_buffer();
        }
        self.pending_dirty_bits = DirtyBits::empty();

        crate::shim_trace!(SOURCE, "Synchronized {:?}", dirty);
        Ok(())
    }

    /// Drain this translator's bits from `state` and sync
    pub fn sync(&mut self, state: &mut FramebufferState) -> Result<()> {
        let dirty_bits = state.take_dirty_bits(self.subscription);
        self.sync_state(state, dirty_bits)
    }

    // ===== CACHE ACCESSORS =====

    pub fn cached_color_targets(&self) -> [Option<Arc<dyn RenderTarget>>; MAX_COLOR_ATTACHMENTS] {
        self.render_targets.color_targets()
    }

    pub fn cached_depth_stencil_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.render_targets.depth_stencil_target()
    }

    /// First bound color target, else the depth-stencil target
    pub fn first_render_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.render_targets.first().ok().flatten()
    }

    /// Storage format the backend uses for `target`
    pub fn implementation_format(&self, target: &dyn RenderTarget) -> TextureFormat {
        target.storage_format()
    }

    // ===== QUERIES =====

    /// Tell the device the contents of every bound attachment changed
    pub fn mark_attachments_dirty(&mut self, state: &mut FramebufferState) -> Result<()> {
        self.sync(state)?;
        let targets = self.bound_targets()?;
        let mut device = self.lock_device()?;
        for target in targets {
            device.mark_image_contents_changed(target.image());
        }
        Ok(())
    }

    /// Standard position of sample `index` of the framebuffer, in `[0, 1)`
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` when nothing is attached or the framebuffer is
    /// single-sampled, `OutOfRange` when `index` is not below the sample count.
    pub fn sample_position(&mut self, state: &mut FramebufferState, index: u32) -> Result<Vec2> {
        self.sync(state)?;

        let target = match self.render_targets.first()? {
            Some(target) => target,
            None => crate::shim_bail!(SOURCE,
                Error::UnsupportedOperation("Sample position query on an unattached framebuffer".to_string())),
        };

        let samples = target.samples();
        if samples <= 1 {
            crate::shim_bail!(SOURCE,
                Error::UnsupportedOperation("Sample position query on a single-sampled framebuffer".to_string()));
        }
        if index >= samples {
            crate::shim_bail!(SOURCE,
                Error::OutOfRange(format!("Sample {} of a {}-sample framebuffer", index, samples)));
        }

        match standard_sample_positions(samples) {
            Some(table) => Ok(normalized_position(table[index as usize])),
            None => Err(crate::shim_err!(SOURCE,
                Error::UnsupportedOperation(format!("No standard positions for {} samples", samples)))),
        }
    }

    // ===== HELPERS FOR THE OPERATIONS =====

    pub(super) fn is_enabled(&self, feature: Feature) -> bool {
        self.features.is_feature_enabled(feature)
    }

    pub(super) fn lock_device(&self) -> Result<MutexGuard<'_, dyn Device + 'static>> {
        self.device.lock().map_err(|_| {
            crate::shim_err!(SOURCE, Error::BackendError("Device lock poisoned".to_string()))
        })
    }

    pub(super) fn target(&self, point: AttachmentPoint) -> Result<Option<Arc<dyn RenderTarget>>> {
        self.render_targets.target(point)
    }

    /// Bound color targets enabled in the draw-buffer mask
    pub(super) fn draw_targets(&self) -> Result<Vec<(u8, Arc<dyn RenderTarget>)>> {
        let mut targets = Vec::new();
        for index in 0..MAX_COLOR_ATTACHMENTS as u8 {
            if self.draw_buffers & (1 << index) == 0 {
                continue;
            }
            if let Some(target) = self.target(AttachmentPoint::Color(index))? {
                targets.push((index, target));
            }
        }
        Ok(targets)
    }

    /// Color target of the read buffer
    pub(super) fn read_target(&self) -> Result<Option<Arc<dyn RenderTarget>>> {
        match self.read_buffer {
            Some(index) => self.target(AttachmentPoint::Color(index)),
            None => Ok(None),
        }
    }

    pub(super) fn bound_targets(&self) -> Result<Vec<Arc<dyn RenderTarget>>> {
        let mut targets = Vec::new();
        for point in AttachmentPoint::all() {
            if let Some(target) = self.target(point)? {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}

#[cfg(test)]
#[path = "translator_tests.rs"]
mod tests;
