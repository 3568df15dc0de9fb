/// RenderTargetCache - one resolved view per attachment slot
///
/// Slots hold weak references; the resolver owns the views. The cache is a
/// memoized lookup that can be rebuilt from the attachment source at any time.

use std::sync::{Arc, Weak};
use crate::device::{RenderTarget, RenderTargetResolver};
use crate::error::{Error, Result};
use super::{AttachmentPoint, DirtyBits, FramebufferState, ATTACHMENT_SLOT_COUNT, MAX_COLOR_ATTACHMENTS};

pub struct RenderTargetCache {
    slots: [Option<Weak<dyn RenderTarget>>; ATTACHMENT_SLOT_COUNT],
}

impl RenderTargetCache {
    pub fn new() -> Self {
        Self { slots: Default::default() }
    }

    /// Re-resolve the slots named in `dirty` from `state`
    ///
    /// All-or-nothing: every dirty slot is resolved before any slot is
    /// written. On failure only the failing slot changes (it is emptied).
    pub fn update(
        &mut self,
        state: &FramebufferState,
        resolver: &dyn RenderTargetResolver,
        dirty: DirtyBits,
    ) -> Result<()> {
        let mut staged: Vec<(AttachmentPoint, Option<Arc<dyn RenderTarget>>)> = Vec::new();

        for point in dirty.points() {
            let target = match state.attachment(point) {
                None => None,
                Some(attachment) => match resolver.resolve(attachment) {
                    Ok(target) => Some(target),
                    Err(error) => {
                        self.slots[point.slot_index()] = None;
                        let message = match error {
                            Error::ResourceResolutionFailure(message) => message,
                            other => other.to_string(),
                        };
                        crate::shim_bail!("fbt::RenderTargetCache", Error::ResourceResolutionFailure(
                            format!("{:?}: {}", point, message)));
                    }
                },
            };
            staged.push((point, target));
        }

        for (point, target) in staged {
            self.slots[point.slot_index()] = target.as_ref().map(Arc::downgrade);
        }
        Ok(())
    }

    /// Live view of `point`
    ///
    /// # Errors
    ///
    /// `ResourceResolutionFailure` when the slot refers to a view that no
    /// longer exists.
    pub fn target(&self, point: AttachmentPoint) -> Result<Option<Arc<dyn RenderTarget>>> {
        match &self.slots[point.slot_index()] {
            None => Ok(None),
            Some(weak) => match weak.upgrade() {
                Some(target) => Ok(Some(target)),
                None => Err(crate::shim_err!("fbt::RenderTargetCache", Error::ResourceResolutionFailure(
                    format!("{:?}: render target was released", point)))),
            },
        }
    }

    /// Snapshot of the color slots (released views read as empty)
    pub fn color_targets(&self) -> [Option<Arc<dyn RenderTarget>>; MAX_COLOR_ATTACHMENTS] {
        std::array::from_fn(|index| self.slots[index].as_ref().and_then(Weak::upgrade))
    }

    /// Snapshot of the depth-stencil slot
    pub fn depth_stencil_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.slots[AttachmentPoint::DepthStencil.slot_index()].as_ref().and_then(Weak::upgrade)
    }

    /// First bound color slot, else the depth-stencil slot
    pub fn first(&self) -> Result<Option<Arc<dyn RenderTarget>>> {
        for point in AttachmentPoint::all() {
            if let Some(target) = self.target(point)? {
                return Ok(Some(target));
            }
        }
        Ok(None)
    }

    /// Whether `point` holds a view
    pub fn is_bound(&self, point: AttachmentPoint) -> bool {
        self.slots[point.slot_index()].is_some()
    }
}

impl Default for RenderTargetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_target_cache_tests.rs"]
mod tests;
