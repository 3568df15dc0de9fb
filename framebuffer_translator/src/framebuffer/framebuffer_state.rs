/// FramebufferState - the attachment source of one logical framebuffer
///
/// Owns the attachment bindings and the draw/read buffer selection. Every
/// mutation sets a dirty bit for each subscribed translator; subscribers
/// drain their bits with `take_dirty_bits`.

use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use super::{Attachment, AttachmentPoint, DirtyBits, ImageKey, MAX_COLOR_ATTACHMENTS};

new_key_type! {
    /// Handle of one subscriber of a `FramebufferState`
    pub struct SubscriptionKey;
}

/// Attachment bindings of a logical framebuffer
pub struct FramebufferState {
    color_attachments: [Option<Attachment>; MAX_COLOR_ATTACHMENTS],
    depth_stencil_attachment: Option<Attachment>,
    /// Bit i = color slot i is written by draws and clears
    draw_buffers: u8,
    read_buffer: Option<u8>,
    subscribers: SlotMap<SubscriptionKey, DirtyBits>,
}

impl FramebufferState {
    /// Unattached framebuffer; draw buffer 0 enabled, read buffer 0
    pub fn new() -> Self {
        Self {
            color_attachments: [None; MAX_COLOR_ATTACHMENTS],
            depth_stencil_attachment: None,
            draw_buffers: 0b1,
            read_buffer: Some(0),
            subscribers: SlotMap::with_key(),
        }
    }

    // ===== SUBSCRIPTION =====

    /// Register an observer; it starts with every bit dirty
    pub fn subscribe(&mut self) -> SubscriptionKey {
        self.subscribers.insert(DirtyBits::all())
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.remove(key).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Bits changed since the last call for this subscriber; clears them
    pub fn take_dirty_bits(&mut self, key: SubscriptionKey) -> DirtyBits {
        self.subscribers
            .get_mut(key)
            .map(|bits| std::mem::replace(bits, DirtyBits::empty()))
            .unwrap_or(DirtyBits::empty())
    }

    /// Bits pending for this subscriber, without clearing them
    pub fn dirty_bits(&self, key: SubscriptionKey) -> DirtyBits {
        self.subscribers.get(key).copied().unwrap_or(DirtyBits::empty())
    }

    fn notify(&mut self, bits: DirtyBits) {
        for pending in self.subscribers.values_mut() {
            *pending |= bits;
        }
    }

    // ===== MUTATIONS =====

    /// Bind `attachment` to `point`, replacing any previous binding
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a color index past the slot count.
    pub fn attach(&mut self, point: AttachmentPoint, attachment: Attachment) -> Result<()> {
        *self.slot_mut(point)? = Some(attachment);
        self.notify(DirtyBits::for_point(point));
        Ok(())
    }

    /// Unbind `point`
    pub fn detach(&mut self, point: AttachmentPoint) -> Result<()> {
        *self.slot_mut(point)? = None;
        self.notify(DirtyBits::for_point(point));
        Ok(())
    }

    /// Select which color slots draws and clears write (bit i = slot i)
    pub fn set_draw_buffers(&mut self, mask: u8) {
        self.draw_buffers = mask;
        self.notify(DirtyBits::DRAW_BUFFERS);
    }

    /// Select the color slot readback and blit read from (`None` = no read buffer)
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `index >= MAX_COLOR_ATTACHMENTS`.
    pub fn set_read_buffer(&mut self, index: Option<u32>) -> Result<()> {
        let read_buffer = match index {
            Some(index) if index as usize >= MAX_COLOR_ATTACHMENTS => {
                crate::shim_bail!("fbt::FramebufferState", Error::OutOfRange(format!(
                    "Read buffer {} exceeds the {} color slots", index, MAX_COLOR_ATTACHMENTS)));
            }
            Some(index) => Some(index as u8),
            None => None,
        };
        self.read_buffer = read_buffer;
        self.notify(DirtyBits::READ_BUFFER);
        Ok(())
    }

    /// Report that the storage of `image` changed (respecified or deleted)
    ///
    /// Every point bound to the image is marked dirty.
    pub fn on_image_changed(&mut self, image: ImageKey) {
        let bits = AttachmentPoint::all()
            .filter(|&point| self.attachment(point).is_some_and(|attachment| attachment.image == image))
            .fold(DirtyBits::empty(), |bits, point| bits | DirtyBits::for_point(point));
        if !bits.is_empty() {
            self.notify(bits);
        }
    }

    // ===== QUERIES =====

    pub fn attachment(&self, point: AttachmentPoint) -> Option<&Attachment> {
        match point {
            AttachmentPoint::Color(index) => self.color_attachments.get(index as usize)?.as_ref(),
            AttachmentPoint::DepthStencil => self.depth_stencil_attachment.as_ref(),
        }
    }

    /// Points with an attachment bound, ascending
    pub fn bound_points(&self) -> impl Iterator<Item = AttachmentPoint> + '_ {
        AttachmentPoint::all().filter(|&point| self.attachment(point).is_some())
    }

    pub fn draw_buffers(&self) -> u8 {
        self.draw_buffers
    }

    pub fn draw_buffer_enabled(&self, index: u8) -> bool {
        index < 8 && self.draw_buffers & (1 << index) != 0
    }

    pub fn read_buffer(&self) -> Option<u8> {
        self.read_buffer
    }

    fn slot_mut(&mut self, point: AttachmentPoint) -> Result<&mut Option<Attachment>> {
        match point {
            AttachmentPoint::Color(index) => match self.color_attachments.get_mut(index as usize) {
                Some(slot) => Ok(slot),
                None => Err(crate::shim_err!("fbt::FramebufferState", Error::OutOfRange(format!(
                    "Color attachment {} exceeds the {} available slots", index, MAX_COLOR_ATTACHMENTS)))),
            },
            AttachmentPoint::DepthStencil => Ok(&mut self.depth_stencil_attachment),
        }
    }
}

impl Default for FramebufferState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "framebuffer_state_tests.rs"]
mod tests;
