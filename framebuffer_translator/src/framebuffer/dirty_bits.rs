/// Dirty bits - which parts of a framebuffer changed since the last sync

use bitflags::bitflags;
use super::AttachmentPoint;

bitflags! {
    /// One bit per attachment point plus the draw/read buffer selections
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyBits: u16 {
        const COLOR_ATTACHMENT_0 = 1 << 0;
        const COLOR_ATTACHMENT_1 = 1 << 1;
        const COLOR_ATTACHMENT_2 = 1 << 2;
        const COLOR_ATTACHMENT_3 = 1 << 3;
        const COLOR_ATTACHMENT_4 = 1 << 4;
        const COLOR_ATTACHMENT_5 = 1 << 5;
        const COLOR_ATTACHMENT_6 = 1 << 6;
        const COLOR_ATTACHMENT_7 = 1 << 7;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 8;
        const DRAW_BUFFERS = 1 << 9;
        const READ_BUFFER = 1 << 10;

        /// Every attachment slot
        const ATTACHMENTS = 0x01FF;
    }
}

impl DirtyBits {
    /// Bit of one attachment point
    pub fn for_point(point: AttachmentPoint) -> Self {
        Self::from_bits_truncate(1 << point.slot_index())
    }

    /// Attachment points named by the set, ascending
    pub fn points(self) -> impl Iterator<Item = AttachmentPoint> {
        AttachmentPoint::all().filter(move |&point| self.contains(Self::for_point(point)))
    }
}

#[cfg(test)]
#[path = "dirty_bits_tests.rs"]
mod tests;
