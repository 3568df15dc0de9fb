/// Attachment points, attachment bindings and portable attachment enums

use slotmap::new_key_type;
use crate::error::{Error, Result};
use super::Planes;

new_key_type! {
    /// Handle to an image owned by the resource manager
    pub struct ImageKey;
}

/// Number of color attachment slots
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// Render-target cache size (color slots + depth-stencil)
pub const ATTACHMENT_SLOT_COUNT: usize = MAX_COLOR_ATTACHMENTS + 1;

/// Portable-API attachment enums
pub mod gl {
    pub const COLOR_ATTACHMENT0: u32 = 0x8CE0;
    /// Last color attachment enum the portable API defines
    pub const COLOR_ATTACHMENT31: u32 = 0x8CFF;
    pub const DEPTH_ATTACHMENT: u32 = 0x8D00;
    pub const STENCIL_ATTACHMENT: u32 = 0x8D20;
    pub const DEPTH_STENCIL_ATTACHMENT: u32 = 0x821A;

    // Default-framebuffer names, accepted by the legacy EXT discard entry point
    pub const COLOR_EXT: u32 = 0x1800;
    pub const DEPTH_EXT: u32 = 0x1801;
    pub const STENCIL_EXT: u32 = 0x1802;
}

/// Slot of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachmentPoint {
    Color(u8),
    DepthStencil,
}

impl AttachmentPoint {
    /// Color slot `index`
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `index >= MAX_COLOR_ATTACHMENTS`.
    pub fn color(index: u32) -> Result<Self> {
        if index as usize >= MAX_COLOR_ATTACHMENTS {
            crate::shim_bail!("fbt::AttachmentPoint", Error::OutOfRange(format!(
                "Color attachment {} exceeds the {} available slots", index, MAX_COLOR_ATTACHMENTS)));
        }
        Ok(AttachmentPoint::Color(index as u8))
    }

    /// Position in the render-target cache
    pub fn slot_index(self) -> usize {
        match self {
            AttachmentPoint::Color(index) => index as usize,
            AttachmentPoint::DepthStencil => MAX_COLOR_ATTACHMENTS,
        }
    }

    /// Every point, colors first in ascending order
    pub fn all() -> impl Iterator<Item = AttachmentPoint> {
        (0..MAX_COLOR_ATTACHMENTS as u8)
            .map(AttachmentPoint::Color)
            .chain(std::iter::once(AttachmentPoint::DepthStencil))
    }
}

/// Image subresource bound to an attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attachment {
    pub image: ImageKey,
    pub level: u32,
    pub layer: u32,
}

impl Attachment {
    /// Level 0, layer 0 of `image`
    pub fn new(image: ImageKey) -> Self {
        Self { image, level: 0, layer: 0 }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }
}

/// Attachment named by an invalidate/discard request
///
/// Depth and stencil are distinct names that both live in the
/// depth-stencil slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentName {
    Color(u8),
    Depth,
    Stencil,
    DepthStencil,
}

impl AttachmentName {
    /// Parse a portable-API attachment enum
    ///
    /// With `use_ext_behavior` the default-framebuffer names (`COLOR_EXT`,
    /// `DEPTH_EXT`, `STENCIL_EXT`) are accepted as well.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for color attachments past the slot count,
    /// `InvalidAttachment` for anything that is not an attachment enum.
    pub fn from_enum(value: u32, use_ext_behavior: bool) -> Result<Self> {
        match value {
            gl::COLOR_ATTACHMENT0..=gl::COLOR_ATTACHMENT31 => {
                let index = value - gl::COLOR_ATTACHMENT0;
                AttachmentPoint::color(index)?;
                Ok(AttachmentName::Color(index as u8))
            }
            gl::DEPTH_ATTACHMENT => Ok(AttachmentName::Depth),
            gl::STENCIL_ATTACHMENT => Ok(AttachmentName::Stencil),
            gl::DEPTH_STENCIL_ATTACHMENT => Ok(AttachmentName::DepthStencil),
            gl::COLOR_EXT if use_ext_behavior => Ok(AttachmentName::Color(0)),
            gl::DEPTH_EXT if use_ext_behavior => Ok(AttachmentName::Depth),
            gl::STENCIL_EXT if use_ext_behavior => Ok(AttachmentName::Stencil),
            _ => Err(crate::shim_err!("fbt::AttachmentName",
                Error::InvalidAttachment(format!("0x{:04X} is not an attachment enum", value)))),
        }
    }

    /// Slot the name refers to
    pub fn point(self) -> AttachmentPoint {
        match self {
            AttachmentName::Color(index) => AttachmentPoint::Color(index),
            _ => AttachmentPoint::DepthStencil,
        }
    }

    /// Planes the name refers to
    pub fn planes(self) -> Planes {
        match self {
            AttachmentName::Color(_) => Planes::COLOR,
            AttachmentName::Depth => Planes::DEPTH,
            AttachmentName::Stencil => Planes::STENCIL,
            AttachmentName::DepthStencil => Planes::DEPTH_STENCIL,
        }
    }
}

#[cfg(test)]
#[path = "attachment_tests.rs"]
mod tests;
