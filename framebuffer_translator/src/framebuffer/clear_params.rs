/// Clear request parameters

use bitflags::bitflags;
use glam::Vec4;
use super::{Rect, MAX_COLOR_ATTACHMENTS};

bitflags! {
    /// Color channel write mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorMask: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const RGB = Self::R.bits() | Self::G.bits() | Self::B.bits();
        const ALL = Self::RGB.bits() | Self::A.bits();
    }
}

impl ColorMask {
    /// Whether channel `index` (0 = R .. 3 = A) is writable
    pub fn channel(self, index: usize) -> bool {
        self.bits() & (1 << index) != 0
    }
}

/// One clear request
///
/// A color slot with an empty mask is not cleared. Depth and stencil are
/// cleared only when their flag is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearParameters {
    pub color_masks: [ColorMask; MAX_COLOR_ATTACHMENTS],
    pub color_value: Vec4,
    pub clear_depth: bool,
    pub depth_value: f32,
    pub clear_stencil: bool,
    pub stencil_value: u8,
    pub stencil_write_mask: u8,
    pub scissor: Option<Rect>,
}

impl Default for ClearParameters {
    fn default() -> Self {
        Self {
            color_masks: [ColorMask::empty(); MAX_COLOR_ATTACHMENTS],
            color_value: Vec4::ZERO,
            clear_depth: false,
            depth_value: 1.0,
            clear_stencil: false,
            stencil_value: 0,
            stencil_write_mask: 0xFF,
            scissor: None,
        }
    }
}

impl ClearParameters {
    /// Clear every color slot to `value` with a full mask
    pub fn color(value: Vec4) -> Self {
        Self {
            color_masks: [ColorMask::ALL; MAX_COLOR_ATTACHMENTS],
            color_value: value,
            ..Self::default()
        }
    }

    /// Same mask on every color slot
    pub fn with_color_mask(mut self, mask: ColorMask) -> Self {
        self.color_masks = [mask; MAX_COLOR_ATTACHMENTS];
        self
    }

    /// Mask of one color slot
    pub fn with_attachment_mask(mut self, index: usize, mask: ColorMask) -> Self {
        if let Some(slot) = self.color_masks.get_mut(index) {
            *slot = mask;
        }
        self
    }

    pub fn with_depth(mut self, value: f32) -> Self {
        self.clear_depth = true;
        self.depth_value = value;
        self
    }

    pub fn with_stencil(mut self, value: u8) -> Self {
        self.clear_stencil = true;
        self.stencil_value = value;
        self
    }

    pub fn with_stencil_write_mask(mut self, mask: u8) -> Self {
        self.stencil_write_mask = mask;
        self
    }

    pub fn with_scissor(mut self, scissor: Rect) -> Self {
        self.scissor = Some(scissor);
        self
    }

    /// Whether any color slot has a non-empty mask
    pub fn clears_color(&self) -> bool {
        self.color_masks.iter().any(|mask| !mask.is_empty())
    }

    /// Whether any plane at all is requested
    pub fn clears_anything(&self) -> bool {
        self.clears_color() || self.clear_depth || self.clear_stencil
    }
}
