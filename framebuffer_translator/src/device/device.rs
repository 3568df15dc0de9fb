/// Device trait - backend command surface used by the translator

use std::sync::Arc;
use glam::Vec4;
use crate::error::Result;
use crate::framebuffer::{ColorMask, Filter, ImageKey, Planes, Rect};
use super::RenderTarget;

/// Backend capability matrix
///
/// Decides which emulation path an operation takes. `Default` describes a
/// backend supporting everything natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCaps {
    /// Per-attachment color write masks on clears
    pub supports_independent_color_masks: bool,
    /// Clearing depth or stencil alone on a combined surface
    pub supports_separate_depth_stencil_clear: bool,
    /// Blitting depth or stencil alone on a combined surface
    pub supports_partial_depth_stencil_blit: bool,
    /// Native content-undefined hint (`discard_view`)
    pub supports_discard_hint: bool,
    /// `copy_region` accepts flip flags
    pub supports_flipped_copy: bool,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            supports_independent_color_masks: true,
            supports_separate_depth_stencil_clear: true,
            supports_partial_depth_stencil_blit: true,
            supports_discard_hint: true,
            supports_flipped_copy: true,
        }
    }
}

impl DeviceCaps {
    /// Backend without any optional capability
    pub fn minimal() -> Self {
        Self {
            supports_independent_color_masks: false,
            supports_separate_depth_stencil_clear: false,
            supports_partial_depth_stencil_blit: false,
            supports_discard_hint: false,
            supports_flipped_copy: false,
        }
    }
}

/// Mirror flags of a copy or draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

impl Flip {
    pub const NONE: Flip = Flip { x: false, y: false };

    pub fn is_none(self) -> bool {
        !self.x && !self.y
    }
}

/// Saved rectangle of depth and/or stencil values
///
/// Values are stored row-major over `area`, samples innermost.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthStencilSnapshot {
    pub area: Rect,
    pub samples: u32,
    pub depth: Option<Vec<f32>>,
    pub stencil: Option<Vec<u8>>,
}

impl DepthStencilSnapshot {
    /// Overwrite the bits of `mask` in every stencil value with `value`
    pub fn merge_stencil(&mut self, value: u8, mask: u8) {
        if let Some(stencil) = self.stencil.as_mut() {
            for old in stencil.iter_mut() {
                *old = (*old & !mask) | (value & mask);
            }
        }
    }

    /// Planes the snapshot holds
    pub fn planes(&self) -> Planes {
        let mut planes = Planes::empty();
        if self.depth.is_some() {
            planes |= Planes::DEPTH;
        }
        if self.stencil.is_some() {
            planes |= Planes::STENCIL;
        }
        planes
    }
}

/// Backend command surface
///
/// All rectangles are normalized and lie inside the target bounds unless
/// stated otherwise. Texel data exchanged through `read_pixels` /
/// `write_pixels` is tightly packed in the target's storage format. Clear
/// colors are linear; a backend encodes them when the storage is sRGB.
pub trait Device: Send {
    /// Capability matrix of this backend
    fn caps(&self) -> DeviceCaps;

    /// Clear all channels of `area`
    fn clear_render_target(&mut self, target: &dyn RenderTarget, color: Vec4, area: Rect) -> Result<()>;

    /// Clear the channels of `mask` natively (`supports_independent_color_masks`)
    fn clear_render_target_masked(
        &mut self,
        target: &dyn RenderTarget,
        color: Vec4,
        mask: ColorMask,
        area: Rect,
    ) -> Result<()>;

    /// Clear the channels of `mask` with a full-screen draw
    fn draw_clear(&mut self, target: &dyn RenderTarget, color: Vec4, mask: ColorMask, area: Rect) -> Result<()>;

    /// Clear the given planes; `None` leaves a plane alone
    fn clear_depth_stencil(
        &mut self,
        target: &dyn RenderTarget,
        depth: Option<f32>,
        stencil: Option<u8>,
        area: Rect,
    ) -> Result<()>;

    /// Save `planes` of `area`
    fn read_depth_stencil(&mut self, target: &dyn RenderTarget, area: Rect, planes: Planes) -> Result<DepthStencilSnapshot>;

    /// Restore a snapshot taken by `read_depth_stencil`
    fn write_depth_stencil(&mut self, target: &dyn RenderTarget, snapshot: &DepthStencilSnapshot) -> Result<()>;

    /// Read texels of a single-sampled target
    fn read_pixels(&mut self, target: &dyn RenderTarget, area: Rect) -> Result<Vec<u8>>;

    /// Write texels of a single-sampled target
    fn write_pixels(&mut self, target: &dyn RenderTarget, area: Rect, data: &[u8]) -> Result<()>;

    /// Unscaled copy of `src_area` to (`dst_x`, `dst_y`)
    fn copy_region(
        &mut self,
        src: &dyn RenderTarget,
        src_area: Rect,
        dst: &dyn RenderTarget,
        dst_x: i32,
        dst_y: i32,
        flip: Flip,
    ) -> Result<()>;

    /// Textured draw mapping `src_area` onto `dst_area`
    ///
    /// Only pixels inside `clip` are written. `src_area` may extend past the
    /// source bounds; such texels read as the clamped edge.
    #[allow(clippy::too_many_arguments)]
    fn draw_textured_quad(
        &mut self,
        src: &dyn RenderTarget,
        src_area: Rect,
        dst: &dyn RenderTarget,
        dst_area: Rect,
        clip: Rect,
        flip: Flip,
        filter: Filter,
    ) -> Result<()>;

    /// Nearest-filtered depth/stencil blit of `planes`
    #[allow(clippy::too_many_arguments)]
    fn blit_depth_stencil(
        &mut self,
        src: &dyn RenderTarget,
        src_area: Rect,
        dst: &dyn RenderTarget,
        dst_area: Rect,
        clip: Rect,
        flip: Flip,
        planes: Planes,
    ) -> Result<()>;

    /// Single-sampled temporary matching `src` in size and format
    fn create_resolve_target(&mut self, src: &dyn RenderTarget) -> Result<Arc<dyn RenderTarget>>;

    /// Average the samples of `src` into `dst`
    fn resolve_subresource(&mut self, src: &dyn RenderTarget, dst: &dyn RenderTarget) -> Result<()>;

    /// Mark contents of `area` (whole target when `None`) undefined
    fn discard_view(&mut self, target: &dyn RenderTarget, area: Option<Rect>) -> Result<()>;

    /// Drop backend state derived from the contents of `image`
    fn mark_image_contents_changed(&mut self, image: ImageKey);
}
