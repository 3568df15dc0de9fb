/// Render-target views and their resolver

use std::sync::Arc;
use crate::error::Result;
use crate::framebuffer::{Attachment, ImageKey, Rect};
use super::TextureFormat;

/// Backend view through which the device writes one image subresource
pub trait RenderTarget: Send + Sync {
    /// Image the view belongs to
    fn image(&self) -> ImageKey;

    /// Mip level of the view
    fn level(&self) -> u32;

    /// Array layer of the view
    fn layer(&self) -> u32;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Samples per pixel (1 = single-sampled)
    fn samples(&self) -> u32;

    /// Format the portable API asked for
    fn format(&self) -> TextureFormat;

    /// Format the backend actually stores
    fn storage_format(&self) -> TextureFormat;

    /// Whole-surface rectangle
    fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }
}

/// Produces render-target views for attachments
///
/// Implementations own the views they return (typically memoized per
/// subresource). Callers may keep only weak references.
pub trait RenderTargetResolver: Send + Sync {
    /// View of `attachment`, created on first request
    ///
    /// # Errors
    ///
    /// `ResourceResolutionFailure` when the image no longer exists or its
    /// format cannot be rendered to.
    fn resolve(&self, attachment: &Attachment) -> Result<Arc<dyn RenderTarget>>;
}
