//! Backend interface
//!
//! The translator never touches image storage itself. Everything it does to
//! pixels goes through a [`Device`], and every attachment it sees is a
//! [`RenderTarget`] produced by a [`RenderTargetResolver`].

mod device;
mod format;
mod render_target;

#[cfg(test)]
pub(crate) mod mock_device;

pub use device::{Device, DeviceCaps, DepthStencilSnapshot, Flip};
pub use format::{TextureFormat, linear_to_srgb, srgb_to_linear};
pub use render_target::{RenderTarget, RenderTargetResolver};
