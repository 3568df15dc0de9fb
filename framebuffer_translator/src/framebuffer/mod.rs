//! Framebuffer translation
//!
//! A [`Framebuffer`] pairs the portable-API attachment state
//! ([`FramebufferState`]) with its [`FramebufferTranslator`], which keeps a
//! [`RenderTargetCache`] in sync through [`DirtyBits`] and lowers clears,
//! blits, invalidates, readbacks and sample-position queries onto a
//! [`Device`](crate::device::Device).

mod attachment;
mod blit;
mod blit_region;
mod clear;
mod clear_params;
mod dirty_bits;
mod framebuffer;
mod framebuffer_state;
mod invalidate;
mod pixel_pack;
mod planes;
mod read_pixels;
mod rect;
mod render_target_cache;
mod sample_positions;
mod translator;

pub use attachment::{gl, Attachment, AttachmentName, AttachmentPoint, ImageKey, ATTACHMENT_SLOT_COUNT, MAX_COLOR_ATTACHMENTS};
pub use blit_region::{BlitRegion, Filter};
pub use clear_params::{ClearParameters, ColorMask};
pub use dirty_bits::DirtyBits;
pub use framebuffer::Framebuffer;
pub use framebuffer_state::{FramebufferState, SubscriptionKey};
pub use pixel_pack::{encode_pixel, pixel_size, PackLayout, PixelFormat, PixelPackState, PixelType};
pub use planes::{apply_depth_stencil_plan, plan_depth_stencil, DepthStencilPlan, PartialPlanePolicy, Planes};
pub use rect::Rect;
pub use render_target_cache::RenderTargetCache;
pub use sample_positions::{normalized_position, standard_sample_positions};
pub use translator::FramebufferTranslator;
