/*!
# Framebuffer Translator

Maps the framebuffer object of a portable graphics API onto a backend that
only knows render-target views.

The portable side describes a framebuffer as attachment points, draw buffers
and a read buffer. The backend side exposes views of images and a small set
of commands. In between, each framebuffer keeps a cache of resolved views and
lowers every operation onto the commands the backend actually has:

- **Clear**: per-attachment color masks, scissor, depth/stencil with write
  masks, sRGB and emulated-channel handling
- **Blit**: exact copies when possible, textured draws otherwise, with
  flipping, scaling, clipping and multisample resolve
- **Invalidate / discard**: native hint or zero clear
- **Readback**: format conversion and pack-state layout
- **Sample positions**: standard sample tables

Driver workarounds are selected through a [`FeatureRegistry`](fbt::FeatureRegistry)
and backend capabilities through [`DeviceCaps`](fbt::DeviceCaps).
*/

// Internal modules
mod error;
mod shim;
pub mod log;
pub mod features;
pub mod device;
pub mod framebuffer;

// Main fbt namespace module
pub mod fbt {
    // Error types
    pub use crate::error::{Error, Result};

    // Process-wide state
    pub use crate::shim::Shim;

    // Driver workarounds
    pub use crate::features::{Feature, FeatureConfig, FeatureRegistry, FeatureRegistryBuilder};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend interface
    pub use crate::device::{
        linear_to_srgb, srgb_to_linear, DepthStencilSnapshot, Device, DeviceCaps, Flip, RenderTarget,
        RenderTargetResolver, TextureFormat,
    };

    // Framebuffer objects and operation parameters
    pub use crate::framebuffer::*;
}

// Re-export math library at crate root
pub use glam;
