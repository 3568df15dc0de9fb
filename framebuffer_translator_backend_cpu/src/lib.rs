/*!
# Framebuffer Translator - CPU Backend

Reference backend that keeps every image in system memory.

Implements the translator's [`Device`](framebuffer_translator::fbt::Device)
and [`RenderTargetResolver`](framebuffer_translator::fbt::RenderTargetResolver)
traits with plain loops over texels. The capability matrix is configurable so
every emulation path of the translator can be exercised, and the device
refuses commands its capabilities do not allow.
*/

mod cpu_backend;
mod cpu_device;
mod cpu_image;
mod cpu_render_target;
mod cpu_resolver;
mod cpu_resources;
mod cpu_sampling;

pub mod fbt {
    pub use crate::cpu_backend::CpuBackend;
    pub use crate::cpu_device::CpuDevice;
    pub use crate::cpu_image::ImageDesc;
    pub use crate::cpu_render_target::CpuRenderTarget;
    pub use crate::cpu_resolver::CpuResolver;
    pub use crate::cpu_resources::CpuResources;
}
