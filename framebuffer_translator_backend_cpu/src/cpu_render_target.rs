/// CpuRenderTarget - view of one CPU image subresource

use std::sync::{Mutex, Weak};
use framebuffer_translator::fbt::{ImageKey, RenderTarget, TextureFormat};
use crate::cpu_resources::CpuResources;

/// View of one level/layer of a CPU image
///
/// Resolve temporaries own their image: it is deleted when the last
/// reference to the view goes away.
pub struct CpuRenderTarget {
    pub(crate) image: ImageKey,
    pub(crate) level: u32,
    pub(crate) layer: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) samples: u32,
    pub(crate) format: TextureFormat,
    pub(crate) storage_format: TextureFormat,
    /// Set on resolve temporaries
    pub(crate) owner: Option<Weak<Mutex<CpuResources>>>,
}

impl CpuRenderTarget {
    pub fn is_transient(&self) -> bool {
        self.owner.is_some()
    }
}

impl RenderTarget for CpuRenderTarget {
    fn image(&self) -> ImageKey {
        self.image
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn storage_format(&self) -> TextureFormat {
        self.storage_format
    }
}

impl Drop for CpuRenderTarget {
    fn drop(&mut self) {
        let Some(owner) = self.owner.take().and_then(|owner| owner.upgrade()) else {
            return;
        };
        if let Ok(mut resources) = owner.lock() {
            resources.release_transient(self.image);
        };
    }
}
