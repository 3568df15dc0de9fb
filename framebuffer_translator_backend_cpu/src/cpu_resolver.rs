/// CpuResolver - RenderTargetResolver over CpuResources

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use framebuffer_translator::fbt::{Attachment, Error, RenderTarget, RenderTargetResolver, Result};
use framebuffer_translator::shim_err;
use crate::cpu_resources::CpuResources;

pub struct CpuResolver {
    resources: Arc<Mutex<CpuResources>>,
    resolve_count: AtomicUsize,
}

impl CpuResolver {
    pub fn new(resources: Arc<Mutex<CpuResources>>) -> Self {
        Self { resources, resolve_count: AtomicUsize::new(0) }
    }

    /// Number of `resolve` calls so far
    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::Relaxed)
    }
}

impl RenderTargetResolver for CpuResolver {
    fn resolve(&self, attachment: &Attachment) -> Result<Arc<dyn RenderTarget>> {
        self.resolve_count.fetch_add(1, Ordering::Relaxed);
        let mut resources = self.resources.lock().map_err(|_| {
            shim_err!("fbt::cpu::Resolver", Error::ResourceResolutionFailure("Resource lock poisoned".to_string()))
        })?;
        let view: Arc<dyn RenderTarget> = resources.view(attachment)?;
        Ok(view)
    }
}
