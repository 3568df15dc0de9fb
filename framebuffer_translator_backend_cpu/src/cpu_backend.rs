/// CpuBackend - device, resolver and image table wired together

use std::sync::{Arc, Mutex, MutexGuard};
use framebuffer_translator::fbt::{DeviceCaps, Error, FeatureRegistry, Framebuffer, ImageKey, Result, Shim};
use framebuffer_translator::{shim_err, shim_info};
use crate::cpu_device::CpuDevice;
use crate::cpu_image::ImageDesc;
use crate::cpu_resolver::CpuResolver;
use crate::cpu_resources::CpuResources;

const SOURCE: &str = "fbt::cpu::Backend";

/// One CPU backend instance
///
/// # Example
///
/// ```no_run
/// use framebuffer_translator::fbt::{Attachment, AttachmentPoint, ClearParameters, DeviceCaps, TextureFormat};
/// use framebuffer_translator::glam::Vec4;
/// use framebuffer_translator_backend_cpu::fbt::{CpuBackend, ImageDesc};
///
/// let backend = CpuBackend::with_device_defaults(DeviceCaps::default());
/// let image = backend.create_image(ImageDesc::new(2, 2, TextureFormat::R8G8B8A8_UNORM))?;
///
/// let mut framebuffer = backend.create_framebuffer();
/// framebuffer.attach(AttachmentPoint::Color(0), Attachment::new(image))?;
/// framebuffer.clear(&ClearParameters::color(Vec4::new(1.0, 0.0, 0.0, 1.0)))?;
/// # Ok::<(), framebuffer_translator::fbt::Error>(())
/// ```
pub struct CpuBackend {
    device: Arc<Mutex<CpuDevice>>,
    resolver: Arc<CpuResolver>,
    resources: Arc<Mutex<CpuResources>>,
    features: Arc<FeatureRegistry>,
}

impl CpuBackend {
    pub fn new(caps: DeviceCaps, features: FeatureRegistry) -> Self {
        Self::with_registry(caps, Arc::new(features))
    }

    /// Backend sharing the process-wide registry installed by `Shim::initialize`
    ///
    /// # Errors
    ///
    /// `InitializationFailed` when the registry was never initialized.
    pub fn from_shim(caps: DeviceCaps) -> Result<Self> {
        Ok(Self::with_registry(caps, Shim::features()?))
    }

    fn with_registry(caps: DeviceCaps, features: Arc<FeatureRegistry>) -> Self {
        let resources = Arc::new(Mutex::new(CpuResources::new(features.clone())));
        let device = Arc::new(Mutex::new(CpuDevice::new(caps, resources.clone())));
        let resolver = Arc::new(CpuResolver::new(resources.clone()));

        shim_info!(SOURCE, "CPU backend created ({:?}, {} features enabled)",
            caps, features.enabled_features().len());
        Self { device, resolver, resources, features }
    }

    /// Backend whose registry enables exactly the fallbacks `caps` needs
    pub fn with_device_defaults(caps: DeviceCaps) -> Self {
        Self::new(caps, FeatureRegistry::builder().with_device_defaults(&caps).build())
    }

    pub fn features(&self) -> &Arc<FeatureRegistry> {
        &self.features
    }

    pub fn resolver(&self) -> &Arc<CpuResolver> {
        &self.resolver
    }

    /// New framebuffer drawing through this backend
    pub fn create_framebuffer(&self) -> Framebuffer {
        Framebuffer::new(self.device.clone(), self.resolver.clone(), self.features.clone())
    }

    pub fn create_image(&self, desc: ImageDesc) -> Result<ImageKey> {
        self.resources()?.create_image(desc)
    }

    pub fn delete_image(&self, image: ImageKey) -> Result<bool> {
        Ok(self.resources()?.delete_image(image))
    }

    pub fn device(&self) -> Result<MutexGuard<'_, CpuDevice>> {
        self.device
            .lock()
            .map_err(|_| shim_err!(SOURCE, Error::BackendError("Device lock poisoned".to_string())))
    }

    pub fn resources(&self) -> Result<MutexGuard<'_, CpuResources>> {
        self.resources
            .lock()
            .map_err(|_| shim_err!(SOURCE, Error::BackendError("Resource lock poisoned".to_string())))
    }
}
