/// Mock backend for unit tests
///
/// `MockDevice` records every call as a string and returns zero-filled data.
/// `MockResolver` hands out `MockRenderTarget`s for images registered on it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use glam::Vec4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::features::FeatureRegistry;
use crate::framebuffer::{
    Attachment, AttachmentPoint, ClearParameters, ColorMask, Filter, FramebufferState,
    FramebufferTranslator, ImageKey, Planes, Rect,
};
use super::{Device, DeviceCaps, DepthStencilSnapshot, Flip, RenderTarget, RenderTargetResolver, TextureFormat};

// ============================================================================
// Mock RenderTarget
// ============================================================================

#[derive(Debug)]
pub struct MockRenderTarget {
    pub image: ImageKey,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub format: TextureFormat,
    pub storage_format: TextureFormat,
}

impl MockRenderTarget {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            image: ImageKey::default(),
            width,
            height,
            samples: 1,
            format,
            storage_format: format,
        }
    }
}

impl RenderTarget for MockRenderTarget {
    fn image(&self) -> ImageKey { self.image }
    fn level(&self) -> u32 { 0 }
    fn layer(&self) -> u32 { 0 }
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn samples(&self) -> u32 { self.samples }
    fn format(&self) -> TextureFormat { self.format }
    fn storage_format(&self) -> TextureFormat { self.storage_format }
}

// ============================================================================
// Mock Device
// ============================================================================

#[derive(Debug)]
pub struct MockDevice {
    pub caps: DeviceCaps,
    pub commands: Vec<String>,
    /// Clear colors passed to clear_render_target / masked / draw_clear
    pub clear_colors: Vec<Vec4>,
    /// Masks passed to clear_render_target_masked / draw_clear
    pub clear_masks: Vec<ColorMask>,
    /// Rectangles passed to every area-taking command, in call order
    pub areas: Vec<Option<Rect>>,
    /// Flip flags of copy_region / draw_textured_quad / blit_depth_stencil
    pub flips: Vec<Flip>,
    /// Planes of blit_depth_stencil and read_depth_stencil
    pub planes: Vec<Planes>,
    /// Depth/stencil values of clear_depth_stencil
    pub depth_stencil_values: Vec<(Option<f32>, Option<u8>)>,
    pub changed_images: Vec<ImageKey>,
    /// Fail every call after this many successful commands
    pub fail_after: Option<usize>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::with_caps(DeviceCaps::default())
    }

    pub fn with_caps(caps: DeviceCaps) -> Self {
        Self {
            caps,
            commands: Vec::new(),
            clear_colors: Vec::new(),
            clear_masks: Vec::new(),
            areas: Vec::new(),
            flips: Vec::new(),
            planes: Vec::new(),
            depth_stencil_values: Vec::new(),
            changed_images: Vec::new(),
            fail_after: None,
        }
    }

    fn record(&mut self, command: &str, area: Option<Rect>) -> Result<()> {
        if let Some(limit) = self.fail_after {
            if self.commands.len() >= limit {
                return Err(Error::BackendError(format!("{} failed", command)));
            }
        }
        self.commands.push(command.to_string());
        self.areas.push(area);
        Ok(())
    }
}

impl Device for MockDevice {
    fn caps(&self) -> DeviceCaps {
        self.caps
    }

    fn clear_render_target(&mut self, _target: &dyn RenderTarget, color: Vec4, area: Rect) -> Result<()> {
        self.record("clear_render_target", Some(area))?;
        self.clear_colors.push(color);
        Ok(())
    }

    fn clear_render_target_masked(
        &mut self,
        _target: &dyn RenderTarget,
        color: Vec4,
        mask: ColorMask,
        area: Rect,
    ) -> Result<()> {
        self.record("clear_render_target_masked", Some(area))?;
        self.clear_colors.push(color);
        self.clear_masks.push(mask);
        Ok(())
    }

    fn draw_clear(&mut self, _target: &dyn RenderTarget, color: Vec4, mask: ColorMask, area: Rect) -> Result<()> {
        self.record("draw_clear", Some(area))?;
        self.clear_colors.push(color);
        self.clear_masks.push(mask);
        Ok(())
    }

    fn clear_depth_stencil(
        &mut self,
        _target: &dyn RenderTarget,
        depth: Option<f32>,
        stencil: Option<u8>,
        area: Rect,
    ) -> Result<()> {
        self.record("clear_depth_stencil", Some(area))?;
        self.depth_stencil_values.push((depth, stencil));
        Ok(())
    }

    fn read_depth_stencil(&mut self, target: &dyn RenderTarget, area: Rect, planes: Planes) -> Result<DepthStencilSnapshot> {
        self.record("read_depth_stencil", Some(area))?;
        self.planes.push(planes);
        let count = area.area() * target.samples() as usize;
        Ok(DepthStencilSnapshot {
            area,
            samples: target.samples(),
            depth: planes.contains(Planes::DEPTH).then(|| vec![0.0; count]),
            stencil: planes.contains(Planes::STENCIL).then(|| vec![0; count]),
        })
    }

    fn write_depth_stencil(&mut self, _target: &dyn RenderTarget, snapshot: &DepthStencilSnapshot) -> Result<()> {
        self.record("write_depth_stencil", Some(snapshot.area))
    }

    fn read_pixels(&mut self, target: &dyn RenderTarget, area: Rect) -> Result<Vec<u8>> {
        self.record("read_pixels", Some(area))?;
        Ok(vec![0; area.area() * target.storage_format().bytes_per_pixel()])
    }

    fn write_pixels(&mut self, _target: &dyn RenderTarget, area: Rect, _data: &[u8]) -> Result<()> {
        self.record("write_pixels", Some(area))
    }

    fn copy_region(
        &mut self,
        _src: &dyn RenderTarget,
        src_area: Rect,
        _dst: &dyn RenderTarget,
        _dst_x: i32,
        _dst_y: i32,
        flip: Flip,
    ) -> Result<()> {
        self.record("copy_region", Some(src_area))?;
        self.flips.push(flip);
        Ok(())
    }

    fn draw_textured_quad(
        &mut self,
        _src: &dyn RenderTarget,
        _src_area: Rect,
        _dst: &dyn RenderTarget,
        _dst_area: Rect,
        clip: Rect,
        flip: Flip,
        _filter: Filter,
    ) -> Result<()> {
        self.record("draw_textured_quad", Some(clip))?;
        self.flips.push(flip);
        Ok(())
    }

    fn blit_depth_stencil(
        &mut self,
        _src: &dyn RenderTarget,
        _src_area: Rect,
        _dst: &dyn RenderTarget,
        _dst_area: Rect,
        clip: Rect,
        flip: Flip,
        planes: Planes,
    ) -> Result<()> {
        self.record("blit_depth_stencil", Some(clip))?;
        self.flips.push(flip);
        self.planes.push(planes);
        Ok(())
    }

    fn create_resolve_target(&mut self, src: &dyn RenderTarget) -> Result<Arc<dyn RenderTarget>> {
        self.record("create_resolve_target", None)?;
        Ok(Arc::new(MockRenderTarget {
            image: src.image(),
            width: src.width(),
            height: src.height(),
            samples: 1,
            format: src.format(),
            storage_format: src.storage_format(),
        }))
    }

    fn resolve_subresource(&mut self, _src: &dyn RenderTarget, _dst: &dyn RenderTarget) -> Result<()> {
        self.record("resolve_subresource", None)
    }

    fn discard_view(&mut self, _target: &dyn RenderTarget, area: Option<Rect>) -> Result<()> {
        self.record("discard_view", area)
    }

    fn mark_image_contents_changed(&mut self, image: ImageKey) {
        self.changed_images.push(image);
    }
}

// ============================================================================
// Mock Resolver
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MockImage {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub format: TextureFormat,
    pub storage_format: TextureFormat,
}

pub struct MockResolver {
    images: Mutex<SlotMap<ImageKey, MockImage>>,
    views: Mutex<FxHashMap<Attachment, Arc<MockRenderTarget>>>,
    resolve_count: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            images: Mutex::new(SlotMap::with_key()),
            views: Mutex::new(FxHashMap::default()),
            resolve_count: AtomicUsize::new(0),
        }
    }

    pub fn add_image(&self, width: u32, height: u32, format: TextureFormat) -> ImageKey {
        self.add_image_with(MockImage { width, height, samples: 1, format, storage_format: format })
    }

    pub fn add_image_with(&self, image: MockImage) -> ImageKey {
        self.images.lock().unwrap().insert(image)
    }

    /// Delete an image and every view of it
    pub fn remove_image(&self, key: ImageKey) {
        self.images.lock().unwrap().remove(key);
        self.views.lock().unwrap().retain(|attachment, _| attachment.image != key);
    }

    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::SeqCst)
    }
}

impl RenderTargetResolver for MockResolver {
    fn resolve(&self, attachment: &Attachment) -> Result<Arc<dyn RenderTarget>> {
        self.resolve_count.fetch_add(1, Ordering::SeqCst);
        let image = self.images.lock().unwrap().get(attachment.image).copied().ok_or_else(|| {
            Error::ResourceResolutionFailure("image deleted".to_string())
        })?;

        let mut views = self.views.lock().unwrap();
        let view = views.entry(*attachment).or_insert_with(|| {
            Arc::new(MockRenderTarget {
                image: attachment.image,
                width: image.width,
                height: image.height,
                samples: image.samples,
                format: image.format,
                storage_format: image.storage_format,
            })
        });
        Ok(view.clone())
    }
}

// ============================================================================
// Mock Harness
// ============================================================================

/// Translator wired to a mock device and resolver
pub struct MockHarness {
    pub device: Arc<Mutex<MockDevice>>,
    pub resolver: Arc<MockResolver>,
    pub state: FramebufferState,
    pub translator: FramebufferTranslator,
}

impl MockHarness {
    pub fn new(caps: DeviceCaps, features: FeatureRegistry) -> Self {
        let device = Arc::new(Mutex::new(MockDevice::with_caps(caps)));
        let resolver = Arc::new(MockResolver::new());
        let mut state = FramebufferState::new();
        let translator = FramebufferTranslator::new(
            &mut state,
            device.clone(),
            resolver.clone(),
            Arc::new(features),
        );
        Self { device, resolver, state, translator }
    }

    /// Full-capability device, no workaround enabled
    pub fn default_caps() -> Self {
        Self::new(DeviceCaps::default(), FeatureRegistry::builder().build())
    }

    /// Create a single-sampled image and bind it to `point`
    pub fn attach(&mut self, point: AttachmentPoint, width: u32, height: u32, format: TextureFormat) -> ImageKey {
        self.attach_image(point, MockImage { width, height, samples: 1, format, storage_format: format })
    }

    pub fn attach_image(&mut self, point: AttachmentPoint, image: MockImage) -> ImageKey {
        let key = self.resolver.add_image_with(image);
        self.state.attach(point, Attachment::new(key)).unwrap();
        key
    }

    pub fn device(&self) -> MutexGuard<'_, MockDevice> {
        self.device.lock().unwrap()
    }

    pub fn commands(&self) -> Vec<String> {
        self.device().commands.clone()
    }

    pub fn clear(&mut self, params: &ClearParameters) -> Result<()> {
        self.translator.clear(&mut self.state, params)
    }
}
