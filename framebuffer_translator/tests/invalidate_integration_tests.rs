//! Integration tests for invalidate and discard against the CPU backend
//!
//! Run with: cargo test --test invalidate_integration_tests


use cpu_test_utils::*;
use framebuffer_translator::fbt::{
    gl, AttachmentPoint, ClearParameters, DeviceCaps, Error, Feature, FeatureRegistry, Rect, TextureFormat,
};
use framebuffer_translator::glam::Vec4;
use framebuffer_translator_backend_cpu::fbt::CpuBackend;

/// Backend without the discard hint
fn zero_clear_backend(enabled: &[Feature]) -> CpuBackend {
    let caps = DeviceCaps { supports_discard_hint: false, ..DeviceCaps::default() };
    let features = enabled.iter().fold(FeatureRegistry::builder(), |builder, &feature| builder.enable(feature));
    CpuBackend::new(caps, features.build())
}

// ============================================================================
// DISCARD HINT TESTS
// ============================================================================

#[test]
fn test_integration_invalidate_uses_discard_hint() {
    let backend = full_backend();
    let (mut framebuffer, image) = color_framebuffer(&backend, 4, 4);
    fill_color(&backend, image, RED);

    framebuffer.invalidate(&[gl::COLOR_ATTACHMENT0]).unwrap();
    framebuffer.invalidate_sub(&[gl::COLOR_ATTACHMENT0], Rect::new(1, 1, 2, 2)).unwrap();
    framebuffer.invalidate_sub(&[gl::COLOR_ATTACHMENT0], Rect::new(-1, -1, 10, 10)).unwrap();

    let device = backend.device().unwrap();
    assert_eq!(device.discards(), &[(image, None), (image, Some(Rect::new(1, 1, 2, 2))), (image, None)]);
    assert_eq!(device.content_changes(image), 3);
    drop(device);

    // A hint leaves the bytes alone on this backend
    assert_eq!(color_at(&backend, image, 0, 0), RED);
}

#[test]
fn test_integration_readback_after_invalidate() {
    let backend = full_backend();
    let (mut framebuffer, _) = color_framebuffer(&backend, 2, 2);
    framebuffer.clear(&ClearParameters::color(RED)).unwrap();

    framebuffer.invalidate(&[gl::COLOR_ATTACHMENT0]).unwrap();

    // Contents are undefined; only the call itself is checked
    read_rgba8(&mut framebuffer, Rect::new(0, 0, 2, 2));
}

#[test]
fn test_integration_invalidate_unbound_and_outside_areas() {
    let backend = full_backend();
    let (mut framebuffer, image) = color_framebuffer(&backend, 4, 4);

    framebuffer.invalidate(&[gl::COLOR_ATTACHMENT0 + 3, gl::DEPTH_ATTACHMENT]).unwrap();
    framebuffer.invalidate_sub(&[gl::COLOR_ATTACHMENT0], Rect::new(8, 8, 2, 2)).unwrap();
    framebuffer.invalidate_sub(&[gl::COLOR_ATTACHMENT0], Rect::new(0, 0, 0, 2)).unwrap();

    let device = backend.device().unwrap();
    assert!(device.discards().is_empty());
    assert_eq!(device.content_changes(image), 0);
}

#[test]
fn test_integration_ext_discard_widens_partial_depth_stencil() {
    let features = FeatureRegistry::builder().enable(Feature::DiscardPartialDepthStencilForExt).build();
    let backend = CpuBackend::new(DeviceCaps::default(), features);
    let (mut framebuffer, image) =
        framebuffer_with(&backend, AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    // The non-EXT entry point skips a single plane
    framebuffer.invalidate(&[gl::DEPTH_ATTACHMENT]).unwrap();
    assert!(backend.device().unwrap().discards().is_empty());

    framebuffer.discard(&[gl::DEPTH_EXT]).unwrap();
    assert_eq!(backend.device().unwrap().discards(), &[(image, None)]);
}

#[test]
fn test_integration_ext_discard_skips_partial_without_feature() {
    let backend = full_backend();
    let (mut framebuffer, _) =
        framebuffer_with(&backend, AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    framebuffer.discard(&[gl::STENCIL_EXT]).unwrap();
    assert!(backend.device().unwrap().discards().is_empty());

    framebuffer.discard(&[gl::DEPTH_EXT, gl::STENCIL_EXT]).unwrap();
    assert_eq!(backend.device().unwrap().discards().len(), 1);
}

// ============================================================================
// ZERO CLEAR TESTS
// ============================================================================

#[test]
fn test_integration_invalidate_clears_to_zero() {
    let backend = zero_clear_backend(&[Feature::ClearInvalidatedAttachmentsToZero]);
    let (mut framebuffer, image) = color_framebuffer(&backend, 4, 4);
    fill_color(&backend, image, RED);

    framebuffer.invalidate_sub(&[gl::COLOR_ATTACHMENT0], Rect::new(0, 0, 2, 2)).unwrap();

    assert_eq!(color_at(&backend, image, 0, 0), Vec4::ZERO);
    assert_eq!(color_at(&backend, image, 1, 1), Vec4::ZERO);
    assert_eq!(color_at(&backend, image, 2, 2), RED);
    assert_eq!(color_at(&backend, image, 3, 0), RED);
}

#[test]
fn test_integration_invalidate_without_hint_or_feature_is_noop() {
    let backend = zero_clear_backend(&[]);
    let (mut framebuffer, image) = color_framebuffer(&backend, 2, 2);
    fill_color(&backend, image, GREEN);

    framebuffer.invalidate(&[gl::COLOR_ATTACHMENT0]).unwrap();

    assert_eq!(color_at(&backend, image, 1, 1), GREEN);
    assert_eq!(backend.device().unwrap().content_changes(image), 0);
}

#[test]
fn test_integration_invalidate_depth_plane_to_zero() {
    let backend = zero_clear_backend(&[Feature::ClearInvalidatedAttachmentsToZero]);
    let (mut framebuffer, image) =
        framebuffer_with(&backend, AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);
    backend.resources().unwrap().fill_depth_stencil(image, 0.5, 9).unwrap();

    framebuffer.invalidate(&[gl::DEPTH_ATTACHMENT]).unwrap();

    assert_eq!(depth_at(&backend, image, 1, 0), Some(0.0));
    assert_eq!(stencil_at(&backend, image, 1, 0), Some(9));
}

#[test]
fn test_integration_invalidate_skips_emulated_formats() {
    let backend = zero_clear_backend(&[
        Feature::ClearInvalidatedAttachmentsToZero,
        Feature::PreferSkippingInvalidateForEmulatedFormats,
    ]);
    let (mut framebuffer, image) =
        framebuffer_with(&backend, AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8_UNORM);
    fill_color(&backend, image, BLUE);

    framebuffer.invalidate(&[gl::COLOR_ATTACHMENT0]).unwrap();
    assert_eq!(color_at(&backend, image, 0, 0), BLUE);
}

// ============================================================================
// ERROR TESTS
// ============================================================================

#[test]
fn test_integration_invalidate_rejects_bad_input() {
    let backend = full_backend();
    let (mut framebuffer, _) = color_framebuffer(&backend, 2, 2);

    let result = framebuffer.invalidate(&[0x1234]);
    assert!(matches!(result, Err(Error::InvalidAttachment(_))));

    // Default-framebuffer names only exist for the EXT entry point
    let result = framebuffer.invalidate(&[gl::COLOR_EXT]);
    assert!(matches!(result, Err(Error::InvalidAttachment(_))));
    framebuffer.discard(&[gl::COLOR_EXT]).unwrap();

    let result = framebuffer.invalidate(&[gl::COLOR_ATTACHMENT0 + 8]);
    assert!(matches!(result, Err(Error::OutOfRange(_))));

    let result = framebuffer.invalidate_sub(&[gl::COLOR_ATTACHMENT0], Rect::new(0, 0, -1, 1));
    assert!(matches!(result, Err(Error::InvalidRectangle(_))));
}
