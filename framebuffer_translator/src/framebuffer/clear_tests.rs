/// Tests for clear path selection (mock device)

use glam::Vec4;
use crate::device::mock_device::{MockHarness, MockImage};
use crate::device::{linear_to_srgb, DeviceCaps, TextureFormat};
use crate::error::Error;
use crate::features::{Feature, FeatureRegistry};
use crate::framebuffer::{AttachmentPoint, ClearParameters, ColorMask, Rect};

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const GREY: Vec4 = Vec4::new(0.5, 0.5, 0.5, 0.5);

fn harness_with(caps: DeviceCaps, features: &[Feature]) -> MockHarness {
    let registry = features
        .iter()
        .fold(FeatureRegistry::builder(), |builder, &feature| builder.enable(feature))
        .build();
    MockHarness::new(caps, registry)
}

fn no_masks() -> DeviceCaps {
    DeviceCaps { supports_independent_color_masks: false, ..DeviceCaps::default() }
}

// ============================================================================
// Tests: Color path selection
// ============================================================================

#[test]
fn test_full_mask_uses_native_clear() {
    let mut h = MockHarness::default_caps();
    let image = h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(RED)).unwrap();

    assert_eq!(h.commands(), vec!["clear_render_target"]);
    let device = h.device();
    assert_eq!(device.clear_colors, vec![RED]);
    assert_eq!(device.areas, vec![Some(Rect::new(0, 0, 2, 2))]);
    assert_eq!(device.changed_images, vec![image]);
}

#[test]
fn test_partial_mask_uses_native_masked_clear() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::RGB)).unwrap();

    assert_eq!(h.commands(), vec!["clear_render_target_masked"]);
    assert_eq!(h.device().clear_masks, vec![ColorMask::RGB]);
}

#[test]
fn test_partial_mask_emulated_with_draw() {
    let mut h = harness_with(no_masks(), &[Feature::EmulateIndependentColorMasks]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::R | ColorMask::A)).unwrap();

    assert_eq!(h.commands(), vec!["draw_clear"]);
    assert_eq!(h.device().clear_masks, vec![ColorMask::R | ColorMask::A]);
}

#[test]
fn test_partial_mask_read_modify_write_fallback() {
    let mut h = harness_with(no_masks(), &[]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::G)).unwrap();

    assert_eq!(h.commands(), vec!["read_pixels", "write_pixels"]);
}

#[test]
fn test_read_modify_write_rejects_multisample() {
    let mut h = harness_with(no_masks(), &[]);
    h.attach_image(AttachmentPoint::Color(0), MockImage {
        width: 2,
        height: 2,
        samples: 4,
        format: TextureFormat::R8G8B8A8_UNORM,
        storage_format: TextureFormat::R8G8B8A8_UNORM,
    });

    let result = h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::G));
    assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
}

#[test]
fn test_multisample_rejection_happens_before_any_attachment_is_written() {
    let mut h = harness_with(no_masks(), &[]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);
    h.attach_image(AttachmentPoint::Color(1), MockImage {
        width: 2,
        height: 2,
        samples: 4,
        format: TextureFormat::R8G8B8A8_UNORM,
        storage_format: TextureFormat::R8G8B8A8_UNORM,
    });
    h.state.set_draw_buffers(0b11);

    let result = h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::G));

    assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
    assert!(h.commands().is_empty());
    assert!(h.device().changed_images.is_empty());
}

#[test]
fn test_prefer_draw_clear() {
    let mut h = harness_with(DeviceCaps::default(), &[Feature::PreferDrawClearOverClearAttachments]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(GREY)).unwrap();

    assert_eq!(h.commands(), vec!["draw_clear"]);
    assert_eq!(h.device().clear_masks, vec![ColorMask::ALL]);
}

#[test]
fn test_zero_or_one_workaround_only_for_exact_values() {
    let mut h = harness_with(DeviceCaps::default(), &[Feature::ClearToZeroOrOneBroken]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(RED)).unwrap();
    h.clear(&ClearParameters::color(GREY)).unwrap();

    assert_eq!(h.commands(), vec!["draw_clear", "clear_render_target"]);
}

#[test]
fn test_call_clear_twice() {
    let mut h = harness_with(DeviceCaps::default(), &[Feature::CallClearTwice]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(RED)).unwrap();

    assert_eq!(h.commands(), vec!["clear_render_target", "clear_render_target"]);
}

// ============================================================================
// Tests: Attachment selection
// ============================================================================

#[test]
fn test_only_draw_enabled_slots_are_cleared() {
    let mut h = MockHarness::default_caps();
    let first = h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);
    let second = h.attach(AttachmentPoint::Color(1), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(RED)).unwrap();
    assert_eq!(h.device().changed_images, vec![first]);

    h.state.set_draw_buffers(0b10);
    h.clear(&ClearParameters::color(RED)).unwrap();
    assert_eq!(h.device().changed_images, vec![first, second]);
}

#[test]
fn test_empty_attachment_mask_is_skipped() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);
    h.attach(AttachmentPoint::Color(1), 2, 2, TextureFormat::R8G8B8A8_UNORM);
    h.state.set_draw_buffers(0b11);

    let params = ClearParameters::color(RED).with_attachment_mask(0, ColorMask::empty());
    h.clear(&params).unwrap();

    assert_eq!(h.commands(), vec!["clear_render_target"]);
}

#[test]
fn test_clear_without_attachments() {
    let mut h = MockHarness::default_caps();
    assert!(matches!(
        h.clear(&ClearParameters::color(RED)),
        Err(Error::UnsupportedOperation(_))
    ));
    assert!(h.clear(&ClearParameters::default()).is_ok());
    assert!(h.commands().is_empty());
}

#[test]
fn test_depth_request_without_depth_attachment_is_ignored() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::default().with_depth(0.5).with_stencil(3)).unwrap();

    assert!(h.commands().is_empty());
}

#[test]
fn test_scissor_restricts_area() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::Color(0), 4, 4, TextureFormat::R8G8B8A8_UNORM);

    h.clear(&ClearParameters::color(RED).with_scissor(Rect::new(2, 1, 10, 10))).unwrap();
    h.clear(&ClearParameters::color(RED).with_scissor(Rect::new(8, 8, 2, 2))).unwrap();

    assert_eq!(h.device().areas, vec![Some(Rect::new(2, 1, 2, 3))]);
}

// ============================================================================
// Tests: Format handling
// ============================================================================

#[test]
fn test_emulated_alpha_is_forced_to_one() {
    let mut h = MockHarness::default_caps();
    h.attach_image(AttachmentPoint::Color(0), MockImage {
        width: 2,
        height: 2,
        samples: 1,
        format: TextureFormat::R8G8B8_UNORM,
        storage_format: TextureFormat::R8G8B8A8_UNORM,
    });

    h.clear(&ClearParameters::color(Vec4::new(0.2, 0.4, 0.6, 0.0))).unwrap();
    h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::RGB)).unwrap();
    h.clear(&ClearParameters::color(GREY).with_color_mask(ColorMask::R | ColorMask::A)).unwrap();

    let device = h.device();
    assert_eq!(device.commands, vec!["clear_render_target", "clear_render_target", "clear_render_target_masked"]);
    assert_eq!(device.clear_colors[0], Vec4::new(0.2, 0.4, 0.6, 1.0));
    assert_eq!(device.clear_colors[1].w, 1.0);
    assert_eq!(device.clear_masks, vec![ColorMask::R]);
}

#[test]
fn test_srgb_logical_over_linear_storage_encodes_value() {
    let mut h = MockHarness::default_caps();
    h.attach_image(AttachmentPoint::Color(0), MockImage {
        width: 1,
        height: 1,
        samples: 1,
        format: TextureFormat::R8G8B8A8_SRGB,
        storage_format: TextureFormat::R8G8B8A8_UNORM,
    });

    h.clear(&ClearParameters::color(GREY)).unwrap();

    let color = h.device().clear_colors[0];
    assert!((color.x - linear_to_srgb(0.5)).abs() < 1e-6);
    assert_eq!(color.w, 0.5);
}

#[test]
fn test_matching_color_spaces_leave_value_alone() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::Color(0), 1, 1, TextureFormat::R8G8B8A8_SRGB);

    h.clear(&ClearParameters::color(GREY)).unwrap();

    assert_eq!(h.device().clear_colors, vec![GREY]);
}

// ============================================================================
// Tests: Depth / stencil
// ============================================================================

fn no_separate_clear() -> DeviceCaps {
    DeviceCaps { supports_separate_depth_stencil_clear: false, ..DeviceCaps::default() }
}

#[test]
fn test_joint_depth_stencil_clear() {
    let mut h = harness_with(no_separate_clear(), &[]);
    let image = h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    h.clear(&ClearParameters::default().with_depth(2.0).with_stencil(7)).unwrap();

    let device = h.device();
    assert_eq!(device.commands, vec!["clear_depth_stencil"]);
    assert_eq!(device.depth_stencil_values, vec![(Some(1.0), Some(7))]);
    assert_eq!(device.changed_images, vec![image]);
}

#[test]
fn test_depth_only_with_separate_support() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    h.clear(&ClearParameters::default().with_depth(0.25)).unwrap();

    assert_eq!(h.device().depth_stencil_values, vec![(Some(0.25), None)]);
}

#[test]
fn test_depth_only_preserve_and_rewrite() {
    let mut h = harness_with(no_separate_clear(), &[Feature::PreserveUnclearedDepthStencilPlane]);
    h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    h.clear(&ClearParameters::default().with_depth(0.25)).unwrap();

    let device = h.device();
    assert_eq!(device.commands, vec!["read_depth_stencil", "clear_depth_stencil", "write_depth_stencil"]);
    assert_eq!(device.planes, vec![crate::framebuffer::Planes::STENCIL]);
}

#[test]
fn test_depth_only_rejected_without_fallback_and_nothing_issued() {
    let mut h = harness_with(no_separate_clear(), &[]);
    h.attach(AttachmentPoint::Color(0), 2, 2, TextureFormat::R8G8B8A8_UNORM);
    h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    let result = h.clear(&ClearParameters::color(RED).with_depth(0.25));

    assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
    assert!(h.commands().is_empty());
}

#[test]
fn test_depth_only_surface_needs_no_fallback() {
    let mut h = harness_with(no_separate_clear(), &[]);
    h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D32_FLOAT);

    h.clear(&ClearParameters::default().with_depth(0.0).with_stencil(1)).unwrap();

    assert_eq!(h.device().depth_stencil_values, vec![(Some(0.0), None)]);
}

#[test]
fn test_partial_stencil_mask_merges_snapshot() {
    let mut h = harness_with(no_separate_clear(), &[]);
    h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    h.clear(&ClearParameters::default().with_stencil(0xFF).with_stencil_write_mask(0x0F)).unwrap();

    assert_eq!(h.commands(), vec!["read_depth_stencil", "write_depth_stencil"]);
}

#[test]
fn test_zero_stencil_mask_writes_nothing() {
    let mut h = MockHarness::default_caps();
    h.attach(AttachmentPoint::DepthStencil, 2, 2, TextureFormat::D24_UNORM_S8_UINT);

    h.clear(&ClearParameters::default().with_stencil(5).with_stencil_write_mask(0)).unwrap();

    assert!(h.commands().is_empty());
    assert!(h.device().changed_images.is_empty());
}
