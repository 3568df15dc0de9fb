/// Tests for FeatureRegistry, Feature and FeatureConfig

use super::*;
use crate::device::DeviceCaps;

// ============================================================================
// Tests: Catalogue
// ============================================================================

#[test]
fn test_feature_names_round_trip() {
    for &feature in Feature::ALL {
        assert_eq!(Feature::from_name(feature.name()), Some(feature));
    }
}

#[test]
fn test_feature_names_are_unique() {
    let mut names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), Feature::ALL.len());
}

#[test]
fn test_unknown_feature_name() {
    assert_eq!(Feature::from_name("noSuchFeature"), None);
    assert_eq!(Feature::from_name("CallClearTwice"), None);
}

// ============================================================================
// Tests: Registry
// ============================================================================

#[test]
fn test_defaults_are_disabled() {
    let registry = FeatureRegistry::builder().build();
    assert!(registry.enabled_features().is_empty());
    assert!(!registry.is_enabled("callClearTwice"));
}

#[test]
fn test_enable_and_query_by_name() {
    let registry = FeatureRegistry::builder()
        .enable(Feature::CallClearTwice)
        .enable(Feature::DepthStencilBlitExtraCopy)
        .build();

    assert!(registry.is_enabled("callClearTwice"));
    assert!(registry.is_feature_enabled(Feature::DepthStencilBlitExtraCopy));
    assert!(!registry.is_enabled("clearToZeroOrOneBroken"));
    assert!(!registry.is_enabled("notAFeature"));
    assert_eq!(
        registry.enabled_features(),
        vec![Feature::DepthStencilBlitExtraCopy, Feature::CallClearTwice]
    );
}

#[test]
fn test_disable_after_enable() {
    let registry = FeatureRegistry::builder()
        .enable(Feature::CallClearTwice)
        .disable(Feature::CallClearTwice)
        .build();
    assert!(!registry.is_feature_enabled(Feature::CallClearTwice));
}

#[test]
fn test_device_defaults_follow_missing_caps() {
    let caps = DeviceCaps {
        supports_independent_color_masks: false,
        supports_separate_depth_stencil_clear: true,
        supports_partial_depth_stencil_blit: false,
        ..DeviceCaps::default()
    };
    let registry = FeatureRegistry::builder().with_device_defaults(&caps).build();

    assert!(registry.is_feature_enabled(Feature::EmulateIndependentColorMasks));
    assert!(!registry.is_feature_enabled(Feature::PreserveUnclearedDepthStencilPlane));
    assert!(registry.is_feature_enabled(Feature::DepthStencilBlitExtraCopy));
    assert!(!registry.is_feature_enabled(Feature::AdjustSrcDstRegionForBlitFramebuffer));
}

#[test]
fn test_config_overrides_apply_after_defaults() {
    let config = FeatureConfig {
        enabled_overrides: vec!["callClearTwice".to_string(), "bogus".to_string()],
        disabled_overrides: vec!["adjustSrcDstRegionForBlitFramebuffer".to_string()],
    };
    let registry = FeatureRegistry::builder()
        .enable(Feature::AdjustSrcDstRegionForBlitFramebuffer)
        .apply_config(&config)
        .build();

    assert!(registry.is_enabled("callClearTwice"));
    assert!(!registry.is_enabled("adjustSrcDstRegionForBlitFramebuffer"));
}

#[test]
fn test_disabled_override_wins() {
    let config = FeatureConfig {
        enabled_overrides: vec!["callClearTwice".to_string()],
        disabled_overrides: vec!["callClearTwice".to_string()],
    };
    let registry = FeatureRegistry::builder().apply_config(&config).build();
    assert!(!registry.is_enabled("callClearTwice"));
}

// ============================================================================
// Tests: FeatureConfig
// ============================================================================

#[test]
fn test_parse_list_separators() {
    assert_eq!(
        FeatureConfig::parse_list("callClearTwice, clearToZeroOrOneBroken:forceD24S8AsUnsupported  x"),
        vec!["callClearTwice", "clearToZeroOrOneBroken", "forceD24S8AsUnsupported", "x"]
    );
    assert!(FeatureConfig::parse_list(" , ").is_empty());
}

#[test]
fn test_default_config_is_empty() {
    assert!(FeatureConfig::default().is_empty());
}
