/// Feature registry - immutable name -> bool table

use rustc_hash::FxHashMap;
use crate::device::DeviceCaps;
use super::{Feature, FeatureConfig};

/// Immutable table of feature states
///
/// Unknown names and features absent from the table read as disabled.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    states: FxHashMap<Feature, bool>,
}

impl FeatureRegistry {
    /// Start building a registry from the catalogue defaults (all disabled)
    pub fn builder() -> FeatureRegistryBuilder {
        FeatureRegistryBuilder {
            states: Feature::ALL.iter().map(|&feature| (feature, false)).collect(),
        }
    }

    /// Query by camelCase name
    pub fn is_enabled(&self, name: &str) -> bool {
        Feature::from_name(name)
            .map(|feature| self.is_feature_enabled(feature))
            .unwrap_or(false)
    }

    /// Query by key
    pub fn is_feature_enabled(&self, feature: Feature) -> bool {
        self.states.get(&feature).copied().unwrap_or(false)
    }

    /// Enabled features in catalogue order
    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|&feature| self.is_feature_enabled(feature))
            .collect()
    }
}

/// Mutable stage of a `FeatureRegistry`
pub struct FeatureRegistryBuilder {
    states: FxHashMap<Feature, bool>,
}

impl FeatureRegistryBuilder {
    /// Force a feature on
    pub fn enable(self, feature: Feature) -> Self {
        self.set(feature, true)
    }

    /// Force a feature off
    pub fn disable(self, feature: Feature) -> Self {
        self.set(feature, false)
    }

    /// Set a feature state
    pub fn set(mut self, feature: Feature, enabled: bool) -> Self {
        self.states.insert(feature, enabled);
        self
    }

    /// Enable the fallbacks a device needs for the capabilities it lacks
    pub fn with_device_defaults(self, caps: &DeviceCaps) -> Self {
        self.set(Feature::EmulateIndependentColorMasks, !caps.supports_independent_color_masks)
            .set(Feature::PreserveUnclearedDepthStencilPlane, !caps.supports_separate_depth_stencil_clear)
            .set(Feature::DepthStencilBlitExtraCopy, !caps.supports_partial_depth_stencil_blit)
    }

    /// Apply name overrides; disabled overrides win. Unknown names are logged and ignored.
    pub fn apply_config(mut self, config: &FeatureConfig) -> Self {
        for (names, enabled) in [(&config.enabled_overrides, true), (&config.disabled_overrides, false)] {
            for name in names {
                match Feature::from_name(name) {
                    Some(feature) => {
                        self.states.insert(feature, enabled);
                    }
                    None => {
                        crate::shim_warn!("fbt::FeatureRegistry", "Unknown feature override '{}' ignored", name);
                    }
                }
            }
        }
        self
    }

    /// Freeze the table
    pub fn build(self) -> FeatureRegistry {
        FeatureRegistry { states: self.states }
    }
}

#[cfg(test)]
#[path = "feature_registry_tests.rs"]
mod tests;
