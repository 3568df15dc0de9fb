//! Workaround feature flags
//!
//! A flat, immutable table of named boolean toggles selecting backend- and
//! driver-specific emulation behavior. Built once at startup by
//! `FeatureRegistry::builder()` and shared read-only.

mod feature;
mod feature_config;
mod feature_registry;

pub use feature::Feature;
pub use feature_config::FeatureConfig;
pub use feature_registry::{FeatureRegistry, FeatureRegistryBuilder};
