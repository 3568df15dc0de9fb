/// Feature override configuration.
///
/// Lists of feature names forced on or off, applied on top of the catalogue
/// and device defaults.

use std::env;

/// Environment variable listing features to force on
pub const ENABLED_OVERRIDES_ENV: &str = "FBT_FEATURE_OVERRIDES_ENABLED";

/// Environment variable listing features to force off
pub const DISABLED_OVERRIDES_ENV: &str = "FBT_FEATURE_OVERRIDES_DISABLED";

/// Feature overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Names of features to enable
    pub enabled_overrides: Vec<String>,
    /// Names of features to disable (wins over `enabled_overrides`)
    pub disabled_overrides: Vec<String>,
}

impl FeatureConfig {
    /// Read overrides from `FBT_FEATURE_OVERRIDES_ENABLED` and
    /// `FBT_FEATURE_OVERRIDES_DISABLED`
    pub fn from_env() -> Self {
        Self {
            enabled_overrides: env::var(ENABLED_OVERRIDES_ENV)
                .map(|value| Self::parse_list(&value))
                .unwrap_or_default(),
            disabled_overrides: env::var(DISABLED_OVERRIDES_ENV)
                .map(|value| Self::parse_list(&value))
                .unwrap_or_default(),
        }
    }

    /// Split a comma/space/colon separated list of names
    pub fn parse_list(value: &str) -> Vec<String> {
        value
            .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether no override is configured
    pub fn is_empty(&self) -> bool {
        self.enabled_overrides.is_empty() && self.disabled_overrides.is_empty()
    }
}
