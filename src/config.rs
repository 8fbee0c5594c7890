//! Balancer configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a balancing session.
///
/// Deserialized from the optional `config` key of page input; every field
/// has a default so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceConfig {
    /// Text whose unwrapped width reaches this many pixels is left alone.
    pub max_text_width: f64,
    /// Do nothing when the host balances text natively.
    pub respect_native_text_wrap: bool,
}

impl BalanceConfig {
    pub const DEFAULT_MAX_TEXT_WIDTH: f64 = 5000.0;
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_text_width: Self::DEFAULT_MAX_TEXT_WIDTH,
            respect_native_text_wrap: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: BalanceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BalanceConfig::default());
        assert_eq!(config.max_text_width, 5000.0);
    }

    #[test]
    fn test_camel_case_keys() {
        let config: BalanceConfig =
            serde_json::from_str(r#"{ "maxTextWidth": 800, "respectNativeTextWrap": false }"#)
                .unwrap();
        assert_eq!(config.max_text_width, 800.0);
        assert!(!config.respect_native_text_wrap);
    }
}
