//! Retriever configuration.

use serde::{Deserialize, Serialize};
use skillbridge_core::error::ConfigError;

/// What the retriever does when the bridge pass fails after a successful
/// direct pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeFailurePolicy {
    /// Return the direct results with a recorded warning.
    #[default]
    Degrade,
    /// Propagate the bridge error.
    Fail,
}

/// Tunables of the hybrid retriever.
///
/// The bridge constants were chosen empirically. Treat them as knobs, not
/// derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Result count used by `retrieve_default`.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    /// How many related skills the direct pass asks the vector index for.
    #[serde(default = "default_related_skill_k")]
    pub related_skill_k: usize,
    /// The bridge pass runs when the direct pass yields fewer candidates than
    /// this. 0 disables the bridge.
    #[serde(default = "default_bridge_trigger")]
    pub bridge_trigger: usize,
    /// How many active skills the bridge pass keeps.
    #[serde(default = "default_bridge_skill_k")]
    pub bridge_skill_k: usize,
    /// Minimum similarity for an active skill to act as a bridge.
    #[serde(default = "default_bridge_min_similarity")]
    pub bridge_min_similarity: f64,
    #[serde(default)]
    pub on_bridge_error: BridgeFailurePolicy,
}

fn default_top_k() -> usize { 8 }
fn default_related_skill_k() -> usize { 10 }
fn default_bridge_trigger() -> usize { 3 }
fn default_bridge_skill_k() -> usize { 5 }
fn default_bridge_min_similarity() -> f64 { 0.35 }

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            related_skill_k: default_related_skill_k(),
            bridge_trigger: default_bridge_trigger(),
            bridge_skill_k: default_bridge_skill_k(),
            bridge_min_similarity: default_bridge_min_similarity(),
            on_bridge_error: BridgeFailurePolicy::default(),
        }
    }
}

impl RetrieverConfig {
    pub fn with_default_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }

    pub fn with_related_skill_k(mut self, k: usize) -> Self {
        self.related_skill_k = k;
        self
    }

    pub fn with_bridge_trigger(mut self, trigger: usize) -> Self {
        self.bridge_trigger = trigger;
        self
    }

    pub fn with_bridge_skill_k(mut self, k: usize) -> Self {
        self.bridge_skill_k = k;
        self
    }

    pub fn with_bridge_min_similarity(mut self, similarity: f64) -> Self {
        self.bridge_min_similarity = similarity;
        self
    }

    pub fn with_bridge_failure_policy(mut self, policy: BridgeFailurePolicy) -> Self {
        self.on_bridge_error = policy;
        self
    }

    /// Whether the bridge pass is enabled at all.
    pub fn bridge_enabled(&self) -> bool {
        self.bridge_trigger > 0
    }

    /// Reject values the retriever cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("default_top_k", self.default_top_k),
            ("related_skill_k", self.related_skill_k),
            ("bridge_skill_k", self.bridge_skill_k),
        ] {
            if value == 0 {
                return Err(ConfigError::out_of_range(field, 1.0, usize::MAX as f64, 0.0));
            }
        }

        let similarity = self.bridge_min_similarity;
        if !(0.0..=1.0).contains(&similarity) {
            return Err(ConfigError::out_of_range(
                "bridge_min_similarity",
                0.0,
                1.0,
                similarity,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RetrieverConfig::default();
        assert_eq!(config.default_top_k, 8);
        assert_eq!(config.related_skill_k, 10);
        assert_eq!(config.bridge_trigger, 3);
        assert_eq!(config.bridge_skill_k, 5);
        assert!((config.bridge_min_similarity - 0.35).abs() < f64::EPSILON);
        assert_eq!(config.on_bridge_error, BridgeFailurePolicy::Degrade);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RetrieverConfig =
            serde_json::from_str(r#"{"bridge_min_similarity": 0.5, "on_bridge_error": "fail"}"#)
                .unwrap();
        assert_eq!(config.related_skill_k, 10);
        assert_eq!(config.on_bridge_error, BridgeFailurePolicy::Fail);
        assert!((config.bridge_min_similarity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_k = RetrieverConfig::default().with_related_skill_k(0);
        assert!(matches!(
            zero_k.validate(),
            Err(ConfigError::OutOfRange { ref field, .. }) if field == "related_skill_k"
        ));

        for bad in [-0.1, 1.5, f64::NAN] {
            let config = RetrieverConfig::default().with_bridge_min_similarity(bad);
            assert!(config.validate().is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn zero_trigger_disables_bridge() {
        let config = RetrieverConfig::default().with_bridge_trigger(0);
        assert!(!config.bridge_enabled());
        assert!(config.validate().is_ok());
    }
}
