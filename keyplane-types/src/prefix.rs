use serde::{Deserialize, Serialize};

/// Key-namespacing configuration for the transcoder.
///
/// A field/prefix pair is only active when both halves are present; a
/// half-configured pair is inert. Prefixes apply to string values only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixConfig {
    /// Partition-key field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_key: Option<String>,
    /// Prefix applied to the partition-key value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_prefix: Option<String>,
    /// Sort-key field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    /// Prefix applied to the sort-key value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_prefix: Option<String>,
}

impl PrefixConfig {
    /// Config prefixing only the partition key.
    pub fn hash(key: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            hash_key: Some(key.into()),
            hash_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Adds a sort-key pair to the config.
    pub fn with_range(mut self, key: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.range_key = Some(key.into());
        self.range_prefix = Some(prefix.into());
        self
    }

    /// The partition pair, if both halves are configured.
    pub fn hash_pair(&self) -> Option<(&str, &str)> {
        match (self.hash_key.as_deref(), self.hash_prefix.as_deref()) {
            (Some(key), Some(prefix)) => Some((key, prefix)),
            _ => None,
        }
    }

    /// The sort pair, if both halves are configured.
    pub fn range_pair(&self) -> Option<(&str, &str)> {
        match (self.range_key.as_deref(), self.range_prefix.as_deref()) {
            (Some(key), Some(prefix)) => Some((key, prefix)),
            _ => None,
        }
    }

    /// True when no pair is fully configured.
    pub fn is_inert(&self) -> bool {
        self.hash_pair().is_none() && self.range_pair().is_none()
    }
}
