use serde::{Deserialize, Serialize};

/// Governs whether an update write is guarded by the original value of a
/// designated field, and how conflicting concurrent updates are handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotenceContract {
    /// Field whose stored value guards the conditional write. `None`
    /// disables guarding entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Raise instead of writing unconditionally when the guard field is
    /// absent on the original, or when the caller changed its value.
    #[serde(default)]
    pub raise_on_mismatch: bool,
    /// When both values parse as timestamps and the stored one is strictly
    /// newer, skip the write and treat the stored record as current.
    #[serde(default)]
    pub use_latest: bool,
}

impl IdempotenceContract {
    /// Contract guarding on the given field with default behavior
    /// (no raise, no use-latest).
    pub fn guarded(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }
}
