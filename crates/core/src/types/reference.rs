//! Order reference: the correlation key between a checkout preference and
//! the payment webhook that eventually resolves it.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the random suffix appended to the timestamp.
const SUFFIX_LEN: usize = 8;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque order reference string.
///
/// Generated as `SB-<millis>-<random suffix>`. Uniqueness is probabilistic:
/// a millisecond timestamp plus an 8-character random suffix makes a
/// collision negligible for this traffic, and nothing downstream depends on
/// formal uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Generate a fresh reference from the current time and a random suffix.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
                char::from(SUFFIX_ALPHABET[idx])
            })
            .collect();
        Self(format!("SB-{millis}-{suffix}"))
    }

    /// Wrap an existing reference string (e.g., from a gateway payload).
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderReference {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl AsRef<str> for OrderReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
