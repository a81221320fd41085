use rand::{Rng, distributions::Alphanumeric, thread_rng};
use std::fmt;

pub const NONCE_LEN: usize = 32;

/// One-time token authorizing inline script and style in a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Samples a fresh token from the 62-symbol alphanumeric alphabet.
    pub fn generate() -> Self {
        let token = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
