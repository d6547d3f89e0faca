//! Secret candidate source
//!
//! Supplies the wallet-level passphrase and the ordered account passphrase
//! candidates. Content is passed through untouched: no trimming, no
//! deduplication, order exactly as supplied.

use std::fmt;

use crate::shared::types::SecretBytes;

/// Where unlock secrets come from
#[cfg_attr(test, mockall::automock)]
pub trait SecretSource: Send + Sync {
    /// Passphrase for wallet-level unlock, if one was supplied
    fn wallet_secret(&self) -> Option<SecretBytes>;

    /// Account passphrase guesses, tried first to last
    fn account_candidates(&self) -> Vec<SecretBytes>;
}

/// Caller-supplied secrets held in memory for one operation
#[derive(Default)]
pub struct SecretCandidates {
    wallet_secret: Option<SecretBytes>,
    account_candidates: Vec<SecretBytes>,
}

impl SecretCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from plain strings, as collected from flags or the environment
    pub fn from_strings<I, S>(wallet_secret: Option<&str>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut secrets = Self::new();
        if let Some(secret) = wallet_secret {
            secrets = secrets.with_wallet_secret(secret.as_bytes());
        }
        for candidate in candidates {
            secrets.push_candidate(candidate.as_ref().as_bytes());
        }
        secrets
    }

    pub fn with_wallet_secret(mut self, secret: &[u8]) -> Self {
        self.wallet_secret = Some(SecretBytes::new(secret.to_vec()));
        self
    }

    pub fn with_candidate(mut self, candidate: &[u8]) -> Self {
        self.push_candidate(candidate);
        self
    }

    /// Append a candidate after those already present
    pub fn push_candidate(&mut self, candidate: &[u8]) {
        self.account_candidates.push(SecretBytes::new(candidate.to_vec()));
    }

    pub fn candidate_count(&self) -> usize {
        self.account_candidates.len()
    }

    pub fn has_wallet_secret(&self) -> bool {
        self.wallet_secret.is_some()
    }
}

impl SecretSource for SecretCandidates {
    fn wallet_secret(&self) -> Option<SecretBytes> {
        self.wallet_secret.clone()
    }

    fn account_candidates(&self) -> Vec<SecretBytes> {
        self.account_candidates.clone()
    }
}

// Never print secret content
impl fmt::Debug for SecretCandidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCandidates")
            .field("wallet_secret", &self.wallet_secret.as_ref().map(|_| "<redacted>"))
            .field("account_candidates", &self.account_candidates.len())
            .finish()
    }
}
