//! Passphrase envelope encryption
//!
//! Argon2id stretches the passphrase into an AES-256-GCM key. The KDF
//! parameters, salt and nonce travel with the ciphertext so an envelope can be
//! opened with nothing but the passphrase.

use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::SecretBytes;
use aes_gcm::aead::{Aead, generic_array::GenericArray};
use aes_gcm::{Aes256Gcm, KeyInit};
use argon2::{Argon2, Algorithm, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: ARGON2_MEMORY_COST,
            time_cost: ARGON2_TIME_COST,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

impl KdfParams {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self { memory_cost, time_cost, parallelism }
    }

    /// Minimal parameters for tests and throwaway keystores
    pub fn insecure_fast() -> Self {
        Self::new(256, 1, 1)
    }
}

/// Ciphertext plus everything needed to re-derive its key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretEnvelope {
    pub kdf: KdfParams,
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
}

impl SecretEnvelope {
    /// Encrypt `plaintext` under `passphrase`
    pub fn seal(plaintext: &[u8], passphrase: &[u8], kdf: KdfParams) -> Result<Self, WalletError> {
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        let mut rng = OsRng;
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut nonce);

        let key = derive_key(passphrase, &salt, &kdf)?;
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&*key));
        let ciphertext = cipher.encrypt(GenericArray::from_slice(&nonce), plaintext)
            .map_err(|e| WalletError::crypto(format!("Encryption failed: {}", e)))?;

        Ok(Self {
            kdf,
            salt: STANDARD.encode(salt),
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
        })
    }

    /// Decrypt with `passphrase`. A wrong passphrase is `UnlockFailed`.
    pub fn open(&self, passphrase: &[u8]) -> Result<SecretBytes, WalletError> {
        let salt = STANDARD.decode(&self.salt)
            .map_err(|e| WalletError::crypto(format!("Base64 decode failed: {}", e)))?;
        let nonce = STANDARD.decode(&self.nonce)
            .map_err(|e| WalletError::crypto(format!("Base64 decode failed: {}", e)))?;
        let ciphertext = STANDARD.decode(&self.ciphertext)
            .map_err(|e| WalletError::crypto(format!("Base64 decode failed: {}", e)))?;

        if nonce.len() != NONCE_SIZE {
            return Err(WalletError::crypto("Invalid nonce length".to_string()));
        }
        if ciphertext.len() < TAG_SIZE {
            return Err(WalletError::crypto("Encrypted data too short".to_string()));
        }

        let key = derive_key(passphrase, &salt, &self.kdf)?;
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&*key));
        let plaintext = cipher.decrypt(GenericArray::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| WalletError::unlock_failed("incorrect passphrase"))?;

        Ok(SecretBytes::new(plaintext))
    }
}

fn derive_key(passphrase: &[u8], salt: &[u8], kdf: &KdfParams) -> Result<Zeroizing<[u8; KEY_SIZE]>, WalletError> {
    let argon2 = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(kdf.memory_cost, kdf.time_cost, kdf.parallelism, Some(KEY_SIZE))?,
    );
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2.hash_password_into(passphrase, salt, &mut *key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ErrorKind;

    #[test]
    fn test_seal_and_open() {
        let envelope = SecretEnvelope::seal(b"secret key bytes", b"passphrase", KdfParams::insecure_fast())
            .expect("seal");
        let opened = envelope.open(b"passphrase").expect("open");
        assert_eq!(opened.as_slice(), b"secret key bytes");
    }

    #[test]
    fn test_wrong_passphrase_is_unlock_failure() {
        let envelope = SecretEnvelope::seal(b"data", b"right", KdfParams::insecure_fast())
            .expect("seal");
        let err = envelope.open(b"wrong").expect_err("wrong passphrase must fail");
        assert_eq!(err.kind(), ErrorKind::UnlockFailed);
    }

    #[test]
    fn test_envelope_survives_json() {
        let envelope = SecretEnvelope::seal(b"data", b"pw", KdfParams::insecure_fast())
            .expect("seal");
        let json = serde_json::to_string(&envelope).expect("serialize");
        let restored: SecretEnvelope = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.kdf, KdfParams::insecure_fast());
        assert_eq!(restored.open(b"pw").expect("open").as_slice(), b"data");
    }

    #[test]
    fn test_tampered_nonce_rejected() {
        let mut envelope = SecretEnvelope::seal(b"data", b"pw", KdfParams::insecure_fast())
            .expect("seal");
        envelope.nonce = STANDARD.encode([0u8; 4]);
        assert_eq!(envelope.open(b"pw").expect_err("short nonce").kind(), ErrorKind::Crypto);
    }
}
