use crate::domain::capabilities::KeyMaterial;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::SecretBytes;
use crate::shared::utils::to_prefixed_hex;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroizing;

/// Raw secp256k1 private key held in zeroizing memory
pub struct PrivateKeyBytes {
    bytes: Zeroizing<[u8; PRIVATE_KEY_SIZE]>,
}

impl PrivateKeyBytes {
    /// Copy and validate key bytes; the caller keeps ownership of its buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(WalletError::crypto("Invalid private key length".to_string()));
        }

        let mut key = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        key.copy_from_slice(bytes);

        // Validate the key is a valid secp256k1 private key
        SecretKey::from_byte_array(*key)
            .map_err(|_| WalletError::crypto("Invalid private key".to_string()))?;

        Ok(Self { bytes: key })
    }

    /// Generate a new private key
    /// Uses cryptographically secure random number generation
    pub fn generate() -> Result<Self, WalletError> {
        use rand_core::OsRng;
        use rand_core::RngCore;

        let mut rng = OsRng;
        let mut key_bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        rng.fill_bytes(&mut *key_bytes);

        Self::from_bytes(&*key_bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &*self.bytes
    }

    /// `0x`-prefixed hex of the key
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(to_prefixed_hex(&*self.bytes))
    }

    /// Compressed public key as `0x`-prefixed hex
    pub fn public_key_hex(&self) -> Result<String, WalletError> {
        let secret_key = SecretKey::from_byte_array(*self.bytes)
            .map_err(|e| WalletError::crypto(format!("Invalid private key: {}", e)))?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::new(), &secret_key);
        Ok(to_prefixed_hex(&public_key.serialize()))
    }
}

impl KeyMaterial for PrivateKeyBytes {
    fn marshal(&self) -> SecretBytes {
        SecretBytes::new(self.bytes.to_vec())
    }
}

// No Debug implementation to prevent key exposure in logs
// No Clone implementation to prevent accidental key duplication
