//! Key derivation for hierarchical deterministic wallets
//!
//! BIP-39 mnemonics become seeds, and BIP-32 paths such as `m/44'/60'/0'/0/0`
//! are derived from a seed into a [`PrivateKeyBytes`].

use crate::shared::constants::DERIVATION_PATH_PREFIX;
use crate::shared::error::WalletError;
use crate::shared::types::SecretBytes;
use super::PrivateKeyBytes;
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use rand_core::{OsRng, RngCore};
use std::str::FromStr;
use zeroize::Zeroizing;

/// Stateless BIP-39/BIP-32 helper
pub struct KeyDeriver;

impl KeyDeriver {
    /// Generate a fresh 12-word English mnemonic
    pub fn generate_mnemonic() -> Result<Zeroizing<String>, WalletError> {
        let mut entropy = Zeroizing::new([0u8; 16]);
        OsRng.fill_bytes(&mut *entropy);
        let mnemonic = Mnemonic::from_entropy(&*entropy)
            .map_err(|e| WalletError::crypto(format!("Failed to build mnemonic: {}", e)))?;
        Ok(Zeroizing::new(mnemonic.to_string()))
    }

    /// Turn a mnemonic into a 64-byte seed. No BIP-39 passphrase is applied.
    pub fn seed_from_mnemonic(phrase: &str) -> Result<SecretBytes, WalletError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| WalletError::validation(format!("Invalid BIP39 seed phrase: {}", e)))?;
        Ok(SecretBytes::new(mnemonic.to_seed_normalized("").to_vec()))
    }

    /// Derive the private key at `path` from `seed`
    pub fn derive(seed: &[u8], path: &str) -> Result<PrivateKeyBytes, WalletError> {
        if !path.starts_with(DERIVATION_PATH_PREFIX) {
            return Err(WalletError::validation(format!(
                "Derivation path must start with {}",
                DERIVATION_PATH_PREFIX
            )));
        }

        let xprv = XPrv::new(seed)
            .map_err(|e| WalletError::crypto(format!("Failed to create XPrv: {}", e)))?;

        let derivation_path = DerivationPath::from_str(path)
            .map_err(|e| WalletError::validation(format!("Invalid derivation path {}: {}", path, e)))?;

        let mut child_xprv = xprv;
        for child_number in derivation_path.into_iter() {
            child_xprv = child_xprv.derive_child(child_number)
                .map_err(|e| WalletError::crypto(format!("Failed to derive child XPrv: {}", e)))?;
        }

        let private_key_bytes = Zeroizing::new(child_xprv.private_key().to_bytes().to_vec());
        PrivateKeyBytes::from_bytes(&private_key_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_seed_from_mnemonic() {
        let seed = KeyDeriver::seed_from_mnemonic(PHRASE).expect("valid mnemonic");
        assert_eq!(seed.len(), 64);
    }

    #[test]
    fn test_invalid_mnemonic_rejected() {
        assert!(KeyDeriver::seed_from_mnemonic("not a mnemonic").is_err());
    }

    #[test]
    fn test_derivation_is_deterministic_per_path() {
        let seed = KeyDeriver::seed_from_mnemonic(PHRASE).expect("valid mnemonic");
        let first = KeyDeriver::derive(&seed, "m/44'/60'/0'/0/0").expect("derive");
        let again = KeyDeriver::derive(&seed, "m/44'/60'/0'/0/0").expect("derive");
        let other = KeyDeriver::derive(&seed, "m/44'/60'/0'/0/1").expect("derive");
        assert_eq!(first.as_bytes(), again.as_bytes());
        assert_ne!(first.as_bytes(), other.as_bytes());
    }

    #[test]
    fn test_known_ethereum_vector() {
        // First account of the all-"abandon" test mnemonic
        let seed = KeyDeriver::seed_from_mnemonic(PHRASE).expect("valid mnemonic");
        let key = KeyDeriver::derive(&seed, "m/44'/60'/0'/0/0").expect("derive");
        assert_eq!(
            key.to_hex().as_str(),
            "0x1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
    }

    #[test]
    fn test_rejects_path_without_marker() {
        let seed = KeyDeriver::seed_from_mnemonic(PHRASE).expect("valid mnemonic");
        assert!(KeyDeriver::derive(&seed, "44'/60'/0'/0/0").is_err());
        assert!(KeyDeriver::derive(&seed, "m/not-a-number").is_err());
    }

    #[test]
    fn test_generated_mnemonic_parses() {
        let phrase = KeyDeriver::generate_mnemonic().expect("generate");
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert!(KeyDeriver::seed_from_mnemonic(&phrase).is_ok());
    }
}
