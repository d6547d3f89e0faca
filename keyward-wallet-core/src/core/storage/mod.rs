//! Keystore management
//!
//! Creates, loads and saves wallet documents through a [`WalletStore`] and
//! opens them as capability handles for key retrieval.

use std::sync::Arc;
use zeroize::Zeroizing;

use crate::core::crypto::{KdfParams, KeyDeriver, PrivateKeyBytes};
use crate::domain::capabilities::Wallet;
use crate::infrastructure::keystore::{open_envelope, AccountDocument, WalletDocument};
use crate::infrastructure::platform::WalletStore;
use crate::shared::constants::{DEFAULT_ACCOUNT_PATH_BASE, ACCOUNT_SEPARATOR};
use crate::shared::error::{ErrorKind, WalletError, WalletResult};
use crate::shared::types::{is_derivation_path, SecretBytes, WalletType};

/// Outcome of creating a wallet
pub struct CreatedWallet {
    pub document: WalletDocument,
    /// Mnemonic generated for an HD wallet created without one
    pub mnemonic: Option<Zeroizing<String>>,
}

/// Keystore operations over a pluggable store
pub struct KeystoreManager {
    store: Arc<dyn WalletStore>,
    kdf: KdfParams,
}

impl KeystoreManager {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store, kdf: KdfParams::default() }
    }

    /// Override the KDF cost used for newly sealed secrets
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn list_wallets(&self) -> WalletResult<Vec<String>> {
        self.store.list_keys()
    }

    pub fn load_document(&self, wallet_name: &str) -> WalletResult<WalletDocument> {
        validate_wallet_name(wallet_name)?;
        let data = self.store.retrieve(wallet_name)?;
        WalletDocument::from_json(&data)
    }

    pub fn save_document(&self, document: &WalletDocument) -> WalletResult<()> {
        validate_wallet_name(&document.name)?;
        self.store.store(&document.name, &document.to_json()?)
    }

    /// Open a wallet as a capability handle, all accounts locked
    pub fn open_wallet(&self, wallet_name: &str) -> WalletResult<Arc<dyn Wallet>> {
        let document = self.load_document(wallet_name)?;
        log::debug!("Opened wallet {:?} ({})", document.name, document.wallet_type);
        document.open()
    }

    /// Create and persist a wallet.
    ///
    /// HD wallets need `wallet_passphrase`; when `mnemonic` is `None` a fresh
    /// one is generated and handed back once in [`CreatedWallet::mnemonic`].
    pub async fn create_wallet(
        &self,
        wallet_name: &str,
        wallet_type: WalletType,
        wallet_passphrase: Option<&[u8]>,
        mnemonic: Option<&str>,
    ) -> WalletResult<CreatedWallet> {
        validate_wallet_name(wallet_name)?;
        if self.store.exists(wallet_name)? {
            return Err(WalletError::wallet_already_exists(wallet_name.to_string()));
        }

        let created = match wallet_type {
            WalletType::NonDeterministic => {
                if mnemonic.is_some() {
                    return Err(WalletError::validation(
                        "a mnemonic only applies to hierarchical deterministic wallets",
                    ));
                }
                CreatedWallet {
                    document: WalletDocument::non_deterministic(wallet_name),
                    mnemonic: None,
                }
            }
            WalletType::HierarchicalDeterministic => {
                let passphrase = wallet_passphrase
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        WalletError::missing_credential("a wallet passphrase is required for an HD wallet")
                    })?;
                let (phrase, generated) = match mnemonic {
                    Some(phrase) => (Zeroizing::new(phrase.to_string()), false),
                    None => (KeyDeriver::generate_mnemonic()?, true),
                };
                let name = wallet_name.to_string();
                let passphrase = SecretBytes::new(passphrase.to_vec());
                let kdf = self.kdf;
                let seal_phrase = phrase.clone();
                let document = tokio::task::spawn_blocking(move || {
                    let seed = KeyDeriver::seed_from_mnemonic(&seal_phrase)?;
                    WalletDocument::hierarchical(&name, &seed, &passphrase, kdf)
                })
                .await??;
                CreatedWallet {
                    document,
                    mnemonic: if generated { Some(phrase) } else { None },
                }
            }
        };

        self.save_document(&created.document)?;
        log::info!("Created {} wallet {:?}", wallet_type, wallet_name);
        Ok(created)
    }

    /// Import a raw private key as a named account sealed under `passphrase`
    pub async fn import_account(
        &self,
        wallet_name: &str,
        account_name: &str,
        key: &[u8],
        passphrase: &[u8],
    ) -> WalletResult<AccountDocument> {
        let mut document = self.load_document(wallet_name)?;
        validate_account_name(&document, account_name)?;
        let key = PrivateKeyBytes::from_bytes(key)?;
        let account = self.seal_account(account_name, key, passphrase, None).await?;
        self.append_account(&mut document, account)
    }

    /// Create the next account of an HD wallet from its seed
    pub async fn create_account(
        &self,
        wallet_name: &str,
        account_name: &str,
        wallet_passphrase: &[u8],
        passphrase: &[u8],
    ) -> WalletResult<AccountDocument> {
        let mut document = self.load_document(wallet_name)?;
        validate_account_name(&document, account_name)?;
        let sealed_seed = document.seed.as_ref().ok_or_else(|| {
            WalletError::unsupported(format!(
                "wallet {:?} is {} and cannot derive accounts",
                wallet_name, document.wallet_type
            ))
        })?;

        let seed = open_envelope(sealed_seed, wallet_passphrase).await?;
        let path = format!("{}/{}", DEFAULT_ACCOUNT_PATH_BASE, document.next_account);
        let key = KeyDeriver::derive(&seed, &path)?;
        let account = self.seal_account(account_name, key, passphrase, Some(path)).await?;
        document.next_account += 1;
        self.append_account(&mut document, account)
    }

    pub fn delete_wallet(&self, wallet_name: &str) -> WalletResult<()> {
        validate_wallet_name(wallet_name)?;
        if !self.store.exists(wallet_name)? {
            return Err(WalletError::wallet_not_found(wallet_name.to_string()));
        }
        self.store.delete(wallet_name)
    }

    async fn seal_account(
        &self,
        account_name: &str,
        key: PrivateKeyBytes,
        passphrase: &[u8],
        path: Option<String>,
    ) -> WalletResult<AccountDocument> {
        if passphrase.is_empty() {
            return Err(WalletError::missing_credential("an account passphrase is required"));
        }
        let name = account_name.to_string();
        let passphrase = SecretBytes::new(passphrase.to_vec());
        let kdf = self.kdf;
        tokio::task::spawn_blocking(move || AccountDocument::seal(&name, &key, &passphrase, kdf, path))
            .await?
    }

    fn append_account(
        &self,
        document: &mut WalletDocument,
        account: AccountDocument,
    ) -> WalletResult<AccountDocument> {
        document.accounts.push(account.clone());
        self.save_document(document)?;
        log::info!("Added account {:?} to wallet {:?}", account.name, document.name);
        Ok(account)
    }
}

fn validate_wallet_name(name: &str) -> WalletResult<()> {
    if name.is_empty() || name.contains(ACCOUNT_SEPARATOR) || name.starts_with('.') {
        return Err(WalletError::validation(format!("Invalid wallet name: {:?}", name)));
    }
    Ok(())
}

fn validate_account_name(document: &WalletDocument, name: &str) -> WalletResult<()> {
    if name.is_empty() || is_derivation_path(name) {
        return Err(WalletError::validation(format!("Invalid account name: {:?}", name)));
    }
    if document.account(name).is_some() {
        return Err(WalletError::account_already_exists(format!(
            "{:?} in wallet {:?}",
            name, document.name
        )));
    }
    Ok(())
}

/// True for errors that mean the wallet itself is absent
pub fn is_missing_wallet(error: &WalletError) -> bool {
    error.kind() == ErrorKind::WalletNotFound
}
