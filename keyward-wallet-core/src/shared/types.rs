use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::shared::constants::{DERIVATION_PATH_PREFIX, HD_WALLET_TYPE, ND_WALLET_TYPE};
use crate::shared::error::WalletError;

/// Secret bytes that are wiped when dropped
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Keystore wallet flavours
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    HierarchicalDeterministic,
    NonDeterministic,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::HierarchicalDeterministic => HD_WALLET_TYPE,
            WalletType::NonDeterministic => ND_WALLET_TYPE,
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            HD_WALLET_TYPE | "hd" => Ok(WalletType::HierarchicalDeterministic),
            ND_WALLET_TYPE | "nd" => Ok(WalletType::NonDeterministic),
            other => Err(WalletError::validation(format!("Unknown wallet type: {}", other))),
        }
    }
}

/// Wallet and account components of a qualified account name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountReference {
    pub wallet_name: String,
    pub account_name: String,
}

impl AccountReference {
    pub fn new(wallet_name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            wallet_name: wallet_name.into(),
            account_name: account_name.into(),
        }
    }

    /// True when the account name is a derivation path rather than a stored name
    pub fn is_derivation_path(&self) -> bool {
        is_derivation_path(&self.account_name)
    }
}

impl fmt::Display for AccountReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.wallet_name, self.account_name)
    }
}

pub fn is_derivation_path(account_name: &str) -> bool {
    account_name.starts_with(DERIVATION_PATH_PREFIX)
}
