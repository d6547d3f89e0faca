//! `keyward account import`: seal an existing private key into a wallet.

use anyhow::{anyhow, Result};
use clap::Args;
use std::io::Write;
use zeroize::Zeroizing;

use keyward_wallet_core::shared::utils::decode_prefixed_hex;
use keyward_wallet_core::{NameResolver, QualifiedNameResolver};

use crate::infrastructure::config::CliConfig;
use crate::secrets::{required_secret, Prompt};

#[derive(Args)]
pub struct AccountImportArgs {
    /// Qualified name of the new account: `<wallet>/<account>`.
    #[arg(long)]
    pub account: String,

    /// Private key as hex, with or without `0x` (prompted when omitted).
    #[arg(long, env = "KEYWARD_IMPORT_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Passphrase sealing the account (or set KEYWARD_ACCOUNT_PASSPHRASE).
    #[arg(long, env = "KEYWARD_ACCOUNT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
}

pub async fn run(config: &CliConfig, args: AccountImportArgs, prompt: Prompt<'_>, out: &mut dyn Write) -> Result<()> {
    let reference = QualifiedNameResolver::new().resolve(&args.account)?;
    let core = super::wallet_core(config)?;

    let key_hex = required_secret(args.key, "Private key (hex): ", prompt)?;
    let key = Zeroizing::new(
        decode_prefixed_hex(&key_hex).map_err(|e| anyhow!("Private key is not valid hex: {}", e))?,
    );
    let passphrase = required_secret(args.passphrase, "Account passphrase: ", prompt)?;

    let account = core
        .keystore
        .import_account(&reference.wallet_name, &reference.account_name, &key, passphrase.as_bytes())
        .await?;
    tracing::info!(account = %reference, "Account imported");

    writeln!(out, "Imported account {}", reference)?;
    writeln!(out, "Public key: {}", account.public_key)?;
    Ok(())
}
