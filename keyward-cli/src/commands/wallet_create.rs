//! `keyward wallet create`: create an empty wallet.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::str::FromStr;

use keyward_wallet_core::WalletType;

use crate::infrastructure::config::CliConfig;
use crate::secrets::{required_secret, Prompt};

#[derive(Args)]
pub struct WalletCreateArgs {
    /// Wallet name.
    #[arg(long)]
    pub wallet: String,

    /// Wallet type: "hd" (hierarchical deterministic) or "nd" (non-deterministic).
    #[arg(long = "type", default_value = "nd", value_parser = WalletType::from_str)]
    pub wallet_type: WalletType,

    /// Existing BIP-39 mnemonic for an HD wallet (generated when omitted).
    #[arg(long, env = "KEYWARD_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Passphrase protecting the HD seed (or set KEYWARD_WALLET_PASSPHRASE).
    #[arg(long, env = "KEYWARD_WALLET_PASSPHRASE", hide_env_values = true)]
    pub wallet_passphrase: Option<String>,
}

pub async fn run(config: &CliConfig, args: WalletCreateArgs, prompt: Prompt<'_>, out: &mut dyn Write) -> Result<()> {
    let core = super::wallet_core(config)?;

    let passphrase = match args.wallet_type {
        WalletType::HierarchicalDeterministic => Some(required_secret(
            args.wallet_passphrase,
            "Wallet passphrase: ",
            prompt,
        )?),
        WalletType::NonDeterministic => None,
    };

    let created = core
        .keystore
        .create_wallet(
            &args.wallet,
            args.wallet_type,
            passphrase.as_ref().map(|p| p.as_bytes()),
            args.mnemonic.as_deref(),
        )
        .await?;
    tracing::info!(wallet = %created.document.name, "Wallet created");

    writeln!(out, "Created {} wallet {}", created.document.wallet_type, created.document.name)?;
    if let Some(mnemonic) = created.mnemonic {
        writeln!(out, "Write down this mnemonic; it is the only way to recover the wallet:")?;
        writeln!(out, "  {}", mnemonic.as_str())?;
    }
    Ok(())
}
