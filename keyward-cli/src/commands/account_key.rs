//! `keyward account key`: unlock an account and print its raw private key.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use zeroize::Zeroizing;

use keyward_wallet_core::shared::utils::to_prefixed_hex;
use keyward_wallet_core::{NameResolver, QualifiedNameResolver};

use crate::infrastructure::config::CliConfig;
use crate::secrets::{PassphraseArgs, Prompt};

#[derive(Args)]
pub struct AccountKeyArgs {
    /// Qualified account name: `<wallet>/<account>` or `<wallet>/m/<path>`.
    #[arg(long)]
    pub account: String,

    #[command(flatten)]
    pub secrets: PassphraseArgs,

    /// Unlock and export without printing the key.
    #[arg(long)]
    pub quiet: bool,
}

pub async fn run(config: &CliConfig, args: AccountKeyArgs, prompt: Prompt<'_>, out: &mut dyn Write) -> Result<()> {
    let core = super::wallet_core(config)?;

    let needs_wallet_secret = QualifiedNameResolver::new()
        .resolve(&args.account)
        .map(|reference| reference.is_derivation_path())
        .unwrap_or(false);
    let secrets = args.secrets.into_candidates(needs_wallet_secret, prompt)?;

    let (outcome, relock_error) = core.account_key(&args.account, &secrets).await.into_parts();
    if let Some(e) = relock_error {
        tracing::warn!(account = %args.account, error = %e, "Account could not be locked again");
        eprintln!("Warning: account {} may still be unlocked: {}", args.account, e);
    }

    let key = outcome?;
    tracing::info!(account = %args.account, "Private key exported");
    if !args.quiet {
        let rendered = Zeroizing::new(to_prefixed_hex(&key));
        writeln!(out, "{}", rendered.as_str())?;
    }
    Ok(())
}
