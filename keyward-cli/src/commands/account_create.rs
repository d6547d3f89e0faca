//! `keyward account create`: derive the next account of an HD wallet.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use keyward_wallet_core::{NameResolver, QualifiedNameResolver};

use crate::infrastructure::config::CliConfig;
use crate::secrets::{required_secret, Prompt};

#[derive(Args)]
pub struct AccountCreateArgs {
    /// Qualified name of the new account: `<wallet>/<account>`.
    #[arg(long)]
    pub account: String,

    /// Passphrase of the HD wallet seed (or set KEYWARD_WALLET_PASSPHRASE).
    #[arg(long, env = "KEYWARD_WALLET_PASSPHRASE", hide_env_values = true)]
    pub wallet_passphrase: Option<String>,

    /// Passphrase sealing the new account (or set KEYWARD_ACCOUNT_PASSPHRASE).
    #[arg(long, env = "KEYWARD_ACCOUNT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
}

pub async fn run(config: &CliConfig, args: AccountCreateArgs, prompt: Prompt<'_>, out: &mut dyn Write) -> Result<()> {
    let reference = QualifiedNameResolver::new().resolve(&args.account)?;
    let core = super::wallet_core(config)?;

    let wallet_passphrase = required_secret(args.wallet_passphrase, "Wallet passphrase: ", prompt)?;
    let passphrase = required_secret(args.passphrase, "Account passphrase: ", prompt)?;

    let account = core
        .keystore
        .create_account(
            &reference.wallet_name,
            &reference.account_name,
            wallet_passphrase.as_bytes(),
            passphrase.as_bytes(),
        )
        .await?;
    tracing::info!(account = %reference, path = ?account.path, "Account created");

    writeln!(out, "Created account {}", reference)?;
    if let Some(path) = &account.path {
        writeln!(out, "Derivation path: {}", path)?;
    }
    writeln!(out, "Public key: {}", account.public_key)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{config, no_prompt};
    use crate::commands::wallet_core;
    use keyward_wallet_core::{ErrorKind, WalletError, WalletType};

    fn args(account: &str) -> AccountCreateArgs {
        AccountCreateArgs {
            account: account.to_string(),
            wallet_passphrase: Some("wallet pw".to_string()),
            passphrase: Some("account pw".to_string()),
        }
    }

    fn kind_of(error: &anyhow::Error) -> Option<ErrorKind> {
        error.downcast_ref::<WalletError>().map(WalletError::kind)
    }

    #[tokio::test]
    async fn test_accounts_take_consecutive_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        wallet_core(&config(&dir))
            .expect("core")
            .keystore
            .create_wallet("Seeded", WalletType::HierarchicalDeterministic, Some(b"wallet pw".as_slice()), None)
            .await
            .expect("wallet");

        let mut first = Vec::new();
        run(&config(&dir), args("Seeded/Spending"), &mut no_prompt, &mut first)
            .await
            .expect("first");
        let mut second = Vec::new();
        run(&config(&dir), args("Seeded/Savings"), &mut no_prompt, &mut second)
            .await
            .expect("second");

        assert!(String::from_utf8(first).expect("utf8").contains("Derivation path: m/44'/60'/0'/0/0\n"));
        assert!(String::from_utf8(second).expect("utf8").contains("Derivation path: m/44'/60'/0'/0/1\n"));
    }

    #[tokio::test]
    async fn test_non_deterministic_wallet_cannot_derive() {
        let dir = tempfile::tempdir().expect("tempdir");
        wallet_core(&config(&dir))
            .expect("core")
            .keystore
            .create_wallet("Personal", WalletType::NonDeterministic, None, None)
            .await
            .expect("wallet");

        let mut out = Vec::new();
        let error = run(&config(&dir), args("Personal/Spending"), &mut no_prompt, &mut out)
            .await
            .expect_err("nd wallet");
        assert_eq!(kind_of(&error), Some(ErrorKind::UnsupportedOperation));
    }

    #[tokio::test]
    async fn test_rejects_path_as_account_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut out = Vec::new();
        assert!(run(&config(&dir), args("Seeded/m/0"), &mut no_prompt, &mut out).await.is_err());
    }
}
