use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::commands::{account_create, account_import, account_key, wallet_create};
use crate::infrastructure::config::CliConfig;
use crate::secrets::Prompt;

/// Command-line arguments for keyward
#[derive(Parser)]
#[command(
    name = "keyward",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keyward - encrypted keystore wallets and account key export"
)]
pub struct Cli {
    /// JSON configuration file (or set KEYWARD_CONFIG_FILE)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the wallet documents
    #[arg(long = "base-dir", value_name = "DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Bound for each unlock, lookup and export step, in seconds
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Log level for stderr output
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage wallets
    #[command(subcommand)]
    Wallet(WalletCommand),
    /// Manage accounts and export their keys
    #[command(subcommand)]
    Account(AccountCommand),
}

#[derive(Subcommand)]
pub enum WalletCommand {
    /// Create an empty wallet
    Create(wallet_create::WalletCreateArgs),
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Unlock an account and print its private key
    Key(account_key::AccountKeyArgs),
    /// Import an existing private key
    Import(account_import::AccountImportArgs),
    /// Derive the next account of an HD wallet
    Create(account_create::AccountCreateArgs),
}

impl Cli {
    /// Log level after `--debug` and `--log-level` are applied
    pub fn log_level(&self) -> Option<String> {
        if self.debug {
            Some("debug".to_string())
        } else {
            self.log_level.clone()
        }
    }
}

pub async fn dispatch(command: Command, config: &CliConfig, prompt: Prompt<'_>, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Wallet(WalletCommand::Create(args)) => wallet_create::run(config, args, prompt, out).await,
        Command::Account(AccountCommand::Key(args)) => account_key::run(config, args, prompt, out).await,
        Command::Account(AccountCommand::Import(args)) => account_import::run(config, args, prompt, out).await,
        Command::Account(AccountCommand::Create(args)) => account_create::run(config, args, prompt, out).await,
    }
}

/// Print the primary error once, with its cause chain
pub fn report_error(error: &anyhow::Error, err: &mut dyn Write) {
    // Nothing useful is left to do if stderr itself is gone
    let _ = writeln!(err, "Error: {error:#}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_account_key() {
        let cli = Cli::try_parse_from([
            "keyward",
            "account",
            "key",
            "--account",
            "Personal/Operations",
            "--passphrase",
            "first",
            "--passphrase",
            "second",
            "--timeout",
            "3",
        ])
        .expect("parse");
        assert_eq!(cli.timeout, Some(3));
        match cli.command {
            Command::Account(AccountCommand::Key(args)) => {
                assert_eq!(args.account, "Personal/Operations");
                assert_eq!(args.secrets.passphrases, vec!["first", "second"]);
                assert!(!args.quiet);
            }
            _ => panic!("expected account key"),
        }
    }

    #[test]
    fn test_debug_flag_wins() {
        let cli = Cli::try_parse_from(["keyward", "--log-level", "error", "--debug", "wallet", "create", "--wallet", "w"])
            .expect("parse");
        assert_eq!(cli.log_level().as_deref(), Some("debug"));
    }

    #[test]
    fn test_error_is_reported_once() {
        let error = anyhow::Error::new(keyward_wallet_core::WalletError::unlock_failed("no passphrase matched"))
            .context("account key");
        let mut err = Vec::new();
        report_error(&error, &mut err);
        let printed = String::from_utf8(err).expect("utf8");
        assert_eq!(printed.lines().count(), 1);
        assert!(printed.starts_with("Error: account key: "));
        assert!(printed.contains("no passphrase matched"));
    }

    #[test]
    fn test_unknown_wallet_type_is_rejected() {
        assert!(Cli::try_parse_from(["keyward", "wallet", "create", "--wallet", "w", "--type", "distributed"]).is_err());
    }
}
