//! Passphrase collection from flags, environment and the terminal

use anyhow::{anyhow, Result};
use clap::Args;
use std::io;
use zeroize::Zeroizing;

use keyward_wallet_core::SecretCandidates;

/// Prompt for a secret without echo
pub type Prompt<'a> = &'a mut dyn FnMut(&str) -> io::Result<String>;

pub fn terminal_prompt(message: &str) -> io::Result<String> {
    rpassword::prompt_password(message)
}

#[derive(Args, Default)]
pub struct PassphraseArgs {
    /// Account passphrase to try; repeat to try several, in order
    /// (or set KEYWARD_PASSPHRASES, one per line).
    #[arg(long = "passphrase", env = "KEYWARD_PASSPHRASES", value_delimiter = '\n', hide_env_values = true)]
    pub passphrases: Vec<String>,

    /// Wallet passphrase, needed for derivation path accounts of HD wallets
    /// (or set KEYWARD_WALLET_PASSPHRASE).
    #[arg(long, env = "KEYWARD_WALLET_PASSPHRASE", hide_env_values = true)]
    pub wallet_passphrase: Option<String>,

    /// Also ask for a passphrase on the terminal, tried after the others.
    #[arg(long)]
    pub prompt: bool,
}

impl PassphraseArgs {
    /// Build the candidate list. Order is kept exactly as supplied.
    pub fn into_candidates(self, needs_wallet_secret: bool, prompt: Prompt<'_>) -> Result<SecretCandidates> {
        let passphrases = Zeroizing::new(self.passphrases);
        let mut wallet_passphrase = self.wallet_passphrase.map(Zeroizing::new);

        if self.prompt && needs_wallet_secret && wallet_passphrase.is_none() {
            wallet_passphrase = Some(Zeroizing::new(
                prompt("Wallet passphrase: ").map_err(|e| anyhow!("Passphrase prompt failed: {}", e))?,
            ));
        }

        let mut secrets =
            SecretCandidates::from_strings(wallet_passphrase.as_deref().map(String::as_str), passphrases.iter());

        if self.prompt {
            let typed = Zeroizing::new(
                prompt("Account passphrase: ").map_err(|e| anyhow!("Passphrase prompt failed: {}", e))?,
            );
            secrets.push_candidate(typed.as_bytes());
        }

        tracing::debug!(
            candidates = secrets.candidate_count(),
            wallet_passphrase = secrets.has_wallet_secret(),
            "Collected passphrases"
        );
        Ok(secrets)
    }
}

/// A single secret from a flag value or, failing that, the terminal
pub fn required_secret(value: Option<String>, message: &str, prompt: Prompt<'_>) -> Result<Zeroizing<String>> {
    let secret = match value {
        Some(value) => Zeroizing::new(value),
        None => Zeroizing::new(prompt(message).map_err(|e| anyhow!("Passphrase prompt failed: {}", e))?),
    };
    if secret.is_empty() {
        return Err(anyhow!("{} cannot be empty", message.trim_end_matches([':', ' '])));
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_wallet_core::SecretSource;

    fn never(_: &str) -> io::Result<String> {
        panic!("prompt should not be used")
    }

    fn texts(secrets: &SecretCandidates) -> Vec<String> {
        secrets
            .account_candidates()
            .iter()
            .map(|c| String::from_utf8_lossy(c).to_string())
            .collect()
    }

    #[test]
    fn test_flags_keep_order() {
        let args = PassphraseArgs {
            passphrases: vec!["second".into(), "first".into(), "second".into()],
            wallet_passphrase: None,
            prompt: false,
        };
        let secrets = args.into_candidates(false, &mut never).expect("secrets");
        assert_eq!(texts(&secrets), vec!["second", "first", "second"]);
        assert!(!secrets.has_wallet_secret());
    }

    #[test]
    fn test_prompted_passphrase_is_last() {
        let args = PassphraseArgs {
            passphrases: vec!["flag".into()],
            wallet_passphrase: Some("wallet".into()),
            prompt: true,
        };
        let mut asked = Vec::new();
        let mut prompt = |message: &str| -> io::Result<String> {
            asked.push(message.to_string());
            Ok("typed".to_string())
        };
        let secrets = args.into_candidates(true, &mut prompt).expect("secrets");
        assert_eq!(texts(&secrets), vec!["flag", "typed"]);
        assert_eq!(asked, vec!["Account passphrase: "]);
    }

    #[test]
    fn test_prompt_asks_for_missing_wallet_passphrase() {
        let args = PassphraseArgs { prompt: true, ..Default::default() };
        let mut prompt = |message: &str| -> io::Result<String> { Ok(format!("answer to {}", message)) };
        let secrets = args.into_candidates(true, &mut prompt).expect("secrets");
        assert_eq!(
            secrets.wallet_secret().map(|s| String::from_utf8_lossy(&s).to_string()),
            Some("answer to Wallet passphrase: ".to_string())
        );
    }

    #[test]
    fn test_required_secret() {
        assert_eq!(
            required_secret(Some("pw".into()), "Passphrase: ", &mut never).expect("flag").as_str(),
            "pw"
        );
        let mut empty = |_: &str| -> io::Result<String> { Ok(String::new()) };
        assert!(required_secret(None, "Passphrase: ", &mut empty).is_err());
    }
}
