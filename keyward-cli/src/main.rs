use anyhow::Result;
use clap::Parser;
use std::env;
use std::io;

use keyward_cli::cli::{dispatch, report_error, Cli};
use keyward_cli::infrastructure::config::{CliConfig, CONFIG_FILE_VAR};
use keyward_cli::infrastructure::logger::Logger;
use keyward_cli::secrets::terminal_prompt;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        report_error(&e, &mut io::stderr().lock());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_file = cli.config.clone();
    let mut config = CliConfig::from_lookup(|name| match (&config_file, name) {
        (Some(path), CONFIG_FILE_VAR) => Some(path.to_string_lossy().into_owned()),
        _ => env::var(name).ok(),
    })?;
    config.apply_overrides(cli.base_dir.clone(), cli.timeout, cli.log_level());

    Logger::init(&config.log_level);
    config.validate()?;
    tracing::debug!(
        base_dir = %config.base_dir.display(),
        timeout_secs = config.timeout_secs,
        "Configuration loaded"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut prompt = terminal_prompt;
    dispatch(cli.command, &config, &mut prompt, &mut out).await
}
