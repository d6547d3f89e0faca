use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Log targets that follow the configured level
const TARGETS: [&str; 2] = ["keyward_cli", "keyward_wallet_core"];

pub struct Logger;

impl Logger {
    /// Install the stderr subscriber. `RUST_LOG` wins over `level` when set.
    ///
    /// Records emitted through the `log` facade by the wallet core are
    /// forwarded into the same subscriber.
    pub fn init(level: &str) {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Self::directives(Self::parse_level(level))));

            let result = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
            if let Err(e) = result {
                eprintln!("Failed to initialize logging: {e}");
            }
        });
    }

    pub fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }

    fn directives(level: Level) -> String {
        let level = level.to_string().to_lowercase();
        let mut directives = vec!["warn".to_string()];
        directives.extend(TARGETS.iter().map(|target| format!("{target}={level}")));
        directives.join(",")
    }
}
