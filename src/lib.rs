pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::config;

use crate::core::CurrencyPair;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub from: Option<String>,
    pub to: Option<String>,
    pub interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if self.from.is_some() || self.to.is_some() {
            config.pair = CurrencyPair::new(
                self.from.as_deref().unwrap_or(&config.pair.from),
                self.to.as_deref().unwrap_or(&config.pair.to),
            );
        }
        if let Some(interval_ms) = self.interval_ms {
            config.watch.interval_ms = interval_ms;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.watch.max_attempts = max_attempts;
        }
    }
}

pub enum AppCommand {
    Watch {
        start_rate: String,
        target_rate: String,
        overrides: Overrides,
    },
    Rate {
        overrides: Overrides,
    },
}

impl AppCommand {
    fn overrides(&self) -> &Overrides {
        match self {
            AppCommand::Watch { overrides, .. } | AppCommand::Rate { overrides } => overrides,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rate watcher starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    command.overrides().apply(&mut config);
    debug!("Loaded config: {config:#?}");

    let source = providers::YahooRateSource::from_config(
        &config.providers.yahoo_or_default(),
        config.pair.clone(),
    )?;

    match command {
        AppCommand::Watch {
            start_rate,
            target_rate,
            ..
        } => {
            let notifier = cli::notify::ConsoleNotifier::new(config.pair.clone());
            let status = cli::watch::run(
                &config.pair,
                config.watch.settings(),
                Arc::new(source),
                &notifier,
                &start_rate,
                &target_rate,
            )
            .await?;
            info!(%status, "Rate watcher finished");
            Ok(())
        }
        AppCommand::Rate { .. } => cli::rate::run(&config.pair, &source).await.map(|_| ()),
    }
}
