//! `tavern run` and `tavern console`: start supervised bots.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use tavern_channels::{ConsoleAdapter, DiscordAdapter};
use tavern_config::{manifest_path, BotsManifest, ConfigError};
use tavern_core::ChannelAdapter;
use tavern_supervisor::{BotSpec, BotState, BotSupervisor};

/// Placeholder token for offline console sessions; never persisted.
const CONSOLE_TOKEN: &str = "console";

/// Build bot specs from the manifest, optionally only entry `only`.
pub fn select_bots(manifest: &BotsManifest, only: Option<usize>, config_dir: &Path) -> Result<Vec<BotSpec>> {
    if manifest.bots.is_empty() {
        bail!("the bots manifest lists no bots");
    }
    match only {
        Some(index) => {
            let entry = manifest.bots.get(index).with_context(|| {
                format!("no bot at index {index} (manifest has {})", manifest.bots.len())
            })?;
            Ok(vec![BotSpec::from_entry(index, entry, config_dir)])
        }
        None => Ok(manifest
            .bots
            .iter()
            .enumerate()
            .map(|(index, entry)| BotSpec::from_entry(index, entry, config_dir))
            .collect()),
    }
}

/// Run every selected bot against Discord until all of them stop.
pub async fn run(config_dir: &Path, only: Option<usize>) -> Result<ExitCode> {
    let path = manifest_path(config_dir);
    let manifest = BotsManifest::load(&path)
        .await
        .with_context(|| format!("could not load bots manifest {}", path.display()))?;
    let specs = select_bots(&manifest, only, config_dir)?;

    info!(bots = specs.len(), config_dir = %config_dir.display(), "Starting tavern");

    let adapter: Arc<dyn ChannelAdapter> = Arc::new(DiscordAdapter::new());
    let mut bots = JoinSet::new();
    for spec in specs {
        let adapter = adapter.clone();
        bots.spawn(async move {
            let index = spec.index;
            let name = spec.name().to_string();
            let state = BotSupervisor::new(spec).run(adapter).await;
            (index, name, state)
        });
    }

    let mut failed = false;
    while let Some(joined) = bots.join_next().await {
        match joined {
            Ok((index, name, state)) => {
                info!(bot = %name, index, state = %state, "Bot stopped");
                failed |= state.is_fatal();
            }
            Err(e) => {
                error!(error = %e, "Bot task failed");
                failed = true;
            }
        }
    }

    Ok(exit_code(failed))
}

/// Talk to one bot through stdin/stdout.
pub async fn console(config_dir: &Path, index: usize, user: &str) -> Result<ExitCode> {
    let path = manifest_path(config_dir);
    let mut spec = match BotsManifest::load(&path).await {
        Ok(manifest) => select_bots(&manifest, Some(index), config_dir)?.remove(0),
        Err(ConfigError::ManifestMissing(_)) => {
            warn!(path = %path.display(), "No bots manifest; using the default bot");
            BotSpec::new(index, Default::default(), config_dir)
        }
        Err(e) => return Err(e.into()),
    };
    spec.overrides
        .entry("token")
        .or_insert_with(|| Value::String(CONSOLE_TOKEN.into()));

    let state = BotSupervisor::new(spec)
        .run(Arc::new(ConsoleAdapter::new(user)))
        .await;
    if state == BotState::AwaitingSetup {
        println!("A bot config was generated in {}; edit it and run again.", config_dir.display());
    }
    Ok(exit_code(state.is_fatal()))
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
