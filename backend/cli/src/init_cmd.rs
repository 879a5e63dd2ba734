//! `tavern init`: write a starter bots manifest.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use tavern_config::{manifest_path, write_json, BotsManifest};

pub async fn run(config_dir: &Path, name: &str, token_var: &str, force: bool) -> Result<PathBuf> {
    let path = manifest_path(config_dir);
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", path.display());
    }

    let manifest = BotsManifest::sample(name, token_var);
    write_json(&serde_json::to_value(&manifest)?, &path).await?;
    Ok(path)
}
