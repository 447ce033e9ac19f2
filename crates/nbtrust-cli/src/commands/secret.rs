//! Secret command.

use anyhow::{Context, Result};
use nbtrust_core::{ensure_secret, TrustConfig, SECRET_FILE};
use std::process::ExitCode;

/// Makes sure a secret exists and prints where it lives. The secret itself
/// is never printed.
pub async fn run(config: &TrustConfig) -> Result<ExitCode> {
    let dir = config.data_dir()?;
    ensure_secret(&dir)
        .await
        .context("failed to prepare the notebook secret")?;
    println!("{}", dir.join(SECRET_FILE).display());
    Ok(ExitCode::SUCCESS)
}
