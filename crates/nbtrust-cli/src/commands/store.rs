//! Maintenance commands that only need the signature database.

use anyhow::{Context, Result};
use nbtrust_core::{SignatureStore, TrustConfig};
use std::process::ExitCode;

async fn open(config: &TrustConfig) -> Result<SignatureStore> {
    config.validate()?;
    let path = config.database_path()?;
    SignatureStore::open(&path, config.store.clone())
        .await
        .with_context(|| format!("failed to open {}", path.display()))
}

pub async fn count(config: &TrustConfig) -> Result<ExitCode> {
    let store = open(config).await?;
    let count = store.count().await;
    store.close().await?;
    println!("{}", count?);
    Ok(ExitCode::SUCCESS)
}

pub async fn cull(config: &TrustConfig) -> Result<ExitCode> {
    let store = open(config).await?;
    let culled = async {
        let before = store.count().await?;
        store.cull().await?;
        let after = store.count().await?;
        Ok::<_, nbtrust_core::TrustError>((before, after))
    }
    .await;
    store.close().await?;

    let (before, after) = culled?;
    println!("removed {} signatures, {} remain", before - after, after);
    Ok(ExitCode::SUCCESS)
}
