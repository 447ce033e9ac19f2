//! Sign, check, unsign and filter commands.

use anyhow::{Context, Result};
use nbtrust_core::{Trust, TrustConfig, TrustError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::output;

#[derive(Clone, Copy)]
enum Op {
    Sign,
    Check,
    Unsign,
}

impl Op {
    /// Labels printed for a `true` and a `false` outcome.
    fn verdicts(self) -> (&'static str, &'static str) {
        match self {
            Op::Sign => ("signed", "unchanged"),
            Op::Check => ("trusted", "untrusted"),
            Op::Unsign => ("unsigned", "unchanged"),
        }
    }

    async fn apply(self, trust: &Trust, path: &Path) -> Result<bool, TrustError> {
        match self {
            Op::Sign => trust.sign(path).await,
            Op::Check => trust.check(path).await,
            Op::Unsign => trust.unsign(path).await,
        }
    }
}

async fn open(config: &TrustConfig) -> Result<Trust> {
    config
        .open()
        .await
        .context("failed to open the trust database")
}

async fn run(config: &TrustConfig, notebooks: Vec<PathBuf>, json: bool, op: Op) -> Result<ExitCode> {
    let trust = open(config).await?;
    let (yes, no) = op.verdicts();

    let mut all = true;
    let mut outcome: Result<()> = Ok(());
    for path in &notebooks {
        match op.apply(&trust, path).await {
            Ok(hit) => {
                all &= hit;
                println!("{}", output::verdict_line(path, if hit { yes } else { no }, json));
            }
            Err(e) => {
                outcome = Err(e).with_context(|| format!("failed on {}", path.display()));
                break;
            }
        }
    }

    let closed = trust.close().await;
    outcome?;
    closed?;

    if matches!(op, Op::Check) && !all {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn sign(config: &TrustConfig, notebooks: Vec<PathBuf>, json: bool) -> Result<ExitCode> {
    run(config, notebooks, json, Op::Sign).await
}

pub async fn check(config: &TrustConfig, notebooks: Vec<PathBuf>, json: bool) -> Result<ExitCode> {
    run(config, notebooks, json, Op::Check).await
}

pub async fn unsign(config: &TrustConfig, notebooks: Vec<PathBuf>, json: bool) -> Result<ExitCode> {
    run(config, notebooks, json, Op::Unsign).await
}

pub async fn filter(config: &TrustConfig, notebooks: Vec<PathBuf>, json: bool) -> Result<ExitCode> {
    let trust = open(config).await?;
    let kept = trust.filter(notebooks).await;
    let closed = trust.close().await;
    let kept = kept.context("failed to filter notebooks")?;
    closed?;

    for path in &kept {
        println!("{}", output::path_line(path, json));
    }
    Ok(ExitCode::SUCCESS)
}
