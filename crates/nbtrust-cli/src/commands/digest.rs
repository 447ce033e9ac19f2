//! Digest and canonicalize commands.

use anyhow::{Context, Result};
use nbtrust_canonical::{canonical_string, tokens, Value};
use nbtrust_core::TrustConfig;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::output;

/// Reads JSON from a file, or stdin when no path is given.
fn read_document(input: Option<PathBuf>) -> Result<Value> {
    let text = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Value::from_json_str(&text).context("invalid JSON")
}

pub async fn digest(config: &TrustConfig, input: Option<PathBuf>) -> Result<ExitCode> {
    let doc = read_document(input)?;
    let signature = nbtrust_core::digest(&doc, config)
        .await
        .context("failed to compute signature")?;
    println!("{signature}");
    Ok(ExitCode::SUCCESS)
}

pub fn canonicalize(input: Option<PathBuf>, as_tokens: bool) -> Result<ExitCode> {
    let doc = read_document(input)?;
    if as_tokens {
        for token in tokens(&doc) {
            println!("{}", output::token_line(&token));
        }
    } else {
        println!("{}", canonical_string(&doc));
    }
    Ok(ExitCode::SUCCESS)
}
