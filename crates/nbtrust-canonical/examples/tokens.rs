use nbtrust_canonical::{digest, tokens, DigestAlg, Value};

fn main() {
    let notebook = Value::from_json_str(
        r#"{
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"signature": "sha256:ignored", "kernelspec": {"name": "python3"}},
            "cells": [{"cell_type": "code", "source": ["1 / 3"], "outputs": [], "execution_count": null}]
        }"#,
    )
    .expect("valid notebook JSON");

    for token in tokens(&notebook) {
        println!("{token:?}");
    }

    match digest(&notebook, b"example-secret", DigestAlg::Sha256) {
        Ok(hex) => println!("sha256:{hex}"),
        Err(err) => {
            eprintln!("digest failed: {}", err);
            std::process::exit(1);
        }
    }
}
