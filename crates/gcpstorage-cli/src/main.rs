#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod invoke;
mod telemetry;

use std::process;

use anyhow::Context;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "gcpstorage_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "gcpstorage_cli::config";
pub const TRACING_TARGET_INVOKE: &str = "gcpstorage_cli::invoke";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    let kind = error
        .downcast_ref::<gcpstorage_activity::Error>()
        .map_or("cli", gcpstorage_activity::Error::kind_str);

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_INVOKE,
            kind,
            error = %format!("{error:#}"),
            "invocation failed"
        );
    } else {
        eprintln!("Error ({kind}): {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    let output = invoke::invoke(&cli).await?;
    let json = serde_json::to_string(&output).context("failed to serialize output")?;
    println!("{json}");

    tracing::info!(
        target: TRACING_TARGET_INVOKE,
        has_output = output.output.is_some(),
        "invocation completed"
    );

    Ok(())
}
