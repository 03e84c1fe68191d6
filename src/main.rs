// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::prelude::*;

use cli::{Args, Command};
use k8s_inspect::config::{self, Config};
use k8s_inspect::handlers::{Toolbox, args::Arguments, tool_definitions};
use k8s_inspect::kubernetes::K8sClient;

/// Initialize logging with file output and optional stderr.
/// Stdout is left alone: it carries the tool payload.
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate daily or at 10MB, keeping up to 5 files
    let log_path = log_dir.join("k8s-inspect.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let filter = if verbose {
        "k8s_inspect=debug"
    } else {
        "k8s_inspect=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file_appender))
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if verbose {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&tool_definitions())?);
            Ok(())
        }
        Command::UseContext { name } => {
            let mut config = Config::load()?;
            config.set_context(name.clone())?;
            match name {
                Some(name) => println!("Default context set to {}", name),
                None => println!("Default context cleared"),
            }
            Ok(())
        }
        Command::Call {
            tool,
            args: raw_args,
            envelope,
        } => run_call(&args, tool, raw_args, *envelope).await,
    }
}

async fn run_call(args: &Args, tool: &str, raw_args: &str, envelope: bool) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}; using defaults", e);
        Config::default()
    });
    if let Some(ref context) = args.context {
        config.context = Some(context.clone());
    }
    if let Some(timeout) = args.timeout {
        config.call_timeout_secs = timeout;
    }

    let arguments: Arguments = match serde_json::from_str::<serde_json::Value>(raw_args)
        .context("Tool arguments must be a JSON object")?
    {
        serde_json::Value::Object(map) => map,
        other => return Err(anyhow!("Tool arguments must be a JSON object, got {}", other)),
    };

    let client = K8sClient::connect(&config.client_options()).await?;
    debug!(context = %client.context(), tool = %tool, "Connected");
    let toolbox = Toolbox::new(Arc::new(client), config.tool_settings());

    // Ctrl-C cancels the in-flight call
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match toolbox.call(tool, &arguments, &cancel).await {
        Ok(response) if envelope => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Ok(response) => {
            println!("{}", response.text_payload().unwrap_or_default());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            std::process::exit(1);
        }
    }
}
