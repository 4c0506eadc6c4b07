mod args;
mod logging;
mod signal;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context as _, bail};
use clap::Parser as _;
use kwait_backend_k8s::KubeCluster;
use kwait_core::{ResourceResolver, WaitReport, Waiter, parse_condition};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{args::Args, logging::init_tracing, signal::cancel_on_signal};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(args.debug);

    match run(args).await {
        Ok(report) if report.is_success() => {
            info!("all conditions are met");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for failure in report.failures() {
                error!("not met: {}", failure.description);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<WaitReport> {
    if args.conditions.is_empty() {
        bail!("no conditions given, expected at least one kind/[namespace/]name[/condition]");
    }

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone())?;

    let cluster = Arc::new(
        KubeCluster::connect(args.kubeconfig.as_deref())
            .await
            .context("failed to connect to the cluster")?,
    );
    let resolver = ResourceResolver::new(cluster.clone());

    let conditions = args
        .conditions
        .iter()
        .map(|input| {
            parse_condition(input, &resolver)
                .with_context(|| format!("invalid condition {input:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let waiter = Waiter::new(args.timeout, args.interval);
    info!(
        "waiting {} for the following conditions to be met",
        humantime::format_duration(waiter.timeout())
    );
    for condition in &conditions {
        info!("{}", condition.describe());
    }

    Ok(waiter.run(cluster, conditions, &shutdown).await)
}
