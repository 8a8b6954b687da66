/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use anyhow::bail;
use clap::Parser;
use lambda_edge_deployer::{bootstrap, deploy};
use tracing::warn;
use tracing_subscriber::{filter::EnvFilter, prelude::*};

#[derive(Debug, Parser, Eq, PartialEq)]
#[clap(version, about)]
enum Opt {
    /// Provisions the signing profile, execution role, function, code signing
    /// configuration, and artifact bucket
    #[clap(alias = "init")]
    Bootstrap(bootstrap::BootstrapOpt),

    /// Signs and publishes a new function version, then puts a CloudFront distribution in front of it
    Deploy(deploy::DeployOpt),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn,lambda_edge_deployer=info"))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let opt = Opt::parse();
    let workflow = async move {
        match opt {
            Opt::Bootstrap(subopt) => bootstrap::bootstrap(subopt).await,
            Opt::Deploy(subopt) => deploy::deploy(subopt).await,
        }
    };
    tokio::select! {
        result = workflow => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; resources created so far were not cleaned up");
            bail!("interrupted")
        }
    }
}
