/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

// Provisions everything a signed edge deployment needs, once. Nothing here is
// idempotent: every run derives fresh resource names from the current time and
// appends a new set of identifiers to the env file.

use crate::config::{RunToken, Settings, DEFAULT_REGION};
use crate::outputs::ProvisionedResources;
use crate::{code_signing, function, iam, package, signing, storage, Clients};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Parser, Eq, PartialEq)]
pub struct BootstrapOpt {
    /// File the provisioned identifiers are appended to
    #[clap(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Directory holding the function's source code
    #[clap(long, default_value = "lambda_function_code")]
    pub source_dir: PathBuf,

    /// Region to provision in. Lambda@Edge functions must be created in us-east-1.
    #[clap(long, default_value = DEFAULT_REGION)]
    pub region: String,
}

pub async fn bootstrap(opt: BootstrapOpt) -> Result<()> {
    let settings = Settings {
        region: opt.region,
        ..Default::default()
    };
    let clients = Clients::new(&settings.load_sdk_config().await);
    let token = RunToken::now();

    let resources = provision(&clients, &settings, &token, &opt.source_dir).await?;
    resources
        .append_to(&opt.env_file)
        .context(here!("failed to persist provisioned identifiers"))?;
    info!("Bootstrap complete");
    Ok(())
}

/// Creates the signing profile, execution role, function, code-signing configuration,
/// and artifact bucket, in that order.
pub async fn provision(
    clients: &Clients,
    settings: &Settings,
    token: &RunToken,
    source_dir: &Path,
) -> Result<ProvisionedResources> {
    let archive = package::archive_directory(source_dir).context(here!())?;

    let profile = signing::create_signing_profile(&clients.signer, settings, token).await?;

    let role = iam::create_execution_role(&clients.iam, token).await?;
    let role = iam::wait_for_propagation(&clients.iam, role, settings.role_propagation).await?;

    let function =
        function::create_function(&clients.lambda, settings, token, &role, &archive).await?;
    let active = function::wait_until_active(&clients.lambda, &function, settings.function_ready)
        .await?;

    let config_arn =
        code_signing::create_code_signing_config(&clients.lambda, &profile.version_arn).await?;
    code_signing::attach_code_signing_config(&clients.lambda, &config_arn, &active).await?;

    let bucket = token.bucket_name();
    storage::create_versioned_bucket(&clients.s3, &bucket, &settings.region).await?;

    Ok(ProvisionedResources {
        signing_profile_arn: profile.arn,
        signing_profile_version_arn: profile.version_arn,
        signing_configuration_arn: config_arn,
        function_arn: function,
        bucket,
    })
}
