/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::arn::FunctionVersionArn;
use crate::config::{RunToken, Settings, DEFAULT_REGION};
use crate::distribution::{self, CreatedDistribution};
use crate::outputs::ProvisionedResources;
use crate::{function, package, signing_job, storage, Clients};
use anyhow::{Context, Result};
use aws_sdk_cloudfront as cloudfront;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser, Eq, PartialEq)]
pub struct DeployOpt {
    /// File holding the identifiers written by `bootstrap`. Environment variables
    /// with the same names take precedence.
    #[clap(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Directory holding the function's source code
    #[clap(long, default_value = "lambda_function_code")]
    pub source_dir: PathBuf,

    /// Region the function and bucket were provisioned in
    #[clap(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// How long to wait for the signing job before giving up
    #[clap(long, default_value_t = 600)]
    pub signing_timeout_secs: u64,
}

pub async fn deploy(opt: DeployOpt) -> Result<()> {
    // Everything that can be checked locally is checked before the first provider call
    let resources = ProvisionedResources::load(&opt.env_file).context(here!())?;
    let archive = package::archive_directory(&opt.source_dir).context(here!())?;

    let mut settings = Settings {
        region: opt.region,
        ..Default::default()
    };
    settings.signing_job.timeout = Duration::from_secs(opt.signing_timeout_secs);
    let clients = Clients::new(&settings.load_sdk_config().await);
    let token = RunToken::now();

    let version = publish_signed_version(&clients, &settings, &resources, archive).await?;
    let created = create_edge_distribution(
        &clients.cloudfront,
        &settings,
        &token,
        &resources.bucket,
        &version,
    )
    .await?;
    info!(
        "Successfully created CloudFront distribution {} at https://{}",
        created.id, created.domain_name
    );
    Ok(())
}

/// Uploads `archive`, signs that exact upload, and publishes the signed artifact as a
/// new function version.
///
/// `UpdateFunctionCode` is only reached once the signing job has succeeded.
pub async fn publish_signed_version(
    clients: &Clients,
    settings: &Settings,
    resources: &ProvisionedResources,
    archive: Vec<u8>,
) -> Result<FunctionVersionArn> {
    let object = storage::upload_archive(
        &clients.s3,
        &resources.bucket,
        &settings.archive_key,
        archive,
    )
    .await?;

    let job_id = signing_job::start_signing_job(
        &clients.signer,
        &resources.signing_profile_arn,
        &object,
        &settings.signed_output_prefix,
    )
    .await?;
    let signed =
        signing_job::wait_for_signed_object(&clients.signer, &job_id, settings.signing_job).await?;

    function::wait_until_updatable(
        &clients.lambda,
        &resources.function_arn,
        settings.function_ready,
    )
    .await?;
    function::publish_signed_code(&clients.lambda, &resources.function_arn, &signed).await
}

/// Creates an origin access control and a distribution that runs `version` on origin requests.
pub async fn create_edge_distribution(
    cloudfront_client: &cloudfront::Client,
    settings: &Settings,
    token: &RunToken,
    bucket: &str,
    version: &FunctionVersionArn,
) -> Result<CreatedDistribution> {
    let control_id = distribution::create_origin_access_control(cloudfront_client, token).await?;
    distribution::wait_for_origin_access_control(
        cloudfront_client,
        &control_id,
        settings.origin_access_control,
    )
    .await?;

    let config = distribution::distribution_config(settings, token, bucket, &control_id, version)
        .context(here!("invalid distribution configuration"))?;
    distribution::create_distribution(cloudfront_client, config).await
}
