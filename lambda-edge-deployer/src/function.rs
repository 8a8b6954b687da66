/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::arn::{FunctionArn, FunctionVersionArn};
use crate::config::{PollConfig, RunToken, Settings};
use crate::error::required;
use crate::iam::PropagatedRole;
use crate::retry::{run_with_retry, ErrorClass};
use crate::signing_job::SignedObject;
use crate::wait::{poll_until_ready, Readiness};
use anyhow::{bail, Context, Result};
use aws_sdk_lambda as lambda;
use aws_sdk_lambda::error::SdkError;
use aws_sdk_lambda::operation::create_function::CreateFunctionError;
use tracing::info;

/// A function that Lambda reported as `Active`.
///
/// Only [`wait_until_active`] produces one, so configuration that requires the
/// function to exist can take it as proof.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActiveFunction(FunctionArn);

impl ActiveFunction {
    pub fn arn(&self) -> &FunctionArn {
        &self.0
    }
}

/// Lambda can lag behind IAM: a role that IAM already serves may still be
/// rejected as "cannot be assumed" for a few seconds.
fn classify_create_function_error<R>(err: &SdkError<CreateFunctionError, R>) -> ErrorClass {
    match err.as_service_error() {
        Some(CreateFunctionError::InvalidParameterValueException(e))
            if e.message()
                .map_or(false, |message| message.contains("cannot be assumed")) =>
        {
            ErrorClass::NotYetConsistent
        }
        _ => ErrorClass::Permanent,
    }
}

/// Creates the origin-request function from `archive` and publishes its first version.
///
/// Returns the unqualified function ARN.
pub async fn create_function(
    lambda_client: &lambda::Client,
    settings: &Settings,
    token: &RunToken,
    role: &PropagatedRole,
    archive: &[u8],
) -> Result<FunctionArn> {
    use lambda::primitives::Blob;
    use lambda::types::{Architecture, EphemeralStorage, FunctionCode, PackageType};

    let function_name = token.function_name();
    let ephemeral_storage = EphemeralStorage::builder()
        .size(settings.function_ephemeral_storage_mb)
        .build()
        .context(here!())?;
    info!("Creating Lambda function {}...", function_name);

    let output = run_with_retry(
        "Creating the Lambda function",
        settings.create_function_attempts,
        settings.create_function_backoff,
        || {
            lambda_client
                .create_function()
                .function_name(&function_name)
                .description("Origin request handler for a signed Lambda@Edge deployment")
                .runtime(settings.function_runtime.clone())
                .role(role.arn())
                .handler(&settings.function_handler)
                .code(
                    FunctionCode::builder()
                        .zip_file(Blob::new(archive.to_vec()))
                        .build(),
                )
                .timeout(settings.function_timeout_secs)
                .memory_size(settings.function_memory_mb)
                .publish(true)
                .package_type(PackageType::Zip)
                .architectures(Architecture::X8664)
                .ephemeral_storage(ephemeral_storage.clone())
                .send()
        },
        classify_create_function_error,
    )
    .await
    .context(here!("failed to create Lambda function"))?;

    let function_arn: &str = required(output.function_arn(), "CreateFunction", "FunctionArn")?;
    let function: FunctionArn = function_arn.parse().context(here!())?;
    info!("Created Lambda function {}", function);
    Ok(function.unqualified())
}

/// Polls the function configuration until its state is `Active`.
///
/// A function that doesn't exist is an error, not a pending state.
pub async fn wait_until_active(
    lambda_client: &lambda::Client,
    function: &FunctionArn,
    poll: PollConfig,
) -> Result<ActiveFunction> {
    use lambda::types::State;

    poll_until_ready("Lambda function to become active", poll, || async move {
        let configuration = lambda_client
            .get_function_configuration()
            .function_name(function.to_string())
            .send()
            .await
            .context(here!("failed to get Lambda function status"))?;
        Ok(match configuration.state() {
            Some(State::Active) => Readiness::Ready(()),
            Some(State::Failed) => bail!(
                "Lambda function {} failed to become active: {}",
                function,
                configuration.state_reason().unwrap_or("no reason given")
            ),
            other => Readiness::Pending(format!("state: {:?}", other)),
        })
    })
    .await?;
    Ok(ActiveFunction(function.clone()))
}

/// Polls until no code or configuration update is in progress on the function.
pub async fn wait_until_updatable(
    lambda_client: &lambda::Client,
    function: &FunctionArn,
    poll: PollConfig,
) -> Result<()> {
    use lambda::types::{LastUpdateStatus, State};

    poll_until_ready("Lambda function to accept updates", poll, || async move {
        let configuration = lambda_client
            .get_function_configuration()
            .function_name(function.to_string())
            .send()
            .await
            .context(here!("failed to get Lambda function status"))?;
        Ok(
            match (configuration.state(), configuration.last_update_status()) {
                (Some(State::Pending), _) | (_, Some(LastUpdateStatus::InProgress)) => {
                    Readiness::Pending(format!(
                        "state: {:?}, last update: {:?}",
                        configuration.state(),
                        configuration.last_update_status()
                    ))
                }
                _ => Readiness::Ready(()),
            },
        )
    })
    .await
}

/// Replaces the function's code with the signed artifact and publishes a new version.
pub async fn publish_signed_code(
    lambda_client: &lambda::Client,
    function: &FunctionArn,
    signed: &SignedObject,
) -> Result<FunctionVersionArn> {
    info!(
        "Publishing {} from s3://{}/{}...",
        function.function_name(),
        signed.bucket,
        signed.key
    );
    let output = lambda_client
        .update_function_code()
        .function_name(function.function_name())
        .s3_bucket(&signed.bucket)
        .s3_key(&signed.key)
        .publish(true)
        .send()
        .await
        .context(here!("failed to update Lambda function code"))?;

    let function_arn: &str = required(output.function_arn(), "UpdateFunctionCode", "FunctionArn")?;
    let version: &str = required(output.version(), "UpdateFunctionCode", "Version")?;
    let published = FunctionVersionArn::from_published(function_arn, version).context(here!())?;
    info!("Published function version {}", published);
    Ok(published)
}
