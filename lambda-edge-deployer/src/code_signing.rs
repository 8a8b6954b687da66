/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::arn::{Arn, ProfileVersionArn};
use crate::error::required;
use crate::function::ActiveFunction;
use anyhow::{Context, Result};
use aws_sdk_lambda as lambda;
use tracing::info;

/// Creates a code-signing configuration that only trusts artifacts signed with `profile_version`,
/// and rejects anything else at deployment time.
pub async fn create_code_signing_config(
    lambda_client: &lambda::Client,
    profile_version: &ProfileVersionArn,
) -> Result<Arn> {
    use lambda::types::{AllowedPublishers, CodeSigningPolicies, CodeSigningPolicy};

    info!("Creating code signing configuration for {}...", profile_version);
    let output = lambda_client
        .create_code_signing_config()
        .description("Only allows code signed by the edge signing profile")
        .allowed_publishers(
            AllowedPublishers::builder()
                .signing_profile_version_arns(profile_version.to_string())
                .build()
                .context(here!())?,
        )
        .code_signing_policies(
            CodeSigningPolicies::builder()
                .untrusted_artifact_on_deployment(CodeSigningPolicy::Enforce)
                .build(),
        )
        .send()
        .await
        .context(here!("failed to create code signing configuration"))?;

    let config: &lambda::types::CodeSigningConfig = required(
        output.code_signing_config(),
        "CreateCodeSigningConfig",
        "CodeSigningConfig",
    )?;
    let config_arn: &str = required(
        config.code_signing_config_arn(),
        "CreateCodeSigningConfig",
        "CodeSigningConfig.CodeSigningConfigArn",
    )?;
    info!("Created code signing configuration {}", config_arn);
    config_arn.parse::<Arn>().context(here!())
}

/// Enforces `config_arn` on `function`.
pub async fn attach_code_signing_config(
    lambda_client: &lambda::Client,
    config_arn: &Arn,
    function: &ActiveFunction,
) -> Result<()> {
    lambda_client
        .put_function_code_signing_config()
        .code_signing_config_arn(config_arn.to_string())
        .function_name(function.arn().to_string())
        .send()
        .await
        .context(here!("failed to attach code signing configuration"))?;
    info!(
        "Attached code signing configuration to {}",
        function.arn().function_name()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arn::FunctionArn;
    use crate::config::PollConfig;
    use crate::function::wait_until_active;
    use aws_sdk_lambda::config::retry::RetryConfig;
    use aws_sdk_lambda::operation::create_code_signing_config::CreateCodeSigningConfigOutput;
    use aws_sdk_lambda::operation::get_function_configuration::{
        GetFunctionConfigurationError, GetFunctionConfigurationOutput,
    };
    use aws_sdk_lambda::operation::put_function_code_signing_config::PutFunctionCodeSigningConfigOutput;
    use aws_sdk_lambda::types::error::ResourceNotFoundException;
    use aws_sdk_lambda::types::{
        AllowedPublishers, CodeSigningConfig, CodeSigningPolicies, CodeSigningPolicy, State,
    };
    use aws_sdk_lambda::Client;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const PROFILE_VERSION: &str =
        "arn:aws:signer:us-east-1:123456789012:/signing-profiles/EdgeSigningProfile1700000000/zJ4gcZ4F8f";
    const CONFIG: &str =
        "arn:aws:lambda:us-east-1:123456789012:code-signing-config:csc-0a1b2c3d4e5f67890";
    const FUNCTION: &str =
        "arn:aws:lambda:us-east-1:123456789012:function:EdgeOriginRequestFunction1700000000";
    const POLL: PollConfig = PollConfig::new(Duration::from_secs(1), Duration::from_secs(60));

    fn put_output() -> PutFunctionCodeSigningConfigOutput {
        PutFunctionCodeSigningConfigOutput::builder()
            .code_signing_config_arn(CONFIG)
            .function_name("EdgeOriginRequestFunction1700000000")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn config_trusts_only_the_profile_version() {
        let create = mock!(Client::create_code_signing_config)
            .match_requests(|req| {
                let Some(publishers) = req.allowed_publishers() else {
                    return false;
                };
                let arns: Option<&[String]> = publishers.signing_profile_version_arns().into();
                let policy = req
                    .code_signing_policies()
                    .and_then(|p| p.untrusted_artifact_on_deployment());
                arns == Some(&[PROFILE_VERSION.to_string()][..])
                    && policy == Some(&CodeSigningPolicy::Enforce)
            })
            .then_output(|| {
                CreateCodeSigningConfigOutput::builder()
                    .code_signing_config(
                        CodeSigningConfig::builder()
                            .code_signing_config_id("csc-0a1b2c3d4e5f67890")
                            .code_signing_config_arn(CONFIG)
                            .allowed_publishers(
                                AllowedPublishers::builder()
                                    .signing_profile_version_arns(PROFILE_VERSION)
                                    .build()
                                    .unwrap(),
                            )
                            .code_signing_policies(
                                CodeSigningPolicies::builder()
                                    .untrusted_artifact_on_deployment(CodeSigningPolicy::Enforce)
                                    .build(),
                            )
                            .last_modified("2023-11-14T22:13:20.000+0000")
                            .build()
                            .unwrap(),
                    )
                    .build()
            });
        let client = mock_client!(aws_sdk_lambda, RuleMode::Sequential, &[&create], |c| c
            .retry_config(RetryConfig::disabled()));

        let config = create_code_signing_config(&client, &PROFILE_VERSION.parse().unwrap())
            .await
            .unwrap();
        assert_eq!(CONFIG, config.to_string());
    }

    #[tokio::test]
    async fn config_is_attached_to_an_active_function() {
        let active = mock!(Client::get_function_configuration).then_output(|| {
            GetFunctionConfigurationOutput::builder()
                .function_arn(FUNCTION)
                .state(State::Active)
                .build()
        });
        let put = mock!(Client::put_function_code_signing_config)
            .match_requests(|req| {
                req.code_signing_config_arn() == Some(CONFIG)
                    && req.function_name() == Some(FUNCTION)
            })
            .then_output(put_output);
        let client = mock_client!(
            aws_sdk_lambda,
            RuleMode::Sequential,
            &[&active, &put],
            |c| c.retry_config(RetryConfig::disabled())
        );

        let function: FunctionArn = FUNCTION.parse().unwrap();
        let active_function = wait_until_active(&client, &function, POLL).await.unwrap();
        attach_code_signing_config(&client, &CONFIG.parse().unwrap(), &active_function)
            .await
            .unwrap();
        assert_eq!(1, put.num_calls());
    }

    #[tokio::test]
    async fn missing_function_is_never_attached() {
        let missing = mock!(Client::get_function_configuration).then_error(|| {
            GetFunctionConfigurationError::ResourceNotFoundException(
                ResourceNotFoundException::builder().build(),
            )
        });
        let put = mock!(Client::put_function_code_signing_config).then_output(put_output);
        let client = mock_client!(
            aws_sdk_lambda,
            RuleMode::MatchAny,
            &[&missing, &put],
            |c| c.retry_config(RetryConfig::disabled())
        );

        let function: FunctionArn = FUNCTION.parse().unwrap();
        let config: Arn = CONFIG.parse().unwrap();
        let result = async {
            let active = wait_until_active(&client, &function, POLL).await?;
            attach_code_signing_config(&client, &config, &active).await
        }
        .await;

        assert!(result.is_err());
        assert_eq!(1, missing.num_calls());
        assert_eq!(0, put.num_calls());
    }
}
