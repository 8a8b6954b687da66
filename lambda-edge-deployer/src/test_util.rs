/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::Clients;
use aws_smithy_mocks::{mock_client, Rule, RuleMode};

/// Mock rules per service. Services left empty reject every call.
#[derive(Default)]
pub(crate) struct ServiceRules<'a> {
    pub(crate) iam: &'a [&'a Rule],
    pub(crate) lambda: &'a [&'a Rule],
    pub(crate) s3: &'a [&'a Rule],
    pub(crate) signer: &'a [&'a Rule],
    pub(crate) cloudfront: &'a [&'a Rule],
}

impl ServiceRules<'_> {
    /// Mocked clients matching any rule in order, with SDK retries disabled.
    pub(crate) fn clients(&self) -> Clients {
        use aws_sdk_cloudfront::config::retry::RetryConfig as CloudFrontRetry;
        use aws_sdk_iam::config::retry::RetryConfig as IamRetry;
        use aws_sdk_lambda::config::retry::RetryConfig as LambdaRetry;
        use aws_sdk_s3::config::retry::RetryConfig as S3Retry;
        use aws_sdk_signer::config::retry::RetryConfig as SignerRetry;

        Clients {
            iam: mock_client!(aws_sdk_iam, RuleMode::MatchAny, self.iam, |c| c
                .retry_config(IamRetry::disabled())),
            lambda: mock_client!(aws_sdk_lambda, RuleMode::MatchAny, self.lambda, |c| c
                .retry_config(LambdaRetry::disabled())),
            s3: mock_client!(aws_sdk_s3, RuleMode::MatchAny, self.s3, |c| c
                .retry_config(S3Retry::disabled())),
            signer: mock_client!(aws_sdk_signer, RuleMode::MatchAny, self.signer, |c| c
                .retry_config(SignerRetry::disabled())),
            cloudfront: mock_client!(aws_sdk_cloudfront, RuleMode::MatchAny, self.cloudfront, |c| c
                .retry_config(CloudFrontRetry::disabled())),
        }
    }
}
