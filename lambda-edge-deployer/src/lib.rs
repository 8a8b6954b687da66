/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Provisions a Lambda@Edge function that only runs code signed with AWS Signer,
//! and deploys signed versions of it behind a CloudFront distribution.

#[macro_use]
mod macros;

pub mod arn;
pub mod bootstrap;
pub mod code_signing;
pub mod config;
pub mod deploy;
pub mod distribution;
pub mod error;
pub mod function;
pub mod iam;
pub mod outputs;
pub mod package;
pub mod policy;
pub mod retry;
pub mod signing;
pub mod signing_job;
pub mod storage;
pub mod wait;

#[cfg(test)]
mod test_util;

use aws_config::SdkConfig;

/// One client per service the workflows talk to, all built from the same config.
#[derive(Clone, Debug)]
pub struct Clients {
    pub iam: aws_sdk_iam::Client,
    pub lambda: aws_sdk_lambda::Client,
    pub s3: aws_sdk_s3::Client,
    pub signer: aws_sdk_signer::Client,
    pub cloudfront: aws_sdk_cloudfront::Client,
}

impl Clients {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            iam: aws_sdk_iam::Client::new(config),
            lambda: aws_sdk_lambda::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
            signer: aws_sdk_signer::Client::new(config),
            cloudfront: aws_sdk_cloudfront::Client::new(config),
        }
    }
}
