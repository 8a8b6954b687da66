/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! CloudFront distribution in front of the artifact bucket, running the
//! published function on every origin request.

use crate::arn::FunctionVersionArn;
use crate::config::{PollConfig, RunToken, Settings};
use crate::error::required;
use crate::wait::{poll_until_ready, Readiness};
use anyhow::{Context, Result};
use aws_sdk_cloudfront as cloudfront;
use aws_sdk_cloudfront::error::BuildError;
use aws_sdk_cloudfront::types::DistributionConfig;
use tracing::info;

pub const ORIGIN_ID: &str = "edge-artifacts-origin";
const DEFAULT_ROOT_OBJECT: &str = "index.html";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CreatedDistribution {
    pub id: String,
    pub domain_name: String,
}

/// Creates an origin access control for signing CloudFront's requests to S3. Returns its id.
pub async fn create_origin_access_control(
    cloudfront_client: &cloudfront::Client,
    token: &RunToken,
) -> Result<String> {
    use cloudfront::types::{
        OriginAccessControlConfig, OriginAccessControlOriginTypes,
        OriginAccessControlSigningBehaviors, OriginAccessControlSigningProtocols,
    };

    let name = token.origin_access_control_name();
    info!("Creating origin access control {}...", name);
    let output = cloudfront_client
        .create_origin_access_control()
        .origin_access_control_config(
            OriginAccessControlConfig::builder()
                .name(&name)
                .description("Origin access control for the edge function distribution")
                .signing_protocol(OriginAccessControlSigningProtocols::Sigv4)
                .signing_behavior(OriginAccessControlSigningBehaviors::Always)
                .origin_access_control_origin_type(OriginAccessControlOriginTypes::S3)
                .build()
                .context(here!())?,
        )
        .send()
        .await
        .context(here!("failed to create origin access control"))?;

    let control: &cloudfront::types::OriginAccessControl = required(
        output.origin_access_control(),
        "CreateOriginAccessControl",
        "OriginAccessControl",
    )?;
    let id: &str = required(
        control.id(),
        "CreateOriginAccessControl",
        "OriginAccessControl.Id",
    )?;
    Ok(id.to_string())
}

/// Waits until the origin access control can be read back.
pub async fn wait_for_origin_access_control(
    cloudfront_client: &cloudfront::Client,
    id: &str,
    poll: PollConfig,
) -> Result<()> {
    poll_until_ready("origin access control", poll, || async move {
        match cloudfront_client.get_origin_access_control().id(id).send().await {
            Ok(_) => Ok(Readiness::Ready(())),
            Err(err)
                if err
                    .as_service_error()
                    .map_or(false, |e| e.is_no_such_origin_access_control()) =>
            {
                Ok(Readiness::Pending("not found yet".into()))
            }
            Err(err) => Err(err).context(here!("failed to get origin access control")),
        }
    })
    .await
}

/// Configuration for a distribution that serves `bucket` and runs `function` on origin requests.
pub fn distribution_config(
    settings: &Settings,
    token: &RunToken,
    bucket: &str,
    origin_access_control_id: &str,
    function: &FunctionVersionArn,
) -> Result<DistributionConfig, BuildError> {
    use cloudfront::types::{
        AllowedMethods, CachedMethods, DefaultCacheBehavior, EventType, HttpVersion,
        LambdaFunctionAssociation, LambdaFunctionAssociations, Method, Origin, Origins, PriceClass,
        S3OriginConfig, ViewerProtocolPolicy,
    };

    let methods = [Method::Get, Method::Head, Method::Options];
    let origin = Origin::builder()
        .id(ORIGIN_ID)
        .domain_name(format!("{}.s3.{}.amazonaws.com", bucket, settings.region))
        // Empty identity: access goes through the origin access control instead
        .s3_origin_config(S3OriginConfig::builder().origin_access_identity("").build())
        .origin_access_control_id(origin_access_control_id)
        .build()?;
    let association = LambdaFunctionAssociation::builder()
        .lambda_function_arn(function.to_string())
        .event_type(EventType::OriginRequest)
        .include_body(false)
        .build()?;

    let cache_behavior = DefaultCacheBehavior::builder()
        .target_origin_id(ORIGIN_ID)
        .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
        .allowed_methods(
            AllowedMethods::builder()
                .quantity(methods.len() as i32)
                .set_items(Some(methods.to_vec()))
                .cached_methods(
                    CachedMethods::builder()
                        .quantity(methods.len() as i32)
                        .set_items(Some(methods.to_vec()))
                        .build()?,
                )
                .build()?,
        )
        .compress(true)
        .lambda_function_associations(
            LambdaFunctionAssociations::builder()
                .quantity(1)
                .items(association)
                .build()?,
        )
        .cache_policy_id(&settings.cache_policy_id)
        .origin_request_policy_id(&settings.origin_request_policy_id)
        .build()?;

    DistributionConfig::builder()
        .caller_reference(token.as_str())
        .default_root_object(DEFAULT_ROOT_OBJECT)
        .origins(Origins::builder().quantity(1).items(origin).build()?)
        .default_cache_behavior(cache_behavior)
        .comment("Signed Lambda@Edge origin request distribution")
        .price_class(PriceClass::PriceClassAll)
        .enabled(true)
        .http_version(HttpVersion::Http2and3)
        .build()
}

pub async fn create_distribution(
    cloudfront_client: &cloudfront::Client,
    config: DistributionConfig,
) -> Result<CreatedDistribution> {
    info!("Creating CloudFront distribution...");
    let output = cloudfront_client
        .create_distribution()
        .distribution_config(config)
        .send()
        .await
        .context(here!("failed to create CloudFront distribution"))?;

    let distribution: &cloudfront::types::Distribution =
        required(output.distribution(), "CreateDistribution", "Distribution")?;
    let id: &str = required(distribution.id(), "CreateDistribution", "Distribution.Id")?;
    let domain_name: &str = required(
        distribution.domain_name(),
        "CreateDistribution",
        "Distribution.DomainName",
    )?;
    info!("Created CloudFront distribution {} ({})", id, domain_name);
    Ok(CreatedDistribution {
        id: id.into(),
        domain_name: domain_name.into(),
    })
}
