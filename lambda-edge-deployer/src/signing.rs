/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::arn::{ProfileVersionArn, SigningProfileArn};
use crate::config::{RunToken, Settings};
use crate::error::required;
use anyhow::{Context, Result};
use aws_sdk_signer as signer;
use tracing::info;

/// A signing profile and the exact revision of it that artifacts get signed with.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SigningProfile {
    pub arn: SigningProfileArn,
    pub version_arn: ProfileVersionArn,
}

pub async fn create_signing_profile(
    signer_client: &signer::Client,
    settings: &Settings,
    token: &RunToken,
) -> Result<SigningProfile> {
    use signer::types::{SignatureValidityPeriod, ValidityType};

    let profile_name = token.signing_profile_name();
    info!("Creating signing profile {}...", profile_name);
    let output = signer_client
        .put_signing_profile()
        .profile_name(&profile_name)
        .platform_id(&settings.signing_platform_id)
        .signature_validity_period(
            SignatureValidityPeriod::builder()
                .value(settings.signature_validity_days)
                .r#type(ValidityType::Days)
                .build(),
        )
        .send()
        .await
        .context(here!("failed to create signing profile"))?;

    let arn: &str = required(output.arn(), "PutSigningProfile", "arn")?;
    let version_arn: &str = required(
        output.profile_version_arn(),
        "PutSigningProfile",
        "profileVersionArn",
    )?;
    let profile = SigningProfile {
        arn: arn.parse().context(here!())?,
        version_arn: version_arn.parse().context(here!())?,
    };
    info!("Created signing profile {}", profile.version_arn);
    Ok(profile)
}
