/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::arn::SigningProfileArn;
use crate::config::PollConfig;
use crate::error::{required, DeployError};
use crate::storage::ObjectVersion;
use crate::wait::{poll_until_ready, Readiness};
use anyhow::{Context, Result};
use aws_sdk_signer as signer;
use tracing::{debug, info};

/// Location of the signed artifact a successful signing job wrote.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignedObject {
    pub bucket: String,
    pub key: String,
}

/// Starts signing exactly `object`, writing the result under `output_prefix` in the same bucket.
///
/// Returns the job id.
pub async fn start_signing_job(
    signer_client: &signer::Client,
    profile: &SigningProfileArn,
    object: &ObjectVersion,
    output_prefix: &str,
) -> Result<String> {
    use signer::types::{Destination, S3Destination, S3Source, Source};

    let source = Source::builder()
        .s3(S3Source::builder()
            .bucket_name(&object.bucket)
            .key(&object.key)
            .version(&object.version_id)
            .build()
            .context(here!())?)
        .build();
    let destination = Destination::builder()
        .s3(S3Destination::builder()
            .bucket_name(&object.bucket)
            .prefix(output_prefix)
            .build())
        .build();

    let output = signer_client
        .start_signing_job()
        .source(source)
        .destination(destination)
        .profile_name(profile.profile_name())
        .send()
        .await
        .context(here!("failed to start signing job"))?;
    let job_id: &str = required(output.job_id(), "StartSigningJob", "jobId")?;
    info!(
        job_id,
        version_id = %object.version_id,
        "Started signing s3://{}/{}", object.bucket, object.key
    );
    Ok(job_id.to_string())
}

/// Polls the signing job until it finishes and returns where the signed artifact was written.
pub async fn wait_for_signed_object(
    signer_client: &signer::Client,
    job_id: &str,
    poll: PollConfig,
) -> Result<SignedObject> {
    use signer::types::SigningStatus;

    let signed = poll_until_ready("signing job to complete", poll, || async move {
        let job = signer_client
            .describe_signing_job()
            .job_id(job_id)
            .send()
            .await
            .context(here!("failed to describe signing job"))?;
        debug!(job_id, status = ?job.status(), "polled signing job");
        match job.status() {
            Some(SigningStatus::Succeeded) => {
                let signed: &signer::types::SignedObject =
                    required(job.signed_object(), "DescribeSigningJob", "signedObject")?;
                let s3: &signer::types::S3SignedObject =
                    required(signed.s3(), "DescribeSigningJob", "signedObject.s3")?;
                let bucket: &str =
                    required(s3.bucket_name(), "DescribeSigningJob", "signedObject.s3.bucketName")?;
                let key: &str = required(s3.key(), "DescribeSigningJob", "signedObject.s3.key")?;
                Ok(Readiness::Ready(SignedObject {
                    bucket: bucket.into(),
                    key: key.into(),
                }))
            }
            Some(SigningStatus::Failed) => Err(DeployError::SigningJobFailed {
                job_id: job_id.into(),
                reason: job
                    .status_reason()
                    .unwrap_or("no reason given")
                    .to_string(),
            }
            .into()),
            other => Ok(Readiness::Pending(format!("status: {:?}", other))),
        }
    })
    .await?;
    info!(
        job_id,
        "Signing job finished: s3://{}/{}", signed.bucket, signed.key
    );
    Ok(signed)
}
